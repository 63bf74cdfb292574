use std::time::Duration;

/// Events the observer can record
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    InvitationPlanned {
        can_proceed: bool,
        reason: Option<String>,
    },
    InvitationDelivered {
        channel: String,
        requirement: String,
        success: bool,
    },
    AudioTransition {
        id: Option<String>,
        from: String,
        to: String,
    },
    AutoplayDeferred {
        id: String,
        source: String,
    },
    PlaybackFailed {
        id: String,
        message: String,
    },
    Error {
        component: String,
        message: String,
    },
}

/// Numeric metrics
#[derive(Debug, Clone)]
pub enum ObserverMetric {
    PlaybackStartLatency(Duration),
    PendingRetries(u64),
}

/// Core observability trait, implemented per backend
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Record a numeric metric
    fn record_metric(&self, metric: &ObserverMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
