use super::traits::{Observer, ObserverEvent, ObserverMetric};
use tracing::{info, warn};

/// Log-based observer backed by tracing
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::InvitationPlanned {
                can_proceed,
                reason,
            } => {
                info!(can_proceed = can_proceed, reason = ?reason, "invitation.planned");
            }
            ObserverEvent::InvitationDelivered {
                channel,
                requirement,
                success,
            } => {
                info!(
                    channel = %channel,
                    requirement = %requirement,
                    success = success,
                    "invitation.delivered"
                );
            }
            ObserverEvent::AudioTransition { id, from, to } => {
                info!(id = ?id, from = %from, to = %to, "audio.transition");
            }
            ObserverEvent::AutoplayDeferred { id, source } => {
                info!(id = %id, source = %source, "audio.autoplay_deferred");
            }
            ObserverEvent::PlaybackFailed { id, message } => {
                warn!(id = %id, error = %message, "audio.playback_failed");
            }
            ObserverEvent::Error { component, message } => {
                warn!(component = %component, error = %message, "error");
            }
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::PlaybackStartLatency(d) => {
                let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
                info!(latency_ms = ms, "metric.playback_start_latency");
            }
            ObserverMetric::PendingRetries(n) => {
                info!(retries = n, "metric.pending_retries");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn log_observer_name() {
        assert_eq!(LogObserver::new().name(), "log");
    }

    #[test]
    fn log_observer_all_events_no_panic() {
        let obs = LogObserver::new();
        obs.record_event(&ObserverEvent::InvitationDelivered {
            channel: "email".into(),
            requirement: "required".into(),
            success: true,
        });
        obs.record_event(&ObserverEvent::PlaybackFailed {
            id: "intro".into(),
            message: "decode".into(),
        });
        obs.record_metric(&ObserverMetric::PlaybackStartLatency(Duration::from_secs(u64::MAX)));
    }
}
