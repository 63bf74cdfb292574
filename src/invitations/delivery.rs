use super::channel_rules::{
    ChannelPlan, ChannelRequirement, ChannelRuleParams, MandatorySendPlan, Product,
    compute_send_plan,
};
use crate::error::InvitationError;
use crate::observability::{Observer, ObserverEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// An invitation ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub invitee_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub has_app_access: bool,
    pub has_platform_access: bool,
}

impl Invitation {
    /// Phone numbers that are blank after trimming count as absent.
    pub fn phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
    }

    pub fn rule_params(&self) -> ChannelRuleParams {
        ChannelRuleParams::new(
            self.has_app_access,
            self.has_platform_access,
            self.phone().is_some(),
        )
    }
}

/// Payload handed to a delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationMessage {
    pub invitation_id: String,
    pub invitee_name: String,
    pub sender_name: String,
    pub requirement: ChannelRequirement,
    pub products: Vec<Product>,
}

/// Outbound transport for invitations (email provider, WhatsApp gateway, ...)
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Send one invitation message
    async fn send(&self, recipient: &str, message: &InvitationMessage) -> anyhow::Result<()>;
}

/// Delivery channel that only logs what it would send.
pub struct LogDeliveryChannel {
    name: String,
}

impl LogDeliveryChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl DeliveryChannel for LogDeliveryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, recipient: &str, message: &InvitationMessage) -> anyhow::Result<()> {
        tracing::info!(
            channel = %self.name,
            recipient = %recipient,
            invitation = %message.invitation_id,
            requirement = %message.requirement,
            products = ?message.products,
            "invitation.send"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelOutcome {
    Skipped,
    Sent,
    Failed { reason: String },
    /// Delivery stopped on an earlier channel before this one was tried.
    NotAttempted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub invitation_id: String,
    pub delivered_at: DateTime<Utc>,
    pub plan: MandatorySendPlan,
    pub email: ChannelOutcome,
    pub whatsapp: ChannelOutcome,
}

/// Why a single channel send did not produce an outcome.
enum SendFailure {
    MissingRecipient,
    Failed(String),
}

/// Applies a send plan through the email and WhatsApp channels.
///
/// Required sends must succeed; informative sends are best-effort and their
/// failures only show up in the report. Email is sent before WhatsApp. When a
/// required send fails the error carries the report so far, and
/// [`redeliver`](Self::redeliver) retries only what was not sent.
pub struct InvitationDispatcher {
    email: Arc<dyn DeliveryChannel>,
    whatsapp: Arc<dyn DeliveryChannel>,
    observer: Arc<dyn Observer>,
    sender_name: String,
}

impl InvitationDispatcher {
    pub fn new(
        email: Arc<dyn DeliveryChannel>,
        whatsapp: Arc<dyn DeliveryChannel>,
        observer: Arc<dyn Observer>,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            email,
            whatsapp,
            observer,
            sender_name: sender_name.into(),
        }
    }

    pub async fn deliver(&self, invitation: &Invitation) -> Result<DeliveryReport, InvitationError> {
        self.deliver_remaining(invitation, Uuid::new_v4().to_string(), None)
            .await
    }

    /// Resume a delivery that failed part-way. Channels already `Sent` in
    /// `previous` are not sent again and the invitation id is kept.
    pub async fn redeliver(
        &self,
        invitation: &Invitation,
        previous: &DeliveryReport,
    ) -> Result<DeliveryReport, InvitationError> {
        self.deliver_remaining(invitation, previous.invitation_id.clone(), Some(previous))
            .await
    }

    async fn deliver_remaining(
        &self,
        invitation: &Invitation,
        invitation_id: String,
        previous: Option<&DeliveryReport>,
    ) -> Result<DeliveryReport, InvitationError> {
        let plan = compute_send_plan(invitation.rule_params());
        self.observer.record_event(&ObserverEvent::InvitationPlanned {
            can_proceed: plan.can_proceed,
            reason: plan.blocking_reason.map(|reason| reason.to_string()),
        });

        if !plan.can_proceed {
            let message = plan.blocking_message().unwrap_or("invitation is blocked");
            return Err(InvitationError::Blocked(message.to_string()));
        }

        let mut report = DeliveryReport {
            invitation_id,
            delivered_at: Utc::now(),
            plan,
            email: ChannelOutcome::NotAttempted,
            whatsapp: ChannelOutcome::NotAttempted,
        };

        let sent = self
            .send_on(
                self.email.as_ref(),
                &report.plan.email,
                Some(invitation.email.trim()).filter(|email| !email.is_empty()),
                previous.map(|p| &p.email),
                invitation,
                &report.invitation_id,
            )
            .await;
        match sent {
            Ok(outcome) => report.email = outcome,
            Err(failure) => {
                return Err(self.abort(self.email.as_ref(), failure, report, |r| &mut r.email));
            }
        }

        let sent = self
            .send_on(
                self.whatsapp.as_ref(),
                &report.plan.whatsapp,
                invitation.phone(),
                previous.map(|p| &p.whatsapp),
                invitation,
                &report.invitation_id,
            )
            .await;
        match sent {
            Ok(outcome) => report.whatsapp = outcome,
            Err(failure) => {
                return Err(self.abort(self.whatsapp.as_ref(), failure, report, |r| {
                    &mut r.whatsapp
                }));
            }
        }

        Ok(report)
    }

    async fn send_on(
        &self,
        channel: &dyn DeliveryChannel,
        plan: &ChannelPlan,
        recipient: Option<&str>,
        previous: Option<&ChannelOutcome>,
        invitation: &Invitation,
        invitation_id: &str,
    ) -> Result<ChannelOutcome, SendFailure> {
        if !plan.is_sent() {
            return Ok(ChannelOutcome::Skipped);
        }
        if previous == Some(&ChannelOutcome::Sent) {
            tracing::debug!(
                channel = channel.name(),
                invitation = %invitation_id,
                "invitation.already_sent"
            );
            return Ok(ChannelOutcome::Sent);
        }

        let Some(recipient) = recipient else {
            if plan.is_required() {
                return Err(SendFailure::MissingRecipient);
            }
            return Ok(ChannelOutcome::Skipped);
        };

        let message = InvitationMessage {
            invitation_id: invitation_id.to_string(),
            invitee_name: invitation.invitee_name.clone(),
            sender_name: self.sender_name.clone(),
            requirement: plan.requirement,
            products: plan.products.clone(),
        };

        let result = channel.send(recipient, &message).await;
        self.observer
            .record_event(&ObserverEvent::InvitationDelivered {
                channel: channel.name().to_string(),
                requirement: plan.requirement.to_string(),
                success: result.is_ok(),
            });

        match result {
            Ok(()) => Ok(ChannelOutcome::Sent),
            Err(err) if plan.requirement == ChannelRequirement::Informative => {
                tracing::warn!(
                    channel = channel.name(),
                    error = %err,
                    "invitation.informative_send_failed"
                );
                Ok(ChannelOutcome::Failed {
                    reason: err.to_string(),
                })
            }
            Err(err) => Err(SendFailure::Failed(format!("{err:#}"))),
        }
    }

    /// Turn a failed required send into an error carrying the report so far.
    fn abort(
        &self,
        channel: &dyn DeliveryChannel,
        failure: SendFailure,
        mut report: DeliveryReport,
        slot: fn(&mut DeliveryReport) -> &mut ChannelOutcome,
    ) -> InvitationError {
        let channel = channel.name().to_string();
        let message = match failure {
            SendFailure::MissingRecipient => {
                return InvitationError::MissingRecipient { channel };
            }
            SendFailure::Failed(message) => message,
        };

        *slot(&mut report) = ChannelOutcome::Failed {
            reason: message.clone(),
        };
        tracing::warn!(
            channel = %channel,
            invitation = %report.invitation_id,
            email = ?report.email,
            whatsapp = ?report.whatsapp,
            "invitation.delivery_aborted"
        );
        self.observer.record_event(&ObserverEvent::Error {
            component: "invitations".into(),
            message: format!("delivery via {channel} failed: {message}"),
        });
        InvitationError::Delivery {
            channel,
            message,
            report: Box::new(report),
        }
    }
}
