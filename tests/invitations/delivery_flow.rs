use async_trait::async_trait;
use knowyou::error::InvitationError;
use knowyou::invitations::{
    ChannelOutcome, ChannelRequirement, DeliveryChannel, Invitation, InvitationDispatcher,
    InvitationMessage, LogDeliveryChannel,
};
use knowyou::observability::NoopObserver;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct OutboxChannel {
    name: &'static str,
    fail: bool,
    sent: Mutex<Vec<(String, InvitationMessage)>>,
}

impl OutboxChannel {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            ..Self::default()
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: true,
            ..Self::default()
        })
    }

    fn sent(&self) -> Vec<(String, InvitationMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryChannel for OutboxChannel {
    fn name(&self) -> &str {
        self.name
    }

    async fn send(&self, recipient: &str, message: &InvitationMessage) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("{} gateway unavailable", self.name);
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.clone()));
        Ok(())
    }
}

fn invitation(app: bool, platform: bool, phone: Option<&str>) -> Invitation {
    Invitation {
        invitee_name: "Ana Souza".into(),
        email: "ana@clinic.example".into(),
        phone: phone.map(str::to_string),
        has_app_access: app,
        has_platform_access: platform,
    }
}

fn dispatcher(
    email: Arc<dyn DeliveryChannel>,
    whatsapp: Arc<dyn DeliveryChannel>,
) -> InvitationDispatcher {
    InvitationDispatcher::new(email, whatsapp, Arc::new(NoopObserver), "Dr. Lima")
}

#[tokio::test]
async fn full_access_invitation_reaches_both_channels() {
    let email = OutboxChannel::new("email");
    let whatsapp = OutboxChannel::new("whatsapp");
    let report = dispatcher(email.clone(), whatsapp.clone())
        .deliver(&invitation(true, true, Some("+55 11 91234-5678")))
        .await
        .unwrap();

    assert_eq!(report.email, ChannelOutcome::Sent);
    assert_eq!(report.whatsapp, ChannelOutcome::Sent);

    let (recipient, message) = &whatsapp.sent()[0];
    assert_eq!(recipient, "+55 11 91234-5678");
    assert_eq!(message.sender_name, "Dr. Lima");
    assert_eq!(message.requirement, ChannelRequirement::Required);
    assert_eq!(message.invitation_id, report.invitation_id);
    assert_eq!(email.sent()[0].1.invitation_id, report.invitation_id);
}

#[tokio::test]
async fn blank_phone_blocks_app_invitation_before_any_send() {
    let email = OutboxChannel::new("email");
    let whatsapp = OutboxChannel::new("whatsapp");
    let err = dispatcher(email.clone(), whatsapp.clone())
        .deliver(&invitation(true, false, Some("   ")))
        .await
        .unwrap_err();

    assert!(matches!(err, InvitationError::Blocked(_)));
    assert!(email.sent().is_empty());
    assert!(whatsapp.sent().is_empty());
}

#[tokio::test]
async fn courtesy_whatsapp_failure_does_not_fail_platform_invitation() {
    let email = OutboxChannel::new("email");
    let report = dispatcher(email.clone(), OutboxChannel::failing("whatsapp"))
        .deliver(&invitation(false, true, Some("+351 912 345 678")))
        .await
        .unwrap();

    assert_eq!(report.email, ChannelOutcome::Sent);
    assert!(matches!(report.whatsapp, ChannelOutcome::Failed { .. }));
    assert_eq!(email.sent().len(), 1);
}

#[tokio::test]
async fn mandatory_failure_is_reported_with_channel_name() {
    let err = dispatcher(OutboxChannel::new("email"), OutboxChannel::failing("whatsapp"))
        .deliver(&invitation(true, false, Some("+55 21 99876-5432")))
        .await
        .unwrap_err();

    match err {
        InvitationError::Delivery {
            channel,
            message,
            report,
        } => {
            assert_eq!(channel, "whatsapp");
            assert!(message.contains("gateway unavailable"));
            assert_eq!(report.email, ChannelOutcome::Skipped);
            assert!(matches!(report.whatsapp, ChannelOutcome::Failed { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn retrying_half_delivered_invitation_does_not_resend_email() {
    let email = OutboxChannel::new("email");
    let flaky = OutboxChannel::failing("whatsapp");
    let invite = invitation(true, true, Some("+55 11 91234-5678"));

    let err = dispatcher(email.clone(), flaky)
        .deliver(&invite)
        .await
        .unwrap_err();
    let partial = err.partial_report().cloned().unwrap();
    assert_eq!(partial.email, ChannelOutcome::Sent);
    assert_eq!(email.sent().len(), 1);

    let whatsapp = OutboxChannel::new("whatsapp");
    let report = dispatcher(email.clone(), whatsapp.clone())
        .redeliver(&invite, &partial)
        .await
        .unwrap();

    assert_eq!(report.invitation_id, partial.invitation_id);
    assert_eq!(report.whatsapp, ChannelOutcome::Sent);
    assert_eq!(email.sent().len(), 1);
    assert_eq!(whatsapp.sent()[0].1.invitation_id, partial.invitation_id);
}

#[tokio::test]
async fn log_channels_accept_everything() {
    let report = dispatcher(
        Arc::new(LogDeliveryChannel::new("email")),
        Arc::new(LogDeliveryChannel::new("whatsapp")),
    )
    .deliver(&invitation(false, true, None))
    .await
    .unwrap();

    assert_eq!(report.email, ChannelOutcome::Sent);
    assert_eq!(report.whatsapp, ChannelOutcome::Skipped);
    assert!(report.plan.can_proceed);
}
