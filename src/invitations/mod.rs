//! Invitation channel planning and delivery.

pub mod channel_rules;
pub mod delivery;

pub use channel_rules::{
    AccessProduct, BlockingReason, ChannelPlan, ChannelRequirement, ChannelRuleParams,
    MandatorySendPlan, Product, ValidationError, ValidationField, compute_send_plan,
    describe_channels, describe_channels_in, is_pwa_only, validate,
};
pub use delivery::{
    ChannelOutcome, DeliveryChannel, DeliveryReport, Invitation, InvitationDispatcher,
    InvitationMessage, LogDeliveryChannel,
};
