//! Invitation channel rules.
//!
//! Given the products an invitation grants and whether the invitee supplied a
//! phone number, decide which delivery channels carry the invitation and
//! whether it can be sent at all. Everything here is pure: no I/O, no shared
//! state, and no error paths. Invalid configurations come back as a blocked
//! [`MandatorySendPlan`].

use serde::{Deserialize, Serialize};
use strum::Display;

/// Access entitlements of an invitation at decision time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRuleParams {
    pub has_app_access: bool,
    pub has_platform_access: bool,
    pub has_phone: bool,
}

impl ChannelRuleParams {
    pub fn new(has_app_access: bool, has_platform_access: bool, has_phone: bool) -> Self {
        Self {
            has_app_access,
            has_platform_access,
            has_phone,
        }
    }

    /// Every combination of the three flags, in a fixed order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0u8..8).map(|bits| Self::new(bits & 0b100 != 0, bits & 0b010 != 0, bits & 0b001 != 0))
    }
}

/// Logical product that motivates a send on some channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Product {
    App,
    Platform,
    PlatformInfo,
}

/// What the caller selected when creating the invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccessProduct {
    Platform,
    App,
    Both,
}

impl AccessProduct {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "platform" => Some(Self::Platform),
            "app" => Some(Self::App),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// True when the invitation grants the installable app and nothing else.
pub fn is_pwa_only(product: AccessProduct) -> bool {
    product == AccessProduct::App
}

/// How strongly a channel is needed.
///
/// `Informative` sends happen whenever they can but never block the
/// invitation, which is why this is not a plain boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChannelRequirement {
    Required,
    Informative,
    #[default]
    NotUsed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPlan {
    pub requirement: ChannelRequirement,
    pub products: Vec<Product>,
}

impl ChannelPlan {
    pub fn mandatory(products: &[Product]) -> Self {
        Self {
            requirement: ChannelRequirement::Required,
            products: products.to_vec(),
        }
    }

    pub fn informative(products: &[Product]) -> Self {
        Self {
            requirement: ChannelRequirement::Informative,
            products: products.to_vec(),
        }
    }

    pub fn is_required(&self) -> bool {
        self.requirement == ChannelRequirement::Required
    }

    /// Whether anything goes out on this channel at all.
    pub fn is_sent(&self) -> bool {
        self.requirement != ChannelRequirement::NotUsed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlockingReason {
    PhoneRequiredForApp,
    PhoneRequiredForAppViaWhatsapp,
    NoAccessSelected,
}

impl BlockingReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::PhoneRequiredForApp => "A phone number is required to grant app access",
            Self::PhoneRequiredForAppViaWhatsapp => {
                "A phone number is required: app access is delivered via WhatsApp"
            }
            Self::NoAccessSelected => "Select at least one access type (platform or app)",
        }
    }

    pub fn mentions_phone(self) -> bool {
        matches!(
            self,
            Self::PhoneRequiredForApp | Self::PhoneRequiredForAppViaWhatsapp
        )
    }
}

/// Outcome of the rule table for one invitation.
///
/// When `can_proceed` is false both channel plans are left at their default
/// and must not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandatorySendPlan {
    pub email: ChannelPlan,
    pub whatsapp: ChannelPlan,
    pub can_proceed: bool,
    pub blocking_reason: Option<BlockingReason>,
}

impl MandatorySendPlan {
    fn proceed(email: ChannelPlan, whatsapp: ChannelPlan) -> Self {
        Self {
            email,
            whatsapp,
            can_proceed: true,
            blocking_reason: None,
        }
    }

    fn blocked(reason: BlockingReason) -> Self {
        Self {
            email: ChannelPlan::default(),
            whatsapp: ChannelPlan::default(),
            can_proceed: false,
            blocking_reason: Some(reason),
        }
    }

    pub fn blocking_message(&self) -> Option<&'static str> {
        self.blocking_reason.map(BlockingReason::message)
    }
}

pub(crate) struct SendRule {
    pub name: &'static str,
    pub applies: fn(&ChannelRuleParams) -> bool,
    pub outcome: fn() -> MandatorySendPlan,
}

/// Ordered rule table. The first rule whose predicate holds decides the plan;
/// predicates are pairwise disjoint and together cover all eight inputs.
pub(crate) const RULES: [SendRule; 7] = [
    SendRule {
        name: "app_only_without_phone",
        applies: |p| p.has_app_access && !p.has_platform_access && !p.has_phone,
        outcome: || MandatorySendPlan::blocked(BlockingReason::PhoneRequiredForApp),
    },
    SendRule {
        name: "app_only_with_phone",
        applies: |p| p.has_app_access && !p.has_platform_access && p.has_phone,
        outcome: || {
            MandatorySendPlan::proceed(
                ChannelPlan::default(),
                ChannelPlan::mandatory(&[Product::App]),
            )
        },
    },
    SendRule {
        name: "platform_only_without_phone",
        applies: |p| !p.has_app_access && p.has_platform_access && !p.has_phone,
        outcome: || {
            MandatorySendPlan::proceed(
                ChannelPlan::mandatory(&[Product::Platform]),
                ChannelPlan::default(),
            )
        },
    },
    SendRule {
        name: "platform_only_with_phone",
        applies: |p| !p.has_app_access && p.has_platform_access && p.has_phone,
        outcome: || {
            MandatorySendPlan::proceed(
                ChannelPlan::mandatory(&[Product::Platform]),
                ChannelPlan::informative(&[Product::PlatformInfo]),
            )
        },
    },
    SendRule {
        name: "app_and_platform_without_phone",
        applies: |p| p.has_app_access && p.has_platform_access && !p.has_phone,
        outcome: || MandatorySendPlan::blocked(BlockingReason::PhoneRequiredForAppViaWhatsapp),
    },
    SendRule {
        name: "app_and_platform_with_phone",
        applies: |p| p.has_app_access && p.has_platform_access && p.has_phone,
        outcome: || {
            MandatorySendPlan::proceed(
                ChannelPlan::mandatory(&[Product::Platform]),
                ChannelPlan::mandatory(&[Product::App, Product::PlatformInfo]),
            )
        },
    },
    SendRule {
        name: "no_access_selected",
        applies: |p| !p.has_app_access && !p.has_platform_access,
        outcome: || MandatorySendPlan::blocked(BlockingReason::NoAccessSelected),
    },
];

pub fn compute_send_plan(params: ChannelRuleParams) -> MandatorySendPlan {
    RULES
        .iter()
        .find(|rule| (rule.applies)(&params))
        .map_or_else(
            || MandatorySendPlan::blocked(BlockingReason::NoAccessSelected),
            |rule| {
                tracing::debug!(rule = rule.name, ?params, "invitation.send_plan");
                (rule.outcome)()
            },
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValidationField {
    Phone,
    Access,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: ValidationField,
    pub message: String,
}

/// Either no errors, or exactly one describing why the invitation is blocked.
pub fn validate(params: ChannelRuleParams) -> Vec<ValidationError> {
    let plan = compute_send_plan(params);
    match plan.blocking_reason {
        Some(reason) if !plan.can_proceed => {
            let field = if reason.mentions_phone() {
                ValidationField::Phone
            } else {
                ValidationField::Access
            };
            vec![ValidationError {
                field,
                message: reason.message().to_string(),
            }]
        }
        _ => Vec::new(),
    }
}

/// Human-readable summary in the current locale.
pub fn describe_channels(params: ChannelRuleParams) -> String {
    let locale = rust_i18n::locale();
    describe_channels_in(params, &locale)
}

pub fn describe_channels_in(params: ChannelRuleParams, locale: &str) -> String {
    let plan = compute_send_plan(params);
    if let Some(reason) = plan.blocking_reason.filter(|_| !plan.can_proceed) {
        return t!(
            "invitations.blocked",
            locale = locale,
            reason = reason_label(reason, locale)
        )
        .into_owned();
    }

    let mut parts = Vec::with_capacity(2);
    if plan.email.is_sent() {
        parts.push(channel_summary(
            t!("invitations.channel.email", locale = locale).into_owned(),
            &plan.email,
            locale,
        ));
    }
    if plan.whatsapp.is_sent() {
        parts.push(channel_summary(
            t!("invitations.channel.whatsapp", locale = locale).into_owned(),
            &plan.whatsapp,
            locale,
        ));
    }
    parts.join(" + ")
}

fn channel_summary(channel: String, plan: &ChannelPlan, locale: &str) -> String {
    let requirement = match plan.requirement {
        ChannelRequirement::Required => t!("invitations.requirement.required", locale = locale),
        ChannelRequirement::Informative => {
            t!("invitations.requirement.informative", locale = locale)
        }
        ChannelRequirement::NotUsed => t!("invitations.requirement.not_used", locale = locale),
    };
    let products = plan
        .products
        .iter()
        .map(|product| product_label(*product, locale))
        .collect::<Vec<_>>()
        .join(", ");

    t!(
        "invitations.summary",
        locale = locale,
        channel = channel,
        requirement = requirement,
        products = products
    )
    .into_owned()
}

fn product_label(product: Product, locale: &str) -> String {
    match product {
        Product::App => t!("invitations.product.app", locale = locale),
        Product::Platform => t!("invitations.product.platform", locale = locale),
        Product::PlatformInfo => t!("invitations.product.platform_info", locale = locale),
    }
    .into_owned()
}

fn reason_label(reason: BlockingReason, locale: &str) -> String {
    match reason {
        BlockingReason::PhoneRequiredForApp => {
            t!("invitations.reason.phone_required_for_app", locale = locale)
        }
        BlockingReason::PhoneRequiredForAppViaWhatsapp => t!(
            "invitations.reason.phone_required_for_app_via_whatsapp",
            locale = locale
        ),
        BlockingReason::NoAccessSelected => {
            t!("invitations.reason.no_access_selected", locale = locale)
        }
    }
    .into_owned()
}
