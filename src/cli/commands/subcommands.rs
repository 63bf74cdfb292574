use crate::invitations::ChannelRuleParams;
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

/// Access flags shared by the invitation subcommands
#[derive(Args, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessArgs {
    /// Grant access to the installable app (delivered via WhatsApp)
    #[arg(long)]
    pub app: bool,
    /// Grant access to the web platform (delivered via email)
    #[arg(long)]
    pub platform: bool,
    /// The invitee supplied a phone number
    #[arg(long)]
    pub phone: bool,
}

impl From<AccessArgs> for ChannelRuleParams {
    fn from(args: AccessArgs) -> Self {
        ChannelRuleParams::new(args.app, args.platform, args.phone)
    }
}

/// Invitation subcommands
#[derive(Subcommand, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum InviteCommands {
    /// Print the send plan as JSON
    Plan(AccessArgs),
    /// Print validation errors (exit code 1 when blocked)
    Validate(AccessArgs),
    /// Print a human-readable channel summary
    Describe {
        #[command(flatten)]
        access: AccessArgs,
        /// Locale override (en, pt-BR)
        #[arg(long)]
        locale: Option<String>,
    },
    /// Deliver an invitation through the logging channels
    Send {
        /// Invitee display name
        #[arg(long)]
        name: String,
        /// Invitee email address
        #[arg(long)]
        email: String,
        /// Invitee phone number (E.164)
        #[arg(long)]
        phone: Option<String>,
        /// Grant app access
        #[arg(long)]
        app: bool,
        /// Grant platform access
        #[arg(long)]
        platform: bool,
    },
}

/// Audio subcommands
#[derive(Subcommand, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AudioCommands {
    /// Play clips back to back on the in-memory backend and print each state
    Demo {
        /// Clip URL (repeatable)
        #[arg(long = "clip", required = true)]
        clips: Vec<String>,
        /// Simulate a user gesture after the first clip is requested
        #[arg(long)]
        gesture: bool,
    },
}

/// Device subcommands
#[derive(Subcommand, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceCommands {
    /// Fingerprint a device description given as JSON
    Fingerprint {
        /// JSON object with user_agent, platform, language, timezone, ...
        attributes: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
}
