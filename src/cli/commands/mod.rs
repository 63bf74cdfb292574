use clap::{Parser, Subcommand};

mod subcommands;

pub use subcommands::{AudioCommands, ConfigCommands, DeviceCommands, InviteCommands};

/// `KnowYOU` - invitation channel planning and single-flight audio playback.
#[derive(Parser, Debug)]
#[command(name = "knowyou")]
#[command(author = "KnowYOU Team")]
#[command(version)]
#[command(about = "KnowYOU assistant core tools.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan, validate and deliver invitations
    Invite {
        #[command(subcommand)]
        invite_command: InviteCommands,
    },

    /// Exercise the audio coordinator
    Audio {
        #[command(subcommand)]
        audio_command: AudioCommands,
    },

    /// Device identification helpers
    Device {
        #[command(subcommand)]
        device_command: DeviceCommands,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        config_command: ConfigCommands,
    },

    /// Show system status
    Status,
}
