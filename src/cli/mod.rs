pub mod commands;

pub use commands::{AudioCommands, Cli, Commands, ConfigCommands, DeviceCommands, InviteCommands};
