mod audio;
mod core;
mod invitations;
mod observability;

pub use audio::{AudioConfig, AutoplayPolicy};
pub use self::core::Config;
pub use invitations::InvitationsConfig;
pub use observability::ObservabilityConfig;
