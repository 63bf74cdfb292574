pub mod schema;

pub use schema::{AudioConfig, AutoplayPolicy, Config, InvitationsConfig, ObservabilityConfig};
