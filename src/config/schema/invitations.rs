use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationsConfig {
    /// Locale used for channel summaries ("en", "pt-BR")
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Name shown as the sender of invitation messages
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
}

fn default_locale() -> String {
    "en".into()
}

fn default_sender_name() -> String {
    "KnowYOU".into()
}

impl Default for InvitationsConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            sender_name: default_sender_name(),
        }
    }
}
