use crate::config::Config;

pub fn render_status(config: &Config) -> String {
    let mut lines = vec![
        format!("◆ {}", t!("status.title")),
        String::new(),
        format!("{}     {}", t!("status.version"), env!("CARGO_PKG_VERSION")),
        format!(
            "{}      {}",
            t!("status.config"),
            config.config_path.display()
        ),
        format!("{}   {}", t!("status.log_level"), config.log_level),
        format!(
            "{}  {}",
            t!("status.observability"),
            config.observability.backend
        ),
        String::new(),
        format!("{}", t!("status.audio")),
        format!(
            "  {}   {}",
            t!("status.autoplay_policy"),
            config.audio.autoplay_policy
        ),
        format!(
            "  {}   {}",
            t!("status.frequency_bins"),
            config.audio.frequency_bins
        ),
        format!(
            "  {}   {:.2}",
            t!("status.default_volume"),
            config.audio.default_volume
        ),
        String::new(),
        format!("{}", t!("status.invitations")),
        format!("  {}   {}", t!("status.locale"), config.invitations.locale),
        format!(
            "  {}   {}",
            t!("status.sender_name"),
            config.invitations.sender_name
        ),
    ];

    if config.observability.backend == "none" || config.observability.backend == "noop" {
        lines.push(String::new());
        lines.push(format!("  {}", t!("status.observability_disabled")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lists_audio_and_invitation_settings() {
        let config = Config::default();
        let status = render_status(&config);
        assert!(status.contains(env!("CARGO_PKG_VERSION")));
        assert!(status.contains("gesture"));
        assert!(status.contains("KnowYOU"));
        assert!(status.contains("32"));
    }

    #[test]
    fn status_mentions_disabled_observability() {
        let disabled = t!("status.observability_disabled");
        assert!(!render_status(&Config::default()).contains(&*disabled));

        let mut config = Config::default();
        config.observability.backend = "none".into();
        let status = render_status(&config);
        assert!(status.contains(&*disabled));
        assert_eq!(status.lines().last().map(str::trim), Some(&*disabled));
    }
}
