use crate::audio::{
    AudioSnapshot, PlaybackState, UserGesture, create_audio_stack, on_user_gesture,
};
use crate::cli::{AudioCommands, Cli, Commands, ConfigCommands, DeviceCommands, InviteCommands};
use crate::config::Config;
use crate::device::{DeviceAttributes, classify, fingerprint};
use crate::invitations::{
    ChannelRuleParams, DeliveryChannel, Invitation, InvitationDispatcher, LogDeliveryChannel,
    compute_send_plan, describe_channels_in, validate,
};
use crate::observability::{Observer, create_observer};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tracing::info;

use crate::app::status::render_status;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let observer: Arc<dyn Observer> = Arc::from(create_observer(&config.observability));

    match cli.command {
        Commands::Invite { invite_command } => run_invite(invite_command, &config, observer).await,
        Commands::Audio { audio_command } => run_audio(audio_command, &config, observer).await,
        Commands::Device { device_command } => run_device(device_command),
        Commands::Config { config_command } => run_config(config_command, &config),
        Commands::Status => {
            println!("{}", render_status(&config));
            Ok(())
        }
    }
}

async fn run_invite(
    command: InviteCommands,
    config: &Config,
    observer: Arc<dyn Observer>,
) -> Result<()> {
    match command {
        InviteCommands::Plan(access) => {
            let plan = compute_send_plan(access.into());
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
        InviteCommands::Validate(access) => {
            let errors = validate(access.into());
            if errors.is_empty() {
                println!("ok");
                return Ok(());
            }
            for error in &errors {
                println!("{}: {}", error.field, error.message);
            }
            bail!("invitation is blocked")
        }
        InviteCommands::Describe { access, locale } => {
            let locale = locale.unwrap_or_else(|| config.invitations.locale.clone());
            let params: ChannelRuleParams = access.into();
            println!("{}", describe_channels_in(params, &locale));
            Ok(())
        }
        InviteCommands::Send {
            name,
            email,
            phone,
            app,
            platform,
        } => {
            let invitation = Invitation {
                invitee_name: name,
                email,
                phone,
                has_app_access: app,
                has_platform_access: platform,
            };
            let dispatcher = InvitationDispatcher::new(
                Arc::new(LogDeliveryChannel::new("email")) as Arc<dyn DeliveryChannel>,
                Arc::new(LogDeliveryChannel::new("whatsapp")) as Arc<dyn DeliveryChannel>,
                observer,
                config.invitations.sender_name.clone(),
            );
            let report = match dispatcher.deliver(&invitation).await {
                Ok(report) => report,
                Err(err) => {
                    if let Some(partial) = err.partial_report() {
                        println!("{}", serde_json::to_string_pretty(partial)?);
                    }
                    return Err(err.into());
                }
            };
            info!(invitation = %report.invitation_id, "invitation delivered");
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

async fn run_audio(
    command: AudioCommands,
    config: &Config,
    observer: Arc<dyn Observer>,
) -> Result<()> {
    match command {
        AudioCommands::Demo { clips, gesture } => {
            let stack = create_audio_stack(&config.audio, observer);
            let coordinator = &stack.coordinator;
            println!("backend: {}", coordinator.port_name());

            for (index, url) in clips.iter().enumerate() {
                let id = format!("clip-{}", index + 1);
                match coordinator.play_audio(id.as_str(), url.as_str(), "cli").await {
                    Ok(outcome) => println!("{id}: {outcome}"),
                    Err(err) => println!("{id}: error: {err}"),
                }
                print_snapshot(&coordinator.snapshot());

                if gesture && index == 0 && coordinator.pending_play().is_some() {
                    let retried =
                        on_user_gesture(coordinator, stack.unlock.as_deref(), UserGesture::Click)
                            .await;
                    if let Some(outcome) = retried {
                        println!("gesture retry: {outcome}");
                        print_snapshot(&coordinator.snapshot());
                    }
                }
            }

            if coordinator.snapshot().state == PlaybackState::Playing {
                let bins = coordinator.frequency_data();
                println!("frequency bins: {}", bins.len());
            }
            coordinator.stop_all_and_cleanup();
            print_snapshot(&coordinator.snapshot());
            Ok(())
        }
    }
}

fn print_snapshot(snapshot: &AudioSnapshot) {
    println!(
        "  state={} current={} playing={} progress={:.0}% pending={}",
        snapshot.state,
        snapshot.current_id.as_deref().unwrap_or("-"),
        snapshot.is_playing,
        snapshot.progress,
        snapshot
            .pending_play
            .as_ref()
            .map_or("-", |pending| pending.id.as_str()),
    );
}

fn run_device(command: DeviceCommands) -> Result<()> {
    match command {
        DeviceCommands::Fingerprint { attributes } => {
            let attributes: DeviceAttributes =
                serde_json::from_str(&attributes).context("Failed to parse device attributes")?;
            println!(
                "{}",
                serde_json::json!({
                    "fingerprint": fingerprint(&attributes),
                    "class": classify(&attributes),
                })
            );
            Ok(())
        }
    }
}

fn run_config(command: ConfigCommands, config: &Config) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let rendered = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{rendered}");
        }
        ConfigCommands::Path => println!("{}", config.config_path.display()),
    }
    Ok(())
}
