use anyhow::Result;
use hyperstream::{ConnectionState, SseTransport};
use status_feed_client::bin_common::{
    load_config_from_env, print_banner, print_shutdown, ConfigType, RunConfig,
};
use statusfeed::infrastructure::init_tracing_with_level;
use statusfeed::{EventData, EventKind, FeedConfig, FeedController, FeedUpdate, StreamEvent};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load config first (before logging is initialized)
    let config_path = load_config_from_env(ConfigType::Feed);
    let config = FeedConfig::load(&config_path)?;

    init_tracing_with_level(&config.log_level);
    config.log();

    let run = RunConfig::new("Status Feed Client").with_stats_interval(config.stats_interval_secs);
    print_banner(&run);

    let mut controller = FeedController::from_config(SseTransport::new(), &config);
    controller.connect();

    let mut stats_tick = tokio::time::interval(config.stats_interval());
    // The first tick completes immediately
    stats_tick.tick().await;

    loop {
        tokio::select! {
            update = controller.process_next() => match update {
                Some(FeedUpdate::Event(event)) => log_event(&event),
                Some(FeedUpdate::Status(ConnectionState::Failed)) => {
                    warn!("Giving up on {}; waiting for Ctrl+C", controller.manager().url());
                }
                Some(_) => {}
                None => break,
            },
            _ = stats_tick.tick() => {
                info!("Stats: {}", controller.stats());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    controller.disconnect().await;
    print_shutdown(&run, Some(&controller.stats().to_string()));
    Ok(())
}

fn log_event(event: &StreamEvent) {
    match (event.kind(), event.data()) {
        (EventKind::Status, Some(EventData::Status(status))) => info!(
            "[{}] {}: {} (cpu {:.1}%, memory {:.1})",
            status.timestamp, status.status, status.message, status.cpu, status.memory
        ),
        (EventKind::Connected, Some(EventData::Connected(payload))) => {
            info!("Registered as {}", payload.client_id)
        }
        (kind, Some(EventData::DecodeError { error })) => {
            warn!("{} event {}: {}", kind, event.id(), error)
        }
        (kind, _) => debug!("{} event {}: {}", kind, event.id(), event.raw_data()),
    }
}
