//! Light Arena - headless light-cycle rounds
//!
//! Plays a fixed number of rounds with the configured lineup and prints a
//! JSON summary per round. With no player colours configured every bike is
//! CPU driven, which makes this a soak test for the simulation core.

use anyhow::bail;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use light_arena::config::Config;
use light_arena::game::protocol::{BikeInfo, RoundEvent, RoundSummary};
use light_arena::game::GameLoop;
use light_arena::util::time::{ticks_per_second, unix_millis, Timer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    info!(
        width = config.round.arena.width,
        height = config.round.arena.height,
        bikes = config.round.bike_count,
        players = config.players.len(),
        moves_per_sec = ticks_per_second(config.round.move_period),
        "Starting Light Arena"
    );

    let game = GameLoop::new(config.round.clone());
    let mut events = game.subscribe();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut round_id = if config.players.is_empty() {
        game.start_demo().await?
    } else {
        game.start(config.players.clone()).await?
    };

    for round in 1..=config.demo_rounds {
        let played = tokio::time::timeout(config.round_timeout, play_round(&mut events, round_id));

        let summary = tokio::select! {
            result = played => match result {
                Ok(summary) => summary?,
                Err(_) => {
                    warn!(round_id = %round_id, round, "Round timed out");
                    None
                }
            },
            _ = &mut shutdown => break,
        };

        if let Some(summary) = summary {
            println!("{}", serde_json::to_string(&summary)?);
        }

        if round < config.demo_rounds {
            round_id = game.restart().await?;
        }
    }

    game.end().await?;
    info!("Shutdown complete");
    Ok(())
}

/// Follow one round's events through to its game over
async fn play_round(
    events: &mut broadcast::Receiver<RoundEvent>,
    round_id: Uuid,
) -> anyhow::Result<Option<RoundSummary>> {
    let timer = Timer::new();
    let mut bikes: Vec<BikeInfo> = Vec::new();
    let mut crashes = Vec::new();

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(round_id = %round_id, skipped, "Event receiver lagged");
                continue;
            }
            Err(RecvError::Closed) => bail!("event channel closed"),
        };

        match event {
            RoundEvent::RoundStarted { round_id: id, bikes: infos } if id == round_id => {
                bikes = infos;
            }
            RoundEvent::BikeCrashed {
                round_id: id, bike, ..
            } if id == round_id => {
                crashes.push(bike);
            }
            RoundEvent::GameOver {
                round_id: id,
                tick,
                winner,
            } if id == round_id => {
                let winner =
                    winner.and_then(|index| bikes.iter().find(|b| b.index == index).cloned());

                return Ok(Some(RoundSummary {
                    round_id,
                    ticks: tick,
                    duration_ms: timer.elapsed_ms(),
                    ended_at: unix_millis(),
                    winner,
                    crashes,
                }));
            }
            // Stale events from a previous round
            _ => {}
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Ctrl+C / SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
