//! Game loop - round lifecycle and the move/draw activities

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::colour::Colour;
use super::error::GameError;
use super::geometry::Turn;
use super::protocol::{Frame, RoundEvent};
use super::round::{Round, RoundConfig, TickOutcome};
use super::snapshot::FrameBuilder;

/// Lifecycle phase of a game loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// No round started yet
    Created,
    /// Activities running (the current round may already be over)
    Running,
    /// Tearing down the old round before starting a new one
    Restarting,
    /// Terminal
    Ended,
}

/// Who sits on the bikes; reused on restart
#[derive(Debug, Clone)]
enum Lineup {
    Players(Vec<Colour>),
    Demo,
}

/// Handles to the two activities of a running round
struct Activities {
    stop_tx: watch::Sender<bool>,
    move_task: JoinHandle<()>,
    draw_task: JoinHandle<()>,
}

struct Lifecycle {
    phase: LoopPhase,
    lineup: Option<Lineup>,
    activities: Option<Activities>,
}

/// Owns the current round and runs its move and draw activities.
///
/// Turn commands are synchronous and may come from any thread. Lifecycle
/// calls are async because they wait for both activities to exit.
pub struct GameLoop {
    config: RoundConfig,
    lifecycle: Mutex<Lifecycle>,
    current: RwLock<Option<Arc<Round>>>,
    events_tx: broadcast::Sender<RoundEvent>,
    frames_tx: watch::Sender<Arc<Frame>>,
    rounds_started: AtomicU64,
}

impl GameLoop {
    pub fn new(config: RoundConfig) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        let (frames_tx, _) = watch::channel(Arc::new(Frame::default()));

        Self {
            config,
            lifecycle: Mutex::new(Lifecycle {
                phase: LoopPhase::Created,
                lineup: None,
                activities: None,
            }),
            current: RwLock::new(None),
            events_tx,
            frames_tx,
            rounds_started: AtomicU64::new(0),
        }
    }

    /// Round lifecycle events (RoundStarted, BikeCrashed, GameOver)
    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.events_tx.subscribe()
    }

    /// Latest frame from the draw activity
    pub fn frames(&self) -> watch::Receiver<Arc<Frame>> {
        self.frames_tx.subscribe()
    }

    pub fn current_round(&self) -> Option<Arc<Round>> {
        self.current.read().clone()
    }

    pub fn is_round_over(&self) -> bool {
        self.current_round().map_or(false, |round| round.is_over())
    }

    pub async fn phase(&self) -> LoopPhase {
        self.lifecycle.lock().await.phase
    }

    /// Start a round for 0-2 human players
    pub async fn start(&self, players: Vec<Colour>) -> Result<Uuid, GameError> {
        self.start_with(Lineup::Players(players)).await
    }

    /// Start an all-CPU round
    pub async fn start_demo(&self) -> Result<Uuid, GameError> {
        self.start_with(Lineup::Demo).await
    }

    async fn start_with(&self, lineup: Lineup) -> Result<Uuid, GameError> {
        let mut lifecycle = self.lifecycle.lock().await;
        match lifecycle.phase {
            LoopPhase::Created => {}
            LoopPhase::Running | LoopPhase::Restarting => return Err(GameError::AlreadyRunning),
            LoopPhase::Ended => return Err(GameError::Ended),
        }

        let round_id = self.launch(&mut lifecycle, lineup)?;
        lifecycle.phase = LoopPhase::Running;
        Ok(round_id)
    }

    /// Stop both activities, discard the bikes and start over with the same
    /// lineup
    pub async fn restart(&self) -> Result<Uuid, GameError> {
        let mut lifecycle = self.lifecycle.lock().await;
        match lifecycle.phase {
            LoopPhase::Running => {}
            LoopPhase::Created => return Err(GameError::NotStarted),
            LoopPhase::Restarting => return Err(GameError::AlreadyRunning),
            LoopPhase::Ended => return Err(GameError::Ended),
        }

        lifecycle.phase = LoopPhase::Restarting;
        let relaunched = match lifecycle.activities.take() {
            Some(activities) => halt(activities).await,
            None => Ok(()),
        }
        .and_then(|_| {
            let lineup = lifecycle.lineup.clone().ok_or(GameError::NotStarted)?;
            self.launch(&mut lifecycle, lineup)
        });

        let round_id = match relaunched {
            Ok(round_id) => round_id,
            Err(e) => {
                // Old activities are gone either way; allow a fresh start
                lifecycle.phase = LoopPhase::Created;
                self.current.write().take();
                return Err(e);
            }
        };
        lifecycle.phase = LoopPhase::Running;

        info!(round_id = %round_id, "Round restarted");
        Ok(round_id)
    }

    /// Stop both activities for good
    pub async fn end(&self) -> Result<(), GameError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.phase == LoopPhase::Ended {
            return Ok(());
        }

        lifecycle.phase = LoopPhase::Ended;
        let result = match lifecycle.activities.take() {
            Some(activities) => halt(activities).await,
            None => Ok(()),
        };
        self.current.write().take();

        info!("Game loop ended");
        result
    }

    pub fn turn_left(&self, player: usize) {
        self.turn(player, Turn::Left);
    }

    pub fn turn_right(&self, player: usize) {
        self.turn(player, Turn::Right);
    }

    /// Best effort: ignored with no round, an unknown player, a dead bike or
    /// an active cooldown
    pub fn turn(&self, player: usize, turn: Turn) {
        if let Some(round) = self.current_round() {
            round.turn(player, turn);
        }
    }

    /// Build a fresh round and spawn its activities
    fn launch(&self, lifecycle: &mut Lifecycle, lineup: Lineup) -> Result<Uuid, GameError> {
        let number = self.rounds_started.fetch_add(1, Ordering::Relaxed);
        let seed = self
            .config
            .seed
            .map(|base| base.wrapping_add(number))
            .unwrap_or_else(rand::random);

        let round = Arc::new(match &lineup {
            Lineup::Players(colours) => Round::for_players(&self.config, colours, seed)?,
            Lineup::Demo => Round::demo(&self.config, seed)?,
        });
        let round_id = round.id();

        *self.current.write() = Some(round.clone());

        let _ = self.events_tx.send(RoundEvent::RoundStarted {
            round_id,
            bikes: round.bike_infos(),
        });

        let (stop_tx, stop_rx) = watch::channel(false);
        let move_task = tokio::spawn(move_activity(
            round.clone(),
            self.config.move_period,
            self.events_tx.clone(),
            stop_rx.clone(),
        ));
        let draw_task = tokio::spawn(draw_activity(
            round.clone(),
            self.config.draw_period,
            self.frames_tx.clone(),
            stop_rx,
        ));

        lifecycle.lineup = Some(lineup);
        lifecycle.activities = Some(Activities {
            stop_tx,
            move_task,
            draw_task,
        });

        info!(
            round_id = %round_id,
            round = number + 1,
            seed,
            bikes = round.bikes().len(),
            "Round started"
        );
        Ok(round_id)
    }
}

/// Raise the stop flag and wait until both activities have exited
async fn halt(activities: Activities) -> Result<(), GameError> {
    // Either activity may already be gone, so a send error is expected
    let _ = activities.stop_tx.send(true);

    let (moved, drawn) = tokio::join!(activities.move_task, activities.draw_task);
    moved.map_err(|_| GameError::ActivityPanicked("move"))?;
    drawn.map_err(|_| GameError::ActivityPanicked("draw"))?;
    Ok(())
}

/// Resolves when the stop flag is raised or its sender is dropped
async fn stopped(stop: &mut watch::Receiver<bool>) {
    while !*stop.borrow_and_update() {
        if stop.changed().await.is_err() {
            return;
        }
    }
}

fn ticker(start: Instant, period: Duration) -> tokio::time::Interval {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Advances bikes and judges collisions every move period until game over
/// or stop
async fn move_activity(
    round: Arc<Round>,
    period: Duration,
    events_tx: broadcast::Sender<RoundEvent>,
    mut stop: watch::Receiver<bool>,
) {
    let round_id = round.id();
    // Give the renderer one period to show the start positions
    let mut ticks = ticker(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = stopped(&mut stop) => break,
            _ = ticks.tick() => {}
        }

        match round.move_tick() {
            TickOutcome::Advanced { tick, crashed } => {
                publish_crashes(&round, &events_tx, tick, &crashed);
            }
            TickOutcome::GameOver {
                tick,
                crashed,
                winner,
            } => {
                publish_crashes(&round, &events_tx, tick, &crashed);
                let _ = events_tx.send(RoundEvent::GameOver {
                    round_id,
                    tick,
                    winner,
                });
                break;
            }
            TickOutcome::Idle => {
                warn!(round_id = %round_id, "Move tick on a finished round");
                break;
            }
        }
    }

    debug!(round_id = %round_id, ticks = round.tick(), "Move activity stopped");
}

fn publish_crashes(
    round: &Round,
    events_tx: &broadcast::Sender<RoundEvent>,
    tick: u64,
    crashed: &[usize],
) {
    for &bike in crashed {
        let position = round.bikes()[bike].pose().position;
        let _ = events_tx.send(RoundEvent::BikeCrashed {
            round_id: round.id(),
            bike,
            tick,
            position,
        });
    }
}

/// Publishes a frame every draw period until stop
async fn draw_activity(
    round: Arc<Round>,
    period: Duration,
    frames_tx: watch::Sender<Arc<Frame>>,
    mut stop: watch::Receiver<bool>,
) {
    let mut builder = FrameBuilder::new();
    let mut ticks = ticker(Instant::now(), period);

    loop {
        tokio::select! {
            _ = stopped(&mut stop) => break,
            _ = ticks.tick() => {}
        }

        frames_tx.send_replace(Arc::new(builder.build(&round)));
    }

    let stats = builder.stats();
    debug!(
        round_id = %round.id(),
        frames = stats.total_frames,
        avg_points = stats.avg_points_per_frame,
        max_bikes = stats.max_bikes,
        "Draw activity stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn stopped_waits_for_the_flag() {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let mut waiting = task::spawn(stopped(&mut stop_rx));

        assert_pending!(waiting.poll());
        stop_tx.send(true).unwrap();
        assert!(waiting.is_woken());
        assert_ready!(waiting.poll());
    }

    #[test]
    fn dropped_sender_counts_as_stop() {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let mut waiting = task::spawn(stopped(&mut stop_rx));

        assert_pending!(waiting.poll());
        drop(stop_tx);
        assert_ready!(waiting.poll());
    }

    #[tokio::test]
    async fn new_loop_is_idle() {
        let game = GameLoop::new(RoundConfig::default());
        assert_eq!(game.phase().await, LoopPhase::Created);
        assert!(game.current_round().is_none());
        assert!(!game.is_round_over());
        assert_eq!(game.frames().borrow().bikes.len(), 0);
    }
}
