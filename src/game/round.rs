//! Round state and the move tick

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::util::time::{DEFAULT_DRAW_TICK_MS, DEFAULT_MOVE_TICK_MS};

use super::autopilot::Autopilot;
use super::bike::{Bike, BikeStats, Pilot};
use super::collision::CollisionSystem;
use super::colour::Colour;
use super::error::GameError;
use super::geometry::{Arena, Turn};
use super::layout::{self, Seat};
use super::protocol::BikeInfo;

/// Tunables for a round
#[derive(Debug, Clone)]
pub struct RoundConfig {
    pub arena: Arena,
    /// Bikes per round, 2..=8
    pub bike_count: usize,
    pub bike: BikeStats,
    pub autopilot: Autopilot,
    /// Wall margin for collisions (px)
    pub border_buffer: f64,
    /// CPU vision runs on every n-th move tick
    pub vision_every: u64,
    /// CPU idle turning runs on every n-th move tick
    pub autopilot_every: u64,
    pub move_period: Duration,
    pub draw_period: Duration,
    /// Base seed for CPU decisions; random when unset
    pub seed: Option<u64>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            arena: Arena::new(800.0, 600.0),
            bike_count: 2,
            bike: BikeStats::default(),
            autopilot: Autopilot::default(),
            border_buffer: 10.0,
            vision_every: 2,
            autopilot_every: 5,
            move_period: Duration::from_millis(DEFAULT_MOVE_TICK_MS),
            draw_period: Duration::from_millis(DEFAULT_DRAW_TICK_MS),
            seed: None,
        }
    }
}

/// Result of one move tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Bikes moved; `crashed` lists bikes that died this tick
    Advanced { tick: u64, crashed: Vec<usize> },
    /// This tick left at most one bike alive. Returned exactly once.
    GameOver {
        tick: u64,
        crashed: Vec<usize>,
        winner: Option<usize>,
    },
    /// The round was already over; nothing moved
    Idle,
}

/// One round: its bikes, their trails, and the CPU decision source.
///
/// `move_tick` is driven by a single move activity. Turn commands and frame
/// reads may arrive from other threads at any time.
pub struct Round {
    id: Uuid,
    bikes: Vec<Bike>,
    collisions: CollisionSystem,
    vision_every: u64,
    autopilot_every: u64,
    has_cpu: bool,
    tick: AtomicU64,
    over: AtomicBool,
    rng: Mutex<ChaCha8Rng>,
}

impl Round {
    /// Place one bike per seat on the start layout
    pub fn new(config: &RoundConfig, seats: Vec<Seat>, seed: u64) -> Result<Self, GameError> {
        Self::seeded(config, seats, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Round for 0-2 human players; remaining seats get CPU bikes
    pub fn for_players(
        config: &RoundConfig,
        players: &[Colour],
        seed: u64,
    ) -> Result<Self, GameError> {
        let seats = layout::player_seats(players, config.bike_count, &config.autopilot)?;
        Self::new(config, seats, seed)
    }

    /// All-CPU round with distinct random colours
    pub fn demo(config: &RoundConfig, seed: u64) -> Result<Self, GameError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let seats = layout::demo_seats(config.bike_count, &config.autopilot, &mut rng)?;
        Self::seeded(config, seats, rng)
    }

    fn seeded(config: &RoundConfig, seats: Vec<Seat>, rng: ChaCha8Rng) -> Result<Self, GameError> {
        layout::check_bike_count(seats.len())?;

        let slots = layout::start_slots(&config.arena);
        let bikes = seats
            .into_iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (seat, slot))| {
                Bike::new(
                    index,
                    slot.position,
                    slot.direction,
                    seat.colour,
                    seat.pilot,
                    config.bike,
                )
            })
            .collect();

        Self::with_bikes(config, bikes, rng)
    }

    /// Round over caller-built bikes. Bike `n` must report index `n`.
    pub fn with_bikes(
        config: &RoundConfig,
        bikes: Vec<Bike>,
        rng: ChaCha8Rng,
    ) -> Result<Self, GameError> {
        layout::check_bike_count(bikes.len())?;
        if let Some((position, bike)) = bikes
            .iter()
            .enumerate()
            .find(|(position, bike)| bike.index() != *position)
        {
            return Err(GameError::MisnumberedBike {
                position,
                index: bike.index(),
            });
        }

        let has_cpu = bikes.iter().any(Bike::is_cpu);
        Ok(Self {
            id: Uuid::new_v4(),
            bikes,
            collisions: CollisionSystem::new(
                config.arena,
                config.border_buffer,
                config.bike.trail_thickness,
            ),
            vision_every: config.vision_every.max(1),
            autopilot_every: config.autopilot_every.max(1),
            has_cpu,
            tick: AtomicU64::new(0),
            over: AtomicBool::new(false),
            rng: Mutex::new(rng),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bikes(&self) -> &[Bike] {
        &self.bikes
    }

    /// Move ticks run so far
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Acquire)
    }

    pub fn is_over(&self) -> bool {
        self.over.load(Ordering::Acquire)
    }

    pub fn alive_count(&self) -> usize {
        self.bikes.iter().filter(|b| b.is_alive()).count()
    }

    /// First living bike; the winner once the round is over
    pub fn leader(&self) -> Option<usize> {
        self.bikes.iter().find(|b| b.is_alive()).map(Bike::index)
    }

    pub fn bike_infos(&self) -> Vec<BikeInfo> {
        self.bikes
            .iter()
            .map(|bike| BikeInfo {
                index: bike.index(),
                colour: bike.colour(),
                player: match bike.pilot() {
                    Pilot::Human { player } => Some(*player),
                    Pilot::Cpu(_) => None,
                },
            })
            .collect()
    }

    /// Forward a turn command. Unknown indices are ignored.
    pub fn turn(&self, player: usize, turn: Turn) -> bool {
        match self.bikes.get(player) {
            Some(bike) => bike.turn(turn),
            None => {
                trace!(round_id = %self.id, player, "Ignoring turn for unknown player");
                false
            }
        }
    }

    /// Advance every bike, then judge collisions on a fresh snapshot, then
    /// let CPU bikes steer
    pub fn move_tick(&self) -> TickOutcome {
        if self.is_over() {
            return TickOutcome::Idle;
        }

        let tick = self.tick.fetch_add(1, Ordering::AcqRel) + 1;

        for bike in &self.bikes {
            bike.advance();
        }

        let crashed = if self.alive_count() > 1 {
            self.collisions.collision_pass(&self.bikes)
        } else {
            Vec::new()
        };

        for &index in &crashed {
            info!(round_id = %self.id, bike = index, tick, "Bike crashed");
        }

        if self.alive_count() <= 1 {
            if let Some(winner) = self.finish() {
                return TickOutcome::GameOver {
                    tick,
                    crashed,
                    winner,
                };
            }
            return TickOutcome::Idle;
        }

        if self.has_cpu {
            self.steer_cpus(tick);
        }

        TickOutcome::Advanced { tick, crashed }
    }

    /// Flip to over. Returns the winner only for the call that flipped it.
    fn finish(&self) -> Option<Option<usize>> {
        self.over
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                let winner = self.leader();
                info!(round_id = %self.id, tick = self.tick(), ?winner, "Game over");
                winner
            })
    }

    fn steer_cpus(&self, tick: u64) {
        let arena = self.collisions.arena;

        if tick % self.vision_every == 0 {
            let spotted = self.collisions.vision_pass(&self.bikes);
            let mut rng = self.rng.lock();
            for index in spotted {
                let bike = &self.bikes[index];
                if let Some(pilot) = bike.autopilot() {
                    if let Some(turn) = pilot.react_to_wall(bike, &arena, &mut *rng) {
                        debug!(round_id = %self.id, bike = index, ?turn, "Swerved from obstacle");
                    }
                }
            }
        }

        if tick % self.autopilot_every == 0 {
            let mut rng = self.rng.lock();
            for bike in self.bikes.iter().filter(|b| b.is_alive()) {
                if let Some(pilot) = bike.autopilot() {
                    pilot.idle(bike, &arena, &mut *rng);
                }
            }
        }
    }
}
