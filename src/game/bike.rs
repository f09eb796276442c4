//! Bike kinematics and the Alive -> Dead state machine

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::autopilot::Autopilot;
use super::colour::Colour;
use super::geometry::{Direction, Point, Probe, Turn};
use super::trail::Trail;

/// Kinematic constants shared by every bike in a round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BikeStats {
    /// Distance covered per move tick (px)
    pub speed: f64,
    /// Width of a trail, and of the arena wall (px)
    pub trail_thickness: f64,
    /// Gap between a bike and the near edge of its probes
    pub probe_epsilon: f64,
}

impl BikeStats {
    /// Cooldown applied after a turn; the bike must cover this distance
    /// before it may turn again
    pub fn turn_grace(&self) -> f64 {
        4.0 * self.trail_thickness
    }
}

impl Default for BikeStats {
    fn default() -> Self {
        Self {
            speed: 2.0,
            trail_thickness: 10.0,
            probe_epsilon: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BikeStatus {
    Alive,
    /// Terminal; position, heading and trail are frozen
    Dead,
}

/// Who steers a bike
#[derive(Debug, Clone, PartialEq)]
pub enum Pilot {
    /// Driven by turn commands for the given player index
    Human { player: usize },
    /// Driven by the autopilot policy each tick
    Cpu(Autopilot),
}

/// Copy of a bike's kinematic state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point,
    pub direction: Direction,
    pub status: BikeStatus,
}

impl Pose {
    pub fn is_alive(&self) -> bool {
        self.status == BikeStatus::Alive
    }
}

#[derive(Debug)]
struct Motion {
    position: Point,
    direction: Direction,
    status: BikeStatus,
    turn_cooldown: f64,
}

/// A light cycle and the trail it owns.
///
/// Kinematics and trail each sit behind their own lock; when both are needed
/// the kinematics lock is taken first.
#[derive(Debug)]
pub struct Bike {
    index: usize,
    colour: Colour,
    pilot: Pilot,
    stats: BikeStats,
    motion: Mutex<Motion>,
    trail: Trail,
}

impl Bike {
    pub fn new(
        index: usize,
        spawn: Point,
        direction: Direction,
        colour: Colour,
        pilot: Pilot,
        stats: BikeStats,
    ) -> Self {
        Self {
            index,
            colour,
            pilot,
            stats,
            motion: Mutex::new(Motion {
                position: spawn,
                direction,
                status: BikeStatus::Alive,
                turn_cooldown: 0.0,
            }),
            trail: Trail::new(spawn),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn pilot(&self) -> &Pilot {
        &self.pilot
    }

    pub fn autopilot(&self) -> Option<&Autopilot> {
        match &self.pilot {
            Pilot::Cpu(autopilot) => Some(autopilot),
            Pilot::Human { .. } => None,
        }
    }

    pub fn is_cpu(&self) -> bool {
        self.autopilot().is_some()
    }

    pub fn pose(&self) -> Pose {
        let motion = self.motion.lock();
        Pose {
            position: motion.position,
            direction: motion.direction,
            status: motion.status,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.motion.lock().status == BikeStatus::Alive
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Move one tick forward along the current heading. No-op once dead.
    pub fn advance(&self) {
        let mut motion = self.motion.lock();
        if motion.status == BikeStatus::Dead {
            return;
        }

        motion.position = motion.position.offset(motion.direction, self.stats.speed);
        if motion.turn_cooldown > 0.0 {
            motion.turn_cooldown -= self.stats.speed;
        }

        self.trail.advance(motion.position);
    }

    pub fn turn_left(&self) -> bool {
        self.turn(Turn::Left)
    }

    pub fn turn_right(&self) -> bool {
        self.turn(Turn::Right)
    }

    /// Rotate a quarter turn. Returns false (and changes nothing) while dead
    /// or still cooling down from the previous turn.
    pub fn turn(&self, turn: Turn) -> bool {
        let mut motion = self.motion.lock();
        if motion.status == BikeStatus::Dead || motion.turn_cooldown > 0.0 {
            return false;
        }

        motion.direction = turn.apply(motion.direction);
        motion.turn_cooldown = self.stats.turn_grace();
        self.trail.turn(motion.position);
        true
    }

    /// Returns true if this call killed the bike
    pub fn mark_dead(&self) -> bool {
        let mut motion = self.motion.lock();
        let was_alive = motion.status == BikeStatus::Alive;
        motion.status = BikeStatus::Dead;
        was_alive
    }

    /// Region the bike sweeps through on its next move
    pub fn collision_probe(&self) -> Probe {
        let pose = self.pose();
        Probe::ahead(
            pose.position,
            pose.direction,
            self.stats.speed,
            self.stats.probe_epsilon,
        )
    }

    /// Collision probe stretched by `sight_range`, for autopilot steering only
    pub fn vision_probe(&self, sight_range: f64) -> Probe {
        let pose = self.pose();
        Probe::ahead(
            pose.position,
            pose.direction,
            self.stats.speed + sight_range,
            self.stats.probe_epsilon,
        )
    }
}
