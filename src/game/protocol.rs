//! Types handed to the presentation layer
//! Events and render frames are serialisable so a front end can sit across any boundary

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bike::BikeStatus;
use super::colour::Colour;
use super::geometry::{Direction, Point};

/// Round lifecycle notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    /// Fresh bikes placed and activities running
    RoundStarted {
        round_id: Uuid,
        bikes: Vec<BikeInfo>,
    },

    /// A bike hit a trail or the wall
    BikeCrashed {
        round_id: Uuid,
        bike: usize,
        tick: u64,
        position: Point,
    },

    /// At most one bike left; raised once per round
    GameOver {
        round_id: Uuid,
        tick: u64,
        /// Surviving bike, if any
        winner: Option<usize>,
    },
}

/// Static description of a bike for lobby/HUD use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeInfo {
    pub index: usize,
    pub colour: Colour,
    /// Player index for human bikes, None for CPU bikes
    pub player: Option<usize>,
}

/// Renderable state of one bike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeView {
    pub index: usize,
    pub status: BikeStatus,
    pub position: Point,
    pub direction: Direction,
    /// Trail corners, oldest first; the last point is the bike itself
    pub trail: Vec<Point>,
    pub colour: Colour,
}

impl BikeView {
    pub fn is_alive(&self) -> bool {
        self.status == BikeStatus::Alive
    }
}

/// Everything the renderer needs for one draw tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub round_id: Uuid,
    /// Move tick the frame was captured after
    pub tick: u64,
    pub over: bool,
    pub bikes: Vec<BikeView>,
}

/// End-of-round report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_id: Uuid,
    pub ticks: u64,
    pub duration_ms: u64,
    /// Unix millis when the game-over event was seen
    pub ended_at: u64,
    pub winner: Option<BikeInfo>,
    pub crashes: Vec<usize>,
}
