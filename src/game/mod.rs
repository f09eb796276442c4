//! Light-cycle simulation modules

pub mod autopilot;
pub mod bike;
pub mod collision;
pub mod colour;
pub mod error;
pub mod game_loop;
pub mod geometry;
pub mod layout;
pub mod protocol;
pub mod round;
pub mod snapshot;
pub mod trail;

pub use autopilot::Autopilot;
pub use bike::{Bike, BikeStats, BikeStatus, Pilot, Pose};
pub use colour::Colour;
pub use error::GameError;
pub use game_loop::{GameLoop, LoopPhase};
pub use geometry::{Arena, Direction, Point, Turn};
pub use protocol::{BikeView, Frame, RoundEvent, RoundSummary};
pub use round::{Round, RoundConfig, TickOutcome};
