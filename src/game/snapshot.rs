//! Frame building for the draw activity

use super::protocol::{BikeView, Frame};
use super::round::Round;

/// Builds render frames from live round state
#[derive(Debug, Default)]
pub struct FrameBuilder {
    stats: FrameStats,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture every bike's pose and trail.
    ///
    /// Each bike is copied under its own locks, one at a time, so a frame may
    /// mix bikes from adjacent move ticks. That is fine for drawing.
    pub fn build(&mut self, round: &Round) -> Frame {
        let bikes: Vec<BikeView> = round
            .bikes()
            .iter()
            .map(|bike| {
                let pose = bike.pose();
                BikeView {
                    index: bike.index(),
                    status: pose.status,
                    position: pose.position,
                    direction: pose.direction,
                    trail: bike.trail().snapshot(),
                    colour: bike.colour(),
                }
            })
            .collect();

        let points: usize = bikes.iter().map(|b| b.trail.len()).sum();
        self.stats.record(bikes.len(), points);

        Frame {
            round_id: round.id(),
            tick: round.tick(),
            over: round.is_over(),
            bikes,
        }
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

/// Frame counters for debugging
#[derive(Debug, Default, Clone)]
pub struct FrameStats {
    pub total_frames: u64,
    pub total_points: u64,
    pub avg_points_per_frame: f32,
    pub max_bikes: usize,
}

impl FrameStats {
    pub fn record(&mut self, bike_count: usize, points: usize) {
        self.total_frames += 1;
        self.total_points += points as u64;
        self.max_bikes = self.max_bikes.max(bike_count);

        // Running average
        let n = self.total_frames as f32;
        self.avg_points_per_frame =
            self.avg_points_per_frame * ((n - 1.0) / n) + (points as f32 / n);
    }
}
