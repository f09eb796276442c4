//! Trail - the append-only polyline a bike leaves behind

use parking_lot::Mutex;

use super::geometry::Point;

/// Corner points of a bike's trail, oldest first.
///
/// The last point is the open end attached to the bike. Every operation holds
/// the lock only while touching the point list, so a reader copying the trail
/// never sees a half-applied move or turn.
#[derive(Debug)]
pub struct Trail {
    points: Mutex<Vec<Point>>,
}

impl Trail {
    /// Start a trail at the spawn point (stored twice: anchor and open end)
    pub fn new(start: Point) -> Self {
        Self {
            points: Mutex::new(vec![start, start]),
        }
    }

    /// Stretch the open segment so it ends at `head`
    pub fn advance(&self, head: Point) {
        let mut points = self.points.lock();
        if let Some(last) = points.last_mut() {
            *last = head;
        }
    }

    /// Freeze the open segment at `corner` and open a new one from there
    pub fn turn(&self, corner: Point) {
        let mut points = self.points.lock();
        if let Some(last) = points.last_mut() {
            *last = corner;
        }
        points.push(corner);
    }

    /// Consistent copy of every point at the time of the call
    pub fn snapshot(&self) -> Vec<Point> {
        self.points.lock().clone()
    }
}
