//! Collision and vision tests against trails and the arena wall

use tracing::debug;

use super::bike::Bike;
use super::geometry::{Arena, Point, Probe};

/// Geometric obstacle tests for one round.
///
/// Every test runs against trail snapshots taken up front, never against the
/// live trails, so no trail lock is held during a scan.
#[derive(Debug, Clone, Copy)]
pub struct CollisionSystem {
    pub arena: Arena,
    /// Wall margin; a probe corner this close to an edge is a crash (px)
    pub border_buffer: f64,
    pub trail_thickness: f64,
}

impl CollisionSystem {
    pub fn new(arena: Arena, border_buffer: f64, trail_thickness: f64) -> Self {
        Self {
            arena,
            border_buffer,
            trail_thickness,
        }
    }

    /// Copy every bike's trail; `trails[n]` belongs to bike `n`
    pub fn snapshot_trails(bikes: &[Bike]) -> Vec<Vec<Point>> {
        bikes.iter().map(|bike| bike.trail().snapshot()).collect()
    }

    pub fn probe_in_bounds(&self, probe: &Probe) -> bool {
        probe
            .corners()
            .iter()
            .all(|corner| self.arena.contains_with_margin(*corner, self.border_buffer))
    }

    /// Does `probe` touch the wall or any trail segment?
    ///
    /// `own` is the index of the probing bike; its two newest segments are
    /// skipped since the bike is still attached to them.
    pub fn probe_hits(&self, trails: &[Vec<Point>], probe: &Probe, own: usize) -> bool {
        if !self.probe_in_bounds(probe) {
            return true;
        }

        trails.iter().enumerate().any(|(owner, trail)| {
            let skip = if owner == own { 2 } else { 0 };
            trail
                .windows(2)
                .rev()
                .skip(skip)
                .any(|seg| self.segment_hit(seg[1], seg[0], probe))
        })
    }

    /// Segment test. Segments are axis-aligned by construction, so an exact
    /// coordinate match decides the orientation.
    fn segment_hit(&self, p1: Point, p2: Point, probe: &Probe) -> bool {
        let reach = self.trail_thickness;
        let lead = probe.leading_edge();

        if p1.x == p2.x {
            let across = p1.x + reach >= probe.min.x && p1.x - reach <= probe.max.x;
            across && within(lead.y, p1.y, p2.y, reach)
        } else if p1.y == p2.y {
            let across = p1.y + reach >= probe.min.y && p1.y - reach <= probe.max.y;
            across && within(lead.x, p1.x, p2.x, reach)
        } else {
            false
        }
    }

    /// Kill every living bike whose collision probe hits something.
    ///
    /// All bikes are judged against the same snapshot, so two bikes that run
    /// into each other on one tick both die. Returns the newly dead indices.
    pub fn collision_pass(&self, bikes: &[Bike]) -> Vec<usize> {
        let trails = Self::snapshot_trails(bikes);

        let crashed: Vec<usize> = bikes
            .iter()
            .filter(|bike| bike.is_alive())
            .filter(|bike| self.probe_hits(&trails, &bike.collision_probe(), bike.index()))
            .map(|bike| bike.index())
            .collect();

        crashed
            .into_iter()
            .filter(|&index| bikes[index].mark_dead())
            .inspect(|index| debug!(bike = index, "Collision detected"))
            .collect()
    }

    /// Indices of living CPU bikes whose vision probe sees an obstacle.
    /// Nothing is killed here.
    pub fn vision_pass(&self, bikes: &[Bike]) -> Vec<usize> {
        let trails = Self::snapshot_trails(bikes);

        bikes
            .iter()
            .filter(|bike| bike.is_alive())
            .filter_map(|bike| bike.autopilot().map(|pilot| (bike, pilot.sight_range)))
            .filter(|(bike, sight)| {
                self.probe_hits(&trails, &bike.vision_probe(*sight), bike.index())
            })
            .map(|(bike, _)| bike.index())
            .collect()
    }
}

/// Is `value` inside the span `a..=b` widened by `margin` on both ends?
fn within(value: f64, a: f64, b: f64, margin: f64) -> bool {
    let lo = a.min(b) - margin;
    let hi = a.max(b) + margin;
    lo <= value && value <= hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::autopilot::Autopilot;
    use crate::game::bike::{BikeStats, Pilot};
    use crate::game::colour::Colour;
    use crate::game::geometry::Direction;

    fn system() -> CollisionSystem {
        CollisionSystem::new(Arena::new(640.0, 480.0), 10.0, 10.0)
    }

    fn bike(index: usize, x: f64, y: f64, direction: Direction) -> Bike {
        Bike::new(
            index,
            Point::new(x, y),
            direction,
            Colour::STEEL_BLUE,
            Pilot::Human { player: index },
            BikeStats::default(),
        )
    }

    fn cpu(index: usize, x: f64, y: f64, direction: Direction) -> Bike {
        Bike::new(
            index,
            Point::new(x, y),
            direction,
            Colour::AQUA,
            Pilot::Cpu(Autopilot::default()),
            BikeStats::default(),
        )
    }

    #[test]
    fn bike_running_into_a_vertical_trail_dies() {
        // B lays a vertical wall at x=110 spanning y=90..110
        let b = bike(1, 110.0, 90.0, Direction::Down);
        let a = bike(0, 100.0, 100.0, Direction::Right);
        for _ in 0..10 {
            b.advance();
        }
        assert_eq!(
            b.trail().snapshot(),
            vec![Point::new(110.0, 90.0), Point::new(110.0, 110.0)]
        );

        let bikes = vec![a, b];
        bikes[0].advance();

        let dead = system().collision_pass(&bikes);
        assert_eq!(dead, vec![0]);
        assert!(!bikes[0].is_alive());
        assert!(bikes[1].is_alive());
    }

    #[test]
    fn bike_in_open_space_survives() {
        let bikes = vec![
            bike(0, 100.0, 100.0, Direction::Right),
            bike(1, 400.0, 300.0, Direction::Left),
        ];
        for _ in 0..10 {
            bikes.iter().for_each(Bike::advance);
            assert!(system().collision_pass(&bikes).is_empty());
        }
    }

    #[test]
    fn border_kills_regardless_of_trails() {
        let bikes = vec![
            bike(0, 9.0, 200.0, Direction::Left),
            bike(1, 400.0, 300.0, Direction::Left),
        ];
        assert_eq!(system().collision_pass(&bikes), vec![0]);
    }

    #[test]
    fn far_border_kills_too() {
        let bikes = vec![
            bike(0, 629.0, 200.0, Direction::Right),
            bike(1, 300.0, 471.0, Direction::Down),
        ];
        assert_eq!(system().collision_pass(&bikes), vec![0, 1]);
    }

    #[test]
    fn own_fresh_corner_is_not_a_collision() {
        let bikes = vec![
            bike(0, 200.0, 200.0, Direction::Right),
            bike(1, 500.0, 400.0, Direction::Left),
        ];
        for _ in 0..30 {
            bikes[0].advance();
        }
        assert!(bikes[0].turn_left());
        for _ in 0..3 {
            bikes[0].advance();
            assert!(system().collision_pass(&bikes).is_empty());
        }
    }

    #[test]
    fn tight_loop_back_into_own_trail_is_fatal() {
        let bikes = vec![
            bike(0, 200.0, 200.0, Direction::Right),
            bike(1, 500.0, 400.0, Direction::Left),
        ];
        let sys = system();
        let run = |ticks: usize| {
            for _ in 0..ticks {
                bikes[0].advance();
                if !sys.collision_pass(&bikes).is_empty() {
                    return true;
                }
            }
            false
        };

        assert!(!run(30));
        assert!(bikes[0].turn_right()); // down
        assert!(!run(20));
        assert!(bikes[0].turn_right()); // left, back along the first leg
        assert!(!run(20));
        assert!(bikes[0].turn_right()); // up, into the first leg
        assert!(run(20));
        assert!(!bikes[0].is_alive());
    }

    #[test]
    fn head_on_crash_kills_both() {
        let bikes = vec![
            bike(0, 100.0, 100.0, Direction::Right),
            bike(1, 130.0, 100.0, Direction::Left),
        ];
        let sys = system();
        let mut dead = Vec::new();
        for _ in 0..20 {
            bikes.iter().for_each(Bike::advance);
            dead = sys.collision_pass(&bikes);
            if !dead.is_empty() {
                break;
            }
        }
        assert_eq!(dead, vec![0, 1]);
    }

    #[test]
    fn dead_bikes_are_not_rechecked() {
        let bikes = vec![
            bike(0, 9.0, 200.0, Direction::Left),
            bike(1, 400.0, 300.0, Direction::Left),
        ];
        let sys = system();
        assert_eq!(sys.collision_pass(&bikes), vec![0]);
        assert!(sys.collision_pass(&bikes).is_empty());
    }

    #[test]
    fn vision_sees_further_but_does_not_kill() {
        let bikes = vec![
            cpu(0, 100.0, 100.0, Direction::Right),
            bike(1, 120.0, 50.0, Direction::Down),
        ];
        for _ in 0..50 {
            bikes[1].advance();
        }

        let sys = system();
        // wall at x=120, band reaches x=110; collision probe ends at x=102
        assert!(sys.collision_pass(&bikes).is_empty());
        assert_eq!(sys.vision_pass(&bikes), vec![0]);
        assert!(bikes[0].is_alive());
    }

    #[test]
    fn vision_ignores_human_bikes() {
        let bikes = vec![
            bike(0, 15.0, 100.0, Direction::Left),
            cpu(1, 300.0, 300.0, Direction::Up),
        ];
        assert!(system().vision_pass(&bikes).is_empty());
    }
}
