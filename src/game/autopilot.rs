//! CPU steering policy - idle random turns, wall reactions, border bans

use rand::Rng;

use super::bike::{Bike, Pose};
use super::geometry::{Arena, Direction, Turn};

/// Turns the autopilot refuses to make this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnBans {
    pub left: bool,
    pub right: bool,
}

/// Decision procedure for a CPU-controlled bike.
///
/// The policy holds no per-bike state; every call reads the bike's pose and
/// draws from the round's shared generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Autopilot {
    /// Percent chance per idle call of turning at all (split evenly L/R)
    pub turn_chance: u32,
    /// Border margin inside which turns toward that border are banned (px)
    pub danger_zone: f64,
    /// Extra look-ahead beyond the collision probe (px)
    pub sight_range: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            turn_chance: 10,
            danger_zone: 20.0,
            sight_range: 10.0,
        }
    }
}

impl Autopilot {
    /// Which turns would steer further into a nearby border
    pub fn banned_turns(&self, pose: &Pose, arena: &Arena) -> TurnBans {
        let mut bans = TurnBans::default();
        let Pose {
            position,
            direction,
            ..
        } = *pose;

        if position.x < self.danger_zone {
            match direction {
                Direction::Up => bans.left = true,
                Direction::Down => bans.right = true,
                _ => {}
            }
        } else if position.x > arena.width - self.danger_zone {
            match direction {
                Direction::Up => bans.right = true,
                Direction::Down => bans.left = true,
                _ => {}
            }
        }

        if position.y > arena.height - self.danger_zone {
            match direction {
                Direction::Left => bans.left = true,
                Direction::Right => bans.right = true,
                _ => {}
            }
        } else if position.y < self.danger_zone {
            match direction {
                Direction::Left => bans.right = true,
                Direction::Right => bans.left = true,
                _ => {}
            }
        }

        bans
    }

    /// Idle behaviour for a sample in `0..100`: the bottom `turn_chance / 2`
    /// turns left, the top `turn_chance / 2` turns right
    pub fn idle_decision(&self, sample: u32, bans: TurnBans) -> Option<Turn> {
        let half = self.turn_chance / 2;
        if sample < half && !bans.left {
            Some(Turn::Left)
        } else if sample >= 100u32.saturating_sub(half) && !bans.right {
            Some(Turn::Right)
        } else {
            None
        }
    }

    /// Reaction to an obstacle in sight for a sample in `0..100`: a coin flip
    /// between left and right, falling back to right when left is banned
    pub fn wall_decision(&self, sample: u32, bans: TurnBans) -> Option<Turn> {
        if sample >= 50 && !bans.left {
            Some(Turn::Left)
        } else if !bans.right {
            Some(Turn::Right)
        } else {
            None
        }
    }

    /// Occasionally turn at random. Returns the turn if the bike accepted it.
    pub fn idle<R: Rng + ?Sized>(&self, bike: &Bike, arena: &Arena, rng: &mut R) -> Option<Turn> {
        let sample = rng.gen_range(0..100);
        let bans = self.banned_turns(&bike.pose(), arena);
        self.idle_decision(sample, bans)
            .filter(|turn| bike.turn(*turn))
    }

    /// Swerve away from something the vision probe found
    pub fn react_to_wall<R: Rng + ?Sized>(
        &self,
        bike: &Bike,
        arena: &Arena,
        rng: &mut R,
    ) -> Option<Turn> {
        let sample = rng.gen_range(0..100);
        let bans = self.banned_turns(&bike.pose(), arena);
        self.wall_decision(sample, bans)
            .filter(|turn| bike.turn(*turn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::bike::{BikeStats, BikeStatus, Pilot};
    use crate::game::colour::Colour;
    use crate::game::geometry::Point;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const ARENA: Arena = Arena {
        width: 400.0,
        height: 300.0,
    };

    fn pose(x: f64, y: f64, direction: Direction) -> Pose {
        Pose {
            position: Point::new(x, y),
            direction,
            status: BikeStatus::Alive,
        }
    }

    #[test]
    fn no_bans_in_open_space() {
        let pilot = Autopilot::default();
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(pilot.banned_turns(&pose(200.0, 150.0, dir), &ARENA), TurnBans::default());
        }
    }

    #[test]
    fn bans_turns_toward_each_border() {
        let pilot = Autopilot::default();

        // left edge: heading up, a left turn faces the wall
        let bans = pilot.banned_turns(&pose(5.0, 150.0, Direction::Up), &ARENA);
        assert_eq!(bans, TurnBans { left: true, right: false });
        let bans = pilot.banned_turns(&pose(5.0, 150.0, Direction::Down), &ARENA);
        assert_eq!(bans, TurnBans { left: false, right: true });

        // right edge
        let bans = pilot.banned_turns(&pose(390.0, 150.0, Direction::Up), &ARENA);
        assert_eq!(bans, TurnBans { left: false, right: true });
        let bans = pilot.banned_turns(&pose(390.0, 150.0, Direction::Down), &ARENA);
        assert_eq!(bans, TurnBans { left: true, right: false });

        // bottom edge
        let bans = pilot.banned_turns(&pose(200.0, 290.0, Direction::Left), &ARENA);
        assert_eq!(bans, TurnBans { left: true, right: false });
        let bans = pilot.banned_turns(&pose(200.0, 290.0, Direction::Right), &ARENA);
        assert_eq!(bans, TurnBans { left: false, right: true });

        // top edge
        let bans = pilot.banned_turns(&pose(200.0, 5.0, Direction::Left), &ARENA);
        assert_eq!(bans, TurnBans { left: false, right: true });
        let bans = pilot.banned_turns(&pose(200.0, 5.0, Direction::Right), &ARENA);
        assert_eq!(bans, TurnBans { left: true, right: false });
    }

    #[test]
    fn corner_bans_both_turns() {
        let pilot = Autopilot::default();
        // near a corner each edge applies independently
        let bans = pilot.banned_turns(&pose(5.0, 5.0, Direction::Up), &ARENA);
        assert!(bans.left);
        let bans = pilot.banned_turns(&pose(395.0, 5.0, Direction::Right), &ARENA);
        assert!(bans.left);
    }

    #[test]
    fn idle_turns_only_in_the_tails() {
        let pilot = Autopilot::default();
        let open = TurnBans::default();
        assert_eq!(pilot.idle_decision(0, open), Some(Turn::Left));
        assert_eq!(pilot.idle_decision(4, open), Some(Turn::Left));
        assert_eq!(pilot.idle_decision(5, open), None);
        assert_eq!(pilot.idle_decision(50, open), None);
        assert_eq!(pilot.idle_decision(94, open), None);
        assert_eq!(pilot.idle_decision(95, open), Some(Turn::Right));
        assert_eq!(pilot.idle_decision(99, open), Some(Turn::Right));
    }

    #[test]
    fn idle_respects_bans() {
        let pilot = Autopilot::default();
        let no_left = TurnBans { left: true, right: false };
        assert_eq!(pilot.idle_decision(0, no_left), None);
        let no_right = TurnBans { left: false, right: true };
        assert_eq!(pilot.idle_decision(99, no_right), None);
    }

    #[test]
    fn wall_reaction_is_a_coin_flip_with_fallback() {
        let pilot = Autopilot::default();
        let open = TurnBans::default();
        assert_eq!(pilot.wall_decision(50, open), Some(Turn::Left));
        assert_eq!(pilot.wall_decision(49, open), Some(Turn::Right));

        let no_left = TurnBans { left: true, right: false };
        assert_eq!(pilot.wall_decision(80, no_left), Some(Turn::Right));

        let boxed_in = TurnBans { left: true, right: true };
        assert_eq!(pilot.wall_decision(80, boxed_in), None);
        assert_eq!(pilot.wall_decision(10, boxed_in), None);
    }

    #[test]
    fn react_to_wall_always_turns_an_open_bike() {
        let pilot = Autopilot::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let bike = Bike::new(
            0,
            Point::new(200.0, 150.0),
            Direction::Right,
            Colour::PERU,
            Pilot::Cpu(pilot.clone()),
            BikeStats::default(),
        );

        let turn = pilot.react_to_wall(&bike, &ARENA, &mut rng);
        assert!(turn.is_some());
        assert_ne!(bike.pose().direction, Direction::Right);

        // cooldown now blocks the next reaction
        assert_eq!(pilot.react_to_wall(&bike, &ARENA, &mut rng), None);
    }
}
