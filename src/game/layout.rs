//! Start positions and seat assignment for a round

use rand::seq::index::sample;
use rand::Rng;

use super::autopilot::Autopilot;
use super::bike::Pilot;
use super::colour::{Colour, PALETTE};
use super::error::GameError;
use super::geometry::{Arena, Direction, Point};

/// Number of distinct start slots
pub const MAX_BIKES: usize = 8;

/// Human players a round can seat
pub const MAX_PLAYERS: usize = 2;

/// Where and which way a bike starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartSlot {
    pub position: Point,
    pub direction: Direction,
}

/// One bike's identity for a round
#[derive(Debug, Clone, PartialEq)]
pub struct Seat {
    pub colour: Colour,
    pub pilot: Pilot,
}

/// The eight start slots on a grid of fifths, pairs facing each other first
pub fn start_slots(arena: &Arena) -> [StartSlot; MAX_BIKES] {
    let (w, h) = (arena.width, arena.height);
    let slot = |x: f64, y: f64, direction| StartSlot {
        position: Point::new(x, y),
        direction,
    };

    [
        slot(w / 5.0, h / 2.0, Direction::Right),
        slot(4.0 * w / 5.0, h / 2.0, Direction::Left),
        slot(w / 2.0, h / 5.0, Direction::Down),
        slot(w / 2.0, 4.0 * h / 5.0, Direction::Up),
        slot(w / 5.0, h / 5.0, Direction::Right),
        slot(4.0 * w / 5.0, h / 5.0, Direction::Left),
        slot(w / 5.0, 4.0 * h / 5.0, Direction::Right),
        slot(4.0 * w / 5.0, 4.0 * h / 5.0, Direction::Left),
    ]
}

pub fn check_bike_count(bikes: usize) -> Result<(), GameError> {
    if bikes < 2 {
        return Err(GameError::DegenerateRound(bikes));
    }
    if bikes > MAX_BIKES {
        return Err(GameError::TooManyBikes(bikes));
    }
    Ok(())
}

/// Seats for a normal round.
///
/// Player colours fill the first seats as human bikes. An empty first seat
/// gets an IndianRed CPU bike, an empty second seat a NavajoWhite one, and
/// any further seats take CPU bikes in palette order.
pub fn player_seats(
    players: &[Colour],
    bikes: usize,
    autopilot: &Autopilot,
) -> Result<Vec<Seat>, GameError> {
    check_bike_count(bikes)?;
    if players.len() > MAX_PLAYERS {
        return Err(GameError::TooManyPlayers {
            players: players.len(),
            bikes,
        });
    }

    let seats = (0..bikes)
        .map(|index| match players.get(index) {
            Some(colour) => Seat {
                colour: *colour,
                pilot: Pilot::Human { player: index },
            },
            None => Seat {
                colour: match index {
                    0 => Colour::INDIAN_RED,
                    1 => Colour::NAVAJO_WHITE,
                    n => PALETTE[(n - 2) % PALETTE.len()],
                },
                pilot: Pilot::Cpu(autopilot.clone()),
            },
        })
        .collect();

    Ok(seats)
}

/// Seats for an all-CPU demo round, each bike a distinct palette colour
pub fn demo_seats<R: Rng + ?Sized>(
    bikes: usize,
    autopilot: &Autopilot,
    rng: &mut R,
) -> Result<Vec<Seat>, GameError> {
    check_bike_count(bikes)?;

    let seats = sample(rng, PALETTE.len(), bikes)
        .into_iter()
        .map(|pick| Seat {
            colour: PALETTE[pick],
            pilot: Pilot::Cpu(autopilot.clone()),
        })
        .collect();

    Ok(seats)
}
