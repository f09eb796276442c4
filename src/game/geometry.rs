//! Arena geometry - points, headings, probe rectangles

use serde::{Deserialize, Serialize};

/// A position in arena space (pixels, origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point reached by travelling `distance` along `direction`
    pub fn offset(self, direction: Direction, distance: f64) -> Self {
        let (dx, dy) = direction.unit();
        Self {
            x: self.x + dx * distance,
            y: self.y + dy * distance,
        }
    }
}

/// The four headings a bike can travel in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in screen coordinates
    pub fn unit(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    /// Quarter turn counter-clockwise: Up -> Left -> Down -> Right -> Up
    pub fn turned_left(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// Quarter turn clockwise, the inverse of [`Direction::turned_left`]
    pub fn turned_right(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }
}

/// Which way to rotate a bike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Left,
    Right,
}

impl Turn {
    pub fn apply(self, direction: Direction) -> Direction {
        match self {
            Turn::Left => direction.turned_left(),
            Turn::Right => direction.turned_right(),
        }
    }
}

/// Thin axis-aligned rectangle projected ahead of a bike.
///
/// `min` and `max` are opposite corners with `min.x <= max.x` and
/// `min.y <= max.y`. The near edge sits `epsilon` in front of the bike so the
/// segment it is drawing right now never registers as an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub min: Point,
    pub max: Point,
    pub heading: Direction,
}

impl Probe {
    pub fn ahead(origin: Point, heading: Direction, reach: f64, epsilon: f64) -> Self {
        let near = origin.offset(heading, epsilon);
        let far = origin.offset(heading, reach);
        Self {
            min: Point::new(near.x.min(far.x), near.y.min(far.y)),
            max: Point::new(near.x.max(far.x), near.y.max(far.y)),
            heading,
        }
    }

    /// The edge furthest along the heading
    pub fn leading_edge(&self) -> Point {
        match self.heading {
            Direction::Up | Direction::Left => self.min,
            Direction::Down | Direction::Right => self.max,
        }
    }

    pub fn corners(&self) -> [Point; 2] {
        [self.min, self.max]
    }
}

/// Playing field dimensions, fixed for the duration of a round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when `point` is strictly further than `margin` from every edge
    pub fn contains_with_margin(&self, point: Point, margin: f64) -> bool {
        point.x > margin
            && point.x < self.width - margin
            && point.y > margin
            && point.y < self.height - margin
    }
}
