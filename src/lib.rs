//! Light Arena - real-time light-cycle arena core
//!
//! Bikes leave permanent trails; touching any trail or the arena wall is
//! fatal; a round ends when at most one bike survives. This crate holds the
//! simulation only:
//! - per-bike state machine and trail
//! - independently clocked move and draw activities
//! - collision and look-ahead tests against trails and walls
//! - the CPU autopilot
//!
//! Input and rendering live outside: callers feed turn commands into a
//! [`GameLoop`](game::GameLoop) and read [`Frame`](game::Frame)s back.

pub mod config;
pub mod game;
pub mod util;
