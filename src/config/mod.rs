//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::game::colour::Colour;
use crate::game::geometry::Arena;
use crate::game::round::RoundConfig;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Simulation tunables for every round
    pub round: RoundConfig,
    /// Colours of the human players; empty means demo mode
    pub players: Vec<Colour>,
    /// Rounds to play before exiting
    pub demo_rounds: u32,
    /// Give up on a round that has not ended after this long
    pub round_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any name -> value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = RoundConfig::default();

        let width = parse_or(&lookup, "ARENA_WIDTH", defaults.arena.width)?;
        let height = parse_or(&lookup, "ARENA_HEIGHT", defaults.arena.height)?;
        if width <= 0.0 {
            return Err(ConfigError::invalid("ARENA_WIDTH", width));
        }
        if height <= 0.0 {
            return Err(ConfigError::invalid("ARENA_HEIGHT", height));
        }

        let vision_every = parse_or(&lookup, "VISION_EVERY", defaults.vision_every)?;
        if vision_every == 0 {
            return Err(ConfigError::invalid("VISION_EVERY", vision_every));
        }
        let autopilot_every = parse_or(&lookup, "AUTOPILOT_EVERY", defaults.autopilot_every)?;
        if autopilot_every == 0 {
            return Err(ConfigError::invalid("AUTOPILOT_EVERY", autopilot_every));
        }

        let move_ms = parse_or(&lookup, "MOVE_TICK_MS", defaults.move_period.as_millis() as u64)?;
        let draw_ms = parse_or(&lookup, "DRAW_TICK_MS", defaults.draw_period.as_millis() as u64)?;

        let seed = match lookup("RNG_SEED") {
            Some(raw) => Some(parse("RNG_SEED", &raw)?),
            None => None,
        };

        let round = RoundConfig {
            arena: Arena::new(width, height),
            bike_count: parse_or(&lookup, "BIKE_COUNT", defaults.bike_count)?,
            vision_every,
            autopilot_every,
            move_period: Duration::from_millis(move_ms),
            draw_period: Duration::from_millis(draw_ms),
            seed,
            ..defaults
        };

        let players = match lookup("PLAYER_COLOURS") {
            Some(raw) => parse_colours(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            round,
            players,
            demo_rounds: parse_or(&lookup, "DEMO_ROUNDS", 3)?,
            round_timeout: Duration::from_secs(parse_or(&lookup, "ROUND_TIMEOUT_SECS", 120)?),
        })
    }
}

fn parse<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
    })
}

fn parse_or<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => parse(var, &raw),
        None => Ok(default),
    }
}

/// Comma separated colour names or hex codes, e.g. `aqua,#cd853f`
fn parse_colours(raw: &str) -> Result<Vec<Colour>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| parse("PLAYER_COLOURS", name))
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl ConfigError {
    fn invalid(var: &'static str, value: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
        }
    }
}
