//! Game errors

use super::layout::MAX_BIKES;

/// Errors raised by round setup and the game loop lifecycle.
///
/// Turn requests never fail: an out-of-range player index is ignored.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("A round needs at least 2 bikes, {0} configured")]
    DegenerateRound(usize),

    #[error("At most {max} bikes fit the start layout, {0} configured", max = MAX_BIKES)]
    TooManyBikes(usize),

    #[error("{players} player colours supplied for {bikes} bikes (at most 2 human players)")]
    TooManyPlayers { players: usize, bikes: usize },

    #[error("Bike at position {position} reports index {index}")]
    MisnumberedBike { position: usize, index: usize },

    #[error("Unknown colour: {0}")]
    UnknownColour(String),

    #[error("A round is already running")]
    AlreadyRunning,

    #[error("No round has been started")]
    NotStarted,

    #[error("Game loop has ended")]
    Ended,

    #[error("The {0} activity panicked")]
    ActivityPanicked(&'static str),
}
