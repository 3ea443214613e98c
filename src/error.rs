//! Error types.
//!
//! Rejected moves are not errors: the board simply stays as it was. The
//! variants of [`EngineError`] describe broken internal contracts that user
//! input cannot reach once gesture targets are validated against the board.

use crate::card::CardId;
use crate::container::ContainerId;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("container {container} does not own card {card}")]
    NotOwned { card: CardId, container: ContainerId },

    #[error("card {0} is not placed in any container")]
    Unplaced(CardId),

    #[error("malformed deck: {0}")]
    MalformedDeck(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("failed to access stats file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stats file {path} is not valid: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
