//! Rule engine for a Shenzhen-style solitaire.
//!
//! A [`Board`] owns every card and container of one game. The presentation
//! layer forwards gestures ([`Gesture`]) and gets back an [`Update`] carrying
//! the applied move, any dragon collapse, the one-shot win flag and a fresh
//! [`BoardSnapshot`] to draw.

pub mod board;
pub mod card;
pub mod config;
pub mod container;
pub mod deck;
pub mod error;
pub mod moves;
pub mod snapshot;
pub mod stats;


pub use board::Board;
pub use card::{Card, CardId, Rank, Suit, SUITS};
pub use config::GameConfig;
pub use container::{Container, ContainerId, Position};
pub use deck::{deal, generate_deck, Deck};
pub use error::{EngineError, StatsError};
pub use moves::{Gesture, Move, Selection, Update};
pub use snapshot::BoardSnapshot;
pub use stats::Stats;
