// Dual-value engine: league fantasy score vs. peripheral score, the gap
// between them, and the buy-low / sell-high reports built on top.

pub mod batch;
pub mod compare;
pub mod divergence;
pub mod fantasy;
pub mod peripheral;
pub mod record;

use crate::player::Role;
use thiserror::Error;

pub use batch::{evaluate_batch, BatchOptions, BatchReport, Unevaluated};
pub use compare::{compare_players, Comparison, Edge, Recommendation};
pub use divergence::Signal;
pub use record::{evaluate_player, EvaluationRecord, ScorePair};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("invalid role for {player}: {reason}")]
    InvalidRole { player: String, reason: String },

    #[error("role mismatch: {first} is a {first_role}, {second} is a {second_role}")]
    RoleMismatch {
        first: String,
        first_role: Role,
        second: String,
        second_role: Role,
    },

    #[error("insufficient data for {player}: {detail}")]
    InsufficientData { player: String, detail: String },
}
