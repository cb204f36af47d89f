//! Central error type used across the domain, store, and service layers.
//!
//! Every rejection is recoverable: a failed operation leaves all shared
//! state unchanged, and the caller decides whether and how to retry.
//! Nothing in this crate treats a rejected operation as fatal.

use thiserror::Error;

/// Why a submitted move was rejected by the rules or the state machine.
///
/// Surfaced to the acting client only; the room state is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MoveRejection {
    /// It is another player's turn and the card is not a valid jump-in.
    NotYourTurn,
    /// The acting player is not seated in this game.
    NotSeated,
    /// The referenced card is not in the acting player's hand.
    CardNotInHand,
    /// The card does not satisfy the play-legality rules.
    IllegalCard,
    /// The operation is not valid in the current phase or sub-state.
    PhaseMismatch,
    /// Seven-swap requires an explicit swap target.
    SwapTargetRequired,
    /// The chosen swap target is not a valid opponent.
    BadSwapTarget,
    /// Bluffing is disallowed and the wild-draw-four was a bluff.
    BluffDisallowed,
    /// Low-hand declaration requires holding at most one card.
    NotLowHand,
}

/// Why a join attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum JoinRejection {
    RoomFull,
    RoomInProgress,
    BadPassword,
}

/// Semantic conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// The caller's expected version is stale; refetch and retry.
    VersionConflict,
    /// A live room with this id already exists.
    AlreadyExists,
    /// The player is already a member of the room.
    AlreadyMember,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Room,
    Player,
}

/// Operational failures, distinct from game-rule rejections so clients
/// can choose a different retry strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnavailableKind {
    /// The per-room exclusion slot could not be acquired in time.
    Timeout,
    /// The backing store refused or failed the operation.
    Store,
}

/// Central engine error type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("move rejected ({kind:?}): {detail}")]
    Rejected { kind: MoveRejection, detail: String },

    #[error("join rejected ({kind:?}): {detail}")]
    Join { kind: JoinRejection, detail: String },

    #[error("conflict ({kind:?}): {detail}")]
    Conflict { kind: ConflictKind, detail: String },

    #[error("not found ({kind:?}): {detail}")]
    NotFound { kind: NotFoundKind, detail: String },

    #[error("unavailable ({kind:?}): {detail}")]
    Unavailable {
        kind: UnavailableKind,
        detail: String,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

impl EngineError {
    pub fn rejected(kind: MoveRejection, detail: impl Into<String>) -> Self {
        Self::Rejected {
            kind,
            detail: detail.into(),
        }
    }

    pub fn join(kind: JoinRejection, detail: impl Into<String>) -> Self {
        Self::Join {
            kind,
            detail: detail.into(),
        }
    }

    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            detail: detail.into(),
        }
    }

    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            detail: detail.into(),
        }
    }

    pub fn unavailable(kind: UnavailableKind, detail: impl Into<String>) -> Self {
        Self::Unavailable {
            kind,
            detail: detail.into(),
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }

    /// True for errors a client can resolve by refetching state and retrying.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            EngineError::Conflict {
                kind: ConflictKind::VersionConflict,
                ..
            } | EngineError::Unavailable { .. }
        )
    }
}
