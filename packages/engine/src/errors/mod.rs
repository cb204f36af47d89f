//! Error taxonomy for the session engine.

mod engine;

pub use engine::{
    ConflictKind, EngineError, JoinRejection, MoveRejection, NotFoundKind, UnavailableKind,
};
