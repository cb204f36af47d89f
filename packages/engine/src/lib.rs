//! Authoritative engine for real-time shedding-style card games.
//!
//! The crate is layered bottom-up:
//! - [`domain`] holds the pure game model: cards, piles, rules, and the
//!   turn state machine. No I/O, fully deterministic under a seed.
//! - [`room`] is the persisted aggregate a [`store::RoomStore`] holds.
//! - [`service`] serializes mutations per room and commits them with an
//!   optimistic version swap.
//! - [`realtime`] fans lightweight change notifications out to
//!   subscribers, who re-fetch state through the service.

pub mod config;
pub mod domain;
pub mod errors;
pub mod realtime;
pub mod room;
pub mod service;
pub mod store;
pub mod timer;

pub use config::EngineConfig;
pub use errors::EngineError;
pub use service::{Move, MoveApplied, RoomService};
