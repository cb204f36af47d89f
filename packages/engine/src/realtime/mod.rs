//! State distribution: version-tagged events to room subscribers and
//! directory change notices to lobby observers.

mod broker;

pub use broker::{DirectoryEvent, RealtimeBroker, RoomEvent};
