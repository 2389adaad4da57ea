//! Conference core models and client-side logic
//!
//! Shared structures for conference-service and player frontends:
//! timeline reconciliation for recorded sessions, playback cursor state,
//! and the typed room signaling protocol.

pub mod media;
pub mod playback;
pub mod signal;
pub mod timeline;

pub use playback::{PlaybackCursor, StreamSource};
pub use signal::RoomSignal;
pub use timeline::{ChatMessage, Timeline};
