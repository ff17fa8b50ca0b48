// Audio module - the playback clock seam the sync engine reads

pub mod playhead;

pub use playhead::{PlaybackPosition, SharedPlayhead};
