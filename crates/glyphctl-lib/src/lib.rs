//! glyphctl-lib — animation playback engine for a five-segment glyph LED array.

pub mod channel;
pub mod config;
pub mod error;
pub mod player;
pub mod script;
pub mod status;

pub use error::GlyphError;
