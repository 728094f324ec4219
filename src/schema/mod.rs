//! frame.sample.v1 input schema
//!
//! This module defines the line-oriented input format for recorded or piped
//! frames: one JSON object per processed video frame with the face metrics and
//! the breathing rate available at that moment.

mod adapter;
mod frame_record;

pub use adapter::*;
pub use frame_record::*;
