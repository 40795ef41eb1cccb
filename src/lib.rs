//! shpkit - Library for reading and writing SHP sprite containers
//!
//! This library provides functionality to:
//! - Parse SHP containers and resolve their delta frame references
//! - Decode every frame, including frames stored as XOR deltas of other frames
//! - Write raw frames back into a valid container
//! - Export frames to PNG and pack PNGs into containers

pub mod cli;
pub mod codec;
pub mod config;
pub mod container;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
pub mod output;
pub mod resolve;
pub mod sheet;

pub use codec::{CodecError, FrameCodec, WestwoodCodec};
pub use error::ShpError;
pub use format::FrameFormat;
pub use sheet::{encode_shp, encode_shp_with, write_shp, write_shp_with, ShpFrame, ShpSheet};
