//! Adaptive lossless compression of telemetry measurement streams.
//!
//! This is the main codec crate. It ties bitstream and wire together to
//! compress ordered `(point id, timestamp, quality, value)` tuples: each field
//! is coded against the history of its point or of the stream, and every
//! point keeps an adaptive prefix model that shrinks its most frequent codes.
//!
//! # Features
//!
//! - [`Encoder`] / [`Decoder`] with history that persists across blocks
//! - Block handles bound to a caller-provided window
//! - Sequenced [`EncodeSession`] / [`DecodeSession`] with reset detection
//!
//! # Design Principles
//!
//! - **Correctness first** - Encoder and decoder replay identical adaptation decisions.
//! - **No steady-state allocations** - Uses caller-provided buffers.
//! - **Deterministic** - Same inputs produce same outputs.
//!
//! # Example
//!
//! ```
//! use codec::{Decoder, Encoder, Measurement, PointId};
//!
//! let input = [
//!     Measurement::new(PointId::new(42), 100, 0, 1.0),
//!     Measurement::new(PointId::new(42), 200, 0, 2.0),
//! ];
//!
//! let mut buf = [0u8; 256];
//! let mut encoder = Encoder::new();
//! let mut block = encoder.begin_block(&mut buf, 0, 256).unwrap();
//! for m in &input {
//!     assert!(block.try_add_measurement(m).unwrap());
//! }
//! let len = block.finish().unwrap();
//!
//! let mut decoder = Decoder::new();
//! let output: Vec<Measurement> = decoder
//!     .begin_block(&buf, 0, len)
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(output, input);
//! ```

mod decoder;
mod encoder;
mod error;
mod limits;
mod metadata;
mod model;
mod payload;
mod session;
mod timestamp;
mod types;

pub use decoder::{BlockDecoder, Decoder};
pub use encoder::{BlockEncoder, Encoder};
pub use error::{CodecError, CodecResult, DecodeStage, LimitKind};
pub use limits::{CodecLimits, MEASUREMENT_HEADROOM};
pub use model::{CodeMode, CodeModel};
pub use session::{BlockOutcome, DecodeSession, EncodeSession, EncodedBlock};
pub use types::{Measurement, PointId};
pub use wire::{CodeWord, Limits as WireLimits, SequenceNumber};
