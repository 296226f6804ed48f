//! Code words, block framing and sequence numbers for the TSSC codec.
//!
//! This crate handles the fixed parts of the wire format: the 32 code words
//! that introduce each compressed field, the frame header a transport puts in
//! front of every block, and 16-bit sequence arithmetic. It does not know
//! about compression state.
//!
//! # Design Principles
//!
//! - **Stable wire format** - Code values and the frame layout are protocol constants.
//! - **Bounded decoding** - Block sizes are validated against limits before decoding.
//! - **No codec state** - Adaptive models and histories live in the codec crate.
//!
//! The block layout and code table are described in the workspace `README.md`.

mod code;
mod error;
mod frame;
mod limits;
mod sequence;

pub use code::{CodeWord, XorLayout, CODE_COUNT};
pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use frame::{decode_block, encode_header, BlockHeader, WireBlock, HEADER_SIZE, VERSION};
pub use limits::Limits;
pub use sequence::SequenceNumber;
