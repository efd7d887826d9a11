//! Byte and bit buffers with pattern search, sequential cursors, a
//! fixed-layout record parser and the signed-data envelope used by platform
//! attestation.

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod attestation;
mod bit_buffer;
mod bit_cursor;
mod byte_buffer;
mod byte_map;
mod envelope;
mod error;
mod options;
mod seq_cursor;
pub mod varint;

#[cfg(test)]
mod tests;

pub use attestation::{
    AttestationSigner, CertificateParser, CertificateSummary, ChallengeResponse, answer_challenge,
};
pub use bit_buffer::BitBuffer;
pub use bit_cursor::BitCursor;
pub use byte_buffer::{Boundary, ByteBuffer, Match, NotInMatch, Pair, Replacement, SequenceMatch};
pub use byte_map::{FieldDecoder, FieldSpec, FieldValue, Record, parse_byte_map};
pub use envelope::SignedEnvelope;
pub use error::{BitError, BufferError, ChallengeError, EnvelopeDecodeError, VarintError};
pub use options::{CursorOptions, Direction, SearchWindow};
pub use seq_cursor::{CursorState, SeqCursor};
