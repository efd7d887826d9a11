use thiserror::Error;

/// Errors raised by [`ByteBuffer`](crate::ByteBuffer) and the byte-map parser.
///
/// A pattern that is simply absent is never an error; searches report that
/// through `Option` or an empty `Vec`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BufferError {
    /// The requested start offset lies outside the buffer.
    #[error("start offset {start} is out of range for a buffer of {len} bytes")]
    StartOutOfRange {
        /// Offending offset.
        start: usize,
        /// Buffer length at the time of the call.
        len: usize,
    },
    /// A hexadecimal string could not be decoded.
    #[error("invalid hex string: {0}")]
    InvalidHex(hex::FromHexError),
    /// A precomputed match does not describe an occurrence of the pattern.
    #[error("no pattern occurrence ends at offset {position}")]
    InvalidMatch {
        /// Reported end offset of the match.
        position: usize,
    },
}

/// Errors raised by [`BitBuffer`](crate::BitBuffer) and
/// [`BitCursor`](crate::BitCursor).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BitError {
    #[error("shift by {shift} bits exceeds one byte")]
    ShiftOutOfRange { shift: u32 },
    #[error("shift by {shift} bits exceeds the {bits} significant bits")]
    ShiftExceedsBits { shift: u32, bits: usize },
    #[error("bit range {start}..={end} is out of bounds for {bits} bits")]
    RangeOutOfBounds { start: usize, end: usize, bits: usize },
    #[error("invalid character '{0}' in bit string")]
    InvalidBitChar(char),
    #[error("{bits} bits do not fit in {capacity} bits of storage")]
    BitsCountTooLarge { bits: usize, capacity: usize },
}

/// Errors raised by the restricted varint codec.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    /// Only values up to [`MAX_VARINT`](crate::varint::MAX_VARINT) have an
    /// encoding.
    #[error("value {0} does not fit in a two-byte varint")]
    TooLarge(usize),
    /// Varints are one or two bytes long.
    #[error("varint of {0} bytes is not supported")]
    InvalidLength(usize),
    /// The first byte of a two-byte varint must carry the continuation bit.
    #[error("first byte {0:#04x} of a two-byte varint lacks the continuation bit")]
    MissingContinuation(u8),
}

/// Errors raised while decoding a [`SignedEnvelope`](crate::SignedEnvelope).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeDecodeError {
    #[error("expected data tag 0x0a, found {found:?}")]
    MissingDataTag { found: Option<u8> },
    #[error("signature tag 0x12 not found after the data field")]
    MissingSignatureTag,
    #[error("signature length does not match the remaining input")]
    BadSignatureLength,
    #[error("invalid base64: {0}")]
    Base64(base64::DecodeError),
}

/// Errors raised while answering an attestation challenge.
#[derive(Debug, Error, PartialEq)]
pub enum ChallengeError<E> {
    #[error("challenge could not be encoded: {0}")]
    Encode(#[from] VarintError),
    #[error("signer failed: {0}")]
    Signer(E),
    #[error("signer response could not be decoded: {0}")]
    Decode(EnvelopeDecodeError),
}
