//! The two-field signed-data envelope.
//!
//! On the wire an envelope is
//!
//! ```text
//! 0x0A varint(len(data)) data 0x12 varint(len(signature)) signature
//! ```
//!
//! with lengths in the restricted varint form of [`crate::varint`], so each
//! field holds at most [`MAX_VARINT`](crate::varint::MAX_VARINT) bytes.
//! Transports carry envelopes as standard, padded base64.

use alloc::{string::String, vec::Vec};

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    error::{EnvelopeDecodeError, VarintError},
    varint,
};

const DATA_TAG: u8 = 0x0A;
const SIGNATURE_TAG: u8 = 0x12;

/// A data blob and its signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SignedEnvelope {
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Decodes the varint at `at`, `width` bytes wide.
fn length_at(bytes: &[u8], at: usize, width: usize) -> Option<usize> {
    let raw = bytes.get(at..at + width)?;
    varint::decode(raw).ok().map(usize::from)
}

impl SignedEnvelope {
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>, signature: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            signature: signature.into(),
        }
    }

    /// Serializes the envelope.
    ///
    /// ```rust
    /// use bytestream::SignedEnvelope;
    ///
    /// let envelope = SignedEnvelope::new(*b"AB", *b"C");
    /// assert_eq!(envelope.encode().unwrap(), [0x0A, 0x02, 0x41, 0x42, 0x12, 0x01, 0x43]);
    /// ```
    ///
    /// # Errors
    ///
    /// [`VarintError::TooLarge`] when either field is longer than
    /// [`MAX_VARINT`](crate::varint::MAX_VARINT) bytes.
    pub fn encode(&self) -> Result<Vec<u8>, VarintError> {
        let data_len = varint::encode(self.data.len())?;
        let signature_len = varint::encode(self.signature.len())?;
        let mut out = Vec::with_capacity(
            2 + data_len.len() + self.data.len() + signature_len.len() + self.signature.len(),
        );
        out.push(DATA_TAG);
        out.extend_from_slice(data_len.as_bytes());
        out.extend_from_slice(&self.data);
        out.push(SIGNATURE_TAG);
        out.extend_from_slice(signature_len.as_bytes());
        out.extend_from_slice(&self.signature);
        Ok(out)
    }

    /// Parses an envelope.
    ///
    /// Each length is first read as a single byte. The data length falls
    /// back to the two-byte form when the byte after the data it describes
    /// is not the signature tag, and the signature length falls back when
    /// the signature it describes does not end exactly at the end of
    /// `bytes`.
    ///
    /// # Errors
    ///
    /// [`EnvelopeDecodeError::MissingDataTag`] when the first byte is not
    /// `0x0A`, [`EnvelopeDecodeError::MissingSignatureTag`] when neither
    /// data length leads to the signature tag and
    /// [`EnvelopeDecodeError::BadSignatureLength`] when neither signature
    /// length spans the rest of the input.
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeDecodeError> {
        let first = bytes.first().copied();
        if first != Some(DATA_TAG) {
            tracing::debug!(found = ?first, "envelope rejected: no data tag");
            return Err(EnvelopeDecodeError::MissingDataTag { found: first });
        }

        let is_tag = |at: usize| bytes.get(at) == Some(&SIGNATURE_TAG);
        let data = match length_at(bytes, 1, 1).map(|len| (2, 2 + len)) {
            Some((start, stop)) if is_tag(stop) => start..stop,
            _ => {
                tracing::debug!("envelope data length retried in two-byte form");
                match length_at(bytes, 1, 2).map(|len| (3, 3 + len)) {
                    Some((start, stop)) if is_tag(stop) => start..stop,
                    _ => {
                        tracing::debug!("envelope rejected: signature tag not found");
                        return Err(EnvelopeDecodeError::MissingSignatureTag);
                    }
                }
            }
        };

        let tag = data.end;
        let ends_input = |stop: usize| stop == bytes.len();
        let signature = match length_at(bytes, tag + 1, 1).map(|len| (tag + 2, tag + 2 + len)) {
            Some((start, stop)) if ends_input(stop) => start..stop,
            _ => {
                tracing::debug!("envelope signature length retried in two-byte form");
                match length_at(bytes, tag + 1, 2).map(|len| (tag + 3, tag + 3 + len)) {
                    Some((start, stop)) if ends_input(stop) => start..stop,
                    _ => {
                        tracing::debug!("envelope rejected: bad signature length");
                        return Err(EnvelopeDecodeError::BadSignatureLength);
                    }
                }
            }
        };

        Ok(Self {
            data: bytes[data].to_vec(),
            signature: bytes[signature].to_vec(),
        })
    }

    /// The encoded envelope as base64.
    ///
    /// # Errors
    ///
    /// Same as [`encode`](Self::encode).
    pub fn to_base64(&self) -> Result<String, VarintError> {
        self.encode().map(|bytes| STANDARD.encode(bytes))
    }

    /// Decodes a base64-encoded envelope.
    ///
    /// # Errors
    ///
    /// [`EnvelopeDecodeError::Base64`] for malformed base64, otherwise the
    /// errors of [`decode`](Self::decode).
    pub fn from_base64(text: &str) -> Result<Self, EnvelopeDecodeError> {
        let bytes = STANDARD
            .decode(text)
            .map_err(EnvelopeDecodeError::Base64)?;
        Self::decode(&bytes)
    }

    /// Builds an envelope from fields delivered separately as base64, the
    /// way challenges arrive from a verification endpoint.
    ///
    /// # Errors
    ///
    /// [`EnvelopeDecodeError::Base64`] when either field is malformed.
    pub fn from_base64_fields(data: &str, signature: &str) -> Result<Self, EnvelopeDecodeError> {
        Ok(Self {
            data: STANDARD.decode(data).map_err(EnvelopeDecodeError::Base64)?,
            signature: STANDARD
                .decode(signature)
                .map_err(EnvelopeDecodeError::Base64)?,
        })
    }

    #[must_use]
    pub fn data_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    #[must_use]
    pub fn signature_base64(&self) -> String {
        STANDARD.encode(&self.signature)
    }
}
