//! Seams to the platform services that sign attestation challenges and
//! inspect certificates.
//!
//! The crate does not talk to any key store or X.509 library itself. Callers
//! plug those in through [`AttestationSigner`] and [`CertificateParser`];
//! this module only moves envelopes between them.

use alloc::{string::String, vec::Vec};

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{SignedEnvelope, error::ChallengeError};

/// Signs an encoded challenge envelope with a platform key.
pub trait AttestationSigner {
    type Error;

    /// Returns the encoded response envelope for `challenge`.
    ///
    /// # Errors
    ///
    /// Whatever the platform reports.
    fn sign(&mut self, challenge: &[u8], include_cert_request: bool)
    -> Result<Vec<u8>, Self::Error>;
}

/// The parts of a certificate worth showing to a user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct CertificateSummary {
    pub common_name: Option<String>,
    pub issuer_common_name: Option<String>,
    pub not_after: Option<String>,
}

/// Extracts a [`CertificateSummary`] from a DER-encoded certificate.
pub trait CertificateParser {
    type Error;

    /// # Errors
    ///
    /// When `der` is not a certificate the parser understands.
    fn parse_certificate(&self, der: &[u8]) -> Result<CertificateSummary, Self::Error>;
}

/// A signed challenge, decoded and in the base64 form verification
/// endpoints expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeResponse {
    pub envelope: SignedEnvelope,
    pub base64: String,
}

/// Encodes `challenge`, has `signer` sign it and decodes the response.
///
/// ```rust
/// use bytestream::{AttestationSigner, SignedEnvelope, answer_challenge};
///
/// struct Echo;
///
/// impl AttestationSigner for Echo {
///     type Error = core::convert::Infallible;
///
///     fn sign(&mut self, challenge: &[u8], _: bool) -> Result<Vec<u8>, Self::Error> {
///         Ok(challenge.to_vec())
///     }
/// }
///
/// let challenge = SignedEnvelope::new(*b"nonce", *b"sig");
/// let response = answer_challenge(&mut Echo, &challenge, false).unwrap();
/// assert_eq!(response.envelope, challenge);
/// assert_eq!(response.base64, challenge.to_base64().unwrap());
/// ```
///
/// # Errors
///
/// [`ChallengeError::Encode`] when the challenge is too large to encode,
/// [`ChallengeError::Signer`] when signing fails and
/// [`ChallengeError::Decode`] when the response is not an envelope.
pub fn answer_challenge<S: AttestationSigner>(
    signer: &mut S,
    challenge: &SignedEnvelope,
    include_cert_request: bool,
) -> Result<ChallengeResponse, ChallengeError<S::Error>> {
    let encoded = challenge.encode()?;
    let response = signer
        .sign(&encoded, include_cert_request)
        .map_err(ChallengeError::Signer)?;
    let envelope = SignedEnvelope::decode(&response).map_err(ChallengeError::Decode)?;
    tracing::debug!(
        data = envelope.data.len(),
        signature = envelope.signature.len(),
        "challenge answered"
    );
    Ok(ChallengeResponse {
        envelope,
        base64: STANDARD.encode(&response),
    })
}
