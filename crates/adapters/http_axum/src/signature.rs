//! HMAC signature verification for Access Controller webhook deliveries.
//!
//! The controller signs every delivery with a `Signature` header of the
//! form `t=<unix seconds>,v1=<hex HMAC-SHA256>`, where the digest covers
//! `"<timestamp>." + payload`. Unrecognised version keys are skipped, not
//! rejected, so newer signing schemes do not break older consumers.
//!
//! No timestamp freshness window is enforced; a verified payload replays
//! within an unbounded window.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use doorbridge_domain::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// Signing scheme version this middleware understands.
const SIGNING_VERSION: &str = "v1";

/// Parsed `Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeader {
    /// Unix timestamp the digest was computed over.
    pub timestamp: i64,
    /// Raw digest bytes of a known signing version.
    pub signature: Vec<u8>,
}

/// Parse a `Signature` header into its timestamp and digest.
///
/// # Errors
///
/// [`SignatureError::Missing`] when the header is empty,
/// [`SignatureError::InvalidHeader`] when a pair is unparseable, and
/// [`SignatureError::NoValidSignature`] when no digest of a known version
/// is present.
pub fn parse_signature_header(header: &str) -> Result<SignedHeader, SignatureError> {
    if header.is_empty() {
        return Err(SignatureError::Missing);
    }

    let mut timestamp = 0i64;
    let mut signature = Vec::new();

    for pair in header.split(',') {
        let parts: Vec<&str> = pair.split('=').collect();
        let [key, value] = parts[..] else {
            return Err(SignatureError::InvalidHeader);
        };
        match key {
            "t" => {
                timestamp = value
                    .parse()
                    .map_err(|_| SignatureError::InvalidHeader)?;
            }
            SIGNING_VERSION => {
                // a malformed digest for a known version is skipped, like
                // an unknown version, rather than rejecting the delivery
                if let Ok(sig) = hex::decode(value) {
                    signature = sig;
                }
            }
            _ => {}
        }
    }

    if signature.is_empty() {
        return Err(SignatureError::NoValidSignature);
    }

    Ok(SignedHeader {
        timestamp,
        signature,
    })
}

/// Compute the expected digest for a payload at a given timestamp.
#[must_use]
pub fn compute_signature(timestamp: i64, payload: &[u8], secret: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Verify a payload against its `Signature` header.
///
/// The digest comparison is constant-time.
///
/// # Errors
///
/// Propagates the parse failures of [`parse_signature_header`], plus
/// [`SignatureError::Mismatch`] when the supplied digest differs from the
/// computed one.
pub fn validate_payload(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), SignatureError> {
    let header = parse_signature_header(sig_header)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(header.timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.verify_slice(&header.signature)
        .map_err(|_| SignatureError::Mismatch)
}
