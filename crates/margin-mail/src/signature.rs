//! Webhook signature verification.
//!
//! The relay signs each request with `HMAC-SHA256(key, timestamp ‖ token)`
//! and sends the lowercase hex digest as `signature`.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// The shared secret used to sign inbound webhooks.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
  pub fn new(key: impl Into<Vec<u8>>) -> Self { Self(key.into()) }

  fn mac(&self, timestamp: &str, token: &str) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(&self.0)
      .map_err(|_| SignatureError::InvalidKey)?;
    mac.update(timestamp.as_bytes());
    mac.update(token.as_bytes());
    Ok(mac)
  }

  /// The hex signature the relay would send for `timestamp` and `token`.
  pub fn sign(&self, timestamp: &str, token: &str) -> Result<String, SignatureError> {
    Ok(hex::encode(self.mac(timestamp, token)?.finalize().into_bytes()))
  }

  /// Check `signature` against `timestamp ‖ token`.
  ///
  /// Hex case is ignored; the digest comparison is constant-time.
  pub fn verify(
    &self,
    timestamp: &str,
    token: &str,
    signature: Option<&str>,
  ) -> Result<(), SignatureError> {
    let signature = signature.ok_or(SignatureError::Missing)?;
    let provided =
      hex::decode(signature.trim()).map_err(|_| SignatureError::Malformed)?;
    self
      .mac(timestamp, token)?
      .verify_slice(&provided)
      .map_err(|_| SignatureError::Mismatch)
  }
}

impl fmt::Debug for SigningKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SigningKey(..)")
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
  #[error("signature missing")]
  Missing,
  #[error("signature is not hex")]
  Malformed,
  #[error("signature mismatch")]
  Mismatch,
  #[error("signing key rejected by HMAC")]
  InvalidKey,
}
