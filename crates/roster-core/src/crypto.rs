//! Field-level encryption boundary.
//!
//! Sensitive fields are sealed with AES-256-CBC and PKCS#7 padding. Every
//! encryption draws a fresh IV from the OS RNG and prepends it to the
//! ciphertext, so equal plaintexts never produce equal ciphertexts. Lookups by
//! a sensitive value therefore go through a blind index: an HMAC-SHA256 tag
//! keyed with a sub-key derived from the same injected key material.

use std::fmt;

use aes::{
  Aes256,
  cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of the injected key (AES-256).
pub const KEY_LEN: usize = 32;

const BLOCK_LEN: usize = 16;
const INDEX_KEY_LABEL: &[u8] = b"roster blind index v1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
  #[error("encryption failed: {0}")]
  Encryption(String),

  #[error("decryption failed: {0}")]
  Decryption(String),

  #[error("invalid key: {0}")]
  InvalidKey(String),
}

/// Symmetric cipher over a process-wide, injected key.
///
/// Stateless apart from the key material; cloning is cheap and a single
/// instance may be shared by any number of concurrent callers.
#[derive(Clone)]
pub struct Cipher {
  key:   [u8; KEY_LEN],
  /// HMAC state pre-keyed with the blind-index sub-key; cloned per use.
  index: HmacSha256,
}

impl Cipher {
  pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
    let key: [u8; KEY_LEN] = key.try_into().map_err(|_| {
      CryptoError::InvalidKey(format!(
        "expected {KEY_LEN} bytes, got {}",
        key.len()
      ))
    })?;

    let mut mac = HmacSha256::new_from_slice(&key)
      .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    mac.update(INDEX_KEY_LABEL);
    let index_key = mac.finalize().into_bytes();
    let index = HmacSha256::new_from_slice(&index_key)
      .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

    Ok(Self { key, index })
  }

  /// Build a cipher from hex-encoded key material, as found in configuration.
  pub fn from_hex(key: &str) -> Result<Self, CryptoError> {
    let bytes =
      hex::decode(key.trim()).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    Self::new(&bytes)
  }

  /// Encrypt `plaintext`, returning `IV || ciphertext`.
  pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut iv = [0u8; BLOCK_LEN];
    OsRng
      .try_fill_bytes(&mut iv)
      .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let ciphertext = Aes256CbcEnc::new_from_slices(&self.key, &iv)
      .map_err(|e| CryptoError::Encryption(e.to_string()))?
      .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(BLOCK_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
  }

  /// Decrypt bytes produced by [`Cipher::encrypt`].
  ///
  /// Input that is not a whole number of blocks, or that lacks room for the
  /// IV plus one padded block, is rejected before it reaches the cipher.
  pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() < 2 * BLOCK_LEN {
      return Err(CryptoError::Decryption(format!(
        "ciphertext too short ({} bytes)",
        data.len()
      )));
    }
    if data.len() % BLOCK_LEN != 0 {
      return Err(CryptoError::Decryption(format!(
        "ciphertext length {} is not a multiple of {BLOCK_LEN}",
        data.len()
      )));
    }

    let (iv, body) = data.split_at(BLOCK_LEN);
    Aes256CbcDec::new_from_slices(&self.key, iv)
      .map_err(|e| CryptoError::Decryption(e.to_string()))?
      .decrypt_padded_vec_mut::<Pkcs7>(body)
      .map_err(|_| CryptoError::Decryption("invalid padding".to_string()))
  }

  /// Encrypt a string field into its base64 document representation.
  pub fn seal(&self, plaintext: &str) -> Result<String, CryptoError> {
    Ok(B64.encode(self.encrypt(plaintext.as_bytes())?))
  }

  /// Reverse of [`Cipher::seal`].
  pub fn open(&self, sealed: &str) -> Result<String, CryptoError> {
    let data = B64
      .decode(sealed)
      .map_err(|e| CryptoError::Decryption(format!("invalid base64: {e}")))?;
    let plaintext = self.decrypt(&data)?;
    String::from_utf8(plaintext)
      .map_err(|_| CryptoError::Decryption("plaintext is not UTF-8".to_string()))
  }

  /// Deterministic, keyed tag for equality lookups on a sensitive value.
  pub fn blind_index(&self, value: &str) -> String {
    let mut mac = self.index.clone();
    mac.update(value.as_bytes());
    hex::encode(mac.finalize().into_bytes())
  }
}

impl fmt::Debug for Cipher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cipher").finish_non_exhaustive()
  }
}
