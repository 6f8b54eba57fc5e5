//! Leaf encryption for objfs.
//!
//! Every leaf file may be wrapped in a text envelope:
//!
//! ```text
//! hex(iv[0..8]) ":" hex(ciphertext) ":" hex(iv[8..16])
//! ```
//!
//! The IV is split around the ciphertext. Readers rebuild it by joining the
//! first and last segments. The layout is shared with existing stores on disk
//! and must not change.
//!
//! Only one algorithm family is supported: AES-256 in CBC mode with PKCS#7
//! padding. Key material shorter than 32 characters is right-padded by cycling
//! a filler string (the store name).
//!
//! # Example
//!
//! ```rust
//! use objfs_crypto::{Cipher, Codec};
//!
//! let codec = Codec::Enabled(Cipher::new("aes-256-cbc", "secret", "obj").unwrap());
//! let stored = codec.encrypt(b"42");
//! assert_ne!(stored, b"42");
//! assert_eq!(codec.decrypt(&stored).unwrap(), b"42");
//! ```

use std::fmt;
use std::str::FromStr;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Key length for AES-256.
pub const KEY_LEN: usize = 32;

/// Initialization vector length (one AES block).
pub const IV_LEN: usize = 16;

/// Separator between envelope segments.
pub const ENVELOPE_SEPARATOR: char = ':';

/// Errors raised while configuring a cipher or opening an envelope.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("unsupported encryption algorithm '{algorithm}' (supported: aes-256-cbc, aes256)")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("encryption key must be {expected} bytes after padding, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("malformed envelope: {message}")]
    MalformedEnvelope { message: String },

    #[error("decryption failed: wrong key or corrupt ciphertext")]
    DecryptionFailed,
}

/// Supported algorithm identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Aes256Cbc,
}

impl Algorithm {
    /// Canonical identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Aes256Cbc => "aes-256-cbc",
        }
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aes-256-cbc" | "aes256" => Ok(Algorithm::Aes256Cbc),
            other => Err(CryptoError::UnsupportedAlgorithm {
                algorithm: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Right-pad `key` to [`KEY_LEN`] characters by cycling `filler`.
///
/// Keys already at or beyond the target length are returned unchanged, as
/// are keys paired with an empty filler.
pub fn pad_key(key: &str, filler: &str) -> String {
    let len = key.chars().count();
    if len >= KEY_LEN || filler.is_empty() {
        return key.to_string();
    }

    let mut padded = String::with_capacity(KEY_LEN);
    padded.push_str(key);
    padded.extend(filler.chars().cycle().take(KEY_LEN - len));
    padded
}

/// A configured cipher: algorithm plus 32 bytes of key material.
#[derive(Clone)]
pub struct Cipher {
    algorithm: Algorithm,
    key: [u8; KEY_LEN],
}

impl Cipher {
    /// Build a cipher from an algorithm identifier and raw key text.
    ///
    /// The key is padded with `filler` first. Over-length keys are rejected,
    /// never truncated.
    pub fn new(algorithm: &str, key: &str, filler: &str) -> Result<Self, CryptoError> {
        let algorithm: Algorithm = algorithm.parse()?;
        let padded = pad_key(key, filler);
        let key: [u8; KEY_LEN] =
            padded
                .as_bytes()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_LEN,
                    actual: padded.len(),
                })?;

        Ok(Cipher { algorithm, key })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Encrypt `plaintext` under a fresh random IV and return the envelope.
    pub fn encrypt(&self, plaintext: &[u8]) -> String {
        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);
        self.encrypt_with_iv(plaintext, &iv)
    }

    fn encrypt_with_iv(&self, plaintext: &[u8], iv: &[u8; IV_LEN]) -> String {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &(*iv).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        format!(
            "{}{sep}{}{sep}{}",
            hex::encode(&iv[..IV_LEN / 2]),
            hex::encode(ciphertext),
            hex::encode(&iv[IV_LEN / 2..]),
            sep = ENVELOPE_SEPARATOR,
        )
    }

    /// Open an envelope produced by [`Cipher::encrypt`].
    pub fn decrypt(&self, envelope: &str) -> Result<Vec<u8>, CryptoError> {
        let segments: Vec<&str> = envelope.trim_end().split(ENVELOPE_SEPARATOR).collect();
        let [head, body, tail] = segments.as_slice() else {
            return Err(CryptoError::MalformedEnvelope {
                message: format!("expected 3 segments, found {}", segments.len()),
            });
        };

        let iv = decode_segment(&format!("{}{}", head, tail), "iv")?;
        let iv: [u8; IV_LEN] =
            iv.as_slice()
                .try_into()
                .map_err(|_| CryptoError::MalformedEnvelope {
                    message: format!("iv must be {} bytes, found {}", IV_LEN, iv.len()),
                })?;
        let ciphertext = decode_segment(body, "ciphertext")?;

        Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(segment).map_err(|e| CryptoError::MalformedEnvelope {
        message: format!("{} is not valid hex: {}", what, e),
    })
}

/// Byte-level codec applied to every leaf file.
///
/// `Disabled` is the identity; `Enabled` turns bytes into envelope text and
/// back.
#[derive(Clone, Debug, Default)]
pub enum Codec {
    #[default]
    Disabled,
    Enabled(Cipher),
}

impl Codec {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Codec::Enabled(_))
    }

    /// Bytes to store on disk for `plaintext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        match self {
            Codec::Disabled => plaintext.to_vec(),
            Codec::Enabled(cipher) => cipher.encrypt(plaintext).into_bytes(),
        }
    }

    /// Plaintext for bytes read from disk.
    pub fn decrypt(&self, stored: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            Codec::Disabled => Ok(stored.to_vec()),
            Codec::Enabled(cipher) => {
                let envelope =
                    std::str::from_utf8(stored).map_err(|_| CryptoError::MalformedEnvelope {
                        message: "envelope is not valid UTF-8".to_string(),
                    })?;
                cipher.decrypt(envelope)
            }
        }
    }
}
