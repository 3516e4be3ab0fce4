//! Payload encryption for the game-completion endpoint.
//!
//! Wire format: `base64(iv) ++ base64(ciphertext)` with no separator. The IV is
//! 12 random bytes, so its base64 form is always exactly 16 characters without
//! padding, which is what lets the server split the two halves.

use crate::error::EncodingError;
use aes::Aes256;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{CryptoRng, RngCore};
use std::fmt;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES-256 key size in bytes.
pub const KEY_LEN: usize = 32;
/// Random IV bytes generated per payload.
pub const IV_LEN: usize = 12;
const BLOCK_LEN: usize = 16;
const IV_B64_LEN: usize = 16;

/// An encrypted payload, ready to be sent as a single string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub iv_b64: String,
    pub ciphertext_b64: String,
}

impl EncryptedPayload {
    pub fn into_wire(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.iv_b64, self.ciphertext_b64)
    }
}

pub struct SecurityUtils;

impl SecurityUtils {
    /// Encrypts `plaintext` under `key` with a fresh IV drawn from `rng`.
    pub fn encrypt_payload<R: RngCore + CryptoRng>(
        plaintext: &str,
        key: &[u8],
        rng: &mut R,
    ) -> Result<EncryptedPayload, EncodingError> {
        let mut iv = [0u8; IV_LEN];
        rng.fill_bytes(&mut iv);
        Self::encrypt_with_iv(plaintext, key, &iv)
    }

    pub fn encrypt_with_iv(
        plaintext: &str,
        key: &[u8],
        iv: &[u8; IV_LEN],
    ) -> Result<EncryptedPayload, EncodingError> {
        check_key(key)?;
        let block_iv = block_iv(iv);

        let cipher = Aes256CbcEnc::new_from_slices(key, &block_iv).map_err(|e| {
            EncodingError::CipherFailed {
                reason: e.to_string(),
            }
        })?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        Ok(EncryptedPayload {
            iv_b64: STANDARD.encode(iv),
            ciphertext_b64: STANDARD.encode(ciphertext),
        })
    }

    /// Reverses [`SecurityUtils::encrypt_payload`]. Only used for debugging and tests.
    pub fn decrypt_payload(wire: &str, key: &[u8]) -> Result<String, EncodingError> {
        check_key(key)?;
        if wire.len() <= IV_B64_LEN || !wire.is_char_boundary(IV_B64_LEN) {
            return Err(EncodingError::MalformedPayload {
                reason: format!("payload too short ({} chars)", wire.len()),
            });
        }
        let (iv_b64, ciphertext_b64) = wire.split_at(IV_B64_LEN);

        let iv_bytes = STANDARD
            .decode(iv_b64)
            .map_err(|e| EncodingError::MalformedPayload {
                reason: format!("invalid IV base64: {}", e),
            })?;
        let iv: [u8; IV_LEN] =
            iv_bytes
                .as_slice()
                .try_into()
                .map_err(|_| EncodingError::MalformedPayload {
                    reason: format!("IV must be {} bytes, got {}", IV_LEN, iv_bytes.len()),
                })?;
        let ciphertext =
            STANDARD
                .decode(ciphertext_b64)
                .map_err(|e| EncodingError::MalformedPayload {
                    reason: format!("invalid ciphertext base64: {}", e),
                })?;

        let cipher = Aes256CbcDec::new_from_slices(key, &block_iv(&iv)).map_err(|e| {
            EncodingError::CipherFailed {
                reason: e.to_string(),
            }
        })?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|e| EncodingError::CipherFailed {
                reason: e.to_string(),
            })?;

        String::from_utf8(plaintext).map_err(|e| EncodingError::MalformedPayload {
            reason: format!("decrypted data is not valid UTF-8: {}", e),
        })
    }
}

fn check_key(key: &[u8]) -> Result<(), EncodingError> {
    if key.len() != KEY_LEN {
        return Err(EncodingError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: key.len(),
        });
    }
    Ok(())
}

// CBC needs a full block; the 12 transmitted bytes lead, the rest is zero.
fn block_iv(iv: &[u8; IV_LEN]) -> [u8; BLOCK_LEN] {
    let mut block = [0u8; BLOCK_LEN];
    block[..IV_LEN].copy_from_slice(iv);
    block
}
