//! Repeating-key XOR cipher with Base64 text encoding.
//!
//! `ciphertext[i] = plaintext[i] ^ key[i % key.len()]`, then the bytes are
//! Base64 encoded (standard alphabet, padded) for storage as text. The
//! transform is deterministic and self-inverse.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::keys::CipherKey;
use kinvault_common::{Error, Result};

fn xor_in_place(data: &mut [u8], key: &[u8]) {
    for (byte, k) in data.iter_mut().zip(key.iter().cycle()) {
        *byte ^= k;
    }
}

/// Encrypt UTF-8 text into Base64 ciphertext.
pub fn encrypt(key: &CipherKey, plaintext: &str) -> String {
    let mut bytes = plaintext.as_bytes().to_vec();
    xor_in_place(&mut bytes, key.as_bytes());
    STANDARD.encode(bytes)
}

/// Decrypt Base64 ciphertext back into UTF-8 text.
///
/// # Errors
/// - `Decryption` if the input is not valid Base64
/// - `Decryption` if the recovered bytes are not valid UTF-8
pub fn decrypt(key: &CipherKey, ciphertext: &str) -> Result<String> {
    let mut bytes = STANDARD
        .decode(ciphertext.trim())
        .map_err(|e| Error::Decryption(format!("Invalid ciphertext encoding: {}", e)))?;
    xor_in_place(&mut bytes, key.as_bytes());
    String::from_utf8(bytes)
        .map_err(|_| Error::Decryption("Recovered bytes are not valid UTF-8".to_string()))
}

/// Cipher bound to the deployment key.
#[derive(Clone, Debug)]
pub struct XorCipher {
    key: CipherKey,
}

impl XorCipher {
    pub fn new(key: CipherKey) -> Self {
        Self { key }
    }

    pub fn encrypt(&self, plaintext: &str) -> String {
        encrypt(&self.key, plaintext)
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        decrypt(&self.key, ciphertext)
    }
}
