//! Secret obfuscation for KinVault text items.
//!
//! This module provides:
//! - A deployment-wide cipher key loaded from the environment
//! - A repeating-key XOR transform with Base64 text encoding
//!
//! # Security
//! The XOR cipher is obfuscation, not authenticated encryption. It is
//! deterministic, has no integrity check, and shares one key across every
//! family. Stored ciphertexts depend on this exact format, so replacing it
//! requires a migration of existing `vault_items` rows.

pub mod keys;
pub mod xor;

pub use keys::{CipherKey, DEFAULT_KEY_ENV};
pub use xor::{decrypt, encrypt, XorCipher};
