//! Signed access links for private objects.
//!
//! A link carries the object path, an expiry, a per-link nonce and a keyed
//! BLAKE2b signature over all three. Links are stateless: anyone holding the
//! signer secret can verify them without a lookup table.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use subtle::ConstantTimeEq;
use url::Url;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::provider::SignedUrl;
use kinvault_common::{Error, ObjectPath, Result};

/// Length of the signing secret in bytes.
pub const SECRET_LENGTH: usize = 32;

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct SigningSecret([u8; SECRET_LENGTH]);

/// Issues and verifies signed links under one base URL.
#[derive(Clone)]
pub struct UrlSigner {
    base: Url,
    secret: SigningSecret,
}

impl UrlSigner {
    /// Create a signer with an explicit secret.
    ///
    /// # Errors
    /// - `Config` if `base` is not an absolute URL
    pub fn new(base: &str, secret: [u8; SECRET_LENGTH]) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| Error::Config(format!("Invalid signing base URL '{}': {}", base, e)))?;
        Ok(Self {
            base,
            secret: SigningSecret(secret),
        })
    }

    /// Create a signer with a random secret.
    pub fn random(base: &str) -> Result<Self> {
        Self::new(base, rand::random())
    }

    /// Base URL links are issued under.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn signature(&self, path: &str, expires: i64, nonce: &str) -> [u8; 32] {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.secret.0);
        hasher.update(path.as_bytes());
        hasher.update(b"\n");
        hasher.update(expires.to_string().as_bytes());
        hasher.update(b"\n");
        hasher.update(nonce.as_bytes());
        hasher.update(b"urlsig");

        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }

    /// Sign a link for `path` valid for `ttl` from now.
    pub fn sign(&self, path: &ObjectPath, ttl: Duration) -> Result<SignedUrl> {
        self.sign_at(path, Utc::now(), ttl)
    }

    /// Sign a link for `path` valid for `ttl` from `issued_at`.
    ///
    /// Every call uses a fresh nonce, so two links for the same path differ.
    /// The expiry is truncated to whole seconds.
    pub fn sign_at(
        &self,
        path: &ObjectPath,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<SignedUrl> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::Storage(format!("Invalid link validity: {}", e)))?;
        let expires = issued_at
            .checked_add_signed(ttl)
            .map(|at| at.timestamp())
            .ok_or_else(|| Error::Storage("Link expiry out of range".to_string()))?;
        // The link carries whole seconds; report the expiry it actually enforces.
        let expires_at = DateTime::from_timestamp(expires, 0)
            .ok_or_else(|| Error::Storage("Link expiry out of range".to_string()))?;

        let path_str = path.to_string_path();
        let nonce = Uuid::new_v4().simple().to_string();
        let signature = URL_SAFE_NO_PAD.encode(self.signature(&path_str, expires, &nonce));

        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("path", &path_str)
            .append_pair("expires", &expires.to_string())
            .append_pair("nonce", &nonce)
            .append_pair("signature", &signature);

        Ok(SignedUrl {
            url: url.to_string(),
            path: path.clone(),
            expires_at,
        })
    }

    /// Verify a link at time `now` and return the object path it grants.
    ///
    /// # Errors
    /// - `Storage` if the link is malformed, issued under another base,
    ///   carries a bad signature, or has expired
    pub fn verify_at(&self, url: &str, now: DateTime<Utc>) -> Result<ObjectPath> {
        let parsed =
            Url::parse(url).map_err(|e| Error::Storage(format!("Malformed signed URL: {}", e)))?;

        let mut unsigned = parsed.clone();
        unsigned.set_query(None);
        let mut base = self.base.clone();
        base.set_query(None);
        if unsigned != base {
            return Err(Error::Storage("Signed URL was not issued by this store".to_string()));
        }

        let mut path = None;
        let mut expires = None;
        let mut nonce = None;
        let mut signature = None;
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "path" => path = Some(value.into_owned()),
                "expires" => expires = Some(value.into_owned()),
                "nonce" => nonce = Some(value.into_owned()),
                "signature" => signature = Some(value.into_owned()),
                _ => {}
            }
        }

        let missing = |name: &str| Error::Storage(format!("Signed URL is missing '{}'", name));
        let path = path.ok_or_else(|| missing("path"))?;
        let expires: i64 = expires
            .ok_or_else(|| missing("expires"))?
            .parse()
            .map_err(|_| Error::Storage("Signed URL has an invalid expiry".to_string()))?;
        let nonce = nonce.ok_or_else(|| missing("nonce"))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature.ok_or_else(|| missing("signature"))?)
            .map_err(|_| Error::Storage("Signed URL has an invalid signature".to_string()))?;

        let expected = self.signature(&path, expires, &nonce);
        if !bool::from(expected.as_slice().ct_eq(signature.as_slice())) {
            return Err(Error::Storage("Signed URL signature mismatch".to_string()));
        }

        if now.timestamp() >= expires {
            return Err(Error::Storage("Signed URL has expired".to_string()));
        }

        ObjectPath::parse(&path).map_err(|e| Error::Storage(e.to_string()))
    }
}

impl fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base", &self.base.as_str())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
