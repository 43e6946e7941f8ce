//! HMAC-signed, expiring file URLs.
//!
//! Attachment ids are never exposed as directly fetchable paths. Uploads get
//! a one-shot signed PUT target and note views resolve `image_id` into a
//! time-limited signed GET URL at query time. The signature covers the HTTP
//! verb, the attachment id, and the expiry timestamp.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use jotlink_core::{defaults, Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies expiring `/files/:id` URLs.
#[derive(Clone)]
pub struct UrlSigner {
    key: Vec<u8>,
}

impl UrlSigner {
    /// Create a signer from a shared secret.
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    /// Create a signer from the `URL_SIGNING_SECRET` environment variable.
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("URL_SIGNING_SECRET")
            .map_err(|_| Error::Config("URL_SIGNING_SECRET must be set".to_string()))?;
        if secret.is_empty() {
            return Err(Error::Config("URL_SIGNING_SECRET must not be empty".to_string()));
        }
        Ok(Self::new(&secret))
    }

    fn mac(&self, verb: &str, id: Uuid, expires: i64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC accepts keys of any length");
        mac.update(verb.as_bytes());
        mac.update(b"\n");
        mac.update(id.to_string().as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac
    }

    /// Compute the hex signature for a verb/id/expiry triple.
    pub fn sign(&self, verb: &str, id: Uuid, expires: i64) -> String {
        hex::encode(self.mac(verb, id, expires).finalize().into_bytes())
    }

    /// Build a signed relative path for uploading an attachment.
    pub fn upload_path(&self, id: Uuid) -> String {
        self.signed_path("put", id, defaults::UPLOAD_URL_TTL_SECS)
    }

    /// Build a signed relative path for reading an attachment.
    pub fn read_path(&self, id: Uuid) -> String {
        self.signed_path("get", id, defaults::READ_URL_TTL_SECS)
    }

    fn signed_path(&self, verb: &str, id: Uuid, ttl_secs: i64) -> String {
        let expires = Utc::now().timestamp() + ttl_secs;
        let sig = self.sign(verb, id, expires);
        format!("/files/{}?expires={}&sig={}", id, expires, sig)
    }

    /// Verify a signature against the current clock.
    pub fn verify(&self, verb: &str, id: Uuid, expires: i64, sig: &str) -> bool {
        self.verify_at(verb, id, expires, sig, Utc::now().timestamp())
    }

    fn verify_at(&self, verb: &str, id: Uuid, expires: i64, sig: &str, now: i64) -> bool {
        if expires < now {
            return false;
        }
        let Ok(sig_bytes) = hex::decode(sig) else {
            return false;
        };
        self.mac(verb, id, expires).verify_slice(&sig_bytes).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> UrlSigner {
        UrlSigner::new("test-secret")
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let s = signer();
        let id = Uuid::new_v4();
        let expires = Utc::now().timestamp() + 60;
        let sig = s.sign("get", id, expires);
        assert!(s.verify("get", id, expires, &sig));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let s = signer();
        let id = Uuid::new_v4();
        let expires = Utc::now().timestamp() + 60;
        let mut sig = s.sign("get", id, expires);
        sig.replace_range(0..1, if sig.starts_with('a') { "b" } else { "a" });
        assert!(!s.verify("get", id, expires, &sig));
    }

    #[test]
    fn test_verb_mismatch_rejected() {
        let s = signer();
        let id = Uuid::new_v4();
        let expires = Utc::now().timestamp() + 60;
        let sig = s.sign("put", id, expires);
        assert!(!s.verify("get", id, expires, &sig));
    }

    #[test]
    fn test_expired_signature_rejected() {
        let s = signer();
        let id = Uuid::new_v4();
        let expires = 1_000;
        let sig = s.sign("get", id, expires);
        assert!(!s.verify_at("get", id, expires, &sig, 1_001));
        assert!(s.verify_at("get", id, expires, &sig, 999));
    }

    #[test]
    fn test_different_secret_rejected() {
        let id = Uuid::new_v4();
        let expires = Utc::now().timestamp() + 60;
        let sig = signer().sign("get", id, expires);
        assert!(!UrlSigner::new("other-secret").verify("get", id, expires, &sig));
    }

    #[test]
    fn test_malformed_hex_rejected() {
        let s = signer();
        let id = Uuid::new_v4();
        let expires = Utc::now().timestamp() + 60;
        assert!(!s.verify("get", id, expires, "not-hex"));
    }

    #[test]
    fn test_paths_carry_expiry_and_signature() {
        let s = signer();
        let id = Uuid::new_v4();
        let path = s.read_path(id);
        assert!(path.starts_with(&format!("/files/{}?expires=", id)));
        assert!(path.contains("&sig="));
    }
}
