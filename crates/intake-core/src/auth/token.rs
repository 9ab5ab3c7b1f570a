//! HMAC-SHA256 signed access tokens.
//!
//! Token layout: `<user id>.<expiry unix seconds>.<signature hex>`.

use chrono::{DateTime, Duration, Utc};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    keyed: HmacSha256,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, InvalidLength> {
        Ok(Self {
            keyed: HmacSha256::new_from_slice(secret)?,
            ttl,
        })
    }

    fn mac(&self) -> HmacSha256 {
        self.keyed.clone()
    }

    /// Issue a token for `user_id`, valid for the configured lifetime.
    pub fn issue(&self, user_id: i64, now: DateTime<Utc>) -> String {
        let payload = format!("{user_id}.{}", (now + self.ttl).timestamp());
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("{payload}.{signature}")
    }

    /// Return the user ID of a well-signed, unexpired token.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<i64> {
        let (payload, signature) = token.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let (user_id, expires_at) = payload.split_once('.')?;
        let expires_at: i64 = expires_at.parse().ok()?;
        if now.timestamp() >= expires_at {
            return None;
        }
        user_id.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let signer = TokenSigner::new(SECRET, Duration::minutes(60)).unwrap();
        let token = signer.issue(42, now());
        assert!(token.starts_with("42."));
        assert_eq!(signer.verify(&token, now() + Duration::minutes(59)), Some(42));
    }

    #[test]
    fn test_expired() {
        let signer = TokenSigner::new(SECRET, Duration::minutes(60)).unwrap();
        let token = signer.issue(42, now());
        assert_eq!(signer.verify(&token, now() + Duration::minutes(60)), None);
    }

    #[test]
    fn test_tampered_payload() {
        let signer = TokenSigner::new(SECRET, Duration::minutes(60)).unwrap();
        let token = signer.issue(42, now());
        let forged = token.replacen("42.", "43.", 1);
        assert_eq!(signer.verify(&forged, now()), None);
    }

    #[test]
    fn test_other_secret() {
        let token = TokenSigner::new(SECRET, Duration::minutes(60)).unwrap().issue(42, now());
        let other = TokenSigner::new(b"another-secret-another-secret-00", Duration::minutes(60)).unwrap();
        assert_eq!(other.verify(&token, now()), None);
    }

    #[test]
    fn test_garbage() {
        let signer = TokenSigner::new(SECRET, Duration::minutes(60)).unwrap();
        for bad in ["", "42", "42.1", "42.1.zz", "a.b.c"] {
            assert_eq!(signer.verify(bad, now()), None, "accepted {bad:?}");
        }
    }
}
