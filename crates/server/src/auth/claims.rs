//! Credential claims and token issuance.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bazaar_core::{Role, UserId};

/// Payload of a verified credential.
///
/// Issued at login/registration, verified by the gate on every protected
/// operation. The expiry is enforced during verification; an expired
/// token is indistinguishable from a tampered one to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's ID.
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    /// Expiry as a unix timestamp (seconds).
    pub exp: u64,
}

/// Signs credentials for authenticated users.
///
/// Holds the signing key by construction - the secret is explicit
/// configuration, never read from ambient process state.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from the shared signing secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            ttl,
        }
    }

    /// Issue a signed credential for the given subject.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue(
        &self,
        sub: UserId,
        email: &str,
        role: Role,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = unix_now().saturating_add(self.ttl.as_secs());
        let claims = Claims {
            sub,
            email: email.to_owned(),
            role,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }
}

/// Current unix time in seconds.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn issued_token_carries_subject_and_role() {
        let secret = SecretString::from("k9#mP2$vL8@nQ4!rT6&wZ0*bD5^hJ3%x");
        let issuer = TokenIssuer::new(&secret, Duration::from_secs(3600));
        let sub = UserId::generate();

        let token = issuer.issue(sub, "a@b.test", Role::Admin).expect("issue");

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .expect("decode");
        assert_eq!(decoded.claims.sub, sub);
        assert_eq!(decoded.claims.role, Role::Admin);
        assert!(decoded.claims.exp > unix_now());
    }
}
