//! The fail-closed authorization decision point.
//!
//! Any ambiguity - missing token, bad signature, expired token, role
//! mismatch - denies; only an explicit absence of a role requirement
//! allows. The gate has no side effects beyond the decision: no token
//! refresh, no audit log, no retry.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use bazaar_core::Role;

use super::claims::Claims;

/// Denial reasons. All three surface as a single unauthorized-class
/// error to the caller; none are retryable without fixing the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    /// A role requirement exists but no usable credential was supplied.
    #[error("Token not found")]
    MissingCredential,

    /// Signature or expiry verification failed. Subsumes tampering and
    /// replay-after-expiry.
    #[error("Invalid token")]
    InvalidCredential,

    /// The verified credential's role is not in the required set.
    #[error("You do not have permission to access this resource")]
    InsufficientRole,
}

/// Per-operation authorization gate.
///
/// Constructed once with the verification key (explicit configuration,
/// not ambient environment) and consulted before dispatch on every
/// operation.
pub struct AuthorizationGate {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthorizationGate {
    /// Create a gate verifying HS256 credentials signed with `secret`.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decide whether the caller may proceed.
    ///
    /// `required` is the operation's declared role set (`None` = public).
    /// `authorization` is the raw `Authorization` header value, if any.
    ///
    /// Returns the verified claims for protected operations, `None` for
    /// public ones.
    ///
    /// # Errors
    ///
    /// Returns a [`GateError`] denial, which the boundary maps to an
    /// unauthorized-class response before any business logic executes.
    pub fn authorize(
        &self,
        required: Option<&[Role]>,
        authorization: Option<&str>,
    ) -> Result<Option<Claims>, GateError> {
        // No declared policy: the public-route case. Allow unconditionally.
        let Some(required) = required else {
            return Ok(None);
        };

        let token = extract_bearer(authorization).ok_or(GateError::MissingCredential)?;

        let claims = self.verify(token)?;

        if !required.contains(&claims.role) {
            return Err(GateError::InsufficientRole);
        }

        Ok(Some(claims))
    }

    /// Verify signature and expiry, extracting the claims.
    fn verify(&self, token: &str) -> Result<Claims, GateError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| GateError::InvalidCredential)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// A missing header, missing scheme, wrong scheme, or empty token all
/// count as "no credential".
fn extract_bearer(authorization: Option<&str>) -> Option<&str> {
    let token = authorization?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    use bazaar_core::UserId;

    const SECRET: &str = "k9#mP2$vL8@nQ4!rT6&wZ0*bD5^hJ3%x";

    fn gate() -> AuthorizationGate {
        AuthorizationGate::new(&SecretString::from(SECRET))
    }

    fn token_with_role(role: Role) -> String {
        signed_token(SECRET, role, far_future())
    }

    fn signed_token(secret: &str, role: Role, exp: u64) -> String {
        let claims = Claims {
            sub: UserId::generate(),
            email: "a@b.test".to_owned(),
            role,
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("sign test token")
    }

    fn far_future() -> u64 {
        4_102_444_800 // 2100-01-01
    }

    const ADMIN_ONLY: &[Role] = &[Role::Admin];
    const ANY_ROLE: &[Role] = &[Role::Admin, Role::User];

    #[test]
    fn absent_policy_allows_without_credential() {
        let decision = gate().authorize(None, None).expect("public route");
        assert!(decision.is_none());
    }

    #[test]
    fn absent_policy_allows_even_with_garbage_header() {
        assert!(gate().authorize(None, Some("Bearer not-a-jwt")).is_ok());
    }

    #[test]
    fn missing_header_is_denied() {
        assert_eq!(
            gate().authorize(Some(ADMIN_ONLY), None).unwrap_err(),
            GateError::MissingCredential
        );
    }

    #[test]
    fn header_without_bearer_prefix_is_denied() {
        let token = token_with_role(Role::Admin);
        assert_eq!(
            gate()
                .authorize(Some(ADMIN_ONLY), Some(&token))
                .unwrap_err(),
            GateError::MissingCredential
        );
    }

    #[test]
    fn empty_token_is_denied() {
        assert_eq!(
            gate().authorize(Some(ADMIN_ONLY), Some("Bearer ")).unwrap_err(),
            GateError::MissingCredential
        );
    }

    #[test]
    fn tampered_signature_is_denied() {
        let forged = signed_token("another-signing-key-entirely-12345", Role::Admin, far_future());
        assert_eq!(
            gate()
                .authorize(Some(ADMIN_ONLY), Some(&format!("Bearer {forged}")))
                .unwrap_err(),
            GateError::InvalidCredential
        );
    }

    #[test]
    fn expired_token_is_denied() {
        let expired = signed_token(SECRET, Role::Admin, 946_684_800); // 2000-01-01
        assert_eq!(
            gate()
                .authorize(Some(ADMIN_ONLY), Some(&format!("Bearer {expired}")))
                .unwrap_err(),
            GateError::InvalidCredential
        );
    }

    #[test]
    fn insufficient_role_is_denied() {
        let token = token_with_role(Role::User);
        assert_eq!(
            gate()
                .authorize(Some(ADMIN_ONLY), Some(&format!("Bearer {token}")))
                .unwrap_err(),
            GateError::InsufficientRole
        );
    }

    #[test]
    fn matching_role_is_allowed_with_claims() {
        let token = token_with_role(Role::Admin);
        let claims = gate()
            .authorize(Some(ADMIN_ONLY), Some(&format!("Bearer {token}")))
            .expect("allow")
            .expect("claims present on protected route");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn user_role_passes_shared_policy() {
        let token = token_with_role(Role::User);
        assert!(
            gate()
                .authorize(Some(ANY_ROLE), Some(&format!("Bearer {token}")))
                .is_ok()
        );
    }

    #[test]
    fn token_with_unknown_claims_shape_is_invalid() {
        #[derive(Serialize)]
        struct Bare {
            exp: u64,
        }
        let bare = encode(
            &Header::new(Algorithm::HS256),
            &Bare { exp: far_future() },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("sign");
        assert_eq!(
            gate()
                .authorize(Some(ADMIN_ONLY), Some(&format!("Bearer {bare}")))
                .unwrap_err(),
            GateError::InvalidCredential
        );
    }
}
