//! Bearer token verification.
//!
//! Token issuance lives in the external identity service; this backend only
//! verifies RS256-signed access tokens against the issuer's public key. An
//! HS256 mode exists for local development and tests, where the same secret
//! signs and verifies.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Verifier has no signing key")]
    SigningUnavailable,
}

/// Access token claims as issued by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID (unique token identifier)
    pub jti: String,
    /// Token type; only `access` tokens are accepted here
    pub token_type: TokenType,
}

/// Type of JWT token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Verifies bearer tokens minted by the external identity service.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    /// Present only in HS256 mode; RS256 verifiers cannot sign.
    encoding_key: Option<EncodingKey>,
    algorithm: Algorithm,
    /// Leeway in seconds for clock skew tolerance.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithm", &self.algorithm)
            .field("leeway_secs", &self.leeway_secs)
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtVerifier {
    /// Creates a verifier from the identity service's RSA public key in PEM
    /// format. Verification only; this backend never issues tokens.
    pub fn from_rsa_public_key_pem(public_key_pem: &str, leeway_secs: u64) -> Result<Self, JwtError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            decoding_key,
            encoding_key: None,
            algorithm: Algorithm::RS256,
            leeway_secs,
        })
    }

    /// Creates a symmetric HS256 verifier that can also sign tokens.
    ///
    /// For local development and tests only; production deployments configure
    /// an RSA public key instead.
    pub fn insecure_hs256(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: Some(EncodingKey::from_secret(secret.as_bytes())),
            algorithm: Algorithm::HS256,
            leeway_secs: 0,
        }
    }

    /// Signs an access token for the given user. Available only in HS256 mode.
    pub fn sign_access_token(&self, user_id: Uuid, expiry_secs: i64) -> Result<String, JwtError> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or(JwtError::SigningUnavailable)?;

        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Access,
        };

        encode(&Header::new(self.algorithm), &claims, encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates a token and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Validates an access token specifically; refresh tokens are rejected.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }
}

/// Extracts the user ID from validated claims.
pub fn extract_user_id(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> JwtVerifier {
        JwtVerifier::insecure_hs256("test_secret_key_for_jwt_testing_12345")
    }

    #[test]
    fn test_sign_and_verify_access_token() {
        let v = verifier();
        let user_id = Uuid::new_v4();

        let token = v.sign_access_token(user_id, 900).unwrap();
        let claims = v.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(extract_user_id(&claims).unwrap(), user_id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let v = verifier();
        let token = v.sign_access_token(Uuid::new_v4(), -60).unwrap();

        let result = v.verify_access_token(&token);
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let v = verifier();
        assert!(v.verify_token("not_a_jwt").is_err());
        assert!(matches!(
            v.verify_token("invalid.token.here"),
            Err(JwtError::InvalidToken) | Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let v = verifier();
        let token = v.sign_access_token(Uuid::new_v4(), 900).unwrap();

        let other = JwtVerifier::insecure_hs256("a_completely_different_secret");
        assert!(matches!(
            other.verify_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_rsa_verifier_cannot_sign() {
        // A bogus PEM fails key parsing before we can even check signing
        let result = JwtVerifier::from_rsa_public_key_pem("not a pem", DEFAULT_LEEWAY_SECS);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_unique_jti_per_token() {
        let v = verifier();
        let user_id = Uuid::new_v4();

        let t1 = v.sign_access_token(user_id, 900).unwrap();
        let t2 = v.sign_access_token(user_id, 900).unwrap();

        let c1 = v.verify_access_token(&t1).unwrap();
        let c2 = v.verify_access_token(&t2).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn test_claims_timestamps() {
        let v = verifier();
        let before = Utc::now().timestamp();
        let token = v.sign_access_token(Uuid::new_v4(), 900).unwrap();
        let after = Utc::now().timestamp();

        let claims = v.verify_access_token(&token).unwrap();
        assert!(claims.iat >= before && claims.iat <= after);
        assert_eq!(claims.exp - claims.iat, 900);
    }
}
