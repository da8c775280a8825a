use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::error::AppError;

/// Classified soft failures from token verification.
///
/// None of these ever reach a client; the authentication gate collapses all
/// of them to "no principal published" and the detail stays in server logs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token structure could not be decoded")]
    Malformed,
    #[error("token signature does not match the active secret")]
    BadSignature,
    #[error("token is expired")]
    Expired,
}

/// Signed claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HMAC-signed access tokens.
///
/// The signing secret and TTL are fixed at startup. There is exactly one
/// active secret per process; rotating it requires a coordinated restart.
/// Nothing is persisted per token, so a crash or restart loses no session
/// state.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        // Expiry is checked in `verify` against the caller-supplied clock,
        // not by jsonwebtoken against the system clock.
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token whose subject is `username`, valid for the configured
    /// TTL starting at `now`.
    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let iat = now.timestamp();
        let claims = AccessTokenClaims {
            sub: username.to_string(),
            iat,
            exp: iat + self.ttl_seconds as i64,
        };

        let header = Header::new(Algorithm::HS512);
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign access token");
            AppError::Internal
        })
    }

    /// Verify `token` as of `now` and return the subject username.
    ///
    /// Signature comparison is constant-time inside jsonwebtoken's MAC
    /// verification; no secret-dependent branching happens in this method.
    /// A token is accepted up to and including `exp`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
                .map_err(classify)?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }
}

fn classify(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("unit-test-signing-secret", 3600)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn round_trip_returns_subject() {
        let c = codec();
        let token = c.issue("alice", t0()).unwrap();
        assert_eq!(c.verify(&token, t0()).unwrap(), "alice");
    }

    #[test]
    fn accepts_up_to_the_ttl_boundary() {
        let c = codec();
        let token = c.issue("alice", t0()).unwrap();
        assert_eq!(
            c.verify(&token, t0() + Duration::seconds(3599)).unwrap(),
            "alice"
        );
        assert_eq!(
            c.verify(&token, t0() + Duration::seconds(3600)).unwrap(),
            "alice"
        );
    }

    #[test]
    fn rejects_after_expiry() {
        let c = codec();
        let token = c.issue("alice", t0()).unwrap();
        assert_eq!(
            c.verify(&token, t0() + Duration::seconds(3601)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn rejects_garbage_as_malformed() {
        let c = codec();
        assert_eq!(c.verify("", t0()), Err(TokenError::Malformed));
        assert_eq!(c.verify("not-a-token", t0()), Err(TokenError::Malformed));
        assert_eq!(c.verify("a.b.c", t0()), Err(TokenError::Malformed));
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let ours = codec();
        let theirs = TokenCodec::new("a-completely-different-secret", 3600);
        let token = theirs.issue("alice", t0()).unwrap();
        assert_eq!(ours.verify(&token, t0()), Err(TokenError::BadSignature));
    }

    #[test]
    fn any_signature_bit_flip_is_a_bad_signature() {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let c = codec();
        let token = c.issue("alice", t0()).unwrap();
        let (head, sig) = token.rsplit_once('.').unwrap();
        let sig_bytes = URL_SAFE_NO_PAD.decode(sig).unwrap();

        for byte in 0..sig_bytes.len() {
            for bit in 0..8 {
                let mut corrupted = sig_bytes.clone();
                corrupted[byte] ^= 1 << bit;
                let forged = format!("{head}.{}", URL_SAFE_NO_PAD.encode(&corrupted));
                assert_eq!(c.verify(&forged, t0()), Err(TokenError::BadSignature));
            }
        }
    }

    #[test]
    fn expired_and_forged_token_reports_bad_signature_first() {
        // Signature validity is established before expiry is considered, so a
        // tampered expired token never leaks that it was also expired.
        let c = codec();
        let token = c.issue("alice", t0()).unwrap();
        let (head, sig) = token.rsplit_once('.').unwrap();
        // Swap the first character for a different base64url character.
        let swapped = if sig.starts_with('A') { 'B' } else { 'A' };
        let forged = format!("{head}.{swapped}{}", &sig[1..]);
        assert_eq!(
            c.verify(&forged, t0() + Duration::seconds(7200)),
            Err(TokenError::BadSignature)
        );
    }
}
