//! Password hashing primitive.
//!
//! Kept behind this module so the algorithm stays swappable; callers only see
//! hash/verify. Currently bcrypt, matching what the user records were hashed
//! with.

use tracing::error;

use crate::error::AppError;

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|e| {
        error!(error = %e, "failed to hash password");
        AppError::Internal
    })
}

/// Returns false on a mismatch and on an unparseable stored hash; the caller
/// cannot distinguish the two, which is intentional.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plain, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_its_own_hashes() {
        // Low cost to keep the test fast; the hash format is the same.
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn unparseable_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
