//! Freeze confirmation tokens
//!
//! A confirmation token is a deterministic keyed one-way function of
//! `(draft_id, user_id)`: HMAC-SHA256 over `"draft_id:user_id"`, keyed
//! with the server's token secret, hex-encoded. The server stores no
//! tokens; minting and verifying are the same computation. The binding
//! to both ids means a token minted for one user or one draft can never
//! confirm another.
//!
//! Single-use is enforced one level up: the draft's consumed flag, not
//! anything in here, blocks a second confirmation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::types::{AmberError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Mints and verifies freeze confirmation tokens
pub struct TokenService {
    /// Server-wide HMAC key (from configuration)
    secret: Vec<u8>,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Compute the token for a (draft, user) pair
    pub fn mint(&self, draft_id: &str, user_id: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| AmberError::Internal(format!("invalid token secret: {}", err)))?;
        mac.update(draft_id.as_bytes());
        mac.update(b":");
        mac.update(user_id.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check a presented token against the expected one for this pair.
    ///
    /// Comparison is constant-time over the decoded bytes. A presented
    /// value that is not valid hex (or the wrong length) can never
    /// match.
    pub fn verify(&self, draft_id: &str, user_id: &str, presented: &str) -> Result<bool> {
        let expected_hex = self.mint(draft_id, user_id)?;
        let expected = hex::decode(&expected_hex)
            .map_err(|err| AmberError::Internal(format!("token encoding: {}", err)))?;

        let presented_bytes = match hex::decode(presented.trim()) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(false),
        };
        if presented_bytes.len() != expected.len() {
            return Ok(false);
        }
        Ok(expected.ct_eq(presented_bytes.as_slice()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_is_deterministic() {
        let service = TokenService::new("test-secret");
        let a = service.mint("draft-1", "user-1").unwrap();
        let b = service.mint("draft-1", "user-1").unwrap();
        assert_eq!(a, b);
        // 32-byte MAC, hex-encoded
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_token_binds_user() {
        let service = TokenService::new("test-secret");
        let for_alice = service.mint("draft-1", "alice").unwrap();
        assert!(service.verify("draft-1", "alice", &for_alice).unwrap());
        assert!(!service.verify("draft-1", "bob", &for_alice).unwrap());
    }

    #[test]
    fn test_token_binds_draft() {
        let service = TokenService::new("test-secret");
        let for_one = service.mint("draft-1", "alice").unwrap();
        assert!(!service.verify("draft-2", "alice", &for_one).unwrap());
    }

    #[test]
    fn test_key_change_invalidates() {
        let old = TokenService::new("old-secret");
        let new = TokenService::new("new-secret");
        let token = old.mint("draft-1", "alice").unwrap();
        assert!(!new.verify("draft-1", "alice", &token).unwrap());
    }

    #[test]
    fn test_garbage_never_verifies() {
        let service = TokenService::new("test-secret");
        assert!(!service.verify("draft-1", "alice", "not-hex!").unwrap());
        assert!(!service.verify("draft-1", "alice", "").unwrap());
        assert!(!service.verify("draft-1", "alice", "deadbeef").unwrap());
    }

    #[test]
    fn test_verify_tolerates_surrounding_whitespace() {
        let service = TokenService::new("test-secret");
        let token = service.mint("draft-1", "alice").unwrap();
        let padded = format!("  {}\n", token);
        assert!(service.verify("draft-1", "alice", &padded).unwrap());
    }
}
