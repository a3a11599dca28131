//! Join codes: issuance and verification.
//!
//! A join code is 8 characters drawn uniformly from `[A-Za-z0-9]` using the
//! thread-local CSPRNG. Only its SHA-512 hex digest is persisted; the
//! plaintext is handed back once to the administrator who generated it.

use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

pub const CODE_LENGTH: usize = 8;

/// A freshly generated code together with the digest to store.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub plaintext: String,
    pub hash: String,
}

pub fn generate() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

pub fn hash(code: &str) -> String {
    hex::encode(Sha512::digest(code.as_bytes()))
}

pub fn issue() -> IssuedCode {
    let plaintext = generate();
    let hash = hash(&plaintext);
    IssuedCode { plaintext, hash }
}

/// Hash `candidate` and compare against `stored_hash` in constant time.
pub fn verify(candidate: &str, stored_hash: &str) -> bool {
    let computed = hash(candidate);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_have_expected_shape() {
        for _ in 0..50 {
            let code = generate();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn issued_code_verifies_against_its_hash() {
        let issued = issue();
        assert!(verify(&issued.plaintext, &issued.hash));
        assert_eq!(issued.hash.len(), 128);
    }

    #[test]
    fn single_character_mutation_fails() {
        let issued = issue();
        for i in 0..CODE_LENGTH {
            let mut chars: Vec<char> = issued.plaintext.chars().collect();
            chars[i] = if chars[i] == 'a' { 'b' } else { 'a' };
            let mutated: String = chars.into_iter().collect();
            assert!(!verify(&mutated, &issued.hash), "mutation at {i} verified");
        }
    }

    #[test]
    fn empty_or_garbage_hash_never_verifies() {
        assert!(!verify("Ab12Cd34", ""));
        assert!(!verify("Ab12Cd34", "not-a-digest"));
    }
}
