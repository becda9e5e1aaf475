//! Password checks. Stored values are bcrypt hashes, except for legacy accounts that still hold plaintext.
//!
//! Verification is two explicit branches: [`PreferredVerifier`] for anything that parses as a bcrypt
//! hash, and [`LegacyFallbackVerifier`] only when the stored value is not a bcrypt hash at all.
//! A well-formed hash that does not match never falls through to the legacy branch.
//! Legacy values are left as they are after a successful login.

use bcrypt::BcryptError;

/// Which branch produced a verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Branch {
    Hash,
    Legacy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub branch: Branch,
    pub matched: bool,
}

/// bcrypt comparison. `Err` means the stored value is not a usable bcrypt hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreferredVerifier;

impl PreferredVerifier {
    pub fn verify(&self, plaintext: &str, stored: &str) -> Result<bool, BcryptError> {
        bcrypt::verify(plaintext, stored)
    }
}

/// Direct equality against a plaintext stored value.
#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyFallbackVerifier;

impl LegacyFallbackVerifier {
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        plaintext == stored
    }
}

#[derive(Clone, Debug)]
pub struct PasswordPolicy {
    preferred: PreferredVerifier,
    legacy: LegacyFallbackVerifier,
    cost: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordPolicy {
    /// `cost` applies to newly hashed passwords only.
    pub fn new(cost: u32) -> Self {
        PasswordPolicy {
            preferred: PreferredVerifier,
            legacy: LegacyFallbackVerifier,
            cost,
        }
    }

    pub fn verify(&self, plaintext: &str, stored: &str) -> Verdict {
        match self.preferred.verify(plaintext, stored) {
            Ok(matched) => Verdict {
                branch: Branch::Hash,
                matched,
            },
            Err(e) => {
                tracing::warn!(error = %e, "stored password is not a bcrypt hash, using legacy comparison");
                Verdict {
                    branch: Branch::Legacy,
                    matched: self.legacy.verify(plaintext, stored),
                }
            }
        }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, BcryptError> {
        bcrypt::hash(plaintext, self.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::new(4)
    }

    #[test]
    fn bcrypt_hash_takes_preferred_branch() {
        let p = policy();
        let stored = p.hash("s3cret").unwrap();
        assert_eq!(
            p.verify("s3cret", &stored),
            Verdict { branch: Branch::Hash, matched: true }
        );
        assert_eq!(
            p.verify("wrong", &stored),
            Verdict { branch: Branch::Hash, matched: false }
        );
    }

    #[test]
    fn plaintext_takes_legacy_branch() {
        let p = policy();
        assert_eq!(
            p.verify("hunter2", "hunter2"),
            Verdict { branch: Branch::Legacy, matched: true }
        );
        assert_eq!(
            p.verify("hunter3", "hunter2"),
            Verdict { branch: Branch::Legacy, matched: false }
        );
    }

    #[test]
    fn hash_text_is_never_accepted_as_plaintext() {
        let p = policy();
        let stored = p.hash("s3cret").unwrap();
        assert!(!p.verify(&stored, &stored).matched);
    }
}
