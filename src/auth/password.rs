use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

/// Salted argon2id hashing with tunable cost.
#[derive(Clone)]
pub struct Passwords {
    params: Params,
    // Verified against when the email is unknown; same cost as real hashes.
    dummy_hash: String,
}

impl Passwords {
    pub fn new(cfg: &PasswordConfig) -> anyhow::Result<Self> {
        let params = Params::new(
            cfg.m_cost.unwrap_or(Params::DEFAULT_M_COST),
            cfg.t_cost.unwrap_or(Params::DEFAULT_T_COST),
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| anyhow::anyhow!("invalid argon2 params: {}", e))?;
        let mut passwords = Self {
            params,
            dummy_hash: String::new(),
        };
        passwords.dummy_hash = passwords.hash("not-a-real-password")?;
        Ok(passwords)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Cost parameters are read from the stored hash, so hashes made under
    /// older settings keep verifying. A corrupt hash verifies as `false`.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "argon2 parse hash error");
                return false;
            }
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burns a verification's worth of CPU for an unknown account.
    pub fn verify_dummy(&self, plain: &str) {
        let _ = self.verify(plain, &self.dummy_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passwords() -> Passwords {
        Passwords::new(&PasswordConfig {
            m_cost: Some(8),
            t_cost: Some(1),
        })
        .expect("params")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let pw = passwords();
        let hash = pw.hash("Secur3P@ssw0rd!").expect("hashing should succeed");
        assert!(pw.verify("Secur3P@ssw0rd!", &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let pw = passwords();
        let hash = pw.hash("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!pw.verify("wrong-password", &hash));
        assert!(!pw.verify("", &hash));
    }

    #[test]
    fn salt_is_embedded_and_unique() {
        let pw = passwords();
        let a = pw.hash("same").unwrap();
        let b = pw.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(pw.verify("same", &a));
        assert!(pw.verify("same", &b));
    }

    #[test]
    fn verify_is_false_on_malformed_hash() {
        assert!(!passwords().verify("anything", "not-a-valid-hash"));
    }

    #[test]
    fn hashes_from_other_costs_still_verify() {
        let strong = Passwords::new(&PasswordConfig {
            m_cost: Some(16),
            t_cost: Some(2),
        })
        .unwrap();
        let hash = strong.hash("pw").unwrap();
        assert!(passwords().verify("pw", &hash));
    }

    #[test]
    fn dummy_hash_uses_configured_cost() {
        let pw = passwords();
        assert!(pw.dummy_hash.starts_with("$argon2id$v=19$m=8,t=1,"));
        assert!(!pw.verify("not-a-real-password-either", &pw.dummy_hash));
    }

    #[test]
    fn rejects_invalid_cost() {
        assert!(Passwords::new(&PasswordConfig {
            m_cost: Some(1),
            t_cost: Some(1),
        })
        .is_err());
    }
}
