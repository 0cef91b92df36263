use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    // Verified against when the login name is unknown, so both paths cost the same.
    static ref DUMMY_HASH: String = hash_password("cookbook-dummy-password").unwrap_or_default();
}

/// Builds the throwaway hash before the first login needs it.
pub fn warm_up() {
    lazy_static::initialize(&DUMMY_HASH);
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Verifies `plain` against the stored hash, or against a throwaway hash when
/// there is no such user. Only `true` means the credentials are good.
pub fn verify_credentials(plain: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(hash) => verify_password(plain, hash).unwrap_or(false),
        None => {
            let _ = verify_password(plain, &DUMMY_HASH);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn hash_is_salted_and_not_plaintext() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn warm_up_builds_the_dummy_hash() {
        warm_up();
        assert!(DUMMY_HASH.starts_with("$argon2"));
        assert!(!verify_credentials("cookbook-dummy-password", None));
    }

    #[test]
    fn unknown_user_and_wrong_password_look_the_same() {
        let hash = hash_password("pw").unwrap();
        assert!(verify_credentials("pw", Some(&hash)));
        assert!(!verify_credentials("nope", Some(&hash)));
        assert!(!verify_credentials("pw", None));
        assert!(!verify_credentials("pw", Some("garbage")));
    }
}
