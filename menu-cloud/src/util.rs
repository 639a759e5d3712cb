//! Password hashing helpers

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

static DUMMY_HASH: std::sync::OnceLock<Option<String>> = std::sync::OnceLock::new();

/// Run one argon2 verify against a throwaway hash. Login calls this for
/// unknown emails so they cost the same as a wrong password.
pub fn verify_dummy_password(password: &str) {
    let hash = DUMMY_HASH.get_or_init(|| hash_password("menu-cloud-unknown-user").ok());
    if let Some(hash) = hash {
        let _ = verify_password(password, hash);
    }
}
