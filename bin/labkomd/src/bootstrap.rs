//! Bootstrap — first-start checks.
//!
//! When labkomd starts:
//! 1. Verify the config carries a JWT secret, a data dir and a
//!    well-formed admin password hash — refuse to start otherwise.
//! 2. Seed the bootstrap admin account (done in main, via the auth
//!    service; the stored account is never overwritten).

use crate::config::ServerConfig;

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.admin.email.trim().is_empty() {
        anyhow::bail!("Admin email is empty in configuration.");
    }
    if config.admin.password_hash.is_empty() {
        anyhow::bail!(
            "No admin password hash found in configuration.\n\
             Run `labkomd --hash-password <password>` and put the output under [admin]."
        );
    }
    if password_hash::PasswordHash::new(&config.admin.password_hash).is_err() {
        anyhow::bail!("Admin password_hash is not a valid PHC string.");
    }
    Ok(())
}

/// Hash a password with argon2id, for the `--hash-password` flag.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?;
    Ok(hash.to_string())
}
