//! Login, token verification and logout.
//!
//! Passwords are argon2id PHC strings, verified in constant time by the
//! argon2 crate. Tokens are HS256 JWTs backed by a session row; logout
//! revokes the row, so a stolen token dies with the session even before
//! its `exp` passes.

use argon2::Argon2;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::{PasswordHash, PasswordVerifier};
use std::sync::Arc;
use tracing::info;

use labkom_core::{ServiceError, new_id, now_rfc3339};
use labkom_sql::SQLStore;

use crate::model::{AdminAccount, AdminIdentity, Claims, Session};
use crate::store::AuthStore;

/// Uniform login failure. Never reveals whether the email exists.
const BAD_CREDENTIALS: &str = "invalid email or password";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret. Startup refuses an empty value.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 86400,
        }
    }
}

pub struct AuthService {
    store: AuthStore,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(sql: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Self, ServiceError> {
        let store = AuthStore::new(sql)?;
        Ok(Self { store, config })
    }

    /// Seed an admin account from configuration. Returns false when the
    /// email is already registered; the stored account is never
    /// overwritten, so a config change does not rotate a live password.
    pub fn seed_admin(
        &self,
        email: &str,
        nama: &str,
        password_hash: &str,
    ) -> Result<bool, ServiceError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ServiceError::Validation("admin email is required".into()));
        }
        if password_hash.trim().is_empty() {
            return Err(ServiceError::Validation(
                "admin password hash is required".into(),
            ));
        }

        let admin = AdminAccount {
            id: new_id(),
            email: email.clone(),
            nama: nama.trim().to_string(),
            password_hash: password_hash.trim().to_string(),
            active: true,
            created_at: now_rfc3339(),
        };
        let created = self.store.insert_admin_if_absent(&admin)?;
        if created {
            info!(email = %email, "admin account seeded");
        }
        Ok(created)
    }

    /// Verify credentials and issue a signed token plus its session row.
    pub fn login(&self, email: &str, password: &str) -> Result<(String, AdminIdentity), ServiceError> {
        let email = email.trim().to_lowercase();
        let admin = self
            .store
            .get_admin_by_email(&email)?
            .ok_or_else(|| ServiceError::Unauthorized(BAD_CREDENTIALS.into()))?;
        if !admin.active {
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.into()));
        }

        let parsed = PasswordHash::new(&admin.password_hash)
            .map_err(|e| ServiceError::Internal(format!("stored password hash is invalid: {e}")))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.into()));
        }

        let session_id = new_id();
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.config.token_ttl_secs);

        let claims = Claims {
            sub: admin.id.clone(),
            name: admin.nama.clone(),
            sid: session_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(format!("JWT encode failed: {e}")))?;

        self.store.insert_session(&Session {
            id: session_id,
            admin_id: admin.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: exp.to_rfc3339(),
            revoked: false,
        })?;

        info!(admin = %admin.email, "admin logged in");
        Ok((token, AdminIdentity::from(&admin)))
    }

    /// Verify signature and expiry, then require a live session row.
    /// A revoked or missing session invalidates the token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))?;
        let claims = data.claims;

        let session = match self.store.get_session(&claims.sid) {
            Ok(s) => s,
            Err(ServiceError::NotFound(_)) => {
                return Err(ServiceError::Unauthorized("session not found".into()));
            }
            Err(e) => return Err(e),
        };
        if session.revoked {
            return Err(ServiceError::Unauthorized("session has been revoked".into()));
        }

        Ok(claims)
    }

    /// Token validity probe for the portal. Any authentication failure
    /// answers `None` rather than an error; storage trouble still
    /// propagates.
    pub fn check_auth(&self, token: &str) -> Result<Option<AdminIdentity>, ServiceError> {
        let claims = match self.verify_token(token) {
            Ok(claims) => claims,
            Err(ServiceError::Unauthorized(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(self
            .store
            .get_admin(&claims.sub)?
            .as_ref()
            .map(AdminIdentity::from))
    }

    /// Revoke the token's session. The token fails verification from
    /// here on, regardless of its `exp`.
    pub fn logout(&self, token: &str) -> Result<(), ServiceError> {
        let claims = self.verify_token(token)?;
        self.store.revoke_session(&claims.sid)?;
        info!(admin = %claims.sub, "admin logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labkom_sql::SqliteStore;

    fn phc(password: &str) -> String {
        use password_hash::rand_core::OsRng;
        use password_hash::{PasswordHasher, SaltString};
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    fn service_with_ttl(ttl: i64) -> AuthService {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let svc = AuthService::new(
            sql,
            AuthConfig {
                jwt_secret: "test-secret-0123".into(),
                token_ttl_secs: ttl,
            },
        )
        .unwrap();
        svc.seed_admin("Admin@Labkom.test", "Admin Lab", &phc("kunci-rahasia"))
            .unwrap();
        svc
    }

    fn service() -> AuthService {
        service_with_ttl(3600)
    }

    #[test]
    fn login_issues_verifiable_token() {
        let svc = service();
        let (token, identity) = svc.login("admin@labkom.test", "kunci-rahasia").unwrap();
        assert_eq!(identity.nama, "Admin Lab");
        assert_eq!(identity.email, "admin@labkom.test");

        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.name, "Admin Lab");
        assert!(claims.exp > claims.iat);

        let who = svc.check_auth(&token).unwrap().unwrap();
        assert_eq!(who.email, "admin@labkom.test");
    }

    #[test]
    fn login_failures_are_uniform() {
        let svc = service();

        let wrong_password = svc.login("admin@labkom.test", "salah").unwrap_err();
        let unknown_email = svc.login("nobody@labkom.test", "kunci-rahasia").unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn logout_kills_the_token() {
        let svc = service();
        let (token, _) = svc.login("admin@labkom.test", "kunci-rahasia").unwrap();

        svc.logout(&token).unwrap();
        assert!(matches!(
            svc.verify_token(&token),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(svc.check_auth(&token).unwrap().is_none());

        // a dead token cannot log out again
        assert!(svc.logout(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // issued already past exp, beyond the default decode leeway
        let svc = service_with_ttl(-120);
        let (token, _) = svc.login("admin@labkom.test", "kunci-rahasia").unwrap();
        assert!(matches!(
            svc.verify_token(&token),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let svc = service();
        assert!(svc.verify_token("this.is.not.a.jwt").is_err());
        assert!(svc.check_auth("this.is.not.a.jwt").unwrap().is_none());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let svc = service();
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let other = AuthService::new(
            sql,
            AuthConfig {
                jwt_secret: "different-secret".into(),
                token_ttl_secs: 3600,
            },
        )
        .unwrap();
        other
            .seed_admin("admin@labkom.test", "Admin Lab", &phc("kunci-rahasia"))
            .unwrap();

        let (token, _) = other.login("admin@labkom.test", "kunci-rahasia").unwrap();
        assert!(matches!(
            svc.verify_token(&token),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn seed_never_overwrites() {
        let svc = service();
        // second seed with a different password is ignored
        assert!(!svc
            .seed_admin("admin@labkom.test", "Other", &phc("lain"))
            .unwrap());
        assert!(svc.login("admin@labkom.test", "kunci-rahasia").is_ok());
        assert!(svc.login("admin@labkom.test", "lain").is_err());
    }

    #[test]
    fn seed_rejects_blank_config() {
        let svc = service();
        assert!(matches!(
            svc.seed_admin("  ", "Admin", "$argon2id$..."),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.seed_admin("x@lab.test", "Admin", "  "),
            Err(ServiceError::Validation(_))
        ));
    }
}
