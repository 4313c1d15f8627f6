//! Admin accounts, sessions and JWT claims.

use serde::{Deserialize, Serialize};

/// A lab administrator. Accounts are seeded from server configuration;
/// there is no self-service registration.
///
/// `password_hash` is an argon2id PHC string and never leaves the
/// server; responses carry [`AdminIdentity`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub id: String,
    /// Lowercased at seed time; lookups are case-insensitive.
    pub email: String,
    pub nama: String,
    pub password_hash: String,
    pub active: bool,
    pub created_at: String,
}

/// What the portal sees of a logged-in admin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentity {
    pub nama: String,
    pub email: String,
}

impl From<&AdminAccount> for AdminIdentity {
    fn from(admin: &AdminAccount) -> Self {
        Self {
            nama: admin.nama.clone(),
            email: admin.email.clone(),
        }
    }
}

/// Server-side session record backing a JWT.
///
/// Logout flips `revoked`; a token whose session is revoked or missing
/// fails verification even while its signature is still valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub admin_id: String,
    pub issued_at: String,
    pub expires_at: String,
    pub revoked: bool,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin account id.
    pub sub: String,
    /// Display name.
    pub name: String,
    /// Session id, for server-side revocation.
    pub sid: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
}

/// Body for `POST /admin-login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body for `POST /admin-check-auth`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthBody {
    #[serde(default)]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_drops_credentials() {
        let admin = AdminAccount {
            id: "a1".into(),
            email: "admin@labkom.test".into(),
            nama: "Admin Lab".into(),
            password_hash: "$argon2id$v=19$...".into(),
            active: true,
            created_at: "2026-01-01T00:00:00Z".into(),
        };
        let identity = AdminIdentity::from(&admin);
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["nama"], "Admin Lab");
        assert_eq!(json["email"], "admin@labkom.test");
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn claims_round_trip() {
        let claims = Claims {
            sub: "a1".into(),
            name: "Admin Lab".into(),
            sid: "s1".into(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        };
        let json = serde_json::to_string(&claims).unwrap();
        let back: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sid, "s1");
        assert_eq!(back.exp, 1_700_086_400);
    }
}
