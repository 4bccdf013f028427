use base64::Engine;
use hmac::{Hmac, Mac};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use crate::db::queries;
use crate::models::{AuthSnapshot, Role, User};
use crate::services::validation;

/// Key the portal's auth state has always been stored under; sessions
/// append their token to it.
pub const SNAPSHOT_KEY: &str = "auth-storage";

/// Registered accounts live next to the sessions, keyed by normalised email.
pub const CREDENTIAL_KEY: &str = "auth-user";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("name is required")]
    MissingName,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("phone number must be 10 digits")]
    InvalidPhone,

    #[error("password must be at least {} characters", validation::MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub snapshot: AuthSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
struct Credential {
    user: User,
    salt: String,
    digest: String,
}

fn snapshot_key(token: &str) -> String {
    format!("{SNAPSHOT_KEY}:{token}")
}

fn credential_key(user_id: &str) -> String {
    format!("{CREDENTIAL_KEY}:{user_id}")
}

/// Users are identified by their normalised email so repeat logins see the
/// same appointments.
fn user_id(email: &str) -> String {
    email.trim().to_lowercase()
}

fn password_mac(salt: &str, password: &str) -> Option<Hmac<Sha1>> {
    let mut mac = Hmac::<Sha1>::new_from_slice(salt.as_bytes()).ok()?;
    mac.update(password.as_bytes());
    Some(mac)
}

fn password_digest(salt: &str, password: &str) -> Option<String> {
    let mac = password_mac(salt, password)?;
    Some(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison of `password` against a stored digest.
fn verify_password(salt: &str, password: &str, digest: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(digest) else {
        return false;
    };
    password_mac(salt, password).is_some_and(|mac| mac.verify_slice(&expected).is_ok())
}

fn load_credential(conn: &Connection, user_id: &str) -> Result<Option<Credential>, AuthError> {
    let Some(value) = queries::load_snapshot(conn, &credential_key(user_id))? else {
        return Ok(None);
    };
    let credential = serde_json::from_str(&value).map_err(anyhow::Error::from)?;
    Ok(Some(credential))
}

fn persist(conn: &Connection, user: User) -> Result<Session, AuthError> {
    let token = uuid::Uuid::new_v4().to_string();
    let snapshot = AuthSnapshot::signed_in(user);
    let value = serde_json::to_string(&snapshot).map_err(anyhow::Error::from)?;
    queries::save_snapshot(conn, &snapshot_key(&token), &value)?;
    Ok(Session { token, snapshot })
}

pub fn register(
    conn: &Connection,
    req: &RegisterRequest,
    admin_email: &str,
) -> Result<Session, AuthError> {
    if req.name.trim().is_empty() {
        return Err(AuthError::MissingName);
    }
    if !validation::is_valid_email(&req.email) {
        return Err(AuthError::InvalidEmail);
    }
    if !validation::is_valid_phone(&req.phone) {
        return Err(AuthError::InvalidPhone);
    }
    if !validation::is_valid_password(&req.password) {
        return Err(AuthError::PasswordTooShort);
    }
    if req.password != req.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }

    let id = user_id(&req.email);
    if id == user_id(admin_email) || load_credential(conn, &id)?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let user = User {
        id: id.clone(),
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: Some(req.phone.trim().to_string()),
        role: Role::User,
    };

    let salt = uuid::Uuid::new_v4().to_string();
    let digest = password_digest(&salt, &req.password)
        .ok_or_else(|| anyhow::anyhow!("failed to derive password digest"))?;
    let credential = Credential {
        user: user.clone(),
        salt,
        digest,
    };
    let value = serde_json::to_string(&credential).map_err(anyhow::Error::from)?;
    queries::save_snapshot(conn, &credential_key(&id), &value)?;

    let session = persist(conn, user)?;
    tracing::info!(user_id = %id, "registered user");
    Ok(session)
}

/// Signs in a registered student, or the administrator when the email is
/// `admin_email` and the password is `admin_password`. An empty
/// `admin_password` disables admin login.
pub fn login(
    conn: &Connection,
    req: &LoginRequest,
    admin_email: &str,
    admin_password: &str,
) -> Result<Session, AuthError> {
    if !validation::is_valid_email(&req.email) {
        return Err(AuthError::InvalidEmail);
    }

    let email = req.email.trim();
    let id = user_id(email);

    let user = if id == user_id(admin_email) {
        // Salt per attempt; only the comparison matters.
        let salt = uuid::Uuid::new_v4().to_string();
        let expected = password_digest(&salt, admin_password);
        let accepted = !admin_password.is_empty()
            && expected.is_some_and(|digest| verify_password(&salt, &req.password, &digest));
        if !accepted {
            tracing::warn!("rejected admin login");
            return Err(AuthError::InvalidCredentials);
        }
        User {
            id,
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            phone: None,
            role: Role::Admin,
        }
    } else {
        let credential = load_credential(conn, &id)?.ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(&credential.salt, &req.password, &credential.digest) {
            tracing::warn!(user_id = %id, "rejected login");
            return Err(AuthError::InvalidCredentials);
        }
        credential.user
    };

    let admin = user.role == Role::Admin;
    let session = persist(conn, user)?;
    tracing::info!(admin, "user logged in");
    Ok(session)
}

/// Drops the session's snapshot. Returns false when there was none.
pub fn logout(conn: &Connection, token: &str) -> Result<bool, AuthError> {
    Ok(queries::delete_snapshot(conn, &snapshot_key(token))?)
}

/// The stored snapshot for `token`, or a signed-out one.
pub fn current(conn: &Connection, token: &str) -> Result<AuthSnapshot, AuthError> {
    let Some(value) = queries::load_snapshot(conn, &snapshot_key(token))? else {
        return Ok(AuthSnapshot::signed_out());
    };

    match serde_json::from_str(&value) {
        Ok(snapshot) => Ok(snapshot),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable auth snapshot");
            Ok(AuthSnapshot::signed_out())
        }
    }
}

pub fn active_sessions(conn: &Connection) -> Result<i64, AuthError> {
    Ok(queries::count_snapshots(conn, &format!("{SNAPSHOT_KEY}:"))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    const ADMIN_EMAIL: &str = "admin@drivebook.local";
    const ADMIN_PASSWORD: &str = "s3cret-admin";

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            name: "Sara Ali".to_string(),
            email: "Sara@Example.com".to_string(),
            phone: "0501234567".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_register_persists_snapshot() {
        let conn = setup_db();
        let session = register(&conn, &register_request(), ADMIN_EMAIL).unwrap();

        assert!(session.snapshot.is_authenticated);
        assert!(!session.snapshot.is_admin);

        let stored = current(&conn, &session.token).unwrap();
        assert_eq!(stored, session.snapshot);
        let user = stored.user.unwrap();
        assert_eq!(user.id, "sara@example.com");
        assert_eq!(user.phone.as_deref(), Some("0501234567"));
    }

    #[test]
    fn test_register_validation() {
        let conn = setup_db();

        let mut req = register_request();
        req.name = "  ".to_string();
        assert!(matches!(register(&conn, &req, ADMIN_EMAIL), Err(AuthError::MissingName)));

        let mut req = register_request();
        req.phone = "12345".to_string();
        assert!(matches!(register(&conn, &req, ADMIN_EMAIL), Err(AuthError::InvalidPhone)));

        let mut req = register_request();
        req.confirm_password = "secret2".to_string();
        assert!(matches!(register(&conn, &req, ADMIN_EMAIL), Err(AuthError::PasswordMismatch)));

        assert_eq!(active_sessions(&conn).unwrap(), 0);
    }

    #[test]
    fn test_register_rejects_taken_email() {
        let conn = setup_db();
        register(&conn, &register_request(), ADMIN_EMAIL).unwrap();

        let mut again = register_request();
        again.email = "sara@example.COM".to_string();
        assert!(matches!(register(&conn, &again, ADMIN_EMAIL), Err(AuthError::EmailTaken)));

        let mut admin = register_request();
        admin.email = ADMIN_EMAIL.to_string();
        assert!(matches!(register(&conn, &admin, ADMIN_EMAIL), Err(AuthError::EmailTaken)));
    }

    #[test]
    fn test_login_checks_stored_password() {
        let conn = setup_db();
        register(&conn, &register_request(), ADMIN_EMAIL).unwrap();

        let session = login(
            &conn,
            &login_request("sara@example.com", "secret1"),
            ADMIN_EMAIL,
            ADMIN_PASSWORD,
        )
        .unwrap();
        assert_eq!(session.snapshot.user.unwrap().name, "Sara Ali");

        assert!(matches!(
            login(&conn, &login_request("sara@example.com", "guessed"), ADMIN_EMAIL, ADMIN_PASSWORD),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&conn, &login_request("nobody@example.com", "secret1"), ADMIN_EMAIL, ADMIN_PASSWORD),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_admin_login_requires_admin_password() {
        let conn = setup_db();

        let session = login(
            &conn,
            &login_request("ADMIN@drivebook.local", ADMIN_PASSWORD),
            ADMIN_EMAIL,
            ADMIN_PASSWORD,
        )
        .unwrap();
        assert!(session.snapshot.is_admin);

        assert!(matches!(
            login(&conn, &login_request(ADMIN_EMAIL, "guessed"), ADMIN_EMAIL, ADMIN_PASSWORD),
            Err(AuthError::InvalidCredentials)
        ));
        assert_eq!(active_sessions(&conn).unwrap(), 1);
    }

    #[test]
    fn test_admin_login_disabled_without_password() {
        let conn = setup_db();
        assert!(matches!(
            login(&conn, &login_request(ADMIN_EMAIL, ""), ADMIN_EMAIL, ""),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_login_rejects_bad_email() {
        let conn = setup_db();
        assert!(matches!(
            login(&conn, &login_request("not-an-email", "secret1"), ADMIN_EMAIL, ADMIN_PASSWORD),
            Err(AuthError::InvalidEmail)
        ));
    }

    #[test]
    fn test_logout_clears_snapshot() {
        let conn = setup_db();
        let session = register(&conn, &register_request(), ADMIN_EMAIL).unwrap();
        assert_eq!(active_sessions(&conn).unwrap(), 1);

        assert!(logout(&conn, &session.token).unwrap());
        assert!(!logout(&conn, &session.token).unwrap());
        assert_eq!(current(&conn, &session.token).unwrap(), AuthSnapshot::signed_out());
    }

    #[test]
    fn test_unreadable_snapshot_is_signed_out() {
        let conn = setup_db();
        queries::save_snapshot(&conn, &snapshot_key("broken"), "not json").unwrap();
        assert_eq!(current(&conn, "broken").unwrap(), AuthSnapshot::signed_out());
    }
}
