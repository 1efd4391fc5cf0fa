//! SQLite-based account storage and session state.
//!
//! Provides persistent storage for:
//! - User accounts with salted credential hashes
//! - Profile fields (mood, avatar, notification switches)
//! - Login attempt history
//! - The current-session pointer in a key-value table
//!
//! Credentials are hashed with iterated HMAC-SHA256 over a random
//! per-user salt; the plaintext password is never stored.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::HashMap;

use super::data_dir;
use crate::error::{CoreError, Result, StoreError, ValidationError};

const HASH_ITERATIONS: u32 = 100_000;
const CURRENT_USER_KEY: &str = "current_user";

// === Validation helpers ===

/// Check username format: 3-20 characters, letters/digits/underscores.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.len() < 3 || username.len() > 20 {
        return Err(ValidationError::InvalidUsername(
            "must be 3-20 characters".to_string(),
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidUsername(
            "may only contain letters, numbers, and underscores".to_string(),
        ));
    }
    Ok(())
}

/// Syntactic email check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => {
            return Err(ValidationError::InvalidEmail(
                "must contain exactly one '@'".to_string(),
            ))
        }
    };
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail("malformed address".to_string()));
    }
    let valid_domain = domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty());
    if !valid_domain {
        return Err(ValidationError::InvalidEmail(
            "domain must contain a dot".to_string(),
        ));
    }
    Ok(())
}

/// Password strength check: at least 8 characters with upper, lower,
/// digit, and special.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::InvalidPassword(
            "must be at least 8 characters".to_string(),
        ));
    }
    let checks = [
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "must contain an uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "must contain a lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "must contain a digit",
        ),
        (
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
            "must contain a special character",
        ),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(ValidationError::InvalidPassword(message.to_string()));
        }
    }
    Ok(())
}

// === Credential hashing ===

type HmacSha256 = Hmac<Sha256>;

/// Iterated HMAC-SHA256 over the salt, keyed by the password.
fn hash_password(password: &str, salt: &str) -> String {
    let mut block = salt.as_bytes().to_vec();
    for _ in 0..HASH_ITERATIONS {
        let mut mac = HmacSha256::new_from_slice(password.as_bytes())
            .expect("HMAC can take keys of any size");
        mac.update(&block);
        block = mac.finalize().into_bytes().to_vec();
    }
    hex::encode(block)
}

fn generate_salt() -> Result<String> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| CoreError::Custom(format!("salt generation failed: {e}")))?;
    Ok(hex::encode(bytes))
}

/// Parse datetime from an RFC3339 string with fallback to current time.
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// === Records ===

/// A stored user account, without credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Self-reported mood picked at signup
    pub mood: Option<String>,
    /// Avatar identifier or URL
    pub avatar: Option<String>,
    /// Per-channel notification switches
    pub notifications: HashMap<String, bool>,
    pub agreed_to_terms: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub mood: Option<String>,
    pub agreed_to_terms: bool,
}

/// One recorded login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub email: String,
    pub attempted_at: DateTime<Utc>,
    pub success: bool,
}

/// Aggregate account statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccountStats {
    pub total_users: u64,
    /// Signups within the last 7 days
    pub recent_signups: u64,
    /// Mood label -> user count, most common first
    pub mood_distribution: Vec<(String, u64)>,
}

/// SQLite database for account storage.
pub struct AccountStore {
    conn: Connection,
}

impl AccountStore {
    /// Open the store at `~/.config/studyflow/accounts.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()
            .map_err(|e| CoreError::Custom(e.to_string()))?
            .join("accounts.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| {
            CoreError::Store(StoreError::OpenFailed {
                path: path.to_path_buf(),
                source,
            })
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id            INTEGER PRIMARY KEY AUTOINCREMENT,
                    username      TEXT UNIQUE NOT NULL,
                    email         TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    password_salt TEXT NOT NULL,
                    mood          TEXT,
                    avatar        TEXT,
                    notifications TEXT NOT NULL DEFAULT '{}',
                    agreed_to_terms INTEGER NOT NULL DEFAULT 0,
                    created_at    TEXT NOT NULL,
                    last_login    TEXT
                );

                CREATE TABLE IF NOT EXISTS login_attempts (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    email        TEXT NOT NULL,
                    attempted_at TEXT NOT NULL,
                    success      INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
                CREATE INDEX IF NOT EXISTS idx_attempts_email ON login_attempts(email);",
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // === Account CRUD ===

    /// Create a new account.
    ///
    /// # Errors
    /// Validation failures for each field, a missing terms agreement,
    /// or [`StoreError::Duplicate`] when the username or email is taken.
    pub fn signup(&self, new_user: &NewUser) -> Result<UserRecord> {
        validate_username(&new_user.username).map_err(CoreError::Validation)?;
        validate_email(&new_user.email).map_err(CoreError::Validation)?;
        validate_password(&new_user.password).map_err(CoreError::Validation)?;
        if !new_user.agreed_to_terms {
            return Err(CoreError::Validation(ValidationError::InvalidValue {
                field: "agreed_to_terms".to_string(),
                message: "you must agree to the terms and conditions".to_string(),
            }));
        }

        if self.username_exists(&new_user.username)? {
            return Err(StoreError::Duplicate {
                field: "username",
                value: new_user.username.clone(),
            }
            .into());
        }
        if self.find_id_by_email(&new_user.email)?.is_some() {
            return Err(StoreError::Duplicate {
                field: "email",
                value: new_user.email.clone(),
            }
            .into());
        }

        let salt = generate_salt()?;
        let hash = hash_password(&new_user.password, &salt);
        let created_at = Utc::now();

        self.conn
            .execute(
                "INSERT INTO users (username, email, password_hash, password_salt, mood,
                                    agreed_to_terms, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
                params![
                    new_user.username,
                    new_user.email,
                    hash,
                    salt,
                    new_user.mood,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(StoreError::from)?;

        tracing::info!(username = %new_user.username, "account created");
        self.get_user(&new_user.username)
    }

    /// Verify credentials and update the last-login timestamp.
    ///
    /// Every attempt is recorded, successful or not.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] for an unknown email,
    /// [`StoreError::InvalidCredentials`] for a wrong password.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<UserRecord> {
        let row = self
            .conn
            .query_row(
                "SELECT username, password_hash, password_salt FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(StoreError::from)?;

        let (username, stored_hash, salt) = match row {
            Some(row) => row,
            None => {
                self.record_attempt(email, false)?;
                return Err(StoreError::NotFound {
                    kind: "user",
                    key: email.to_string(),
                }
                .into());
            }
        };

        if hash_password(password, &salt) != stored_hash {
            self.record_attempt(email, false)?;
            tracing::warn!(email, "failed login attempt");
            return Err(StoreError::InvalidCredentials {
                email: email.to_string(),
            }
            .into());
        }

        self.conn
            .execute(
                "UPDATE users SET last_login = ?1 WHERE email = ?2",
                params![Utc::now().to_rfc3339(), email],
            )
            .map_err(StoreError::from)?;
        self.record_attempt(email, true)?;

        self.get_user(&username)
    }

    /// Fetch a user by username.
    pub fn get_user(&self, username: &str) -> Result<UserRecord> {
        self.conn
            .query_row(
                "SELECT id, username, email, mood, avatar, notifications, agreed_to_terms,
                        created_at, last_login
                 FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()
            .map_err(StoreError::from)?
            .ok_or_else(|| {
                StoreError::NotFound {
                    kind: "user",
                    key: username.to_string(),
                }
                .into()
            })
    }

    /// List all users, newest first.
    pub fn list_users(&self) -> Result<Vec<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, username, email, mood, avatar, notifications, agreed_to_terms,
                        created_at, last_login
                 FROM users ORDER BY created_at DESC",
            )
            .map_err(StoreError::from)?;
        let rows = stmt.query_map([], row_to_user).map_err(StoreError::from)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row.map_err(StoreError::from)?);
        }
        Ok(users)
    }

    /// Update the mood field, returning the fresh record.
    pub fn set_mood(&self, username: &str, mood: Option<&str>) -> Result<UserRecord> {
        self.update_field(username, "mood", mood)
    }

    /// Update the avatar field, returning the fresh record.
    pub fn set_avatar(&self, username: &str, avatar: Option<&str>) -> Result<UserRecord> {
        self.update_field(username, "avatar", avatar)
    }

    /// Flip a single notification switch, returning the fresh record.
    ///
    /// Reads the stored map, changes one key, and writes the result
    /// back; other switches are untouched.
    pub fn set_notification(&self, username: &str, channel: &str, enabled: bool) -> Result<UserRecord> {
        let user = self.get_user(username)?;
        let mut notifications = user.notifications;
        notifications.insert(channel.to_string(), enabled);

        let json = serde_json::to_string(&notifications)?;
        let changed = self
            .conn
            .execute(
                "UPDATE users SET notifications = ?1 WHERE username = ?2",
                params![json, username],
            )
            .map_err(StoreError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "user",
                key: username.to_string(),
            }
            .into());
        }
        self.get_user(username)
    }

    /// Delete an account and clear its session pointer if active.
    pub fn delete_user(&self, username: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE username = ?1", params![username])
            .map_err(StoreError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "user",
                key: username.to_string(),
            }
            .into());
        }
        if self.kv_get(CURRENT_USER_KEY)?.as_deref() == Some(username) {
            self.kv_delete(CURRENT_USER_KEY)?;
        }
        Ok(())
    }

    /// Login attempt history for an email, newest first.
    pub fn login_attempts(&self, email: &str) -> Result<Vec<LoginAttempt>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT email, attempted_at, success FROM login_attempts
                 WHERE email = ?1 ORDER BY attempted_at DESC, id DESC",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map(params![email], |row| {
                Ok(LoginAttempt {
                    email: row.get(0)?,
                    attempted_at: parse_datetime_fallback(&row.get::<_, String>(1)?),
                    success: row.get(2)?,
                })
            })
            .map_err(StoreError::from)?;

        let mut attempts = Vec::new();
        for row in rows {
            attempts.push(row.map_err(StoreError::from)?);
        }
        Ok(attempts)
    }

    /// Aggregate statistics: user count, recent signups, mood spread.
    pub fn stats(&self) -> Result<AccountStats> {
        let total_users: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(StoreError::from)?;

        let cutoff = (Utc::now() - Duration::days(7)).to_rfc3339();
        let recent_signups: u64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE created_at >= ?1",
                params![cutoff],
                |row| row.get(0),
            )
            .map_err(StoreError::from)?;

        let mut stmt = self
            .conn
            .prepare(
                "SELECT mood, COUNT(*) AS count FROM users
                 WHERE mood IS NOT NULL GROUP BY mood ORDER BY count DESC",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)))
            .map_err(StoreError::from)?;

        let mut mood_distribution = Vec::new();
        for row in rows {
            mood_distribution.push(row.map_err(StoreError::from)?);
        }

        Ok(AccountStats {
            total_users,
            recent_signups,
            mood_distribution,
        })
    }

    // === Session state ===

    /// Authenticate and mark the user as the active session.
    pub fn login(&self, email: &str, password: &str) -> Result<UserRecord> {
        let user = self.authenticate(email, password)?;
        self.kv_set(CURRENT_USER_KEY, &user.username)?;
        Ok(user)
    }

    /// Clear the active session.
    ///
    /// # Errors
    /// [`StoreError::NoSession`] when nobody is logged in.
    pub fn logout(&self) -> Result<()> {
        if self.kv_get(CURRENT_USER_KEY)?.is_none() {
            return Err(StoreError::NoSession.into());
        }
        self.kv_delete(CURRENT_USER_KEY)
    }

    /// The currently logged-in user, if any.
    pub fn current_user(&self) -> Result<Option<UserRecord>> {
        match self.kv_get(CURRENT_USER_KEY)? {
            Some(username) => self.get_user(&username).map(Some),
            None => Ok(None),
        }
    }

    // === Internals ===

    fn username_exists(&self, username: &str) -> Result<bool> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(id.is_some())
    }

    fn find_id_by_email(&self, email: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
            .map_err(CoreError::from)
    }

    fn update_field(&self, username: &str, column: &str, value: Option<&str>) -> Result<UserRecord> {
        // column names come from the fixed callers above, never user input
        let sql = format!("UPDATE users SET {column} = ?1 WHERE username = ?2");
        let changed = self
            .conn
            .execute(&sql, params![value, username])
            .map_err(StoreError::from)?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "user",
                key: username.to_string(),
            }
            .into());
        }
        self.get_user(username)
    }

    fn record_attempt(&self, email: &str, success: bool) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO login_attempts (email, attempted_at, success) VALUES (?1, ?2, ?3)",
                params![email, Utc::now().to_rfc3339(), success],
            )
            .map_err(StoreError::from)?;
        Ok(())
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(StoreError::from)?;
        Ok(())
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(StoreError::from)
            .map_err(CoreError::from)
    }

    fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(StoreError::from)?;
        Ok(())
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<UserRecord> {
    let notifications_json: String = row.get(5)?;
    let notifications: HashMap<String, bool> =
        serde_json::from_str(&notifications_json).unwrap_or_default();

    let created_at = parse_datetime_fallback(&row.get::<_, String>(7)?);
    let last_login = row
        .get::<_, Option<String>>(8)?
        .map(|s| parse_datetime_fallback(&s));

    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        mood: row.get(3)?,
        avatar: row.get(4)?,
        notifications,
        agreed_to_terms: row.get(6)?,
        created_at,
        last_login,
    })
}
