//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection, OptionalExt};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Micropost, Relationship, User};
use crate::ports::{DestroyReport, Repository};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Timestamp format written to TIMESTAMP columns (microsecond precision)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const USER_COLUMNS: &str = "u.user_id, u.name, u.email, u.password_digest, u.remember_digest,
     u.activation_digest, u.reset_digest, u.activated, u.activated_at::VARCHAR,
     u.created_at::VARCHAR, u.updated_at::VARCHAR";

const MICROPOST_COLUMNS: &str = "m.micropost_id, m.user_id, m.content, m.created_at::VARCHAR";

/// Largest LIMIT/OFFSET DuckDB accepts is below 2^62; no table gets near this
const MAX_ROW_BOUND: usize = 1 << 61;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
        || lower.contains("file is already open")
}

fn is_unique_violation(err: &duckdb::Error) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("duplicate key") || msg.contains("unique constraint")
}

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a database file
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which can occur when another process (e.g. a second CLI invocation)
    /// holds the database.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        // Exponential backoff: 50ms, 100ms, 200ms, 400ms
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[chirp] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::database(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extensions are never needed; skip autoloading them from ~/.duckdb
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    fn row_to_user(row: &duckdb::Row) -> duckdb::Result<User> {
        // 0: user_id, 1: name, 2: email, 3: password_digest, 4: remember_digest,
        // 5: activation_digest, 6: reset_digest, 7: activated, 8: activated_at,
        // 9: created_at, 10: updated_at
        let id_str: String = row.get(0)?;
        let activated_at: Option<String> = row.get(8)?;
        let created_str: String = row.get(9)?;
        let updated_str: String = row.get(10)?;

        Ok(User {
            id: parse_uuid(&id_str),
            name: row.get(1)?,
            email: row.get(2)?,
            password_digest: row.get(3)?,
            remember_digest: row.get(4)?,
            activation_digest: row.get(5)?,
            reset_digest: row.get(6)?,
            activated: row.get::<_, Option<bool>>(7)?.unwrap_or(false),
            activated_at: activated_at.as_deref().map(parse_timestamp),
            created_at: parse_timestamp(&created_str),
            updated_at: parse_timestamp(&updated_str),
        })
    }

    fn row_to_micropost(row: &duckdb::Row) -> duckdb::Result<Micropost> {
        let id_str: String = row.get(0)?;
        let user_id_str: String = row.get(1)?;
        let created_str: String = row.get(3)?;

        Ok(Micropost {
            id: parse_uuid(&id_str),
            user_id: parse_uuid(&user_id_str),
            content: row.get(2)?,
            created_at: parse_timestamp(&created_str),
        })
    }

    fn query_users(&self, sql: &str, user_id: Uuid) -> Result<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let users = stmt
            .query_map([user_id.to_string()], Self::row_to_user)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(users)
    }

    fn query_count(&self, sql: &str, id: Option<Uuid>) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = match id {
            Some(id) => conn.query_row(sql, [id.to_string()], |row| row.get(0))?,
            None => conn.query_row(sql, [], |row| row.get(0))?,
        };
        Ok(count)
    }
}

impl Repository for DuckDbRepository {
    // === Users ===

    fn insert_user(&self, user: &User) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (user_id, name, email, password_digest, remember_digest,
                                activation_digest, reset_digest, activated, activated_at,
                                created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, CAST(? AS TIMESTAMP),
                     CAST(? AS TIMESTAMP), CAST(? AS TIMESTAMP))",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_digest,
                user.remember_digest,
                user.activation_digest,
                user.reset_digest,
                user.activated,
                user.activated_at.map(format_timestamp),
                format_timestamp(user.created_at),
                format_timestamp(user.updated_at),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::validation("email has already been taken")
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let mut conn = self.lock()?;
        let id = user.id.to_string();

        // Both statements commit together; an early return rolls back on drop
        let tx = conn.transaction()?;

        // Email carries a unique index; only touch it when it actually changes
        tx.execute(
            "UPDATE users SET email = ? WHERE user_id = ? AND email <> ?",
            params![user.email, id, user.email],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::validation("email has already been taken")
            } else {
                e.into()
            }
        })?;

        let changed = tx.execute(
            "UPDATE users SET name = ?, password_digest = ?, remember_digest = ?,
                              activation_digest = ?, reset_digest = ?, activated = ?,
                              activated_at = CAST(? AS TIMESTAMP),
                              updated_at = CAST(? AS TIMESTAMP)
             WHERE user_id = ?",
            params![
                user.name,
                user.password_digest,
                user.remember_digest,
                user.activation_digest,
                user.reset_digest,
                user.activated,
                user.activated_at.map(format_timestamp),
                format_timestamp(user.updated_at),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::not_found(format!("user {}", user.id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM users u WHERE u.user_id = ?", USER_COLUMNS);
        let user = conn
            .query_row(&sql, [id.to_string()], Self::row_to_user)
            .optional()?;
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM users u WHERE lower(u.email) = lower(?)",
            USER_COLUMNS
        );
        let user = conn
            .query_row(&sql, [email], Self::row_to_user)
            .optional()?;
        Ok(user)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM users u ORDER BY u.name, u.user_id",
            USER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(users)
    }

    fn count_users(&self) -> Result<i64> {
        self.query_count("SELECT COUNT(*) FROM users", None)
    }

    /// Cascade delete inside one transaction:
    /// 1. every relationship the user is on either end of
    /// 2. every micropost the user authored
    /// 3. the user row
    ///
    /// Any failure rolls the whole unit back, so no orphans are left behind.
    fn destroy_user(&self, id: Uuid) -> Result<DestroyReport> {
        let mut conn = self.lock()?;
        let id = id.to_string();

        let tx = conn.transaction()?;
        let relationships_deleted = tx.execute(
            "DELETE FROM relationships WHERE follower_id = ? OR followed_id = ?",
            params![id, id],
        )?;
        let microposts_deleted =
            tx.execute("DELETE FROM microposts WHERE user_id = ?", params![id])?;
        let users_deleted = tx.execute("DELETE FROM users WHERE user_id = ?", params![id])?;
        tx.commit()?;

        Ok(DestroyReport {
            user_deleted: users_deleted > 0,
            microposts_deleted: microposts_deleted as i64,
            relationships_deleted: relationships_deleted as i64,
        })
    }

    // === Microposts ===

    fn insert_micropost(&self, post: &Micropost) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO microposts (micropost_id, user_id, content, created_at)
             VALUES (?, ?, ?, CAST(? AS TIMESTAMP))",
            params![
                post.id.to_string(),
                post.user_id.to_string(),
                post.content,
                format_timestamp(post.created_at),
            ],
        )?;
        Ok(())
    }

    fn get_micropost(&self, id: Uuid) -> Result<Option<Micropost>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM microposts m WHERE m.micropost_id = ?",
            MICROPOST_COLUMNS
        );
        let post = conn
            .query_row(&sql, [id.to_string()], Self::row_to_micropost)
            .optional()?;
        Ok(post)
    }

    fn delete_micropost(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM microposts WHERE micropost_id = ?",
            [id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    fn microposts_by_user(&self, user_id: Uuid) -> Result<Vec<Micropost>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM microposts m WHERE m.user_id = ?
             ORDER BY m.created_at DESC, m.micropost_id DESC",
            MICROPOST_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let posts = stmt
            .query_map([user_id.to_string()], Self::row_to_micropost)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(posts)
    }

    fn count_microposts(&self) -> Result<i64> {
        self.query_count("SELECT COUNT(*) FROM microposts", None)
    }

    // === Relationships ===

    fn insert_relationship(&self, relationship: &Relationship) -> Result<bool> {
        let conn = self.lock()?;
        let rows_changed = conn.execute(
            "INSERT INTO relationships (follower_id, followed_id, created_at)
             VALUES (?, ?, CAST(? AS TIMESTAMP))
             ON CONFLICT (follower_id, followed_id) DO NOTHING",
            params![
                relationship.follower_id.to_string(),
                relationship.followed_id.to_string(),
                format_timestamp(relationship.created_at),
            ],
        )?;
        Ok(rows_changed > 0)
    }

    fn delete_relationship(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM relationships WHERE follower_id = ? AND followed_id = ?",
            params![follower_id.to_string(), followed_id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    fn relationship_exists(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM relationships WHERE follower_id = ? AND followed_id = ?",
            params![follower_id.to_string(), followed_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn following(&self, user_id: Uuid) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users u
             JOIN relationships r ON r.followed_id = u.user_id
             WHERE r.follower_id = ?
             ORDER BY u.name, u.user_id",
            USER_COLUMNS
        );
        self.query_users(&sql, user_id)
    }

    fn followers(&self, user_id: Uuid) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users u
             JOIN relationships r ON r.follower_id = u.user_id
             WHERE r.followed_id = ?
             ORDER BY u.name, u.user_id",
            USER_COLUMNS
        );
        self.query_users(&sql, user_id)
    }

    fn count_following(&self, user_id: Uuid) -> Result<i64> {
        self.query_count(
            "SELECT COUNT(*) FROM relationships WHERE follower_id = ?",
            Some(user_id),
        )
    }

    fn count_followers(&self, user_id: Uuid) -> Result<i64> {
        self.query_count(
            "SELECT COUNT(*) FROM relationships WHERE followed_id = ?",
            Some(user_id),
        )
    }

    fn count_relationships(&self) -> Result<i64> {
        self.query_count("SELECT COUNT(*) FROM relationships", None)
    }

    // === Feed ===

    fn feed(&self, user_id: Uuid, limit: Option<usize>, offset: usize) -> Result<Vec<Micropost>> {
        if offset >= MAX_ROW_BOUND || limit == Some(0) {
            return Ok(Vec::new());
        }
        let limit = limit.map(|l| l.min(MAX_ROW_BOUND));

        let conn = self.lock()?;
        // One statement, so the followed set and the posts come from the same snapshot
        let sql = format!(
            "SELECT {} FROM microposts m
             WHERE m.user_id = ?
                OR m.user_id IN (SELECT r.followed_id FROM relationships r
                                 WHERE r.follower_id = ?)
             ORDER BY m.created_at DESC, m.micropost_id DESC
             {}",
            MICROPOST_COLUMNS,
            if limit.is_some() { "LIMIT ? OFFSET ?" } else { "OFFSET ?" }
        );
        let id = user_id.to_string();
        let offset = offset as i64;

        let mut stmt = conn.prepare(&sql)?;
        let rows = match limit {
            Some(limit) => stmt
                .query_map(params![id, id, limit as i64, offset], Self::row_to_micropost)?
                .collect::<duckdb::Result<Vec<_>>>()?,
            None => stmt
                .query_map(params![id, id, offset], Self::row_to_micropost)?
                .collect::<duckdb::Result<Vec<_>>>()?,
        };
        Ok(rows)
    }
}

// Helper functions

fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_else(|_| Uuid::nil())
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    parse_naive_datetime(s).and_utc()
}

fn parse_naive_datetime(s: &str) -> NaiveDateTime {
    // DuckDB renders TIMESTAMP as "2024-01-15 10:20:30.123456", dropping the
    // fraction when it is zero
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .unwrap_or_else(|_| Utc::now().naive_utc())
}
