//! Persistent checks and attempts.
//!
//! Rows are mapped to entities by hand, one mapping per query shape. Timestamps
//! are stored as unix milliseconds.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::checks::{Attempt, Check, Origin};
use crate::pagination::Direction;
use crate::vocabulary::{AttemptResult, CheckType, Difficulty, Skill};

pub trait CheckStore {
    fn initialize_schema(&self) -> Result<()>;
    /// Returns the assigned check id.
    fn create_check(&self, check: &Check) -> Result<i64>;
    /// Returns the assigned attempt id.
    fn create_attempt(&self, attempt: &Attempt) -> Result<i64>;
    fn read_check(&self, check_id: i64) -> Result<Option<Check>>;
    /// Up to `limit` checks of `user_id` past `anchor` in `direction`, with
    /// attempts populated. Older rows come newest first; newer rows come
    /// closest to the anchor first. `anchor == 0` lists from the most recent.
    fn list_user_checks(
        &self,
        user_id: i64,
        anchor: i64,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Check>>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS checks (
    check_id INTEGER PRIMARY KEY AUTOINCREMENT,
    skill INTEGER NOT NULL,
    type INTEGER NOT NULL,
    difficulty INTEGER NOT NULL,
    description TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    created_by_user INTEGER NOT NULL,
    created_by_chat INTEGER NOT NULL,
    created_by_message INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS checks_by_user ON checks (created_by_user);
CREATE TABLE IF NOT EXISTS attempts (
    attempt_id INTEGER PRIMARY KEY AUTOINCREMENT,
    check_id INTEGER NOT NULL REFERENCES checks (check_id),
    result INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    created_by_chat INTEGER NOT NULL,
    created_by_message INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS attempts_by_check ON attempts (check_id);
";

const CHECK_COLUMNS: &str = "c.check_id, c.skill, c.type, c.difficulty, c.description, \
     c.created_at, c.created_by_user, c.created_by_chat, c.created_by_message";

const ACTIVITY_CTE: &str = "WITH activity AS (
    SELECT c.check_id AS check_id, COALESCE(MAX(a.created_at), c.created_at) AS active_at
    FROM checks c
    LEFT JOIN attempts a ON a.check_id = c.check_id
    WHERE c.created_by_user = ?1
    GROUP BY c.check_id
)";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create database dir {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open database {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("enable foreign keys")?;
        Ok(SqliteStore { conn })
    }

    fn load_attempts(&self, check_id: i64) -> Result<Vec<Attempt>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT attempt_id, check_id, result, created_at, created_by_chat, created_by_message
             FROM attempts
             WHERE check_id = ?1
             ORDER BY created_at, attempt_id",
        )?;
        let rows = stmt
            .query_map(params![check_id], AttemptRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("read attempts of check {}", check_id))?;
        rows.into_iter().map(AttemptRow::into_attempt).collect()
    }

    fn anchor_activity(&self, user_id: i64, anchor: i64) -> Result<Option<i64>> {
        let sql = format!(
            "{} SELECT active_at FROM activity WHERE check_id = ?2",
            ACTIVITY_CTE
        );
        self.conn
            .query_row(&sql, params![user_id, anchor], |row| row.get(0))
            .optional()
            .with_context(|| format!("resolve anchor {}", anchor))
    }

    fn with_attempts(&self, rows: Vec<CheckRow>) -> Result<Vec<Check>> {
        rows.into_iter()
            .map(|row| {
                let attempts = self.load_attempts(row.check_id)?;
                row.into_check(attempts)
            })
            .collect()
    }
}

impl CheckStore for SqliteStore {
    fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .context("initialize schema")
    }

    fn create_check(&self, check: &Check) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO checks (
                    skill, type, difficulty, description, created_at,
                    created_by_user, created_by_chat, created_by_message
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    check.skill.id(),
                    check.kind.id(),
                    check.difficulty.id(),
                    check.description,
                    check.created_at.timestamp_millis(),
                    check.origin.user_id,
                    check.origin.chat_id,
                    check.origin.message_id,
                ],
            )
            .context("insert check")?;
        Ok(self.conn.last_insert_rowid())
    }

    fn create_attempt(&self, attempt: &Attempt) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO attempts (
                    check_id, result, created_at, created_by_chat, created_by_message
                 ) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    attempt.check_id,
                    attempt.result.id(),
                    attempt.created_at.timestamp_millis(),
                    attempt.chat_id,
                    attempt.message_id,
                ],
            )
            .with_context(|| format!("insert attempt for check {}", attempt.check_id))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn read_check(&self, check_id: i64) -> Result<Option<Check>> {
        let sql = format!("SELECT {} FROM checks c WHERE c.check_id = ?1", CHECK_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![check_id], CheckRow::from_row)
            .optional()
            .with_context(|| format!("read check {}", check_id))?;
        match row {
            Some(row) => {
                let attempts = self.load_attempts(check_id)?;
                Ok(Some(row.into_check(attempts)?))
            }
            None => Ok(None),
        }
    }

    fn list_user_checks(
        &self,
        user_id: i64,
        anchor: i64,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Check>> {
        let limit = limit as i64;
        let anchor_at = if anchor == 0 {
            None
        } else {
            self.anchor_activity(user_id, anchor)?
        };

        let rows = match (anchor_at, direction) {
            (None, Direction::Newer) if anchor != 0 => Ok(Vec::new()),
            (None, _) => {
                let sql = format!(
                    "{} SELECT {} FROM checks c JOIN activity act ON act.check_id = c.check_id
                     ORDER BY act.active_at DESC, c.check_id DESC
                     LIMIT ?2",
                    ACTIVITY_CTE, CHECK_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![user_id, limit], CheckRow::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
            (Some(active_at), Direction::Older) => {
                let sql = format!(
                    "{} SELECT {} FROM checks c JOIN activity act ON act.check_id = c.check_id
                     WHERE act.active_at < ?2 OR (act.active_at = ?2 AND c.check_id < ?3)
                     ORDER BY act.active_at DESC, c.check_id DESC
                     LIMIT ?4",
                    ACTIVITY_CTE, CHECK_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(
                        params![user_id, active_at, anchor, limit],
                        CheckRow::from_row,
                    )?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
            (Some(active_at), Direction::Newer) => {
                let sql = format!(
                    "{} SELECT {} FROM checks c JOIN activity act ON act.check_id = c.check_id
                     WHERE act.active_at > ?2 OR (act.active_at = ?2 AND c.check_id > ?3)
                     ORDER BY act.active_at ASC, c.check_id ASC
                     LIMIT ?4",
                    ACTIVITY_CTE, CHECK_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(
                        params![user_id, active_at, anchor, limit],
                        CheckRow::from_row,
                    )?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
        }
        .with_context(|| format!("list checks of user {}", user_id))?;

        self.with_attempts(rows)
    }
}

struct CheckRow {
    check_id: i64,
    skill: i64,
    kind: i64,
    difficulty: i64,
    description: String,
    created_at: i64,
    created_by_user: i64,
    created_by_chat: i64,
    created_by_message: i64,
}

impl CheckRow {
    /// Column order of `CHECK_COLUMNS`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CheckRow {
            check_id: row.get(0)?,
            skill: row.get(1)?,
            kind: row.get(2)?,
            difficulty: row.get(3)?,
            description: row.get(4)?,
            created_at: row.get(5)?,
            created_by_user: row.get(6)?,
            created_by_chat: row.get(7)?,
            created_by_message: row.get(8)?,
        })
    }

    fn into_check(self, attempts: Vec<Attempt>) -> Result<Check> {
        let id = self.check_id;
        Ok(Check {
            id,
            kind: CheckType::from_id(self.kind)
                .ok_or_else(|| anyhow!("check {} has unknown type {}", id, self.kind))?,
            skill: Skill::from_id(self.skill)
                .ok_or_else(|| anyhow!("check {} has unknown skill {}", id, self.skill))?,
            difficulty: Difficulty::from_id(self.difficulty).ok_or_else(|| {
                anyhow!("check {} has unknown difficulty {}", id, self.difficulty)
            })?,
            description: self.description,
            origin: Origin {
                user_id: self.created_by_user,
                chat_id: self.created_by_chat,
                message_id: self.created_by_message,
            },
            created_at: millis_to_utc(self.created_at)?,
            attempts,
        })
    }
}

struct AttemptRow {
    attempt_id: i64,
    check_id: i64,
    result: i64,
    created_at: i64,
    created_by_chat: i64,
    created_by_message: i64,
}

impl AttemptRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AttemptRow {
            attempt_id: row.get(0)?,
            check_id: row.get(1)?,
            result: row.get(2)?,
            created_at: row.get(3)?,
            created_by_chat: row.get(4)?,
            created_by_message: row.get(5)?,
        })
    }

    fn into_attempt(self) -> Result<Attempt> {
        Ok(Attempt {
            id: self.attempt_id,
            check_id: self.check_id,
            result: AttemptResult::from_id(self.result).ok_or_else(|| {
                anyhow!(
                    "attempt {} has unknown result {}",
                    self.attempt_id,
                    self.result
                )
            })?,
            chat_id: self.created_by_chat,
            message_id: self.created_by_message,
            created_at: millis_to_utc(self.created_at)?,
        })
    }
}

fn millis_to_utc(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| anyhow!("timestamp {} out of range", millis))
}
