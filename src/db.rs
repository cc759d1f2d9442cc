use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{Connection, ErrorCode, Result};

use crate::models::AnalyticsSnapshot;

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).expect("Failed to create data directory");
        }
        let conn = Connection::open(path)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "
            -- Customer orders
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                customer TEXT NOT NULL,
                location TEXT NOT NULL DEFAULT 'unknown',
                total REAL NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                updated_at TEXT
            );

            -- Line items, price captured at order time
            CREATE TABLE IF NOT EXISTS order_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT NOT NULL,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                FOREIGN KEY (order_id) REFERENCES orders(id)
            );

            -- Single-row analytics snapshot document
            CREATE TABLE IF NOT EXISTS analytics (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                snapshot TEXT NOT NULL
            );
            ",
        )?;

        // Run migrations for existing databases (pass connection to avoid deadlock)
        Self::migrate_conn(&conn)?;

        // Seed the empty snapshot once; later writes only ever update it
        let empty = serde_json::to_string(&AnalyticsSnapshot::default())
            .expect("Failed to serialize empty snapshot");
        conn.execute(
            "INSERT OR IGNORE INTO analytics (id, snapshot) VALUES (1, ?1)",
            [&empty],
        )?;

        Ok(())
    }

    fn migrate_conn(conn: &Connection) -> Result<()> {
        let columns: Vec<String> = conn
            .prepare("PRAGMA table_info(orders)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !columns.contains(&"updated_at".to_string()) {
            conn.execute("ALTER TABLE orders ADD COLUMN updated_at TEXT", [])?;
        }
        if !columns.contains(&"location".to_string()) {
            conn.execute(
                "ALTER TABLE orders ADD COLUMN location TEXT NOT NULL DEFAULT 'unknown'",
                [],
            )?;
        }

        Ok(())
    }
}

/// Bounded retry for transient storage errors, linear backoff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff_ms: 50,
        }
    }
}

impl RetryPolicy {
    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(attempt as u64))
    }
}

fn is_transient(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::DatabaseBusy || e.code == ErrorCode::DatabaseLocked
    )
}

/// Run a storage operation, retrying busy/locked failures up to the policy's
/// attempt limit. Any other error is returned immediately.
pub fn with_retry<T>(policy: &RetryPolicy, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Err(err) if is_transient(&err) && attempt + 1 < policy.max_attempts => {
                attempt += 1;
                std::thread::sleep(policy.delay_for_attempt(attempt));
            }
            other => return other,
        }
    }
}
