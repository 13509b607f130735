use crate::store::KvBackend;
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "collegeguide.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS collections(
            key TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    // Workspaces created before timestamps were tracked.
    ensure_collections_updated_at(&conn)?;

    Ok(conn)
}

fn ensure_collections_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "collections", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE collections ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// One row per collection key in the workspace database.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(open_db(workspace)?))
    }
}

impl KvBackend for SqliteBackend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT payload FROM collections WHERE key = ?",
                [key],
                |r| r.get(0),
            )
            .optional()
            .with_context(|| format!("failed to read collection {key}"))
    }

    fn write_many(&mut self, entries: &[(&str, String)]) -> anyhow::Result<()> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction()
            .context("failed to begin collection write")?;
        for (key, payload) in entries {
            tx.execute(
                "INSERT INTO collections(key, payload, updated_at) VALUES(?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
                (key, payload, &updated_at),
            )
            .with_context(|| format!("failed to write collection {key}"))?;
        }
        tx.commit().context("failed to commit collection write")?;
        Ok(())
    }
}
