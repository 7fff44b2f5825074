//! Shared SQLite connection tuning

use rusqlite::Connection;

/// WAL journaling with relaxed sync; safe for a single writer and many readers
pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "cache_size", -16_000)?;
    conn.pragma_update(None, "wal_autocheckpoint", 1_000)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(())
}
