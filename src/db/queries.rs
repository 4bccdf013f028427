use chrono::Utc;
use rusqlite::{params, Connection};

// ── Auth snapshots ──

pub fn save_snapshot(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    conn.execute(
        "INSERT INTO auth_snapshots (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![key, value, now],
    )?;
    Ok(())
}

pub fn load_snapshot(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT value FROM auth_snapshots WHERE key = ?1",
        params![key],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_snapshot(conn: &Connection, key: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM auth_snapshots WHERE key = ?1", params![key])?;
    Ok(count > 0)
}

pub fn count_snapshots(conn: &Connection, key_prefix: &str) -> anyhow::Result<i64> {
    let pattern = format!("{key_prefix}%");
    let count = conn.query_row(
        "SELECT COUNT(*) FROM auth_snapshots WHERE key LIKE ?1",
        params![pattern],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    #[test]
    fn test_snapshot_upsert_and_load() {
        let conn = setup_db();
        assert!(load_snapshot(&conn, "auth-storage:a").unwrap().is_none());

        save_snapshot(&conn, "auth-storage:a", r#"{"v":1}"#).unwrap();
        save_snapshot(&conn, "auth-storage:a", r#"{"v":2}"#).unwrap();

        assert_eq!(
            load_snapshot(&conn, "auth-storage:a").unwrap().as_deref(),
            Some(r#"{"v":2}"#)
        );
        assert_eq!(count_snapshots(&conn, "auth-storage:").unwrap(), 1);
    }

    #[test]
    fn test_snapshot_delete() {
        let conn = setup_db();
        save_snapshot(&conn, "auth-storage:a", "{}").unwrap();
        assert!(delete_snapshot(&conn, "auth-storage:a").unwrap());
        assert!(!delete_snapshot(&conn, "auth-storage:a").unwrap());
        assert_eq!(count_snapshots(&conn, "auth-storage:").unwrap(), 0);
    }
}
