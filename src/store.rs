use std::path::PathBuf;

use anyhow::Result;
use rusqlite::Connection;

/// SQLite-backed key-value store: one `kv` table, string keys and values.
///
/// Each operation opens its own connection, so individual calls are
/// serialized by SQLite itself. There is no cross-call transaction;
/// compound read-modify-write sequences in the manager rely on the
/// single-popup usage model.
#[derive(Debug, Clone)]
pub struct KvStore {
    path: PathBuf,
}

impl KvStore {
    /// Open the store at `path`, creating the file and schema if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        if let Some(parent) = store.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = store.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(store)
    }

    /// WAL so a reopening popup reading state never blocks a pending
    /// draft write; busy_timeout covers the brief overlap.
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(conn)
    }

    /// Fetch a single value. Absent keys come back as None.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query_map([key], |row| row.get::<_, String>(0))?;
        Ok(rows.next().transpose()?)
    }

    /// Upsert several keys as one combined write (a single transaction).
    pub fn set_many(&self, pairs: &[(&str, &str)]) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        for (key, value) in pairs {
            tx.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    /// Delete a key. Deleting an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A store on a throwaway SQLite file under the OS temp dir.
    pub(crate) fn temp_store(tag: &str) -> KvStore {
        use rand::Rng;
        let suffix: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        let path = std::env::temp_dir().join(format!("tabnote-{tag}-{suffix}.sqlite"));
        KvStore::open(path).expect("open temp store")
    }

    #[test]
    fn get_absent_key_is_none() {
        let store = temp_store("absent");
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = temp_store("roundtrip");
        store.set("k", "v1").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v1"));
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn set_many_writes_all_keys() {
        let store = temp_store("many");
        store.set_many(&[("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn remove_deletes_and_tolerates_absent() {
        let store = temp_store("remove");
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.remove("k").unwrap();
    }
}
