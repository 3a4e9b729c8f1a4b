// Persistence layer - narrow store contract + SQLite implementation

use crate::bear::{Bear, Sex};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no bear found for id `{0}`")]
    NotFound(String),

    #[error("invalid stored value in column `{column}`: `{value}`")]
    InvalidData { column: &'static str, value: String },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// The CRUD surface the service layer depends on. Everything the handlers
/// need from durable storage goes through these seven operations, keeping
/// the request logic decoupled from the storage engine.
pub trait BearStore {
    /// Fetch one bear by id. `None` when absent.
    fn get(&self, id: &str) -> StoreResult<Option<Bear>>;
    /// All bears, newest first.
    fn list(&self) -> StoreResult<Vec<Bear>>;
    /// Bears matching one sex, newest first.
    fn filter_sex(&self, sex: Sex) -> StoreResult<Vec<Bear>>;
    /// Insert or fully replace one bear by id.
    fn save(&self, bear: &Bear) -> StoreResult<()>;
    /// Remove one bear. `NotFound` when absent.
    fn delete(&self, id: &str) -> StoreResult<()>;
    /// Number of stored bears.
    fn count(&self) -> StoreResult<i64>;
    /// Whether a bear with this import fingerprint is already stored.
    fn fingerprint_exists(&self, fingerprint: &str) -> StoreResult<bool>;
}

// ============================================================================
// SQLITE IMPLEMENTATION
// ============================================================================

pub struct SqliteBearStore {
    conn: Connection,
}

impl SqliteBearStore {
    /// Open (creating if needed) a database file and ensure the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        setup_database(&conn)?;
        Ok(SqliteBearStore { conn })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteBearStore { conn })
    }
}

pub fn setup_database(conn: &Connection) -> StoreResult<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bears (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            sex TEXT NOT NULL,
            age INTEGER,
            fingerprint TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute("CREATE INDEX IF NOT EXISTS idx_bears_sex ON bears(sex)", [])?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bears_fingerprint ON bears(fingerprint)",
        [],
    )?;

    Ok(())
}

const BEAR_COLUMNS: &str = "id, name, sex, age, created_at, updated_at";

impl BearStore for SqliteBearStore {
    fn get(&self, id: &str) -> StoreResult<Option<Bear>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BEAR_COLUMNS} FROM bears WHERE id = ?1"
        ))?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(bear_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> StoreResult<Vec<Bear>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BEAR_COLUMNS} FROM bears ORDER BY created_at DESC"
        ))?;

        let mut rows = stmt.query([])?;
        let mut bears = Vec::new();
        while let Some(row) = rows.next()? {
            bears.push(bear_from_row(row)?);
        }

        Ok(bears)
    }

    fn filter_sex(&self, sex: Sex) -> StoreResult<Vec<Bear>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BEAR_COLUMNS} FROM bears WHERE sex = ?1 ORDER BY created_at DESC"
        ))?;

        let mut rows = stmt.query([sex.as_str()])?;
        let mut bears = Vec::new();
        while let Some(row) = rows.next()? {
            bears.push(bear_from_row(row)?);
        }

        Ok(bears)
    }

    fn save(&self, bear: &Bear) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO bears (id, name, sex, age, fingerprint, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                sex = excluded.sex,
                age = excluded.age,
                fingerprint = excluded.fingerprint,
                updated_at = excluded.updated_at",
            params![
                bear.id,
                bear.name,
                bear.sex.as_str(),
                bear.age.map(i64::from),
                bear.fingerprint(),
                bear.created_at.to_rfc3339(),
                bear.updated_at.to_rfc3339(),
            ],
        )?;

        debug!(id = %bear.id, "saved bear");
        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let changed = self.conn.execute("DELETE FROM bears WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        debug!(id, "deleted bear");
        Ok(())
    }

    fn count(&self) -> StoreResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM bears", [], |row| row.get(0))?;
        Ok(count)
    }

    fn fingerprint_exists(&self, fingerprint: &str) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM bears WHERE fingerprint = ?1)",
            [fingerprint],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn bear_from_row(row: &rusqlite::Row<'_>) -> StoreResult<Bear> {
    let sex_text: String = row.get("sex")?;
    let sex = Sex::parse(&sex_text).ok_or_else(|| StoreError::InvalidData {
        column: "sex",
        value: sex_text.clone(),
    })?;

    let age: Option<i64> = row.get("age")?;

    Ok(Bear {
        id: row.get("id")?,
        name: row.get("name")?,
        sex,
        age: age.and_then(|a| u32::try_from(a).ok()),
        created_at: parse_timestamp("created_at", row.get("created_at")?)?,
        updated_at: parse_timestamp("updated_at", row.get("updated_at")?)?,
    })
}

fn parse_timestamp(column: &'static str, value: String) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidData { column, value })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_bear(name: &str, sex: Sex, age: Option<u32>) -> Bear {
        Bear::new(name.to_string(), sex, age)
    }

    #[test]
    fn save_and_get_roundtrip() {
        let store = SqliteBearStore::open_in_memory().unwrap();
        let bear = create_test_bear("Masha", Sex::Female, Some(4));

        store.save(&bear).unwrap();
        let loaded = store.get(&bear.id).unwrap().unwrap();

        assert_eq!(loaded.id, bear.id);
        assert_eq!(loaded.name, "Masha");
        assert_eq!(loaded.sex, Sex::Female);
        assert_eq!(loaded.age, Some(4));
        assert_eq!(loaded.created_at, bear.created_at);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = SqliteBearStore::open_in_memory().unwrap();

        assert!(store.get("no-such-id").unwrap().is_none());
    }

    #[test]
    fn save_twice_replaces_instead_of_duplicating() {
        let store = SqliteBearStore::open_in_memory().unwrap();
        let mut bear = create_test_bear("Masha", Sex::Female, Some(4));
        store.save(&bear).unwrap();

        bear.apply("Masha the Great".to_string(), Sex::Female, Some(5));
        store.save(&bear).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let loaded = store.get(&bear.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Masha the Great");
        assert_eq!(loaded.age, Some(5));
    }

    #[test]
    fn delete_removes_exactly_one_row() {
        let store = SqliteBearStore::open_in_memory().unwrap();
        let keep = create_test_bear("Masha", Sex::Female, None);
        let gone = create_test_bear("Misha", Sex::Male, None);
        store.save(&keep).unwrap();
        store.save(&gone).unwrap();

        store.delete(&gone.id).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert!(store.get(&gone.id).unwrap().is_none());
        assert!(store.get(&keep.id).unwrap().is_some());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let store = SqliteBearStore::open_in_memory().unwrap();

        let err = store.delete("no-such-id").unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn filter_sex_returns_only_matching_bears() {
        let store = SqliteBearStore::open_in_memory().unwrap();
        let female = create_test_bear("Masha", Sex::Female, Some(4));
        let male = create_test_bear("Misha", Sex::Male, Some(6));
        store.save(&female).unwrap();
        store.save(&male).unwrap();

        let females = store.filter_sex(Sex::Female).unwrap();

        assert_eq!(females.len(), 1);
        assert_eq!(females[0].id, female.id);
    }

    #[test]
    fn filter_sex_with_no_matches_is_empty_not_error() {
        let store = SqliteBearStore::open_in_memory().unwrap();
        let male = create_test_bear("Misha", Sex::Male, None);
        store.save(&male).unwrap();

        assert!(store.filter_sex(Sex::Female).unwrap().is_empty());
    }

    #[test]
    fn fingerprint_lookup_tracks_saved_bears() {
        let store = SqliteBearStore::open_in_memory().unwrap();
        let bear = create_test_bear("Masha", Sex::Female, Some(4));

        assert!(!store.fingerprint_exists(&bear.fingerprint()).unwrap());
        store.save(&bear).unwrap();
        assert!(store.fingerprint_exists(&bear.fingerprint()).unwrap());
    }

    #[test]
    fn age_column_is_nullable() {
        let store = SqliteBearStore::open_in_memory().unwrap();
        let bear = create_test_bear("Misha", Sex::Male, None);

        store.save(&bear).unwrap();
        let loaded = store.get(&bear.id).unwrap().unwrap();

        assert_eq!(loaded.age, None);
    }
}
