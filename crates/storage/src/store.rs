//! SqliteStore - ReadingStore adapter over rusqlite.
//!
//! Each operation opens a fresh connection from the stored path inside
//! `spawn_blocking`; `Connection`'s Drop releases it on success and error
//! alike. WAL mode makes the per-operation connections safe under
//! concurrent insert/query traffic.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection};
use tracing::debug;

use contracts::{
    ContractError, PersistedReading, Reading, ReadingStore, Scalar, SensorField, SensorRow,
};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS sensores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pressao02_hx710b REAL,
    temperatura_ds18b20 REAL,
    chave_fim_de_curso INTEGER,
    vibracao_vib_x REAL,
    vibracao_vib_y REAL,
    vibracao_vib_z REAL,
    velocidade_m_s REAL,
    data_hora TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sensores_data_hora ON sensores (data_hora);
";

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// SQLite adapter for the reading table.
#[derive(Clone)]
pub struct SqliteStore {
    path: Arc<PathBuf>,
}

impl SqliteStore {
    /// Open (creating if needed) the database and ensure the schema exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ContractError> {
        let path = path.into();
        let conn =
            Connection::open(&path).map_err(|e| ContractError::store("open", e.to_string()))?;

        // WAL mode persists in the database file; later per-operation
        // connections inherit it.
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| ContractError::store("open", e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| ContractError::store("open", e.to_string()))?;

        debug!(path = %path.display(), "reading store ready");
        Ok(Self {
            path: Arc::new(path),
        })
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T, ContractError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, ContractError> + Send + 'static,
    {
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || f(&path))
            .await
            .map_err(|e| ContractError::store(operation, format!("task join failed: {e}")))?
    }
}

impl ReadingStore for SqliteStore {
    async fn insert(&self, reading: Reading) -> Result<PersistedReading, ContractError> {
        self.run("insert", move |path| insert_blocking(path, reading))
            .await
    }

    async fn count_all(&self) -> Result<i64, ContractError> {
        self.run("count_all", count_all_blocking).await
    }

    async fn count_since(&self, window_secs: i64) -> Result<i64, ContractError> {
        self.run("count_since", move |path| {
            count_since_blocking(path, window_secs)
        })
        .await
    }

    async fn query_recent(&self, limit: u32) -> Result<Vec<PersistedReading>, ContractError> {
        self.run("query_recent", move |path| {
            query_recent_blocking(path, limit)
        })
        .await
    }

    async fn query_sensor_column(
        &self,
        field: SensorField,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SensorRow>, ContractError> {
        self.run("query_sensor_column", move |path| {
            query_sensor_column_blocking(path, field, limit, offset)
        })
        .await
    }
}

fn open_connection(path: &Path, operation: &'static str) -> Result<Connection, ContractError> {
    let conn = Connection::open(path).map_err(|e| ContractError::store(operation, e.to_string()))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| ContractError::store(operation, e.to_string()))?;
    Ok(conn)
}

fn insert_blocking(path: &Path, reading: Reading) -> Result<PersistedReading, ContractError> {
    let conn = open_connection(path, "insert")?;
    let timestamp = Utc::now();

    conn.execute(
        "INSERT INTO sensores
         (pressao02_hx710b, temperatura_ds18b20, chave_fim_de_curso,
          vibracao_vib_x, vibracao_vib_y, vibracao_vib_z, velocidade_m_s, data_hora)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            reading.pressure,
            reading.temperature,
            reading.limit_switch,
            reading.vibration_x,
            reading.vibration_y,
            reading.vibration_z,
            reading.speed,
            format_timestamp(&timestamp),
        ],
    )
    .map_err(|e| ContractError::store("insert", e.to_string()))?;

    Ok(PersistedReading {
        id: conn.last_insert_rowid(),
        timestamp,
        reading,
    })
}

fn count_all_blocking(path: &Path) -> Result<i64, ContractError> {
    let conn = open_connection(path, "count_all")?;
    conn.query_row("SELECT COUNT(*) FROM sensores", [], |row| row.get(0))
        .map_err(|e| ContractError::store("count_all", e.to_string()))
}

fn count_since_blocking(path: &Path, window_secs: i64) -> Result<i64, ContractError> {
    let conn = open_connection(path, "count_since")?;
    let cutoff = Utc::now() - chrono::Duration::seconds(window_secs);
    conn.query_row(
        "SELECT COUNT(*) FROM sensores WHERE data_hora >= ?1",
        params![format_timestamp(&cutoff)],
        |row| row.get(0),
    )
    .map_err(|e| ContractError::store("count_since", e.to_string()))
}

fn query_recent_blocking(path: &Path, limit: u32) -> Result<Vec<PersistedReading>, ContractError> {
    let conn = open_connection(path, "query_recent")?;
    let mut stmt = conn
        .prepare(
            "SELECT id, pressao02_hx710b, temperatura_ds18b20, chave_fim_de_curso,
                    vibracao_vib_x, vibracao_vib_y, vibracao_vib_z, velocidade_m_s, data_hora
             FROM sensores
             ORDER BY data_hora DESC, id DESC
             LIMIT ?1",
        )
        .map_err(|e| ContractError::store("query_recent", e.to_string()))?;

    let rows = stmt
        .query_map(params![limit as i64], row_to_persisted)
        .map_err(|e| ContractError::store("query_recent", e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ContractError::store("query_recent", e.to_string()))
}

fn query_sensor_column_blocking(
    path: &Path,
    field: SensorField,
    limit: u32,
    offset: u32,
) -> Result<Vec<SensorRow>, ContractError> {
    let conn = open_connection(path, "query_sensor_column")?;

    // The column name comes from the SensorField enum, never from the caller.
    let sql = format!(
        "SELECT id, {col}, data_hora FROM sensores
         ORDER BY data_hora DESC, id DESC
         LIMIT ?1 OFFSET ?2",
        col = field.column()
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ContractError::store("query_sensor_column", e.to_string()))?;

    let rows = stmt
        .query_map(params![limit as i64, offset as i64], |row| {
            let id: i64 = row.get(0)?;
            let value = scalar_from_sql(field, row.get_ref(1)?);
            let timestamp = timestamp_from_row(row, 2)?;
            Ok(SensorRow {
                id,
                value,
                timestamp,
            })
        })
        .map_err(|e| ContractError::store("query_sensor_column", e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| ContractError::store("query_sensor_column", e.to_string()))
}

fn row_to_persisted(row: &rusqlite::Row) -> rusqlite::Result<PersistedReading> {
    Ok(PersistedReading {
        id: row.get(0)?,
        timestamp: timestamp_from_row(row, 8)?,
        reading: Reading {
            pressure: row.get(1)?,
            temperature: row.get(2)?,
            limit_switch: row.get(3)?,
            vibration_x: row.get(4)?,
            vibration_y: row.get(5)?,
            vibration_z: row.get(6)?,
            speed: row.get(7)?,
        },
    })
}

fn timestamp_from_row(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Rebuild the field's scalar from whatever SQLite actually stored.
///
/// Columns written by this adapter come back as REAL/INTEGER/NULL, but rows
/// written by other tools may carry raw byte encodings; those are coerced
/// back to numbers when they parse, and kept as text for that row when they
/// do not.
fn scalar_from_sql(field: SensorField, value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Null => Scalar::Null,
        ValueRef::Integer(i) => {
            if field.is_switch() {
                Scalar::Bool(i != 0)
            } else {
                Scalar::Number(i as f64)
            }
        }
        ValueRef::Real(f) => Scalar::Number(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            match text.trim().parse::<f64>() {
                Ok(n) if field.is_switch() => Scalar::Bool(n != 0.0),
                Ok(n) => Scalar::Number(n),
                Err(_) => Scalar::Text(text.into_owned()),
            }
        }
    }
}

/// Fixed-width RFC3339 (micros, UTC) so lexicographic column order matches
/// chronological order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let (_dir, store) = open_store();

        let first = store
            .insert(Reading {
                temperature: Some(23.5),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = store.insert(Reading::default()).await.unwrap();

        assert!(first.id < second.id);
        assert_eq!(first.reading.temperature, Some(23.5));
    }

    #[tokio::test]
    async fn test_unset_fields_round_trip_as_unset() {
        let (_dir, store) = open_store();

        store
            .insert(Reading {
                pressure: Some(101.3),
                limit_switch: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        let rows = store.query_recent(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        let got = &rows[0].reading;
        assert_eq!(got.pressure, Some(101.3));
        assert_eq!(got.limit_switch, Some(true));
        assert_eq!(got.temperature, None);
        assert_eq!(got.vibration_x, None);
        assert_eq!(got.speed, None);
    }

    #[tokio::test]
    async fn test_query_recent_is_most_recent_first() {
        let (_dir, store) = open_store();

        for i in 0..3 {
            store
                .insert(Reading {
                    speed: Some(i as f64),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let rows = store.query_recent(2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].reading.speed, Some(2.0));
        assert_eq!(rows[1].reading.speed, Some(1.0));
    }

    #[tokio::test]
    async fn test_count_since_window() {
        let (_dir, store) = open_store();

        for _ in 0..4 {
            store.insert(Reading::default()).await.unwrap();
        }
        // Plant one reading well outside the window.
        let conn = Connection::open(store.path()).unwrap();
        conn.execute(
            "INSERT INTO sensores (data_hora) VALUES (?1)",
            params![format_timestamp(&(Utc::now() - chrono::Duration::seconds(3600)))],
        )
        .unwrap();

        assert_eq!(store.count_all().await.unwrap(), 5);
        assert_eq!(store.count_since(60).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_sensor_column_pagination() {
        let (_dir, store) = open_store();

        for i in 0..5 {
            store
                .insert(Reading {
                    vibration_x: Some(i as f64),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let page = store
            .query_sensor_column(SensorField::VibrationX, 2, 1)
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].value, Scalar::Number(3.0));
        assert_eq!(page[1].value, Scalar::Number(2.0));
    }

    #[tokio::test]
    async fn test_switch_column_reads_back_as_bool() {
        let (_dir, store) = open_store();

        store
            .insert(Reading {
                limit_switch: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .insert(Reading {
                limit_switch: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();

        let rows = store
            .query_sensor_column(SensorField::LimitSwitch, 10, 0)
            .await
            .unwrap();
        assert_eq!(rows[0].value, Scalar::Bool(false));
        assert_eq!(rows[1].value, Scalar::Bool(true));
    }

    #[tokio::test]
    async fn test_blob_cell_coerced_to_number() {
        let (_dir, store) = open_store();

        let conn = Connection::open(store.path()).unwrap();
        conn.execute(
            "INSERT INTO sensores (temperatura_ds18b20, data_hora) VALUES (?1, ?2)",
            params![b"23.5".to_vec(), format_timestamp(&Utc::now())],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO sensores (temperatura_ds18b20, data_hora) VALUES (?1, ?2)",
            params![b"not a number".to_vec(), format_timestamp(&Utc::now())],
        )
        .unwrap();

        let rows = store
            .query_sensor_column(SensorField::Temperature, 10, 0)
            .await
            .unwrap();
        // Unparseable bytes keep their value for that row only.
        assert_eq!(rows[0].value, Scalar::Text("not a number".to_string()));
        assert_eq!(rows[1].value, Scalar::Number(23.5));
    }

    #[tokio::test]
    async fn test_unset_cell_is_null() {
        let (_dir, store) = open_store();

        store
            .insert(Reading {
                temperature: Some(20.0),
                ..Default::default()
            })
            .await
            .unwrap();

        let rows = store
            .query_sensor_column(SensorField::Speed, 10, 0)
            .await
            .unwrap();
        assert!(rows[0].value.is_null());
    }
}
