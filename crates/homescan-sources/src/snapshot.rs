// ── Recorder database reader ──
//
// Reads recent entity states and the device table from the recorder's
// SQLite file. Two `states` layouts exist in the wild:
//
// - legacy: `states.entity_id`, inline `states.attributes`, `last_updated`
//   as a datetime string;
// - current: ids moved to `states_meta`, attributes deduplicated into
//   `state_attributes.shared_attrs`, `last_updated_ts` as epoch seconds.
//
// The database is always opened read-only.

use std::path::{Path, PathBuf};

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use serde_json::Value;

use homescan_core::{DeviceRecord, EntityStateRecord, RecordSource, SourceError, SourceTag};

/// Default file name inside the configuration directory.
pub const DEFAULT_DATABASE: &str = "home-assistant_v2.db";

const LEGACY_STATES_QUERY: &str = "\
    SELECT entity_id, state, attributes
    FROM states
    WHERE last_updated > datetime('now', ?1)
    ORDER BY last_updated, state_id";

const CURRENT_STATES_QUERY: &str = "\
    SELECT m.entity_id, s.state, a.shared_attrs
    FROM states s
    JOIN states_meta m ON s.metadata_id = m.metadata_id
    LEFT JOIN state_attributes a ON s.attributes_id = a.attributes_id
    WHERE s.last_updated_ts > CAST(strftime('%s', 'now') AS REAL) - ?1
    ORDER BY s.last_updated_ts, s.state_id";

/// Layout of the `states` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSchema {
    Legacy,
    Current,
}

/// Handle on a recorder database. Cheap to clone; every read opens its own
/// read-only connection.
#[derive(Debug, Clone)]
pub struct SnapshotDatabase {
    path: PathBuf,
    lookback_hours: u32,
}

impl SnapshotDatabase {
    pub fn new(path: impl Into<PathBuf>, lookback_hours: u32) -> Self {
        Self {
            path: path.into(),
            lookback_hours,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entity-state source over this database.
    pub fn states(&self) -> StateSnapshot {
        StateSnapshot(self.clone())
    }

    /// Device-table source over this database.
    pub fn device_table(&self) -> DeviceTable {
        DeviceTable(self.clone())
    }

    fn open(&self) -> Result<Connection, SourceError> {
        if !self.path.exists() {
            return Err(SourceError::missing("recorder database", self.path.display()));
        }
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SourceError::unreadable(self.label(), e))
    }

    fn label(&self) -> String {
        format!("recorder database {}", self.path.display())
    }

    pub fn schema(&self) -> Result<SnapshotSchema, SourceError> {
        let conn = self.open()?;
        detect_schema(&conn).map_err(|e| SourceError::format(self.label(), e))
    }

    /// States updated within the lookback window, oldest first, so later
    /// rows win when the builder merges them.
    pub fn read_states(&self) -> Result<Vec<EntityStateRecord>, SourceError> {
        let conn = self.open()?;
        let to_err = |e: rusqlite::Error| SourceError::format(self.label(), e);
        let schema = detect_schema(&conn).map_err(to_err)?;

        let records = match schema {
            SnapshotSchema::Legacy => {
                let window = format!("-{} hours", self.lookback_hours);
                query_states(&conn, LEGACY_STATES_QUERY, window)
            }
            SnapshotSchema::Current => {
                let seconds = i64::from(self.lookback_hours) * 3600;
                query_states(&conn, CURRENT_STATES_QUERY, seconds)
            }
        }
        .map_err(to_err)?;

        tracing::debug!(
            path = %self.path.display(),
            ?schema,
            rows = records.len(),
            lookback_hours = self.lookback_hours,
            "read state snapshot"
        );
        Ok(records)
    }

    /// Rows of the `devices` table. A database without one yields nothing.
    pub fn read_devices(&self) -> Result<Vec<DeviceRecord>, SourceError> {
        let conn = self.open()?;
        let to_err = |e: rusqlite::Error| SourceError::format(self.label(), e);

        let columns = table_columns(&conn, "devices").map_err(to_err)?;
        if columns.is_empty() {
            tracing::debug!(path = %self.path.display(), "no devices table");
            return Ok(Vec::new());
        }
        let pick = |name: &str| {
            if columns.iter().any(|c| c == name) {
                name.to_owned()
            } else {
                "NULL".to_owned()
            }
        };
        let sql = format!(
            "SELECT id, {}, {}, {}, {}, {} FROM devices ORDER BY id",
            pick("name_by_user"),
            pick("name"),
            pick("area_id"),
            pick("model"),
            pick("manufacturer"),
        );

        let mut stmt = conn.prepare(&sql).map_err(to_err)?;
        let devices = stmt
            .query_map([], device_row)
            .map_err(to_err)?
            .filter_map(|row| skip_bad_row(row, "devices"))
            .collect::<Vec<_>>();

        tracing::debug!(path = %self.path.display(), rows = devices.len(), "read device table");
        Ok(devices)
    }
}

fn detect_schema(conn: &Connection) -> rusqlite::Result<SnapshotSchema> {
    if !table_columns(conn, "states_meta")?.is_empty() {
        return Ok(SnapshotSchema::Current);
    }
    let states = table_columns(conn, "states")?;
    if states.iter().any(|c| c == "entity_id") {
        Ok(SnapshotSchema::Legacy)
    } else {
        Err(rusqlite::Error::InvalidColumnName(
            "states.entity_id or states_meta".to_owned(),
        ))
    }
}

/// Column names of a table, empty when the table does not exist.
fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Ok(Vec::new());
    }
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn query_states(
    conn: &Connection,
    sql: &str,
    window: impl rusqlite::ToSql,
) -> rusqlite::Result<Vec<EntityStateRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let records = stmt
        .query_map([window], |row| {
            Ok(EntityStateRecord::new(
                text_column(row, 0)?.unwrap_or_default(),
                text_column(row, 1)?.unwrap_or_default(),
                parse_attributes(text_column(row, 2)?),
            ))
        })?
        .filter_map(|row| skip_bad_row(row, "states"))
        .collect();
    Ok(records)
}

/// A column read as text whatever its storage class. NULL is `None`; an
/// empty id is left for the normalizer to reject.
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get::<_, SqlValue>(idx)? {
        SqlValue::Null => None,
        SqlValue::Integer(n) => Some(n.to_string()),
        SqlValue::Real(f) => Some(f.to_string()),
        SqlValue::Text(text) => Some(text),
        SqlValue::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    })
}

fn skip_bad_row<T>(row: rusqlite::Result<T>, table: &str) -> Option<T> {
    row.map_err(|e| tracing::warn!(table, error = %e, "skipping undecodable row"))
        .ok()
}

/// Unparsable JSON is passed on as a string so the normalizer flags it.
fn parse_attributes(raw: Option<String>) -> Value {
    match raw {
        None => Value::Null,
        Some(text) if text.trim().is_empty() => Value::Null,
        Some(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
    }
}

fn device_row(row: &Row<'_>) -> rusqlite::Result<DeviceRecord> {
    let name_by_user = text_column(row, 1)?;
    let name = text_column(row, 2)?;
    Ok(DeviceRecord {
        device_id: text_column(row, 0)?.unwrap_or_default(),
        name: name_by_user.filter(|n| !n.trim().is_empty()).or(name),
        area_id: text_column(row, 3)?,
        model: text_column(row, 4)?,
        manufacturer: text_column(row, 5)?,
    })
}

// ── Record sources ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StateSnapshot(SnapshotDatabase);

impl RecordSource for StateSnapshot {
    type Record = EntityStateRecord;

    fn tag(&self) -> SourceTag {
        SourceTag::SnapshotState
    }

    fn describe(&self) -> String {
        format!("states in {}", self.0.path.display())
    }

    fn read(&self) -> Result<Vec<EntityStateRecord>, SourceError> {
        self.0.read_states()
    }
}

#[derive(Debug, Clone)]
pub struct DeviceTable(SnapshotDatabase);

impl RecordSource for DeviceTable {
    type Record = DeviceRecord;

    fn tag(&self) -> SourceTag {
        SourceTag::DeviceTable
    }

    fn describe(&self) -> String {
        format!("devices in {}", self.0.path.display())
    }

    fn read(&self) -> Result<Vec<DeviceRecord>, SourceError> {
        self.0.read_devices()
    }
}
