//! SQLite-backed reading store
//!
//! A dedicated worker thread owns the connection; async callers hand it
//! closures and await the reply on a oneshot channel.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::oneshot;

use super::migrations::run_migrations;
use super::ReadingStore;
use crate::config::SQLITE_IN_MEMORY;
use crate::reading::{PressureMap, Reading};
use crate::SeatError;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct WorkerHandle {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                tracing::error!("Failed to send shutdown to database thread: {}", err);
            }
            if handle.join().is_err() {
                tracing::error!("Database thread panicked");
            }
        }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT timestamp, pressure_reading, is_zero_pressure FROM sensor_readings";

type RawRow = (String, String, bool);

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> crate::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            SeatError::Persistence(format!("invalid stored timestamp {value:?}: {err}"))
        })
}

fn row_to_reading(row: RawRow) -> crate::Result<Reading> {
    let (timestamp, pressure_json, is_zero_pressure) = row;
    let pressure_reading: PressureMap = serde_json::from_str(&pressure_json).map_err(|err| {
        SeatError::Persistence(format!("invalid stored pressure reading: {err}"))
    })?;
    Ok(Reading::new(
        parse_timestamp(&timestamp)?,
        pressure_reading,
        is_zero_pressure,
    ))
}

fn insert_row(conn: &Connection, reading: &Reading) -> crate::Result<()> {
    let pressure_json = serde_json::to_string(&reading.pressure_reading)?;
    conn.execute(
        "INSERT INTO sensor_readings (timestamp, pressure_reading, is_zero_pressure)
         VALUES (?1, ?2, ?3)",
        params![
            format_timestamp(&reading.timestamp),
            pressure_json,
            reading.is_zero_pressure,
        ],
    )?;
    Ok(())
}

fn query_one(conn: &Connection, order: &str) -> crate::Result<Option<Reading>> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY timestamp {order} LIMIT 1");
    let row: Option<RawRow> = conn
        .query_row(&sql, [], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .optional()?;
    row.map(row_to_reading).transpose()
}

/// Durable store persisting readings in a SQLite database
#[derive(Clone)]
pub struct SqliteStore {
    inner: Arc<WorkerHandle>,
    db_path: Arc<PathBuf>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path` and run migrations
    pub fn open(db_path: PathBuf) -> crate::Result<Self> {
        let in_memory = db_path.as_os_str() == SQLITE_IN_MEMORY;
        if !in_memory {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SeatError::Persistence(format!(
                        "failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<crate::Result<()>>();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("seat-tracker-db".into())
            .spawn(move || {
                let opened = if in_memory {
                    Connection::open_in_memory()
                } else {
                    Connection::open(&path_for_thread)
                };
                let mut conn = match opened {
                    Ok(connection) => connection,
                    Err(err) => {
                        let failure = SeatError::Persistence(format!(
                            "failed to open SQLite database: {err}"
                        ));
                        if ready_tx.send(Err(failure)).is_err() {
                            tracing::error!(
                                "Database initialization receiver dropped before open failure was reported"
                            );
                        }
                        return;
                    }
                };

                if !in_memory {
                    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                        tracing::warn!("Failed to enable WAL mode: {}", err);
                    }
                }

                if ready_tx.send(run_migrations(&mut conn)).is_err() {
                    tracing::error!(
                        "Database initialization receiver dropped before ready signal"
                    );
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => task(&mut conn),
                        DbCommand::Shutdown => break,
                    }
                }

                tracing::debug!("Database thread shutting down");
            })
            .map_err(|e| {
                SeatError::Persistence(format!("failed to spawn database worker thread: {e}"))
            })?;

        let init = ready_rx.recv().map_err(|_| {
            SeatError::Persistence("database worker exited before signaling readiness".to_string())
        })?;
        let inner = Arc::new(WorkerHandle {
            sender: command_tx,
            worker: Mutex::new(Some(worker)),
        });
        // Dropping `inner` on failure shuts the worker down.
        init?;

        tracing::info!("Database initialized at {}", db_path.display());

        Ok(Self {
            inner,
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    async fn execute<F, T>(&self, task: F) -> crate::Result<T>
    where
        F: FnOnce(&mut Connection) -> crate::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            if reply_tx.send(task(conn)).is_err() {
                tracing::warn!("Database caller dropped before receiving result");
            }
        }));

        self.inner.sender.send(command).map_err(|err| {
            SeatError::Persistence(format!("failed to send command to database thread: {err}"))
        })?;

        reply_rx.await.map_err(|_| {
            SeatError::Persistence("database thread terminated unexpectedly".to_string())
        })?
    }
}

#[async_trait]
impl ReadingStore for SqliteStore {
    async fn insert(&self, reading: &Reading) -> crate::Result<()> {
        let record = reading.clone();
        self.execute(move |conn| insert_row(conn, &record)).await
    }

    async fn clear(&self) -> crate::Result<()> {
        self.execute(|conn| {
            conn.execute("DELETE FROM sensor_readings", [])?;
            Ok(())
        })
        .await
    }

    async fn replace_all(&self, reading: &Reading) -> crate::Result<()> {
        let record = reading.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM sensor_readings", [])?;
            insert_row(&tx, &record)?;
            tx.commit()?;
            tracing::debug!("Replaced {} stored readings", removed);
            Ok(())
        })
        .await
    }

    async fn latest(&self) -> crate::Result<Option<Reading>> {
        self.execute(|conn| query_one(conn, "DESC")).await
    }

    async fn earliest(&self) -> crate::Result<Option<Reading>> {
        self.execute(|conn| query_one(conn, "ASC")).await
    }

    async fn count(&self) -> crate::Result<usize> {
        self.execute(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM sensor_readings", [], |row| row.get(0))?;
            usize::try_from(count)
                .map_err(|_| SeatError::Persistence(format!("invalid row count {count}")))
        })
        .await
    }
}
