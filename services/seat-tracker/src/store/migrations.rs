use rusqlite::{Connection, Transaction};

use crate::SeatError;

const CURRENT_SCHEMA_VERSION: i32 = 1;

fn context(what: &str) -> impl FnOnce(rusqlite::Error) -> SeatError + '_ {
    move |err| SeatError::Persistence(format!("{what}: {err}"))
}

pub fn run_migrations(conn: &mut Connection) -> crate::Result<()> {
    let mut version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(context("failed to read user_version pragma"))?;

    if version > CURRENT_SCHEMA_VERSION {
        return Err(SeatError::Persistence(format!(
            "database version ({}) is newer than supported schema ({})",
            version, CURRENT_SCHEMA_VERSION
        )));
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .map_err(context("failed to open migration transaction"))?;

    while version < CURRENT_SCHEMA_VERSION {
        let next_version = version + 1;
        apply_migration(&tx, next_version)?;
        tracing::debug!("Applied schema migration {}", next_version);
        version = next_version;
    }

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .map_err(context("failed to update user_version pragma"))?;
    tx.commit()
        .map_err(context("failed to commit migrations"))?;

    Ok(())
}

fn apply_migration(tx: &Transaction<'_>, version: i32) -> crate::Result<()> {
    match version {
        1 => tx
            .execute_batch(include_str!("schemas/schema_v1.sql"))
            .map_err(context("failed to execute schema_v1.sql")),
        other => Err(SeatError::Persistence(format!(
            "no migration defined for schema version {other}"
        ))),
    }
}
