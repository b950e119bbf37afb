//! Atomic named-sequence store.
//!
//! A counter is a single persisted row keyed by name. Advancing it is one
//! storage command (upsert + increment + returning), so two concurrent
//! callers can never be handed the same value.

use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};
use thiserror::Error;
use tracing::instrument;

/// Sequence feeding employee business identifiers (`EMP-<n>`).
pub const EMPLOYEE_ID_SEQUENCE: &str = "employeeId";

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("failed to advance counter {name:?}: {source}")]
    Increment {
        name: String,
        #[source]
        source: DbErr,
    },
    #[error("counter {name:?} increment returned no row")]
    MissingRow { name: String },
}

impl CounterError {
    pub fn name(&self) -> &str {
        match self {
            CounterError::Increment { name, .. } | CounterError::MissingRow { name } => name,
        }
    }
}

/// Find-or-create the counter row for `name`, advance it by one and return
/// the new value. The first call for a name returns 1.
#[instrument(name = "counter.increment_and_get", skip(db))]
pub async fn increment_and_get<C>(db: &C, name: &str) -> Result<i64, CounterError>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let sql = match backend {
        DatabaseBackend::Postgres => {
            "INSERT INTO counter (name, seq) VALUES ($1, 1) \
             ON CONFLICT (name) DO UPDATE SET seq = counter.seq + 1 \
             RETURNING seq"
        }
        _ => {
            "INSERT INTO counter (name, seq) VALUES (?, 1) \
             ON CONFLICT (name) DO UPDATE SET seq = counter.seq + 1 \
             RETURNING seq"
        }
    };
    let stmt = Statement::from_sql_and_values(backend, sql, [name.into()]);
    let row = db
        .query_one(stmt)
        .await
        .map_err(|source| CounterError::Increment {
            name: name.to_string(),
            source,
        })?
        .ok_or_else(|| CounterError::MissingRow {
            name: name.to_string(),
        })?;
    row.try_get::<i64>("", "seq")
        .map_err(|source| CounterError::Increment {
            name: name.to_string(),
            source,
        })
}
