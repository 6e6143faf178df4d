use anyhow::Result;
use diesel::{
    Connection, PgConnection,
    connection::CacheSize,
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool, PooledConnection},
    result::{DatabaseErrorKind, Error as DieselError},
};

use crate::domain::errors::StoreError;

#[derive(Debug, Default)]
struct DisablePreparedStatements;

impl CustomizeConnection<PgConnection, R2d2Error> for DisablePreparedStatements {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        Ok(())
    }
}

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub fn establish_connection(database_url: &str) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(DisablePreparedStatements))
        .build(manager)?;
    Ok(pool)
}

/// Checks a connection out of the pool. Pool exhaustion and refused
/// connections surface as `StoreError::Unavailable`.
pub fn checkout(pool: &PgPoolSquad) -> Result<PgPooledConnection> {
    pool.get()
        .map_err(|err| StoreError::Unavailable(err.to_string()).into())
}

/// Tags the diesel failures the use cases react to.
pub fn classify_diesel_error(err: DieselError) -> anyhow::Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let constraint = info.constraint_name().unwrap_or(info.message());
            StoreError::Conflict(constraint.to_string()).into()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            StoreError::Unavailable(info.message().to_string()).into()
        }
        other => anyhow::Error::new(other),
    }
}
