use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::category::Category;
use crate::domain::trainer_data::{NewTrainerDataRow, TrainerDataChanges, TrainerDataRow};
use crate::domain::types::{RowId, TrainerId};

pub mod cache;
pub mod errors;
#[cfg(test)]
pub mod test;
pub mod trainer_data;

pub use cache::{CachedRepository, ListingCache};
pub use errors::{RepositoryError, RepositoryResult};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Repository stack shared by the HTTP handlers.
pub type AppRepository = CachedRepository<DieselRepository>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {};",
            BUSY_TIMEOUT.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Build a lazily-connecting pool for `database_url`.
///
/// No connection is opened up front. Each checkout is health-checked with a
/// trivial query and replaced transparently when the check fails.
pub fn establish_connection_pool(
    database_url: &str,
    max_size: u32,
) -> Result<DbPool, diesel::r2d2::PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .min_idle(Some(0))
        .test_on_check_out(true)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
}

/// Apply any migrations the database has not seen yet.
pub fn run_migrations(pool: &DbPool) -> RepositoryResult<()> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| RepositoryError::ConnectionError(format!("migrations failed: {e}")))?;
    Ok(())
}

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Run `op` on a pooled connection, retrying once on a fresh connection
    /// if the first one turns out to be dead.
    fn with_conn<T>(
        &self,
        mut op: impl FnMut(&mut SqliteConnection) -> QueryResult<T>,
    ) -> RepositoryResult<T> {
        let mut conn = self.conn()?;
        match op(&mut *conn) {
            Err(e) if is_connection_lost(&e) => {
                log::warn!("Store connection lost ({e}), reconnecting once");
                drop(conn);
                let mut conn = self.conn()?;
                Ok(op(&mut *conn)?)
            }
            result => Ok(result?),
        }
    }
}

fn is_connection_lost(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _
        ) | DieselError::BrokenTransactionManager
    )
}

/// Read-only operations over the category tables.
pub trait TrainerDataReader {
    /// Count the rows a trainer owns in one category.
    fn count_rows(&self, trainer_id: &TrainerId, category: Category) -> RepositoryResult<usize>;
    /// List a trainer's rows in one category, newest first.
    fn list_rows(
        &self,
        trainer_id: &TrainerId,
        category: Category,
    ) -> RepositoryResult<Vec<TrainerDataRow>>;
    /// Retrieve a row by its identifier.
    fn get_row(&self, category: Category, id: RowId) -> RepositoryResult<Option<TrainerDataRow>>;
}

/// Write operations over the category tables. Each call is one transaction.
pub trait TrainerDataWriter {
    /// Persist a new row and return its identifier.
    fn create_row(&self, row: &NewTrainerDataRow) -> RepositoryResult<RowId>;
    /// Apply a partial update; returns the number of affected rows.
    fn update_row(&self, changes: &TrainerDataChanges) -> RepositoryResult<usize>;
    /// Permanently delete a row; returns the number of affected rows.
    fn delete_row(&self, category: Category, id: RowId) -> RepositoryResult<usize>;
}

/// Control over cached listings, used by the manual refresh action.
pub trait ListingInvalidator {
    fn invalidate_listings(&self);
}
