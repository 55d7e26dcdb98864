//! PostgreSQL repository implementations.

pub mod file;
pub mod folder;
pub mod share;
pub mod tenant;
pub mod trash;

use sqlx::PgPool;

use cloudtree_core::error::{AppError, ErrorKind};

pub use tenant::PgTenantRepository;

/// Tree repository backed by the `folders`, `files`, `trash_records`, and
/// `share_records` tables.
#[derive(Debug, Clone)]
pub struct PgTreeRepository {
    pool: PgPool,
}

impl PgTreeRepository {
    /// Create a new tree repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a failed write to the error taxonomy: unique violations become
/// `AlreadyExists`, foreign-key violations `NotFound`, check violations
/// `NotAllowed`.
pub(crate) fn map_write_error(err: sqlx::Error, context: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::already_exists(format!("{context}: a record with that name already exists"))
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::not_found(format!("{context}: referenced tenant or parent does not exist"))
        }
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
            AppError::not_allowed(format!("{context}: {}", db_err.message()))
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), err),
    }
}

/// Map a failed read.
pub(crate) fn map_read_error(err: sqlx::Error, context: &str) -> AppError {
    AppError::with_source(ErrorKind::Database, context.to_string(), err)
}
