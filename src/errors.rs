use sea_orm::error::DbErr;
use sea_orm::{sqlx, RuntimeErr, SqlErr};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Deletion refused because other rows still reference the target.
    #[error("Cannot delete {entity} {id}: it is still referenced ({detail})")]
    Protected {
        entity: &'static str,
        id: Uuid,
        detail: String,
    },

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Classifies an insert/update failure.
    ///
    /// Unique violations become [`ServiceError::Conflict`], foreign-key violations become
    /// [`ServiceError::InvalidReference`]; anything else stays a database error.
    pub fn from_write(err: DbErr, entity: &'static str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                warn!(entity, %detail, "write rejected by unique constraint");
                ServiceError::Conflict(format!("{} already exists ({})", entity, detail))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                warn!(entity, %detail, "write rejected by foreign key");
                ServiceError::InvalidReference(format!(
                    "{} points at a missing row ({})",
                    entity, detail
                ))
            }
            _ => ServiceError::DatabaseError(err),
        }
    }

    /// Classifies a delete failure. Foreign-key violations mean a protective
    /// relationship still holds a reference to the row.
    pub fn from_delete(err: DbErr, entity: &'static str, id: Uuid) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                warn!(entity, %id, %detail, "delete rejected by protective foreign key");
                ServiceError::Protected { entity, id, detail }
            }
            _ => match sqlite_restrict_violation(&err) {
                Some(detail) => {
                    warn!(entity, %id, %detail, "delete rejected by restricting foreign key");
                    ServiceError::Protected { entity, id, detail }
                }
                None => ServiceError::DatabaseError(err),
            },
        }
    }

    pub fn not_found(entity: &str, id: Uuid) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    /// True when the operation was refused for a reason the administrative caller can
    /// act on, as opposed to an infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Self::DatabaseError(_) | Self::MigrationError(_) | Self::Other(_)
        )
    }

    /// Message suitable for showing to staff. Infrastructure failures are summarized.
    pub fn reason(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::MigrationError(_) | Self::Other(_) => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// SQLite reports an `ON DELETE RESTRICT` violation as SQLITE_CONSTRAINT_TRIGGER
/// (1811) rather than SQLITE_CONSTRAINT_FOREIGNKEY (787), which `DbErr::sql_err`
/// does not classify.
fn sqlite_restrict_violation(err: &DbErr) -> Option<String> {
    let (DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e)))) = err
    else {
        return None;
    };
    let restrict = e.code().as_deref() == Some("1811")
        && e.message().contains("FOREIGN KEY constraint failed");
    restrict.then(|| e.message().to_string())
}

pub type AppError = ServiceError;

// Result extensions for easier error handling
pub trait ResultExt<T> {
    fn map_err_to_service(self) -> Result<T, ServiceError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<ServiceError>,
{
    fn map_err_to_service(self) -> Result<T, ServiceError> {
        self.map_err(|e| e.into())
    }
}
