use fleet_core::entity::EntityKind;
use fleet_core::error::CoreError;
use fleet_core::lifecycle::LifecycleError;
use fleet_core::types::DbId;

/// Error returned by every service operation.
///
/// [`CoreError`] carries the domain taxonomy; [`sqlx::Error`] is the opaque
/// infrastructure failure and is passed through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// `true` for rule violations, `false` for storage failures.
    pub fn is_domain(&self) -> bool {
        matches!(self, ServiceError::Core(_))
    }

    pub fn core(&self) -> Option<&CoreError> {
        match self {
            ServiceError::Core(core) => Some(core),
            ServiceError::Database(_) => None,
        }
    }
}

impl From<LifecycleError<sqlx::Error>> for ServiceError {
    fn from(err: LifecycleError<sqlx::Error>) -> Self {
        match err {
            LifecycleError::Core(core) => ServiceError::Core(core),
            LifecycleError::Store(db) => ServiceError::Database(db),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Core(CoreError::Validation(errors.to_string()))
    }
}

pub(crate) fn not_found(kind: EntityKind, id: DbId) -> ServiceError {
    ServiceError::Core(CoreError::NotFound {
        entity: kind.label(),
        id,
    })
}

pub(crate) fn duplicate(kind: EntityKind, field: &'static str, value: &str) -> ServiceError {
    ServiceError::Core(CoreError::DuplicateKey {
        entity: kind.label(),
        field,
        value: value.to_string(),
    })
}

pub(crate) fn invalid(message: impl Into<String>) -> ServiceError {
    ServiceError::Core(CoreError::Validation(message.into()))
}

/// Map a write error, turning a partial unique index violation (a writer that
/// raced past the pre-check) into `DuplicateKey`.
pub(crate) fn unique_violation(
    err: sqlx::Error,
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> ServiceError {
    if let sqlx::Error::Database(db_err) = &err {
        let is_unique = db_err.code().as_deref() == Some("23505");
        if is_unique && db_err.constraint().is_some_and(|c| c.starts_with("uq_")) {
            return duplicate(kind, field, value);
        }
    }
    ServiceError::Database(err)
}
