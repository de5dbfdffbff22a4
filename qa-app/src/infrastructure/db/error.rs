use qa_errors::AppError;
use sea_orm::{sqlx, DbErr, RuntimeErr, SqlErr};

/// Postgres SQLSTATEs that mean "another writer got there first".
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";

pub(crate) fn map_db_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => return AppError::Conflict(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => return AppError::NotFound(msg),
        _ => {}
    }

    if let Some(mapped) = map_sqlstate(&err) {
        return mapped;
    }

    match err {
        DbErr::RecordNotFound(msg) => AppError::NotFound(msg),
        DbErr::RecordNotUpdated => AppError::Conflict("record was changed or removed".to_string()),
        other => {
            tracing::error!("Database error: {}", other);
            AppError::Internal(other.to_string())
        }
    }
}

fn map_sqlstate(err: &DbErr) -> Option<AppError> {
    let db_err = match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e))) => e,
        _ => return None,
    };
    let code = db_err.code()?;

    match code.as_ref() {
        UNIQUE_VIOLATION => Some(AppError::Conflict(db_err.message().to_string())),
        FOREIGN_KEY_VIOLATION => Some(AppError::NotFound(db_err.message().to_string())),
        SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE => {
            tracing::warn!("Transaction aborted by the database ({}): {}", code, db_err.message());
            Some(AppError::Conflict(db_err.message().to_string()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    #[derive(Debug)]
    struct PgFailure {
        code: &'static str,
        message: &'static str,
    }

    impl std::fmt::Display for PgFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for PgFailure {}

    impl DatabaseError for PgFailure {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.code {
                UNIQUE_VIOLATION => ErrorKind::UniqueViolation,
                FOREIGN_KEY_VIOLATION => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn exec_failure(code: &'static str, message: &'static str) -> DbErr {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(Box::new(
            PgFailure { code, message },
        ))))
    }

    fn query_failure(code: &'static str, message: &'static str) -> DbErr {
        DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(Box::new(
            PgFailure { code, message },
        ))))
    }

    #[test]
    fn test_mapping() {
        assert_eq!(
            map_db_err(DbErr::RecordNotFound("answer".into())),
            AppError::NotFound("answer".into())
        );
        assert!(matches!(
            map_db_err(DbErr::RecordNotUpdated),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            map_db_err(DbErr::Custom("boom".into())),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_transaction_aborts_are_conflicts() {
        for code in [SERIALIZATION_FAILURE, DEADLOCK_DETECTED, LOCK_NOT_AVAILABLE] {
            let mapped = map_db_err(exec_failure(
                code,
                "could not serialize access due to concurrent update",
            ));
            assert!(matches!(mapped, AppError::Conflict(_)), "{}: {:?}", code, mapped);
            assert!(mapped.is_retryable());
        }

        let mapped = map_db_err(query_failure(DEADLOCK_DETECTED, "deadlock detected"));
        assert_eq!(mapped, AppError::Conflict("deadlock detected".into()));
    }

    #[test]
    fn test_duplicate_vote_is_conflict() {
        let mapped = map_db_err(exec_failure(
            UNIQUE_VIOLATION,
            "duplicate key value violates unique constraint \"votes_user_id_answer_id_key\"",
        ));
        assert!(matches!(mapped, AppError::Conflict(_)));
        assert!(mapped.is_retryable());
    }

    #[test]
    fn test_missing_parent_is_not_found() {
        let mapped = map_db_err(exec_failure(
            FOREIGN_KEY_VIOLATION,
            "insert or update on table \"answers\" violates foreign key constraint",
        ));
        assert!(matches!(mapped, AppError::NotFound(_)));
    }

    #[test]
    fn test_other_database_errors_stay_internal() {
        let mapped = map_db_err(exec_failure("42P01", "relation \"votes\" does not exist"));
        assert!(matches!(mapped, AppError::Internal(_)));
    }
}
