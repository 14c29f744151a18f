use thiserror::Error;

use crate::context::local_store::StoreError;
use crate::db::rest_client::BackendError;
use crate::services::auth::AuthError;
use crate::services::smtp_mailer::MailError;
use crate::services::storage::StorageError;

/// How the UI should surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Generic toast.
    Backend,
    /// Shown inline next to the offending field.
    Validation,
    /// Terminal state or toast, never propagated further.
    Authorization,
    /// Rendered as an empty state.
    NotFound,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error("{0}")]
    Validation(String),
    #[error("organization is locked")]
    Locked,
    #[error("incorrect passcode")]
    WrongPasscode,
    #[error("not signed in")]
    NotSignedIn,
    #[error("no organization selected")]
    NoOrganization,
    #[error("no festival selected")]
    NoFestival,
    #[error("{0} not found")]
    NotFound(String),
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Validation(_) | AppError::Auth(AuthError::InvalidEmail(_)) => {
                ErrorCategory::Validation
            }
            AppError::Storage(StorageError::InvalidFileName(_)) => ErrorCategory::Validation,
            AppError::Locked | AppError::WrongPasscode | AppError::NotSignedIn => {
                ErrorCategory::Authorization
            }
            AppError::Backend(err) if err.is_auth_error() => ErrorCategory::Authorization,
            AppError::NotFound(_) | AppError::NoOrganization | AppError::NoFestival => {
                ErrorCategory::NotFound
            }
            AppError::Backend(err) if err.is_not_found() => ErrorCategory::NotFound,
            _ => ErrorCategory::Backend,
        }
    }

    /// Text for the toast or inline message. Backend details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Auth(AuthError::InvalidEmail(_)) => {
                "Please enter a valid email address".to_string()
            }
            AppError::Storage(StorageError::InvalidFileName(_)) => {
                "Please choose a JPG, PNG, GIF or WebP image".to_string()
            }
            AppError::Locked => "Enter the organization passcode to make changes".to_string(),
            AppError::WrongPasscode => "Incorrect passcode".to_string(),
            AppError::NotSignedIn => "Please sign in to continue".to_string(),
            AppError::NoOrganization => "Select an organization first".to_string(),
            AppError::NoFestival => "Select a festival first".to_string(),
            AppError::NotFound(what) => format!("{what} not found"),
            other => match other.category() {
                ErrorCategory::Authorization => {
                    "You do not have permission to do that".to_string()
                }
                ErrorCategory::NotFound => "Nothing found".to_string(),
                _ => "Something went wrong. Please try again.".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn api(status: StatusCode) -> AppError {
        AppError::Backend(BackendError::Api {
            status,
            message: "row level security".into(),
            code: Some("42501".into()),
        })
    }

    #[test]
    fn backend_failures_become_generic_toasts() {
        let err = api(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.category(), ErrorCategory::Backend);
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
        assert!(!err.user_message().contains("row level"));
    }

    #[test]
    fn categories_follow_the_failure_kind() {
        assert_eq!(api(StatusCode::FORBIDDEN).category(), ErrorCategory::Authorization);
        assert_eq!(api(StatusCode::NOT_FOUND).category(), ErrorCategory::NotFound);
        assert_eq!(AppError::WrongPasscode.category(), ErrorCategory::Authorization);
        assert_eq!(
            AppError::Auth(AuthError::InvalidEmail("x".into())).category(),
            ErrorCategory::Validation
        );
        assert_eq!(AppError::NoFestival.category(), ErrorCategory::NotFound);
    }
}
