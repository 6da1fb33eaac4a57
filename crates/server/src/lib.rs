use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use auth::{AuthConfig, AuthError};
pub use login_attempts::{InMemoryLoginAttempts, LoginAttemptStore};
pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod accounts;
mod auth;
mod budget;
mod contact;
mod login_attempts;
mod server;
mod transactions;
mod user;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{AuthResponse, LoginRequest, ProfileUpdate, UserView};
    }

    pub mod account {
        pub use api_types::account::{
            AccountDetailResponse, AccountKind, AccountListResponse, AccountNew, AccountUpdate,
            AccountView,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            BulkDelete, BulkDeleteResponse, Pagination, RecurringFilter, RecurringInterval,
            SortDirection, SortField, TransactionKind, TransactionListQuery,
            TransactionListResponse, TransactionNew, TransactionUpdate, TransactionView,
        };
    }

    pub mod budget {
        pub use api_types::budget::{BudgetProgressResponse, BudgetSet, BudgetView};
    }

    pub mod contact {
        pub use api_types::contact::{ContactNew, ContactView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Auth(AuthError),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_) | EngineError::InvalidInput(_) | EngineError::InvalidId(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn status_for_auth_error(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::Locked(_) => StatusCode::TOO_MANY_REQUESTS,
        AuthError::TokenCreation | AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Auth(err) => (status_for_auth_error(&err), err.to_string()),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use http_body_util::BodyExt;
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidInput("x".to_string()),
            EngineError::InvalidId("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn database_error_is_hidden() {
        let err = EngineError::Database(DbErr::Custom("disk on fire".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal server error");
    }

    #[test]
    fn auth_errors_map_to_401_and_429() {
        let res = ServerError::from(AuthError::Unauthorized).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = ServerError::from(AuthError::Locked(Utc::now())).into_response();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
