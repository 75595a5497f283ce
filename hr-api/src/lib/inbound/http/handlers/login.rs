use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

/// `POST /v1/login`
///
/// Unknown users, store failures and wrong passwords all answer 401 with the
/// same body.
pub async fn login<S: UserServicePort>(
    State(state): State<AppState<S>>,
    body: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "rejected login body");
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    state
        .user_service
        .login(body.into())
        .await
        .map_err(ApiError::from)
        .map(|ref outcome| ApiSuccess::new(StatusCode::OK, outcome.into()))
}

#[derive(Clone, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}

impl From<LoginRequestBody> for LoginCommand {
    fn from(body: LoginRequestBody) -> Self {
        LoginCommand::new(body.username, body.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    pub id: String,
}

impl From<&LoginOutcome> for LoginResponseData {
    fn from(outcome: &LoginOutcome) -> Self {
        Self {
            token: outcome.token.clone(),
            id: outcome.user_id.to_string(),
        }
    }
}
