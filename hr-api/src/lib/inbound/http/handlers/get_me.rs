use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::RequestIdentity;
use crate::inbound::http::router::AppState;

/// `GET /v1/me`
///
/// Reads the `id` claim left by the authentication middleware and returns
/// that user's profile.
pub async fn get_me<S: UserServicePort>(
    State(state): State<AppState<S>>,
    identity: Option<Extension<RequestIdentity>>,
) -> Result<ApiSuccess<GetMeResponseData>, ApiError> {
    let Extension(RequestIdentity(claims)) =
        identity.ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    let user_id = UserId::from_string(claims.subject()).map_err(|e| {
        tracing::warn!(error = %e, "id claim is not a user id");
        ApiError::Unauthorized("Unauthorized".to_string())
    })?;

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetMeResponseData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
}

impl From<&User> for GetMeResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            username: user.username.as_str().to_string(),
        }
    }
}
