use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{ApiError, AppState, Result};
use crate::core::{User, UserId, UserPayload};

pub const INVALID_ID_MESSAGE: &str = "Invalid ID";
pub const INVALID_PAYLOAD_MESSAGE: &str = "Invalid request payload";

/// Raw query pairs. Never rejects: a repeated `id` keeps its first value and
/// anything unparsable is left for `parse_id` to refuse.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct IdQuery(Vec<(String, String)>);

impl IdQuery {
    pub fn id(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct DeleteBody {
    id: UserId,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub users: usize,
}

pub async fn healthcheck(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        users: state.store.len().await,
    })
}

pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.store.list_all().await)
}

pub async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<User>> {
    let id = parse_id(query.id())?;
    let user = state.store.get(id).await?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<User>)> {
    let payload: UserPayload = decode_payload(&body)?;
    let user = state.store.create(payload).await?;
    tracing::info!(id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Result<Json<User>> {
    let payload: UserPayload = decode_payload(&body)?;
    let id = parse_id(query.id())?;
    let user = state.store.update(id, payload).await?;
    Ok(Json(user))
}

/// The id comes from `?id=` when present, otherwise from a `{"id": ..}` body.
pub async fn delete_user(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Result<StatusCode> {
    let id = match query.id() {
        Some(raw) => parse_id(Some(raw))?,
        None => decode_payload::<DeleteBody>(&body)?.id,
    };
    state.store.delete(id).await?;
    tracing::info!(id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub fn parse_id(raw: Option<&str>) -> Result<UserId> {
    raw.and_then(|value| value.parse::<UserId>().ok())
        .ok_or_else(|| ApiError::input(INVALID_ID_MESSAGE))
}

fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "rejected request payload");
        ApiError::input(INVALID_PAYLOAD_MESSAGE)
    })
}
