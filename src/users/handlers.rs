use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    envelope::{Empty, Envelope},
    error::ApiError,
    state::AppState,
    users::{
        dto::{EmergencyNumber, LoginData, LoginRequest, RegisterRequest},
        extractors::ApiJson,
        services::{self, LOGGED_IN, REGISTERED},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/cadastro", post(register))
        .route("/login", post(login))
        .route("/user/:id", get(emergency_number))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<Empty>>), ApiError> {
    services::register(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(Envelope::done(REGISTERED))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<Envelope<LoginData>>, ApiError> {
    let user = services::login(state.users.as_ref(), payload).await?;
    Ok(Json(Envelope::ok(LOGGED_IN, LoginData { user })))
}

#[instrument(skip(state))]
pub async fn emergency_number(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<EmergencyNumber>>, ApiError> {
    let numero_emergencia = services::emergency_number(state.users.as_ref(), &id).await?;
    Ok(Json(Envelope::data(EmergencyNumber { numero_emergencia })))
}
