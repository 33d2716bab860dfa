use crate::command::{Command, parse_command};
use crate::errors::AppError;
use crate::format::build_card;
use crate::models::{
    CommandReply, CommandRequest, PerUserSnapshot, TallyRequest, TallyResponse, TotalsResponse,
    UserId,
};
use crate::state::{AppState, Persisted};
use axum::{
    Json,
    extract::{Path, Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use subtle::ConstantTimeEq;
use tracing::warn;

pub async fn health() -> &'static str {
    "ok"
}

/// Accepts `Authorization: Bot <token>` or `Bearer <token>`.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !token_matches(header, &state.token) {
        warn!("rejected {} {}: bad token", request.method(), request.uri().path());
        return Err(AppError::unauthorized());
    }
    Ok(next.run(request).await)
}

/// Constant-time comparison so response timing does not leak the token.
fn token_matches(header: Option<&str>, expected: &str) -> bool {
    let Some(presented) = header.and_then(|value| {
        value
            .strip_prefix("Bot ")
            .or_else(|| value.strip_prefix("Bearer "))
    }) else {
        return false;
    };
    presented.trim().as_bytes().ct_eq(expected.as_bytes()).into()
}

/// A chat message relayed by the gateway. Non-command messages get `204`.
pub async fn post_command(
    State(state): State<AppState>,
    Json(payload): Json<CommandRequest>,
) -> Result<Response, AppError> {
    let Some(parsed) = parse_command(&state.command_prefix, &payload.content) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let reply = match parsed {
        Ok(Command::Tally(amount)) => match state.record(payload.user_id, amount).await {
            Ok(outcome) => CommandReply::Card(respond(&payload.display_name, outcome)),
            Err(err) => CommandReply::Error {
                message: err.to_string(),
            },
        },
        Err(err) => CommandReply::Error {
            message: err.to_string(),
        },
    };

    Ok(Json(reply).into_response())
}

pub async fn post_tally(
    State(state): State<AppState>,
    Json(payload): Json<TallyRequest>,
) -> Result<Json<TallyResponse>, AppError> {
    let outcome = state.record(payload.user_id, payload.amount).await?;
    Ok(Json(respond(&payload.display_name, outcome)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Json<PerUserSnapshot> {
    Json(state.snapshot(user_id).await)
}

pub async fn get_totals(State(state): State<AppState>) -> Json<TotalsResponse> {
    let store = state.store.lock().await;
    Json(TotalsResponse {
        windows: store.totals(),
    })
}

fn respond(display_name: &str, outcome: Persisted<PerUserSnapshot>) -> TallyResponse {
    let warning = outcome.warning();
    TallyResponse {
        card: build_card(display_name, &outcome.value, Utc::now()),
        snapshot: outcome.value,
        warning,
    }
}
