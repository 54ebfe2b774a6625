//! Live table routes. Session calls carry the ticket from login.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::TableAction;
use crate::error::AppError;
use crate::extractors::{AuthToken, SessionTicket, ValidatedJson};
use crate::services::LoginOutcome;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    name: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    ticket: Option<String>,
    auth_required: bool,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    version: u64,
}

#[derive(Debug, Serialize)]
struct AcceptedResponse {
    accepted: bool,
}

#[derive(Debug, Deserialize)]
struct PollQuery {
    version: u64,
}

/// POST /api/table/login
///
/// Under an active reservation, a login without a bearer token answers
/// `auth_required: true` instead of a ticket.
async fn login(
    body: ValidatedJson<LoginRequest>,
    token: Option<AuthToken>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let outcome = app_state
        .engine
        .login(&body.name, token.as_ref().map(|t| t.token.as_str()))
        .await?;
    let response = match outcome {
        LoginOutcome::Ticket(ticket) => LoginResponse {
            ticket: Some(ticket.to_string()),
            auth_required: false,
        },
        LoginOutcome::AuthRequired => LoginResponse {
            ticket: None,
            auth_required: true,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

async fn logout(
    ticket: SessionTicket,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.engine.logout(&ticket.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn reset(
    ticket: SessionTicket,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.engine.reset(&ticket.0).await?;
    info!("table reset over HTTP");
    Ok(HttpResponse::NoContent().finish())
}

async fn state(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(VersionResponse {
        version: app_state.engine.state(),
    }))
}

/// GET /api/table/state/poll?version=N
///
/// Blocks until the table version differs from `N` or the long-poll timeout
/// elapses; 503 with `Retry-After` when too many clients are waiting.
async fn poll_state(
    query: web::Query<PollQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let version = app_state.engine.long_poll(query.version).await?;
    Ok(HttpResponse::Ok().json(VersionResponse { version }))
}

/// GET /api/table/model
///
/// Without a ticket the caller sees the table as a spectator.
async fn model(
    ticket: Option<SessionTicket>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let view = app_state.engine.model(ticket.as_ref().map(|t| &t.0))?;
    Ok(HttpResponse::Ok().json(view))
}

/// POST /api/table/action
///
/// Illegal actions are not errors: they answer `accepted: false`.
async fn action(
    ticket: SessionTicket,
    body: ValidatedJson<TableAction>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let accepted = app_state.engine.act(&ticket.0, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AcceptedResponse { accepted }))
}

async fn start(
    ticket: SessionTicket,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let accepted = app_state.engine.start_new_round(&ticket.0).await?;
    Ok(HttpResponse::Ok().json(AcceptedResponse { accepted }))
}

async fn add_computer_player(
    ticket: SessionTicket,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let name = app_state.engine.add_computer_player(&ticket.0)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "name": name })))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login))
        .route("/logout", web::post().to(logout))
        .route("/reset", web::post().to(reset))
        .route("/state", web::get().to(state))
        .route("/state/poll", web::get().to(poll_state))
        .route("/model", web::get().to(model))
        .route("/action", web::post().to(action))
        .route("/start", web::post().to(start))
        .route("/computer-player", web::post().to(add_computer_player));
}
