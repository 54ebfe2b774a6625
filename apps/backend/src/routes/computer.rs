//! Computer-game routes. The client holds the whole game in `state` and
//! sends it back with every call.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::TableAction;
use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct NewGameRequest {
    player_name: String,
}

#[derive(Debug, Deserialize)]
struct StateRequest {
    player_name: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    player_name: String,
    state: String,
    action: TableAction,
}

async fn new_game(
    body: ValidatedJson<NewGameRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let res = app_state.computer.new_game(&body.player_name)?;
    Ok(HttpResponse::Ok().json(res))
}

async fn action(
    body: ValidatedJson<ActionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ActionRequest {
        player_name,
        state,
        action,
    } = body.into_inner();
    let res = app_state.computer.act(&player_name, &state, action)?;
    Ok(HttpResponse::Ok().json(res))
}

async fn model(
    body: ValidatedJson<StateRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let res = app_state.computer.model(&body.player_name, &body.state)?;
    Ok(HttpResponse::Ok().json(res))
}

async fn next_round(
    body: ValidatedJson<StateRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let res = app_state
        .computer
        .start_next_round(&body.player_name, &body.state)?;
    Ok(HttpResponse::Ok().json(res))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/new", web::post().to(new_game))
        .route("/action", web::post().to(action))
        .route("/model", web::post().to(model))
        .route("/next-round", web::post().to(next_round));
}
