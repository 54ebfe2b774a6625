//! Reservation routes. Creating and deleting need a bearer token.

use actix_web::{web, HttpResponse};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{AuthToken, ValidatedJson};
use crate::services::{NewReservation, User};
use crate::state::app_state::AppState;

async fn resolve_user(app_state: &AppState, token: &AuthToken) -> Result<User, AppError> {
    app_state
        .identity
        .resolve_token(&token.token)
        .await
        .ok_or_else(AppError::unauthorized)
}

async fn list(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let reservations = app_state
        .reservations
        .list(OffsetDateTime::now_utc())
        .await?;
    Ok(HttpResponse::Ok().json(reservations))
}

async fn create(
    token: AuthToken,
    body: ValidatedJson<NewReservation>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = resolve_user(&app_state, &token).await?;
    let reservation = app_state
        .reservations
        .create(&user, body.into_inner(), OffsetDateTime::now_utc())
        .await?;
    Ok(HttpResponse::Created().json(reservation))
}

async fn delete(
    token: AuthToken,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = Uuid::parse_str(&path.into_inner()).map_err(|_| {
        AppError::not_found(ErrorCode::ReservationNotFound, "no such reservation")
    })?;
    let user = resolve_user(&app_state, &token).await?;
    app_state.reservations.delete(&user, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list))
        .route("", web::post().to(create))
        .route("/{id}", web::delete().to(delete));
}
