//! REST API layer: route handlers, DTOs, router composition and the
//! OpenAPI document.
//!
//! Raffle endpoints are mounted under `/api/v1`; `/health` sits at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "connpass-raffle", description = "Raffle drawing over a connpass participant export"),
    paths(
        handlers::raffle::get_raffle,
        handlers::raffle::list_participants,
        handlers::raffle::list_winners,
        handlers::raffle::list_prizes,
        handlers::raffle::draw,
        handlers::raffle::remove_winner,
        handlers::raffle::reload,
        handlers::system::health_handler,
    ),
    tags(
        (name = "Raffle", description = "Draw pool, winners and prizes"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
