//! Raffle handlers: state, lists, draw, winner removal, reload.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{DrawResponse, ParticipantDto, ParticipantListResponse, PrizeListResponse};
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::{ErrorResponse, RaffleError};
use crate::service::{RaffleManager, RaffleSnapshot};

/// Runs `f` under the raffle lock on a thread that may block.
///
/// Mutations end in synced file writes, so the worker switches to blocking
/// duty while `f` runs. Requires the multi-threaded runtime.
async fn with_raffle_blocking<T>(
    state: &AppState,
    f: impl FnOnce(&mut RaffleManager) -> T,
) -> T {
    let mut raffle = state.raffle.lock().await;
    tokio::task::block_in_place(|| f(&mut raffle))
}

/// `GET /raffle` — Current raffle summary.
#[utoipa::path(
    get,
    path = "/api/v1/raffle",
    tag = "Raffle",
    summary = "Raffle summary",
    description = "Returns pool size, winner count, prize count and the winner ids in draw order.",
    responses(
        (status = 200, description = "Raffle summary", body = RaffleSnapshot),
    )
)]
pub async fn get_raffle(State(state): State<AppState>) -> impl IntoResponse {
    let raffle = state.raffle.lock().await;
    Json(raffle.snapshot())
}

/// `GET /participants` — Participants still eligible to be drawn.
#[utoipa::path(
    get,
    path = "/api/v1/participants",
    tag = "Raffle",
    summary = "List the draw pool",
    description = "Returns every participant still eligible to be drawn, in export order.",
    responses(
        (status = 200, description = "Draw pool", body = ParticipantListResponse),
    )
)]
pub async fn list_participants(State(state): State<AppState>) -> impl IntoResponse {
    let raffle = state.raffle.lock().await;
    Json(ParticipantListResponse::from_records(raffle.pool()))
}

/// `GET /winners` — Winners in draw order.
#[utoipa::path(
    get,
    path = "/api/v1/winners",
    tag = "Raffle",
    summary = "List winners",
    description = "Returns every winner drawn so far, first draw first.",
    responses(
        (status = 200, description = "Winner list", body = ParticipantListResponse),
    )
)]
pub async fn list_winners(State(state): State<AppState>) -> impl IntoResponse {
    let raffle = state.raffle.lock().await;
    Json(ParticipantListResponse::from_records(raffle.winners()))
}

/// `GET /prizes` — Prize list.
#[utoipa::path(
    get,
    path = "/api/v1/prizes",
    tag = "Raffle",
    summary = "List prizes",
    description = "Returns the prize list in file order.",
    responses(
        (status = 200, description = "Prize list", body = PrizeListResponse),
    )
)]
pub async fn list_prizes(State(state): State<AppState>) -> impl IntoResponse {
    let raffle = state.raffle.lock().await;
    Json(PrizeListResponse {
        data: raffle.prizes().to_vec(),
        total: raffle.prizes().len(),
    })
}

/// `POST /draws` — Draw one winner.
///
/// # Errors
///
/// Returns [`RaffleError::EmptyPool`] when nobody is left to draw and
/// [`RaffleError::Persistence`] when the winner file cannot be written.
#[utoipa::path(
    post,
    path = "/api/v1/draws",
    tag = "Raffle",
    summary = "Draw a winner",
    description = "Draws one participant uniformly at random from the pool and records them as a winner. The winner file is written before the response is sent.",
    responses(
        (status = 201, description = "Winner drawn", body = DrawResponse),
        (status = 409, description = "Pool is empty", body = ErrorResponse),
        (status = 500, description = "Winner file could not be written", body = ErrorResponse),
    )
)]
pub async fn draw(State(state): State<AppState>) -> Result<impl IntoResponse, RaffleError> {
    let (winner, draw_number, remaining) = with_raffle_blocking(&state, |raffle| {
        let winner = raffle.pick()?;
        Ok::<_, RaffleError>((winner, raffle.winners().len(), raffle.pool().len()))
    })
    .await?;

    tracing::info!(user_id = %winner.user_id, draw_number, remaining, "winner drawn");

    Ok((
        StatusCode::CREATED,
        Json(DrawResponse {
            draw_number,
            winner: ParticipantDto::from(&winner),
            remaining,
            drawn_at: Utc::now(),
        }),
    ))
}

/// `DELETE /winners/{user_id}` — Remove a winner.
///
/// # Errors
///
/// Returns [`RaffleError::WinnerNotFound`] if the user is not a winner and
/// [`RaffleError::Persistence`] when the winner file cannot be written.
#[utoipa::path(
    delete,
    path = "/api/v1/winners/{user_id}",
    tag = "Raffle",
    summary = "Remove a winner",
    description = "Removes the participant from the winner set. They are not put back into the draw pool until the next reload.",
    params(
        ("user_id" = String, Path, description = "connpass user name"),
    ),
    responses(
        (status = 204, description = "Winner removed"),
        (status = 404, description = "Not a winner", body = ErrorResponse),
        (status = 500, description = "Winner file could not be written", body = ErrorResponse),
    )
)]
pub async fn remove_winner(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, RaffleError> {
    let removed = with_raffle_blocking(&state, |raffle| raffle.remove_winner(&user_id)).await?;
    if !removed {
        return Err(RaffleError::WinnerNotFound(UserId::new(user_id)));
    }
    tracing::info!(%user_id, "winner removed");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /reload` — Re-read all source files.
///
/// # Errors
///
/// Returns a [`RaffleError`] if a source cannot be read or is malformed;
/// the previous state stays in place.
#[utoipa::path(
    post,
    path = "/api/v1/reload",
    tag = "Raffle",
    summary = "Reload sources",
    description = "Re-reads the participant export, winner file and prize list. Winners removed since the last load return to the pool.",
    responses(
        (status = 200, description = "Reloaded raffle summary", body = RaffleSnapshot),
        (status = 500, description = "A source could not be loaded", body = ErrorResponse),
    )
)]
pub async fn reload(State(state): State<AppState>) -> Result<impl IntoResponse, RaffleError> {
    let snapshot = with_raffle_blocking(&state, |raffle| {
        raffle.reload()?;
        Ok::<_, RaffleError>(raffle.snapshot())
    })
    .await?;

    tracing::info!(
        pool_size = snapshot.pool_size,
        winner_count = snapshot.winner_count,
        "raffle reloaded"
    );
    Ok(Json(snapshot))
}

/// Raffle routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/raffle", get(get_raffle))
        .route("/participants", get(list_participants))
        .route("/winners", get(list_winners))
        .route("/winners/{user_id}", delete(remove_winner))
        .route("/prizes", get(list_prizes))
        .route("/draws", post(draw))
        .route("/reload", post(reload))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tower::ServiceExt;

    use super::*;
    use crate::api;
    use crate::service::{RaffleManager, RaffleSources};
    use crate::test_support::{MemoryLog, PRIZE_CSV, ScratchDir, participant_csv};

    fn make_app(dir: &ScratchDir, users: &[&str]) -> Router {
        let participants = dir.write("event.csv", &participant_csv(users));
        let prizes = dir.write("items.csv", PRIZE_CSV);
        let manager = match RaffleManager::open(
            RaffleSources::new(participants, prizes),
            Arc::new(MemoryLog::new()),
            StdRng::seed_from_u64(42),
        ) {
            Ok(manager) => manager,
            Err(e) => panic!("open failed: {e}"),
        };
        api::build_router().with_state(AppState::new(manager))
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let Ok(request) = Request::builder().method(method).uri(uri).body(Body::empty()) else {
            panic!("bad request");
        };
        let response = app
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|infallible| match infallible {});
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn draw_returns_created_winner() {
        let dir = ScratchDir::new();
        let app = make_app(&dir, &["alice", "bob", "carol"]);

        let (status, body) = send(&app, "POST", "/api/v1/draws").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["draw_number"], 1);
        assert_eq!(body["remaining"], 2);

        let (status, body) = send(&app, "GET", "/api/v1/raffle").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["winner_count"], 1);
        assert_eq!(body["pool_size"], 2);
        assert_eq!(body["prize_count"], 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn draw_on_empty_pool_is_conflict() {
        let dir = ScratchDir::new();
        let app = make_app(&dir, &["alice"]);

        let (status, _) = send(&app, "POST", "/api/v1/draws").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "POST", "/api/v1/draws").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], 2001);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn remove_winner_maps_found_indicator() {
        let dir = ScratchDir::new();
        let app = make_app(&dir, &["alice"]);
        let _ = send(&app, "POST", "/api/v1/draws").await;

        let (status, _) = send(&app, "DELETE", "/api/v1/winners/alice").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "DELETE", "/api/v1/winners/alice").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2002);

        let (_, body) = send(&app, "GET", "/api/v1/participants").await;
        assert_eq!(body["total"], 0);

        let (status, body) = send(&app, "POST", "/api/v1/reload").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pool_size"], 1);
        assert_eq!(body["winner_count"], 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn draw_is_on_disk_when_response_arrives() {
        let dir = ScratchDir::new();
        let app = make_app(&dir, &["alice"]);

        let (status, body) = send(&app, "POST", "/api/v1/draws").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["winner"]["user_id"], "alice");

        let Ok(on_disk) = std::fs::read_to_string(dir.path().join("event_win.csv")) else {
            panic!("winner file missing");
        };
        assert!(on_disk.starts_with("一般枠,alice,"));
        assert_eq!(on_disk.lines().count(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lists_expose_pool_and_prizes() {
        let dir = ScratchDir::new();
        let app = make_app(&dir, &["alice", "bob"]);

        let (status, body) = send(&app, "GET", "/api/v1/participants").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"][0]["user_id"], "alice");
        assert_eq!(body["data"][0]["status"], "active");

        let (status, body) = send(&app, "GET", "/api/v1/prizes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][1]["name"], "Red stapler");

        let (_, body) = send(&app, "GET", "/api/v1/winners").await;
        assert_eq!(body["total"], 0);
    }
}
