use std::sync::MutexGuard;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use kilobyte_engine::{Cell, Direction, Game, KEY_NAMES, engine::SIZE};
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::app::{AppState, INDEX_JS, INDEX_TEMPLATE, STYLE_CSS};
use crate::sessions::{SessionId, Sessions};

type Rejection = (StatusCode, String);

#[derive(Deserialize)]
pub struct KeyRequest {
    session: String,
    key: String,
}

#[derive(Deserialize)]
pub struct BoardQuery {
    session: String,
}

#[derive(Serialize)]
pub(crate) struct KeyResponse {
    handled: bool,
    direction: Option<Direction>,
    spawned: Option<[usize; 2]>,
    table: String,
}

#[derive(Serialize)]
pub(crate) struct BoardResponse {
    cells: [[Cell; SIZE]; SIZE],
    empty: usize,
    table: String,
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: String,
}

/// Render the page. Every load starts its own game and embeds its id.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, Rejection> {
    let (session, board) = lock_sessions(&state)?.start();

    let template = state
        .templates
        .get_template(INDEX_TEMPLATE)
        .map_err(internal)?;
    let page = template
        .render(context! {
            board => board,
            keys => KEY_NAMES,
            session => session.to_string(),
        })
        .map_err(internal)?;
    Ok(Html(page))
}

pub async fn index_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], INDEX_JS)
}

pub async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

pub async fn press_key(
    State(state): State<AppState>,
    Json(request): Json<KeyRequest>,
) -> Result<Json<KeyResponse>, Rejection> {
    let id = parse_session(&request.session)?;
    let mut sessions = lock_sessions(&state)?;
    let game = find_game(&mut sessions, &id)?;
    let response = match game.handle_key(&request.key) {
        Some(turn) => KeyResponse {
            handled: true,
            direction: Some(turn.direction),
            spawned: turn.spawned.map(|(row, col)| [row, col]),
            table: turn.table,
        },
        None => KeyResponse {
            handled: false,
            direction: None,
            spawned: None,
            table: game.render(),
        },
    };
    Ok(Json(response))
}

pub async fn get_board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<BoardResponse>, Rejection> {
    let id = parse_session(&query.session)?;
    let mut sessions = lock_sessions(&state)?;
    let game = find_game(&mut sessions, &id)?;
    Ok(Json(BoardResponse {
        cells: game.board().rows(),
        empty: game.board().count_empty(),
        table: game.render(),
    }))
}

pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn parse_session(raw: &str) -> Result<SessionId, Rejection> {
    raw.parse()
        .map_err(|err| (StatusCode::BAD_REQUEST, format!("invalid session id: {err}")))
}

fn find_game<'a>(sessions: &'a mut Sessions, id: &SessionId) -> Result<&'a mut Game, Rejection> {
    sessions.get_mut(id).ok_or_else(|| {
        debug!("session" = %id, "unknown or expired session");
        (
            StatusCode::NOT_FOUND,
            "unknown session, reload the page".to_string(),
        )
    })
}

fn lock_sessions(state: &AppState) -> Result<MutexGuard<'_, Sessions>, Rejection> {
    state.sessions.lock().map_err(|_| {
        error!("session lock poisoned");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "game state unavailable".to_string(),
        )
    })
}

fn internal(err: minijinja::Error) -> Rejection {
    error!("failed to render page: {err}");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;
    use std::path::Path;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::Request,
    };
    use kilobyte_engine::{Board, MergeMode};
    use rand::{SeedableRng, rngs::StdRng};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::app::{AppState, router};
    use crate::config::GameSettings;

    fn test_state(seed: u64, max_sessions: usize) -> AppState {
        let settings = GameSettings {
            seed: Some(seed),
            merge_mode: MergeMode::Wrapping,
        };
        AppState::new(settings, NonZeroUsize::new(max_sessions).unwrap()).unwrap()
    }

    fn test_router(seed: u64) -> (Router, AppState) {
        let state = test_state(seed, 64);
        (router(state.clone(), Path::new("no-such-public-dir")), state)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get(app: &Router, uri: &str) -> axum::response::Response {
        app.clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// Load the page and return it with the session id it was given.
    async fn open_page(app: &Router) -> (String, String) {
        let response = get(app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_string(response).await;
        let marker = "data-session=\"";
        let start = page.find(marker).expect("page carries a session id") + marker.len();
        let end = start + page[start..].find('"').unwrap();
        (page[start..end].to_string(), page)
    }

    fn press(session: &str, key: &str) -> Request<Body> {
        Request::post("/api/keys")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "session": session, "key": key }).to_string()))
            .unwrap()
    }

    fn board_of(state: &AppState, session: &str) -> Board {
        let id: SessionId = session.parse().unwrap();
        *state.sessions.lock().unwrap().get_mut(&id).unwrap().board()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = test_router(1);
        let response = get(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn index_renders_board_and_keys() {
        let (app, state) = test_router(2);
        let (session, page) = open_page(&app).await;
        let id: SessionId = session.parse().unwrap();
        let table = state.sessions.lock().unwrap().get_mut(&id).unwrap().render();
        assert!(page.contains(&table), "board table missing from page");
        assert!(page.contains("ArrowDown"));
        assert_eq!(page.matches("<td").count(), 16);
    }

    #[tokio::test]
    async fn each_page_load_gets_its_own_game() {
        let (app, state) = test_router(3);
        let (a, _) = open_page(&app).await;

        let mut kilobyte = Board::EMPTY;
        kilobyte.set(0, 0, Some(10));
        {
            let id: SessionId = a.parse().unwrap();
            let mut sessions = state.sessions.lock().unwrap();
            *sessions.get_mut(&id).unwrap() =
                Game::with_board(kilobyte, StdRng::seed_from_u64(1), MergeMode::Wrapping);
        }

        // another tab loads the page and plays
        let (b, _) = open_page(&app).await;
        assert_ne!(a, b);
        let response = app.clone().oneshot(press(&b, "ArrowRight")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.sessions.lock().unwrap().len(), 2);

        assert_eq!(board_of(&state, &a), kilobyte);
        let response = get(&app, &format!("/api/board?session={a}")).await;
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["cells"][0][0], json!(10));
        assert!(body["table"].as_str().unwrap().contains("1KB"));
        assert_ne!(board_of(&state, &b), kilobyte);
    }

    #[tokio::test]
    async fn same_seed_replays_the_opening() {
        let (app, state) = test_router(3);
        let (a, _) = open_page(&app).await;
        app.clone().oneshot(press(&a, "ArrowLeft")).await.unwrap();
        let (b, _) = open_page(&app).await;
        let fresh = *Game::from_seed(Some(3), MergeMode::Wrapping).board();
        assert_eq!(board_of(&state, &b), fresh);
    }

    #[tokio::test]
    async fn arrow_key_plays_a_turn() {
        let (app, state) = test_router(4);
        let (session, _) = open_page(&app).await;
        let response = app.clone().oneshot(press(&session, "ArrowUp")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["handled"], json!(true));
        assert_eq!(body["direction"], json!("Up"));
        assert!(body["spawned"].is_array());
        let board = board_of(&state, &session);
        assert_eq!(body["table"], json!(kilobyte_engine::render_board(&board)));
        // two seeded tiles, at most one merge, one spawn
        assert!(board.count_empty() <= 14);
    }

    #[tokio::test]
    async fn presses_apply_in_the_order_sent() {
        let (app, _) = test_router(12);
        let (session, _) = open_page(&app).await;
        let keys = ["ArrowLeft", "ArrowUp", "ArrowRight", "Down", "ArrowLeft", "Up"];
        let mut replay = Game::from_seed(Some(12), MergeMode::Wrapping);
        for key in keys {
            let response = app.clone().oneshot(press(&session, key)).await.unwrap();
            let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
            let turn = replay.handle_key(key).unwrap();
            assert_eq!(body["table"], json!(turn.table), "after {key}");
        }
    }

    #[tokio::test]
    async fn other_keys_are_ignored() {
        let (app, state) = test_router(5);
        let (session, _) = open_page(&app).await;
        let before = board_of(&state, &session);
        let response = app.clone().oneshot(press(&session, "a")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["handled"], json!(false));
        assert_eq!(body["direction"], Value::Null);
        assert_eq!(board_of(&state, &session), before);
    }

    #[tokio::test]
    async fn malformed_key_request_is_rejected() {
        let (app, _) = test_router(6);
        let request = Request::post("/api/keys")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"direction\": 1}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn bad_session_id_is_rejected() {
        let (app, _) = test_router(6);
        let response = app.clone().oneshot(press("not-a-session", "ArrowUp")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = get(&app, "/api/board?session=nope").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = get(&app, "/api/board").await;
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (app, _) = test_router(6);
        open_page(&app).await;
        let stranger = SessionId::new().to_string();
        let response = app.clone().oneshot(press(&stranger, "ArrowUp")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = get(&app, &format!("/api/board?session={stranger}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oldest_session_expires_past_the_limit() {
        let state = test_state(9, 1);
        let app = router(state.clone(), Path::new("no-such-public-dir"));
        let (first, _) = open_page(&app).await;
        let (second, _) = open_page(&app).await;
        let response = app.clone().oneshot(press(&first, "ArrowUp")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = app.clone().oneshot(press(&second, "ArrowUp")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn board_snapshot() {
        let (app, _) = test_router(7);
        let (session, _) = open_page(&app).await;
        let response = get(&app, &format!("/api/board?session={session}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["empty"], json!(14));
        let cells = body["cells"].as_array().unwrap();
        assert_eq!(cells.len(), 4);
        let filled: Vec<&Value> = cells
            .iter()
            .flat_map(|row| row.as_array().unwrap())
            .filter(|cell| !cell.is_null())
            .collect();
        assert_eq!(filled, vec![&json!(1), &json!(1)]);
    }

    #[tokio::test]
    async fn page_assets_are_built_in() {
        // public dir does not exist
        let (app, _) = test_router(8);
        let response = get(&app, "/index.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/javascript"), "{content_type}");
        let script = body_string(response).await;
        assert!(script.contains("keydown"));
        assert!(script.contains("pending = pending"), "presses are not queued");
        assert!(script.contains("dataset.session"));

        let response = get(&app, "/style.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("#board"));

        let response = get(&app, "/missing.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn public_dir_serves_extra_files() {
        let public = tempfile::tempdir().unwrap();
        std::fs::write(public.path().join("robots.txt"), "User-agent: *\n").unwrap();
        let app = router(test_state(8, 4), public.path());
        let response = get(&app, "/robots.txt").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "User-agent: *\n");
    }
}
