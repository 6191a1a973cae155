use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use minijinja::Environment;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::GameSettings;
use crate::routes;
use crate::sessions::Sessions;

pub const INDEX_TEMPLATE: &str = "index.html";

/// Page script and stylesheet, built into the binary so the page works from
/// any working directory.
pub const INDEX_JS: &str = include_str!("../public/index.js");
pub const STYLE_CSS: &str = include_str!("../public/style.css");

#[derive(Clone)]
pub struct AppState {
    /// Games of the pages served so far, keyed by the id each page was given.
    pub sessions: Arc<Mutex<Sessions>>,
    pub templates: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(settings: GameSettings, max_sessions: NonZeroUsize) -> Result<Self> {
        let mut templates = Environment::new();
        templates
            .add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))
            .context("failed to compile page template")?;
        Ok(Self {
            sessions: Arc::new(Mutex::new(Sessions::new(max_sessions, settings))),
            templates: Arc::new(templates),
        })
    }
}

pub fn router(state: AppState, public: &Path) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/index.js", get(routes::index_js))
        .route("/style.css", get(routes::style_css))
        .route("/api/keys", post(routes::press_key))
        .route("/api/board", get(routes::get_board))
        .route("/health", get(routes::get_health))
        .fallback_service(ServeDir::new(public))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
