pub mod auth;
pub mod cli;
pub mod completion;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod processing;
pub mod repository;
pub mod state;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::models::{NoteVersion, PomodoroSession, Prompt, Task};

pub use crate::state::AppState;

/// The full HTTP application.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/prompts/templates/types", get(public::template_types))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{note_versions, processing, resource};

    Router::new()
        // Tasks
        .route("/tasks", get(resource::list::<Task>).post(resource::create::<Task>))
        .route(
            "/tasks/:id",
            get(resource::get::<Task>)
                .patch(resource::update::<Task>)
                .delete(resource::delete::<Task>),
        )
        // Pomodoro sessions
        .route(
            "/pomodoro-sessions",
            get(resource::list::<PomodoroSession>).post(resource::create::<PomodoroSession>),
        )
        .route(
            "/pomodoro-sessions/:id",
            get(resource::get::<PomodoroSession>)
                .patch(resource::update::<PomodoroSession>)
                .delete(resource::delete::<PomodoroSession>),
        )
        // Note versions are immutable
        .route("/note-versions", get(note_versions::list).post(resource::create::<NoteVersion>))
        .route(
            "/note-versions/:id",
            get(resource::get::<NoteVersion>).delete(resource::delete::<NoteVersion>),
        )
        // Prompts
        .route("/prompts", get(resource::list::<Prompt>).post(resource::create::<Prompt>))
        .route(
            "/prompts/:id",
            get(resource::get::<Prompt>)
                .patch(resource::update::<Prompt>)
                .delete(resource::delete::<Prompt>),
        )
        // Note processing
        .route("/process-note", post(processing::process_note))
        .route("/process-note-stream", post(processing::process_note_stream))
        .route_layer(axum::middleware::from_fn_with_state(state, middleware::require_principal))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
