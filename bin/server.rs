// Bear Registry - Web Server
// HTML CRUD routes plus a small read-only JSON API

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use bears::{
    bear_detail, bear_form_values, create_bear, delete_bear, edit_bear, female_bears, list_bears,
    render, Bear, BearSchema, FormData, SaveOutcome, SessionState, SqliteBearStore, StoreError,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<SqliteBearStore>>,
    session: Arc<Mutex<SessionState>>,
    schema: Arc<BearSchema>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

// ============================================================================
// HTML Handlers
// ============================================================================

/// GET / - The list view is the front page
async fn root() -> Redirect {
    Redirect::to("/bears")
}

/// GET /bears - All bears, with the post-delete notice when one is pending
async fn bear_list(State(state): State<AppState>) -> Response {
    let store = state.store.lock().unwrap();
    let flash = state.session.lock().unwrap().take_last_deleted();

    match list_bears(&*store) {
        Ok(bears) => Html(render::list_page("All bears", &bears, flash.as_ref())).into_response(),
        Err(e) => server_error(e),
    }
}

/// GET /bears/females - The female subset, same list view
async fn bear_females(State(state): State<AppState>) -> Response {
    let store = state.store.lock().unwrap();

    match female_bears(&*store) {
        Ok(bears) => Html(render::list_page("Female bears", &bears, None)).into_response(),
        Err(e) => server_error(e),
    }
}

/// GET /bears/:id - Single record
async fn bear_show(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let store = state.store.lock().unwrap();

    match bear_detail(&*store, &id) {
        Ok(bear) => Html(render::detail_page(&bear)).into_response(),
        Err(StoreError::NotFound(_)) => not_found(&id),
        Err(e) => server_error(e),
    }
}

/// GET /bears/new - Empty creation form
async fn bear_new_form(State(state): State<AppState>) -> Response {
    Html(render::form_page(
        "Add a bear",
        "/bears/new",
        &state.schema,
        &FormData::new(),
        &[],
    ))
    .into_response()
}

/// POST /bears/new - Create, or re-render the form with errors
async fn bear_create(State(state): State<AppState>, Form(form): Form<FormData>) -> Response {
    let store = state.store.lock().unwrap();

    match create_bear(&*store, &state.schema, &form) {
        Ok(SaveOutcome::Saved(id)) => Redirect::to(&format!("/bears/{id}")).into_response(),
        Ok(SaveOutcome::Rejected(errors)) => Html(render::form_page(
            "Add a bear",
            "/bears/new",
            &state.schema,
            &form,
            &errors,
        ))
        .into_response(),
        Err(e) => server_error(e),
    }
}

/// GET /bears/:id/edit - Edit form bound to the record
async fn bear_edit_form(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let store = state.store.lock().unwrap();

    match bear_detail(&*store, &id) {
        Ok(bear) => Html(render::form_page(
            &format!("Edit {}", bear.name),
            &format!("/bears/{}/edit", bear.id),
            &state.schema,
            &bear_form_values(&bear),
            &[],
        ))
        .into_response(),
        Err(StoreError::NotFound(_)) => not_found(&id),
        Err(e) => server_error(e),
    }
}

/// POST /bears/:id/edit - Replace fields, or re-render with errors
async fn bear_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<FormData>,
) -> Response {
    let store = state.store.lock().unwrap();

    match edit_bear(&*store, &state.schema, &id, &form) {
        Ok(SaveOutcome::Saved(id)) => Redirect::to(&format!("/bears/{id}")).into_response(),
        Ok(SaveOutcome::Rejected(errors)) => Html(render::form_page(
            "Edit bear",
            &format!("/bears/{id}/edit"),
            &state.schema,
            &form,
            &errors,
        ))
        .into_response(),
        Err(StoreError::NotFound(_)) => not_found(&id),
        Err(e) => server_error(e),
    }
}

/// POST /bears/:id/delete - Record the deletion in the session, remove, back to the list
async fn bear_delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let store = state.store.lock().unwrap();
    let mut session = state.session.lock().unwrap();

    match delete_bear(&*store, &mut session, &id) {
        Ok(()) => Redirect::to("/bears").into_response(),
        Err(StoreError::NotFound(_)) => not_found(&id),
        Err(e) => server_error(e),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn api_health() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/bears - All bears as JSON
async fn api_bears(State(state): State<AppState>) -> Response {
    let store = state.store.lock().unwrap();

    match list_bears(&*store) {
        Ok(bears) => (StatusCode::OK, Json(ApiResponse::ok(bears))).into_response(),
        Err(e) => {
            error!("listing bears for the API failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse {
                    success: false,
                    data: Vec::<Bear>::new(),
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Response helpers
// ============================================================================

fn not_found(id: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(render::not_found_page(id))).into_response()
}

fn server_error(e: StoreError) -> Response {
    error!("request failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render::server_error_page()),
    )
        .into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bears=info,tower_http=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let db_path = std::env::var("BEARS_DB").unwrap_or_else(|_| "bears.db".to_string());
    let store = SqliteBearStore::open(&db_path)?;
    info!("database ready at {db_path}");

    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        session: Arc::new(Mutex::new(SessionState::new())),
        schema: Arc::new(BearSchema::new()),
    };

    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/bears", get(api_bears));

    let app = Router::new()
        .route("/", get(root))
        .route("/bears", get(bear_list))
        .route("/bears/new", get(bear_new_form).post(bear_create))
        .route("/bears/females", get(bear_females))
        .route("/bears/:id", get(bear_show))
        .route("/bears/:id/edit", get(bear_edit_form).post(bear_update))
        .route("/bears/:id/delete", post(bear_delete))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("static"))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("bear registry listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
