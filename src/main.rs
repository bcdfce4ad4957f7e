//! Activity Wheel - sunburst dashboard of the year's activities per month and category.

mod categories;
mod config;
mod error;
mod merge;
mod render;
mod schema;
mod sheet_parser;
mod sheets;
mod template;

use axum::{
    extract::{RawQuery, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use categories::CategorySelection;
use config::{AppConfig, SheetLocation};
use error::AppError;
use render::{Dashboard, SunburstFigure};
use sheets::{CsvUrlSource, FileSource, SheetConnection, SheetSource};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
    sheets: SheetConnection,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "activity_wheel=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let source: Arc<dyn SheetSource> = match &config.sheet {
        SheetLocation::CsvUrl(url) => Arc::new(CsvUrlSource::new(reqwest::Client::new(), url.clone())),
        SheetLocation::File(path) => Arc::new(FileSource::new(path.clone())),
    };
    info!(
        "Sheet source: {} ({:?}), freshness window {:?}",
        source.name(),
        config.sheet,
        config.sheet_ttl
    );

    let state = AppState {
        sheets: SheetConnection::new(source, config.sheet_ttl),
        config: Arc::new(config),
    };
    let bind_addr = state.config.bind_addr.clone();

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr.as_str()).await?;
    info!("Server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/api/categories", get(list_categories))
        .route("/api/chart", post(chart))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The dashboard page with the chart for the requested categories.
async fn dashboard(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, AppError> {
    let selection = CategorySelection::from_query(query.as_deref());
    let wheel = build_wheel(&state, &selection).await?;

    let html = render::render_dashboard(&Dashboard {
        title: &state.config.chart_title,
        figure: &wheel.figure,
        categories: &wheel.categories,
        selected: &wheel.selected,
        edit_url: &state.config.sheet_edit_url,
    })
    .map_err(AppError::Render)?;

    Ok(Html(html))
}

#[derive(serde::Deserialize)]
struct ChartRequest {
    #[serde(default)]
    categories: Option<Vec<String>>,
}

/// Figure JSON for a category selection; the dashboard redraws with it.
async fn chart(
    State(state): State<AppState>,
    Json(request): Json<ChartRequest>,
) -> Result<Json<SunburstFigure>, AppError> {
    let selection = match request.categories {
        Some(categories) => CategorySelection::only(categories),
        None => CategorySelection::all(),
    };
    let wheel = build_wheel(&state, &selection).await?;
    Ok(Json(wheel.figure))
}

/// Distinct categories currently in the sheet.
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let activities = state.sheets.activities().await.map_err(AppError::Sheet)?;
    Ok(Json(categories::distinct_categories(&activities)))
}

// ============================================================================
// Helper functions
// ============================================================================

struct Wheel {
    figure: SunburstFigure,
    categories: Vec<String>,
    selected: HashSet<String>,
}

/// Load the template and rows, merge the selected categories, build the figure.
async fn build_wheel(state: &AppState, selection: &CategorySelection) -> Result<Wheel, AppError> {
    let activities = state.sheets.activities().await.map_err(AppError::Sheet)?;
    let nodes = template::load_template(&state.config.template_path).map_err(AppError::Template)?;

    let categories = categories::distinct_categories(&activities);
    let selected = selection.resolve(&categories);

    let merged = merge::incorporate_activities(&nodes, &activities, &selected, state.config.overflow);
    info!(
        "Built wheel: {} nodes, {}/{} categories selected",
        merged.len(),
        selected.len(),
        categories.len()
    );

    Ok(Wheel {
        figure: SunburstFigure::from_nodes(&merged, &state.config.chart_title),
        categories,
        selected,
    })
}
