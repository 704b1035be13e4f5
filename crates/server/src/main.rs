use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::FormRejection, rejection::PathRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use event_client::HttpEventStore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod helpers;
mod ordering;
mod pages;
mod render;
mod view_model;

use app_state::AppState;
use config::load_settings;
use helpers::event_path;
use pages::{FailureReason, Fallback, SearchForm, SearchSubmission};
use render::{RenderRequest, TemplateRenderer, View};
use view_model::ViewModel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings();
    let store = HttpEventStore::new(&settings.event_store_url)
        .with_context(|| format!("invalid event store url '{}'", settings.event_store_url))?;
    let renderer = TemplateRenderer::new(&settings.template_dir, settings.template_reload);
    if !renderer.dir().is_dir() {
        warn!(
            template_dir = %renderer.dir().display(),
            "template directory does not exist; every page will redirect to /"
        );
    }
    info!(
        event_store = %store.base_url(),
        template_dir = %renderer.dir().display(),
        template_reload = renderer.reloads(),
        "dashboard configured"
    );

    let state = AppState {
        store: Arc::new(store),
        renderer: Arc::new(renderer),
        base_path: settings.base_path.clone(),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, base_path = %settings.base_path, "dashboard listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/latest", get(latest))
        .route("/search", get(search_form).post(search_submit))
        .route("/event/", get(event_without_id))
        .route("/event/:id", get(event))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let request = RenderRequest::from_headers(&headers, &state.base_path);
    let result = pages::index(state.store.as_ref()).await;
    respond(&state, &request, View::Index, result, Fallback::Root)
}

async fn latest(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let request = RenderRequest::from_headers(&headers, &state.base_path);
    let result = pages::latest(state.store.as_ref()).await;
    respond(&state, &request, View::Latest, result, Fallback::Root)
}

async fn search_form(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let request = RenderRequest::from_headers(&headers, &state.base_path);
    respond(
        &state,
        &request,
        View::Search,
        Ok(view_model::search_form()),
        Fallback::Root,
    )
}

async fn search_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Response {
    let request = RenderRequest::from_headers(&headers, &state.base_path);
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(%rejection, "unreadable search form; treating as empty");
            SearchForm::default()
        }
    };

    match SearchSubmission::from_form(form) {
        SearchSubmission::JumpToEvent(id) => found(&event_path(&request.base_path, &id)),
        SearchSubmission::Empty => {
            debug!("search submitted without filters");
            found(&Fallback::SearchForm.location(&request.base_path))
        }
        SearchSubmission::Query { rid, kind } => {
            let result = pages::search_results(state.store.as_ref(), &rid, &kind).await;
            respond(&state, &request, View::Results, result, Fallback::SearchForm)
        }
    }
}

async fn event_without_id(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    show_event(&state, &headers, "").await
}

async fn event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            warn!(%rejection, "unreadable event id");
            String::new()
        }
    };
    show_event(&state, &headers, &id).await
}

async fn show_event(state: &AppState, headers: &HeaderMap, id: &str) -> Response {
    let request = RenderRequest::from_headers(headers, &state.base_path);
    let result = pages::event(state.store.as_ref(), id).await;
    respond(state, &request, View::Event, result, Fallback::Root)
}

/// Renders the page or, on any failure, redirects. Nothing is written before the
/// renderer has produced the whole body.
fn respond(
    state: &AppState,
    request: &RenderRequest,
    view: View,
    result: Result<ViewModel, FailureReason>,
    fallback: Fallback,
) -> Response {
    let model = match result {
        Ok(model) => model,
        Err(reason) => {
            let location = fallback.location(&request.base_path);
            match &reason {
                FailureReason::Remote(error) if error.is_not_found() => {
                    info!(view = view.name(), %error, %location, "event not found")
                }
                FailureReason::Remote(error) => {
                    warn!(view = view.name(), %error, %location, "event store call failed")
                }
                FailureReason::MissingInput(input) => {
                    debug!(view = view.name(), input, %location, "missing input")
                }
            }
            return found(&location);
        }
    };

    match state.renderer.render(view, &model, request) {
        Ok(body) => Html(body).into_response(),
        Err(error) => {
            error!(view = view.name(), %error, "render failed");
            found("/")
        }
    }
}

fn found(location: &str) -> Response {
    let value = HeaderValue::from_str(location).unwrap_or_else(|_| {
        warn!(%location, "redirect target is not a valid header value");
        HeaderValue::from_static("/")
    });
    (StatusCode::FOUND, [(header::LOCATION, value)]).into_response()
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
