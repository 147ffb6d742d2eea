use crate::errors::AppError;
use crate::models::{CounterId, CounterView, FieldValues};
use crate::state::AppState;
use crate::ui::render_index;
use crate::view::{Intent, JsonView, ViewBinding};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn list_counters(State(state): State<AppState>) -> Json<Vec<CounterView>> {
    let mut registry = state.registry.lock().await;
    let mut view = JsonView::new();
    ViewBinding::new(&mut *registry, &*state.clock).render_all(&mut view);
    Json(view.into_rendered())
}

pub async fn add_counter(
    State(state): State<AppState>,
    payload: Option<Json<FieldValues>>,
) -> Result<(StatusCode, Json<CounterView>), AppError> {
    let mut view = match payload {
        Some(Json(fields)) => JsonView::with_fields(fields),
        None => JsonView::new(),
    };
    let rendered = dispatch(&state, Intent::AddRequested, &mut view).await?;
    Ok((StatusCode::CREATED, Json(rendered)))
}

pub async fn update_counter(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<FieldValues>,
) -> Result<Json<CounterView>, AppError> {
    let id = parse_id(&id)?;
    let mut view = JsonView::with_fields(fields);
    let rendered = dispatch(&state, Intent::UpdateRequested(id), &mut view).await?;
    Ok(Json(rendered))
}

pub async fn remove_counter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let mut registry = state.registry.lock().await;
    ViewBinding::new(&mut *registry, &*state.clock)
        .dispatch(Intent::RemoveRequested(id), &mut JsonView::new())?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reload(State(state): State<AppState>) -> Json<Vec<CounterView>> {
    let mut registry = state.registry.lock().await;
    registry.reload();
    let mut view = JsonView::new();
    ViewBinding::new(&mut *registry, &*state.clock).render_all(&mut view);
    Json(view.into_rendered())
}

async fn dispatch(state: &AppState, intent: Intent, view: &mut JsonView) -> Result<CounterView, AppError> {
    let mut registry = state.registry.lock().await;
    ViewBinding::new(&mut *registry, &*state.clock).dispatch(intent, view)?;
    view.rendered()
        .first()
        .cloned()
        .ok_or_else(|| AppError::bad_request("nothing to render"))
}

fn parse_id(raw: &str) -> Result<CounterId, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::bad_request("counter id must not be empty"));
    }
    Ok(CounterId::new(raw))
}
