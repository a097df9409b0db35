use crate::errors::AppError;
use crate::models::{AggregatePoint, ViewMode};
use crate::state::{AppState, HasPanel};
use crate::ui::{render_tracker, EntryView};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub mode: Option<String>,
}

pub async fn index() -> Redirect {
    Redirect::to("/diet")
}

pub async fn page<R: EntryView + HasPanel>(State(state): State<AppState>) -> Html<String> {
    let tracker = R::panel(&state).tracker.lock().await;
    Html(render_tracker(&tracker))
}

// Form posts swallow store failures (the tracker logs them) and re-render.
pub async fn add_entry<R: EntryView + HasPanel>(
    State(state): State<AppState>,
    Form(form): Form<R::Form>,
) -> Redirect {
    let panel = R::panel(&state);
    let mut tracker = panel.tracker.lock().await;
    let _ = tracker.submit(&panel.store, form).await;
    back::<R>()
}

pub async fn delete_entry<R: EntryView + HasPanel>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    let panel = R::panel(&state);
    let mut tracker = panel.tracker.lock().await;
    let _ = tracker.delete(&panel.store, &id).await;
    back::<R>()
}

pub async fn set_view<R: EntryView + HasPanel>(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Result<Redirect, AppError> {
    let mode: ViewMode = mode.parse().map_err(AppError::bad_request)?;
    R::panel(&state).tracker.lock().await.set_view_mode(mode);
    Ok(back::<R>())
}

pub async fn refresh<R: EntryView + HasPanel>(State(state): State<AppState>) -> Redirect {
    let _ = R::panel(&state).refresh().await;
    back::<R>()
}

pub async fn list_entries<R: EntryView + HasPanel>(State(state): State<AppState>) -> Json<Vec<R>> {
    let tracker = R::panel(&state).tracker.lock().await;
    Json(tracker.entries().to_vec())
}

/// JSON create: unlike the form post, store failures come back as errors.
pub async fn create_entry<R: EntryView + HasPanel>(
    State(state): State<AppState>,
    Json(form): Json<R::Form>,
) -> Result<Json<R>, AppError> {
    let panel = R::panel(&state);
    let mut tracker = panel.tracker.lock().await;
    let created = tracker.submit(&panel.store, form).await?;
    Ok(Json(created))
}

pub async fn get_chart<R: EntryView + HasPanel>(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Vec<AggregatePoint>>, AppError> {
    let tracker = R::panel(&state).tracker.lock().await;
    let mode: ViewMode = match query.mode.as_deref() {
        Some(mode) => mode.parse().map_err(AppError::bad_request)?,
        None => tracker.view_mode(),
    };
    Ok(Json(tracker.chart_for(mode)))
}

fn back<R: EntryView>() -> Redirect {
    Redirect::to(&format!("/{}", R::KIND.slug()))
}
