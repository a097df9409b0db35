use crate::handlers;
use crate::models::{ExerciseEntry, MealEntry, WeightEntry};
use crate::state::{AppState, HasPanel};
use crate::ui::EntryView;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .merge(tracker_routes::<MealEntry>())
        .merge(tracker_routes::<ExerciseEntry>())
        .merge(tracker_routes::<WeightEntry>())
        .with_state(state)
}

fn tracker_routes<R: EntryView + HasPanel>() -> Router<AppState> {
    let slug = R::KIND.slug();
    Router::new()
        .route(&format!("/{slug}"), get(handlers::page::<R>))
        .route(&format!("/{slug}/entries"), post(handlers::add_entry::<R>))
        .route(&format!("/{slug}/entries/:id/delete"), post(handlers::delete_entry::<R>))
        .route(&format!("/{slug}/view/:mode"), post(handlers::set_view::<R>))
        .route(&format!("/{slug}/refresh"), post(handlers::refresh::<R>))
        .route(
            &format!("/api/{slug}/entries"),
            get(handlers::list_entries::<R>).post(handlers::create_entry::<R>),
        )
        .route(&format!("/api/{slug}/chart"), get(handlers::get_chart::<R>))
}
