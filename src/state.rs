use crate::config::Config;
use crate::errors::StoreError;
use crate::models::{ExerciseEntry, MealEntry, WeightEntry};
use crate::store::{http_client, RemoteStore};
use crate::tracker::{Trackable, Tracker};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One tab's store plus its view state. The mutex lets one operation run at a time.
pub struct Panel<R: Trackable> {
    pub store: RemoteStore<R>,
    pub tracker: Mutex<Tracker<R>>,
}

impl<R: Trackable> Panel<R> {
    pub fn new(store: RemoteStore<R>) -> Self {
        Self {
            store,
            tracker: Mutex::new(Tracker::new()),
        }
    }

    /// Re-fetches the collection. Failures are logged by the tracker.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let mut tracker = self.tracker.lock().await;
        tracker.load(&self.store).await
    }
}

/// Picks the panel for an entry kind out of the shared state.
pub trait HasPanel: Trackable {
    fn panel(state: &AppState) -> &Arc<Panel<Self>>;
}

impl HasPanel for MealEntry {
    fn panel(state: &AppState) -> &Arc<Panel<Self>> {
        &state.diet
    }
}

impl HasPanel for ExerciseEntry {
    fn panel(state: &AppState) -> &Arc<Panel<Self>> {
        &state.exercise
    }
}

impl HasPanel for WeightEntry {
    fn panel(state: &AppState) -> &Arc<Panel<Self>> {
        &state.weight
    }
}

#[derive(Clone)]
pub struct AppState {
    pub diet: Arc<Panel<MealEntry>>,
    pub exercise: Arc<Panel<ExerciseEntry>>,
    pub weight: Arc<Panel<WeightEntry>>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let http = http_client(config.request_timeout)?;
        Ok(Self::with_client(http, &config.api_url))
    }

    pub fn with_client(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            diet: Arc::new(Panel::new(RemoteStore::new(http.clone(), api_url))),
            exercise: Arc::new(Panel::new(RemoteStore::new(http.clone(), api_url))),
            weight: Arc::new(Panel::new(RemoteStore::new(http, api_url))),
        }
    }

    /// Initial fetch of every collection. A failing tab starts empty.
    pub async fn load_all(&self) {
        let _ = tokio::join!(
            self.diet.refresh(),
            self.exercise.refresh(),
            self.weight.refresh()
        );
    }
}
