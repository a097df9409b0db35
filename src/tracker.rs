//! Per-tab view state: the fetched collection, the form draft, the view mode
//! and the chart series derived from them.

use crate::errors::StoreError;
use crate::models::{
    AggregatePoint, ExerciseEntry, ExerciseForm, ExerciseType, MealEntry, MealForm, NewExercise,
    NewMeal, NewWeight, ViewMode, WeightEntry, WeightForm,
};
use crate::stats::{aggregate, Metrics};
use crate::store::{Entry, RemoteStore};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{error, info};

/// An entry kind that can be entered through a form and charted.
pub trait Trackable: Entry + Metrics {
    type Form: Default + Clone + Send + Sync + DeserializeOwned;

    /// Coerces raw form fields into a draft; `now` stands in for a blank date.
    fn draft_from(form: &Self::Form, now: DateTime<Utc>) -> Result<Self::Draft, StoreError>;
}

impl Trackable for MealEntry {
    type Form = MealForm;

    fn draft_from(form: &MealForm, now: DateTime<Utc>) -> Result<NewMeal, StoreError> {
        Ok(NewMeal {
            date: parse_date(&form.date, now)?,
            name: required_text("meal name", &form.name)?,
            calories: parse_number(&form.calories),
            protein: parse_number(&form.protein),
            carbs: parse_number(&form.carbs),
            fat: parse_number(&form.fat),
        })
    }
}

impl Trackable for ExerciseEntry {
    type Form = ExerciseForm;

    fn draft_from(form: &ExerciseForm, now: DateTime<Utc>) -> Result<NewExercise, StoreError> {
        let kind = match form.kind.trim() {
            "pull" => ExerciseType::Pull,
            _ => ExerciseType::Push,
        };
        Ok(NewExercise {
            date: parse_date(&form.date, now)?,
            movement: required_text("movement", &form.movement)?,
            sets: parse_count(&form.sets),
            reps: parse_count(&form.reps),
            weight: parse_number(&form.weight),
            kind,
        })
    }
}

impl Trackable for WeightEntry {
    type Form = WeightForm;

    fn draft_from(form: &WeightForm, now: DateTime<Utc>) -> Result<NewWeight, StoreError> {
        Ok(NewWeight {
            date: parse_date(&form.date, now)?,
            weight: parse_number(&form.weight),
            note: form.note.trim().to_string(),
        })
    }
}

/// View state for one tracker tab.
///
/// `chart` is rebuilt whenever the entries or the view mode change and at no
/// other time. Store failures are logged and leave the state as it was.
pub struct Tracker<R: Trackable> {
    entries: Vec<R>,
    view_mode: ViewMode,
    draft: R::Form,
    chart: Vec<AggregatePoint>,
}

impl<R: Trackable> Default for Tracker<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            view_mode: ViewMode::default(),
            draft: R::Form::default(),
            chart: Vec::new(),
        }
    }
}

impl<R: Trackable> Tracker<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[R] {
        &self.entries
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn draft(&self) -> &R::Form {
        &self.draft
    }

    pub fn chart(&self) -> &[AggregatePoint] {
        &self.chart
    }

    /// Series for `mode` without switching the held view mode.
    pub fn chart_for(&self, mode: ViewMode) -> Vec<AggregatePoint> {
        if mode == self.view_mode {
            self.chart.clone()
        } else {
            aggregate(&self.entries, mode)
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            self.view_mode = mode;
            self.recompute();
        }
    }

    pub fn replace_entries(&mut self, entries: Vec<R>) {
        self.entries = entries;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.chart = aggregate(&self.entries, self.view_mode);
    }

    /// Replaces the collection with the store's current contents.
    pub async fn load(&mut self, store: &RemoteStore<R>) -> Result<(), StoreError> {
        match store.list().await {
            Ok(entries) => {
                info!(resource = R::RESOURCE, count = entries.len(), "loaded entries");
                self.replace_entries(entries);
                Ok(())
            }
            Err(err) => {
                error!(resource = R::RESOURCE, error = %err, "error retrieving entries");
                Err(err)
            }
        }
    }

    pub async fn submit(&mut self, store: &RemoteStore<R>, form: R::Form) -> Result<R, StoreError> {
        self.submit_at(store, form, Utc::now()).await
    }

    /// Creates an entry from `form`. The draft is cleared only on success.
    pub async fn submit_at(
        &mut self,
        store: &RemoteStore<R>,
        form: R::Form,
        now: DateTime<Utc>,
    ) -> Result<R, StoreError> {
        self.draft = form;
        let result = match R::draft_from(&self.draft, now) {
            Ok(draft) => store.create(&draft).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(created) => {
                self.entries.push(created.clone());
                self.entries.sort_by(|a, b| b.date().cmp(&a.date()));
                self.recompute();
                self.draft = R::Form::default();
                Ok(created)
            }
            Err(err) => {
                error!(resource = R::RESOURCE, error = %err, "error adding entry");
                Err(err)
            }
        }
    }

    /// Deletes `id` remotely, then drops it locally. Unknown ids leave the
    /// collection untouched.
    pub async fn delete(&mut self, store: &RemoteStore<R>, id: &str) -> Result<(), StoreError> {
        if let Err(err) = store.delete(id).await {
            error!(resource = R::RESOURCE, id, error = %err, "error deleting entry");
            return Err(err);
        }

        let before = self.entries.len();
        self.entries.retain(|entry| entry.id() != id);
        if self.entries.len() != before {
            self.recompute();
        }
        Ok(())
    }
}

fn required_text(field: &str, value: &str) -> Result<String, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Blank, unparseable, non-finite and negative input all become zero.
fn parse_number(value: &str) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() && number > 0.0 => number,
        _ => 0.0,
    }
}

fn parse_count(value: &str) -> u32 {
    parse_number(value).trunc().min(f64::from(u32::MAX)) as u32
}

fn parse_date(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(now);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Ok(local.and_utc());
    }
    Err(StoreError::validation(format!("invalid date '{value}'")))
}
