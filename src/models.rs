use chrono::{DateTime, Utc};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::{collections::BTreeMap, str::FromStr};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeal {
    pub date: DateTime<Utc>,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    #[default]
    Push,
    Pull,
}

impl ExerciseType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseType::Push => "push",
            ExerciseType::Pull => "pull",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub movement: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    #[serde(rename = "type")]
    pub kind: ExerciseType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExercise {
    pub date: DateTime<Utc>,
    pub movement: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    #[serde(rename = "type")]
    pub kind: ExerciseType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWeight {
    pub date: DateTime<Utc>,
    pub weight: f64,
    pub note: String,
}

/// Raw meal form fields, kept as typed so a failed submit can be re-rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealForm {
    pub name: String,
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseForm {
    pub movement: String,
    pub sets: String,
    pub reps: String,
    pub weight: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightForm {
    pub weight: String,
    pub note: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Day,
    Week,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Day => "day",
            ViewMode::Week => "week",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            other => Err(format!("unknown view mode '{other}'")),
        }
    }
}

/// The three dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerKind {
    Diet,
    Exercise,
    Weight,
}

impl TrackerKind {
    pub const ALL: [TrackerKind; 3] = [TrackerKind::Diet, TrackerKind::Exercise, TrackerKind::Weight];

    /// Path segment used by the dashboard routes.
    pub fn slug(self) -> &'static str {
        match self {
            TrackerKind::Diet => "diet",
            TrackerKind::Exercise => "exercise",
            TrackerKind::Weight => "weight",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TrackerKind::Diet => "Diet & Food Tracker",
            TrackerKind::Exercise => "Exercise Tracker",
            TrackerKind::Weight => "Weight Tracker",
        }
    }
}

/// One chart-ready point: a bucket label plus the aggregated metric values.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatePoint {
    pub label: String,
    pub sums: BTreeMap<&'static str, f64>,
}

impl AggregatePoint {
    pub fn value(&self, metric: &str) -> f64 {
        self.sums.get(metric).copied().unwrap_or_default()
    }
}

// Flattened to `{ "date": label, "<metric>": value, ... }`, the shape chart
// consumers key on.
impl Serialize for AggregatePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sums.len() + 1))?;
        map.serialize_entry("date", &self.label)?;
        for (name, value) in &self.sums {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
