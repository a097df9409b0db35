use crate::models::{AggregatePoint, ExerciseEntry, MealEntry, ViewMode, WeightEntry};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

const WEEK_DAYS: i64 = 7;

/// How a metric combines when several values fall into one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Mean,
}

#[derive(Debug, Clone, Copy)]
pub struct Metric {
    pub name: &'static str,
    pub aggregation: Aggregation,
}

impl Metric {
    pub const fn sum(name: &'static str) -> Self {
        Self {
            name,
            aggregation: Aggregation::Sum,
        }
    }

    pub const fn mean(name: &'static str) -> Self {
        Self {
            name,
            aggregation: Aggregation::Mean,
        }
    }
}

/// A dated record exposing a fixed set of numeric metrics.
pub trait Metrics {
    const METRICS: &'static [Metric];

    fn date(&self) -> DateTime<Utc>;

    fn value(&self, metric: &str) -> f64;
}

impl Metrics for MealEntry {
    const METRICS: &'static [Metric] = &[
        Metric::sum("calories"),
        Metric::sum("protein"),
        Metric::sum("carbs"),
        Metric::sum("fat"),
    ];

    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn value(&self, metric: &str) -> f64 {
        match metric {
            "calories" => self.calories,
            "protein" => self.protein,
            "carbs" => self.carbs,
            "fat" => self.fat,
            _ => 0.0,
        }
    }
}

impl Metrics for ExerciseEntry {
    const METRICS: &'static [Metric] = &[Metric::sum("reps"), Metric::sum("sets")];

    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn value(&self, metric: &str) -> f64 {
        match metric {
            "reps" => f64::from(self.reps),
            "sets" => f64::from(self.sets),
            _ => 0.0,
        }
    }
}

// Weigh-ins are point-in-time readings, so several on one day average.
impl Metrics for WeightEntry {
    const METRICS: &'static [Metric] = &[Metric::mean("weight")];

    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn value(&self, metric: &str) -> f64 {
        match metric {
            "weight" => self.weight,
            _ => 0.0,
        }
    }
}

/// Aggregated values for one UTC calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub values: BTreeMap<&'static str, f64>,
}

/// Running totals for one bucket; `finish` applies each metric's aggregation.
struct Accumulator {
    metrics: &'static [Metric],
    totals: BTreeMap<&'static str, f64>,
    count: usize,
}

impl Accumulator {
    fn new(metrics: &'static [Metric]) -> Self {
        Self {
            metrics,
            totals: metrics.iter().map(|metric| (metric.name, 0.0)).collect(),
            count: 0,
        }
    }

    fn add(&mut self, value_of: impl Fn(&str) -> f64) {
        for metric in self.metrics {
            if let Some(total) = self.totals.get_mut(metric.name) {
                *total += value_of(metric.name);
            }
        }
        self.count += 1;
    }

    fn finish(self) -> BTreeMap<&'static str, f64> {
        let count = self.count.max(1) as f64;
        self.metrics
            .iter()
            .map(|metric| {
                let total = self.totals.get(metric.name).copied().unwrap_or_default();
                let value = match metric.aggregation {
                    Aggregation::Sum => total,
                    Aggregation::Mean => total / count,
                };
                (metric.name, value)
            })
            .collect()
    }
}

/// Groups records by UTC calendar day, ascending. Days without records are absent.
pub fn aggregate_daily<R: Metrics>(records: &[R]) -> Vec<DailyBucket> {
    let mut groups: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.date().date_naive())
            .or_insert_with(|| Accumulator::new(R::METRICS))
            .add(|metric| record.value(metric));
    }

    groups
        .into_iter()
        .map(|(date, acc)| DailyBucket {
            date,
            values: acc.finish(),
        })
        .collect()
}

/// Rolls sorted daily buckets into 7-day windows anchored at the first day.
///
/// A bucket at least seven days past the current window start closes that
/// window and moves the start forward by exactly seven days, once, whatever
/// the size of the gap. Mean metrics average the daily values with each day
/// weighted equally.
pub fn aggregate_weekly(metrics: &'static [Metric], daily: &[DailyBucket]) -> Vec<AggregatePoint> {
    let Some(first) = daily.first() else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut window_start = first.date;
    let mut window = Accumulator::new(metrics);

    for day in daily {
        if (day.date - window_start).num_days() >= WEEK_DAYS {
            let closed = std::mem::replace(&mut window, Accumulator::new(metrics));
            weeks.push(AggregatePoint {
                label: week_label(window_start),
                sums: closed.finish(),
            });
            window_start += Duration::days(WEEK_DAYS);
        }
        window.add(|metric| day.values.get(metric).copied().unwrap_or_default());
    }

    weeks.push(AggregatePoint {
        label: week_label(window_start),
        sums: window.finish(),
    });
    weeks
}

/// Chart series for `records` under `mode`, ascending by time.
pub fn aggregate<R: Metrics>(records: &[R], mode: ViewMode) -> Vec<AggregatePoint> {
    let daily = aggregate_daily(records);
    match mode {
        ViewMode::Day => daily
            .into_iter()
            .map(|bucket| AggregatePoint {
                label: date_key(bucket.date),
                sums: bucket.values,
            })
            .collect(),
        ViewMode::Week => aggregate_weekly(R::METRICS, &daily),
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn week_label(start: NaiveDate) -> String {
    format!("Week of {}", start.format("%-m/%-d/%Y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExerciseType;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap()
    }

    fn meal(id: &str, date: DateTime<Utc>, calories: f64, protein: f64) -> MealEntry {
        MealEntry {
            id: id.to_string(),
            date,
            name: format!("meal {id}"),
            calories,
            protein,
            carbs: 10.0,
            fat: 5.0,
        }
    }

    fn weigh_in(id: &str, date: DateTime<Utc>, weight: f64) -> WeightEntry {
        WeightEntry {
            id: id.to_string(),
            date,
            weight,
            note: None,
        }
    }

    fn total(points: &[AggregatePoint], metric: &str) -> f64 {
        points.iter().map(|point| point.value(metric)).sum()
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let meals: Vec<MealEntry> = Vec::new();
        assert!(aggregate(&meals, ViewMode::Day).is_empty());
        assert!(aggregate(&meals, ViewMode::Week).is_empty());
    }

    #[test]
    fn day_mode_sums_per_calendar_day_ignoring_time() {
        let meals = vec![
            meal("c", at(6, 12), 300.0, 20.0),
            meal("a", at(5, 8), 400.0, 30.0),
            meal("b", at(5, 23), 600.0, 10.0),
        ];

        let points = aggregate(&meals, ViewMode::Day);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "2026-01-05");
        assert_eq!(points[0].value("calories"), 1000.0);
        assert_eq!(points[0].value("protein"), 40.0);
        assert_eq!(points[0].value("carbs"), 20.0);
        assert_eq!(points[1].label, "2026-01-06");
        assert_eq!(points[1].value("calories"), 300.0);
    }

    #[test]
    fn day_mode_has_one_bucket_per_distinct_day() {
        let meals: Vec<MealEntry> = (0..9)
            .map(|i| meal(&i.to_string(), at(1 + i % 4, i), 100.0, 1.0))
            .collect();
        let points = aggregate(&meals, ViewMode::Day);
        assert_eq!(points.len(), 4);
        assert!(points.len() <= meals.len());
        assert!(points.windows(2).all(|pair| pair[0].label < pair[1].label));
    }

    #[test]
    fn weight_day_mode_averages_weigh_ins() {
        let weights = vec![
            weigh_in("a", at(5, 7), 80.0),
            weigh_in("b", at(5, 21), 82.0),
            weigh_in("c", at(5, 22), 84.0),
        ];
        let points = aggregate(&weights, ViewMode::Day);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value("weight"), 82.0);
    }

    #[test]
    fn single_record_gives_one_bucket_in_both_modes() {
        let meals = vec![meal("a", at(5, 9), 550.0, 25.0)];

        let days = aggregate(&meals, ViewMode::Day);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].label, "2026-01-05");
        assert_eq!(days[0].value("calories"), 550.0);

        let weeks = aggregate(&meals, ViewMode::Week);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].label, "Week of 1/5/2026");
        assert_eq!(weeks[0].value("calories"), 550.0);
    }

    #[test]
    fn week_mode_conserves_sum_totals() {
        let meals = vec![
            meal("a", at(1, 9), 500.0, 20.0),
            meal("b", at(3, 9), 700.0, 35.0),
            meal("c", at(8, 9), 650.0, 30.0),
            meal("d", at(9, 9), 800.0, 40.0),
            meal("e", at(20, 9), 450.0, 15.0),
            meal("f", at(28, 9), 900.0, 50.0),
        ];
        let days = aggregate(&meals, ViewMode::Day);
        let weeks = aggregate(&meals, ViewMode::Week);
        assert!(weeks.len() < days.len());
        for metric in ["calories", "protein", "carbs", "fat"] {
            assert_eq!(total(&weeks, metric), total(&days, metric));
        }
    }

    #[test]
    fn week_mode_mean_is_average_of_daily_means() {
        // Day 1 has three weigh-ins averaging 80, day 2 one at 90.
        let weights = vec![
            weigh_in("a", at(5, 6), 79.0),
            weigh_in("b", at(5, 12), 80.0),
            weigh_in("c", at(5, 20), 81.0),
            weigh_in("d", at(6, 6), 90.0),
        ];
        let weeks = aggregate(&weights, ViewMode::Week);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].value("weight"), 85.0);

        let global_mean = weights.iter().map(|w| w.weight).sum::<f64>() / weights.len() as f64;
        assert_ne!(weeks[0].value("weight"), global_mean);
    }

    #[test]
    fn week_windows_advance_by_fixed_stride() {
        let meals = vec![meal("a", at(1, 9), 100.0, 1.0), meal("b", at(11, 9), 200.0, 2.0)];
        let weeks = aggregate(&meals, ViewMode::Week);
        let labels: Vec<&str> = weeks.iter().map(|point| point.label.as_str()).collect();
        assert_eq!(labels, vec!["Week of 1/1/2026", "Week of 1/8/2026"]);
        assert_eq!(weeks[0].value("calories"), 100.0);
        assert_eq!(weeks[1].value("calories"), 200.0);
    }

    #[test]
    fn large_gap_advances_start_only_once_per_bucket() {
        // Day 21 is three strides away but only moves the start to day 8;
        // day 23 is then 15 days past day 8 and moves it to day 15.
        let meals = vec![
            meal("a", at(1, 9), 100.0, 1.0),
            meal("b", at(21, 9), 200.0, 2.0),
            meal("c", at(23, 9), 300.0, 3.0),
        ];
        let weeks = aggregate(&meals, ViewMode::Week);
        let labels: Vec<&str> = weeks.iter().map(|point| point.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Week of 1/1/2026", "Week of 1/8/2026", "Week of 1/15/2026"]
        );
        assert_eq!(weeks[1].value("calories"), 200.0);
        assert_eq!(weeks[2].value("calories"), 300.0);
    }

    #[test]
    fn days_within_seven_share_a_window() {
        let meals = vec![meal("a", at(1, 9), 100.0, 1.0), meal("b", at(7, 23), 200.0, 2.0)];
        let weeks = aggregate(&meals, ViewMode::Week);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].value("calories"), 300.0);
    }

    #[test]
    fn exercise_metrics_sum_reps_and_sets() {
        let exercise = |id: &str, day: u32, sets: u32, reps: u32| ExerciseEntry {
            id: id.to_string(),
            date: at(day, 18),
            movement: "Bench".to_string(),
            sets,
            reps,
            weight: 60.0,
            kind: ExerciseType::Push,
        };
        let entries = vec![exercise("a", 5, 3, 10), exercise("b", 5, 4, 8)];
        let points = aggregate(&entries, ViewMode::Day);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value("sets"), 7.0);
        assert_eq!(points[0].value("reps"), 18.0);
        assert_eq!(points[0].sums.len(), 2);
    }
}
