use crate::models::{
    AggregatePoint, ExerciseEntry, ExerciseForm, ExerciseType, MealEntry, MealForm, TrackerKind,
    ViewMode, WeightEntry, WeightForm,
};
use crate::tracker::{Trackable, Tracker};
use std::fmt::Write as _;

const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 260.0;
const PAD_X: f64 = 48.0;
const PAD_Y: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Line,
    Bar,
}

/// One plotted metric: key in the aggregate point, legend text, colour.
#[derive(Debug, Clone, Copy)]
pub struct Series {
    pub metric: &'static str,
    pub legend: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ChartSpec {
    pub title: &'static str,
    pub style: ChartStyle,
    pub series: &'static [Series],
}

/// Per-kind pieces of the tracker page.
pub trait EntryView: Trackable {
    const KIND: TrackerKind;
    const NOUN: &'static str;
    const CHARTS: [ChartSpec; 2];

    fn form_fields(draft: &Self::Form) -> String;

    fn summary(&self) -> String;

    fn heading(&self) -> String;
}

impl EntryView for MealEntry {
    const KIND: TrackerKind = TrackerKind::Diet;
    const NOUN: &'static str = "meals";
    const CHARTS: [ChartSpec; 2] = [
        ChartSpec {
            title: "Calories Over Time",
            style: ChartStyle::Line,
            series: &[Series {
                metric: "calories",
                legend: "Calories",
                color: "#ffffff",
            }],
        },
        ChartSpec {
            title: "Macronutrients Over Time",
            style: ChartStyle::Bar,
            series: &[
                Series {
                    metric: "protein",
                    legend: "Protein (g)",
                    color: "#8b5cf6",
                },
                Series {
                    metric: "carbs",
                    legend: "Carbs (g)",
                    color: "#ffc658",
                },
                Series {
                    metric: "fat",
                    legend: "Fat (g)",
                    color: "#ff7300",
                },
            ],
        },
    ];

    fn form_fields(draft: &MealForm) -> String {
        [
            text_input("name", "Meal name", &draft.name, true),
            number_input("calories", "Calories", &draft.calories, true),
            number_input("protein", "Protein (g)", &draft.protein, false),
            number_input("carbs", "Carbs (g)", &draft.carbs, false),
            number_input("fat", "Fat (g)", &draft.fat, false),
            date_input(&draft.date),
        ]
        .concat()
    }

    fn heading(&self) -> String {
        escape_html(&self.name)
    }

    fn summary(&self) -> String {
        format!(
            "{} cal | P: {}g | C: {}g | F: {}g",
            self.calories, self.protein, self.carbs, self.fat
        )
    }
}

impl EntryView for ExerciseEntry {
    const KIND: TrackerKind = TrackerKind::Exercise;
    const NOUN: &'static str = "exercises";
    const CHARTS: [ChartSpec; 2] = [
        ChartSpec {
            title: "Reps Over Time",
            style: ChartStyle::Line,
            series: &[Series {
                metric: "reps",
                legend: "Reps",
                color: "#ffffff",
            }],
        },
        ChartSpec {
            title: "Sets Over Time",
            style: ChartStyle::Bar,
            series: &[Series {
                metric: "sets",
                legend: "Sets",
                color: "#8b5cf6",
            }],
        },
    ];

    fn form_fields(draft: &ExerciseForm) -> String {
        let pull = draft.kind == ExerciseType::Pull.as_str();
        let select = format!(
            r#"<select name="type"><option value="push"{}>Push</option><option value="pull"{}>Pull</option></select>"#,
            if pull { "" } else { " selected" },
            if pull { " selected" } else { "" },
        );
        [
            text_input("movement", "Movement", &draft.movement, true),
            number_input("sets", "Sets", &draft.sets, true),
            number_input("reps", "Reps", &draft.reps, true),
            number_input("weight", "Weight", &draft.weight, true),
            select,
            date_input(&draft.date),
        ]
        .concat()
    }

    fn heading(&self) -> String {
        format!("{} ({})", escape_html(&self.movement), self.kind.as_str())
    }

    fn summary(&self) -> String {
        format!("{} sets x {} reps @ {}", self.sets, self.reps, self.weight)
    }
}

impl EntryView for WeightEntry {
    const KIND: TrackerKind = TrackerKind::Weight;
    const NOUN: &'static str = "weight entries";
    const CHARTS: [ChartSpec; 2] = [
        ChartSpec {
            title: "Weight Over Time",
            style: ChartStyle::Line,
            series: &[Series {
                metric: "weight",
                legend: "Weight",
                color: "#ffffff",
            }],
        },
        ChartSpec {
            title: "Placeholder Chart",
            style: ChartStyle::Line,
            series: &[],
        },
    ];

    fn form_fields(draft: &WeightForm) -> String {
        [
            number_input("weight", "Weight (lbs/kg)", &draft.weight, true),
            text_input("note", "Note", &draft.note, false),
            date_input(&draft.date),
        ]
        .concat()
    }

    fn heading(&self) -> String {
        self.weight.to_string()
    }

    fn summary(&self) -> String {
        self.note.as_deref().map(escape_html).unwrap_or_default()
    }
}

pub fn render_tracker<R: EntryView>(tracker: &Tracker<R>) -> String {
    let kind = R::KIND;
    let charts: String = R::CHARTS
        .iter()
        .map(|spec| render_chart_card(spec, tracker.chart()))
        .collect();

    PAGE_HTML
        .replace("{{TITLE}}", &escape_html(kind.title()))
        .replace("{{ACCENT}}", accent(kind))
        .replace("{{TABS}}", &render_tabs(kind))
        .replace("{{VIEW_TOGGLE}}", &render_view_toggle(kind, tracker.view_mode()))
        .replace("{{SLUG}}", kind.slug())
        .replace("{{FORM_FIELDS}}", &R::form_fields(tracker.draft()))
        .replace("{{ENTRIES}}", &render_entries(tracker.entries()))
        .replace("{{CHARTS}}", &charts)
}

fn accent(kind: TrackerKind) -> &'static str {
    match kind {
        TrackerKind::Diet => "#10b981",
        TrackerKind::Exercise => "#3b82f6",
        TrackerKind::Weight => "#a855f7",
    }
}

fn render_tabs(active: TrackerKind) -> String {
    TrackerKind::ALL
        .iter()
        .map(|kind| {
            let class = if *kind == active { "tab active" } else { "tab" };
            format!(
                r#"<a class="{class}" href="/{slug}">{title}</a>"#,
                slug = kind.slug(),
                title = escape_html(kind.title())
            )
        })
        .collect()
}

fn render_view_toggle(kind: TrackerKind, current: ViewMode) -> String {
    [(ViewMode::Day, "Daily View"), (ViewMode::Week, "Weekly View")]
        .iter()
        .map(|(mode, label)| {
            let class = if *mode == current { "toggle active" } else { "toggle" };
            format!(
                r#"<form method="post" action="/{slug}/view/{mode}"><button class="{class}" type="submit">{label}</button></form>"#,
                slug = kind.slug(),
                mode = mode.as_str(),
            )
        })
        .collect()
}

fn render_entries<R: EntryView>(entries: &[R]) -> String {
    if entries.is_empty() {
        return format!(r#"<p class="empty">No {} added yet.</p>"#, R::NOUN);
    }

    let mut html = String::from(r#"<ul class="entries">"#);
    for entry in entries {
        let _ = write!(
            html,
            r#"<li><div><strong>{heading}</strong><span class="date">{date}</span><span class="summary">{summary}</span></div><form method="post" action="/{slug}/entries/{id}/delete"><button class="delete" type="submit" aria-label="Delete">&#x2715;</button></form></li>"#,
            heading = entry.heading(),
            date = entry.date().format("%-m/%-d/%Y"),
            summary = entry.summary(),
            slug = R::KIND.slug(),
            id = urlencoding::encode(entry.id()),
        );
    }
    html.push_str("</ul>");
    html
}

fn render_chart_card(spec: &ChartSpec, points: &[AggregatePoint]) -> String {
    let legend: String = spec
        .series
        .iter()
        .map(|series| {
            format!(
                r#"<span class="legend-item"><i style="background:{}"></i>{}</span>"#,
                series.color, series.legend
            )
        })
        .collect();
    format!(
        r#"<section class="card chart-card"><h2>{title}</h2>{svg}<div class="legend">{legend}</div></section>"#,
        title = spec.title,
        svg = render_chart(spec, points),
    )
}

/// Inline SVG for one chart. Empty series render the axes and a notice.
pub fn render_chart(spec: &ChartSpec, points: &[AggregatePoint]) -> String {
    let mut svg = format!(
        r#"<svg class="chart" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" role="img" aria-label="{}">"#,
        spec.title
    );
    let _ = write!(
        svg,
        r#"<line class="axis" x1="{PAD_X}" y1="{base}" x2="{right}" y2="{base}" />"#,
        base = CHART_HEIGHT - PAD_Y,
        right = CHART_WIDTH - PAD_X,
    );

    if points.is_empty() || spec.series.is_empty() {
        let _ = write!(
            svg,
            r#"<text class="notice" x="{}" y="{}" text-anchor="middle">No data yet</text></svg>"#,
            CHART_WIDTH / 2.0,
            CHART_HEIGHT / 2.0
        );
        return svg;
    }

    let max = points
        .iter()
        .flat_map(|point| spec.series.iter().map(|series| point.value(series.metric)))
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let plot_width = CHART_WIDTH - 2.0 * PAD_X;
    let plot_height = CHART_HEIGHT - 2.0 * PAD_Y;
    let slot = plot_width / points.len() as f64;
    let x = |index: usize| PAD_X + slot * (index as f64 + 0.5);
    let y = |value: f64| CHART_HEIGHT - PAD_Y - value / max * plot_height;

    for step in 0..=4 {
        let value = max * f64::from(step) / 4.0;
        let _ = write!(
            svg,
            r#"<line class="grid" x1="{PAD_X}" y1="{y:.1}" x2="{right}" y2="{y:.1}" /><text class="tick" x="{tx}" y="{ty:.1}" text-anchor="end">{value:.0}</text>"#,
            y = y(value),
            right = CHART_WIDTH - PAD_X,
            tx = PAD_X - 6.0,
            ty = y(value) + 4.0,
        );
    }

    for (index, point) in points.iter().enumerate() {
        let _ = write!(
            svg,
            r#"<text class="tick" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            x(index),
            CHART_HEIGHT - PAD_Y + 18.0,
            escape_html(&point.label)
        );
    }

    match spec.style {
        ChartStyle::Line => {
            for series in spec.series {
                let path: Vec<String> = points
                    .iter()
                    .enumerate()
                    .map(|(index, point)| format!("{:.1},{:.1}", x(index), y(point.value(series.metric))))
                    .collect();
                let _ = write!(
                    svg,
                    r#"<polyline class="line" fill="none" stroke="{}" stroke-width="2" points="{}" />"#,
                    series.color,
                    path.join(" ")
                );
                for (index, point) in points.iter().enumerate() {
                    let _ = write!(
                        svg,
                        r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"><title>{}: {}</title></circle>"#,
                        x(index),
                        y(point.value(series.metric)),
                        series.color,
                        escape_html(&point.label),
                        point.value(series.metric)
                    );
                }
            }
        }
        ChartStyle::Bar => {
            let group = slot * 0.7;
            let bar = group / spec.series.len() as f64;
            for (index, point) in points.iter().enumerate() {
                let left = x(index) - group / 2.0;
                for (offset, series) in spec.series.iter().enumerate() {
                    let value = point.value(series.metric);
                    let top = y(value);
                    let _ = write!(
                        svg,
                        r#"<rect x="{:.1}" y="{top:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{}: {value}</title></rect>"#,
                        left + bar * offset as f64,
                        bar,
                        CHART_HEIGHT - PAD_Y - top,
                        series.color,
                        series.legend,
                    );
                }
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn text_input(name: &str, placeholder: &str, value: &str, required: bool) -> String {
    format!(
        r#"<input type="text" name="{name}" placeholder="{placeholder}" value="{}"{} />"#,
        escape_html(value),
        if required { " required" } else { "" }
    )
}

fn number_input(name: &str, placeholder: &str, value: &str, required: bool) -> String {
    format!(
        r#"<input type="number" step="any" min="0" name="{name}" placeholder="{placeholder}" value="{}"{} />"#,
        escape_html(value),
        if required { " required" } else { "" }
    )
}

fn date_input(value: &str) -> String {
    format!(
        r#"<input type="date" name="date" value="{}" />"#,
        escape_html(value)
    )
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} | Health Tracker</title>
  <style>
    :root {
      --accent: {{ACCENT}};
      --ink: #1f2937;
      --bg: #f3f4f6;
      --shadow: 0 12px 32px rgba(31, 41, 55, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 24px 16px 48px;
    }

    .app {
      max-width: 1200px;
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    .card {
      background: linear-gradient(90deg, var(--accent), color-mix(in srgb, var(--accent) 60%, white));
      color: #fff;
      border-radius: 12px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    h1, h2 {
      margin: 0 0 16px;
    }

    .tabs, .toggles {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .tab, .toggle {
      border: 1px solid #fff;
      border-radius: 8px;
      background: transparent;
      color: #fff;
      padding: 8px 14px;
      font: inherit;
      text-decoration: none;
      cursor: pointer;
    }

    .tab.active, .toggle.active {
      background: #fff;
      color: var(--accent);
    }

    .layout {
      display: grid;
      grid-template-columns: minmax(0, 3fr) minmax(0, 1fr);
      gap: 24px;
    }

    .panels {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 24px;
    }

    .entry-form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .entry-form input, .entry-form select {
      padding: 8px 10px;
      border: 1px solid #fff;
      border-radius: 6px;
      background: rgba(255, 255, 255, 0.15);
      color: #fff;
      font: inherit;
    }

    .entry-form button {
      grid-column: 1 / -1;
      padding: 10px;
      border: 0;
      border-radius: 6px;
      background: #fff;
      color: var(--accent);
      font-weight: 600;
      cursor: pointer;
    }

    .entries {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
      max-height: 360px;
      overflow-y: auto;
    }

    .entries li {
      display: flex;
      justify-content: space-between;
      align-items: center;
      background: rgba(255, 255, 255, 0.15);
      border-radius: 8px;
      padding: 10px 12px;
    }

    .entries li div {
      display: grid;
      gap: 2px;
    }

    .date, .summary {
      font-size: 0.85rem;
      opacity: 0.9;
    }

    .delete {
      border: 0;
      border-radius: 6px;
      background: #ef4444;
      color: #fff;
      width: 32px;
      height: 32px;
      cursor: pointer;
    }

    .chart {
      width: 100%;
      height: auto;
    }

    .chart .axis, .chart .grid {
      stroke: rgba(255, 255, 255, 0.6);
      stroke-dasharray: 3 3;
    }

    .chart .tick, .chart .notice {
      fill: #fff;
      font-size: 11px;
    }

    .legend {
      display: flex;
      gap: 12px;
      font-size: 0.85rem;
    }

    .legend-item i {
      display: inline-block;
      width: 10px;
      height: 10px;
      margin-right: 4px;
      border-radius: 2px;
    }

    @media (max-width: 900px) {
      .layout {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header class="card">
      <h1>Health Tracker</h1>
      <nav class="tabs">{{TABS}}</nav>
    </header>

    <section class="card">
      <h2>{{TITLE}}</h2>
      <div class="toggles">{{VIEW_TOGGLE}}<form method="post" action="/{{SLUG}}/refresh"><button class="toggle" type="submit">Refresh</button></form></div>
    </section>

    <div class="layout">
      <div class="panels">
        <section class="card">
          <h2>Add New Entry</h2>
          <form class="entry-form" method="post" action="/{{SLUG}}/entries">
            {{FORM_FIELDS}}
            <button type="submit">Add</button>
          </form>
        </section>

        <section class="card">
          <h2>Recent Entries</h2>
          {{ENTRIES}}
        </section>

        {{CHARTS}}
      </div>

      <aside class="card">
        <h2>Insights</h2>
        <p>Trends and suggestions will appear here once enough entries are logged.</p>
      </aside>
    </div>
  </main>
</body>
</html>
"#;
