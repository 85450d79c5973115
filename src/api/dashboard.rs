//! Server-rendered dashboard page at `GET /`.
//!
//! The page is assembled with `format!`; every value that came from a device
//! goes through [`html_escape`] first.

use std::fmt::Write;

use axum::{extract::State, http::StatusCode, response::Html};
use chrono::{DateTime, Duration, Utc};
use tracing::error;

use super::AppState;
use crate::readings::{Reading, Summary};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything the page shows, gathered before rendering starts.
pub struct DashboardView {
    pub latest: Vec<Reading>,
    pub alerts: Vec<Reading>,
    pub summary: Summary,
    pub now: DateTime<Utc>,
}

/// HTML dashboard: summary, latest reading per context, recent alerts.
///
/// On failure an error page is rendered with status 500.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Dashboard page", content_type = "text/html", body = String),
        (status = 500, description = "Error page", content_type = "text/html", body = String),
    ),
    tag = "dashboard"
)]
pub async fn index(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    match load(&state).await {
        Ok(view) => (StatusCode::OK, Html(render_dashboard(&view))),
        Err(e) => {
            error!(error = %e, "Error generating dashboard page");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_error()))
        }
    }
}

async fn load(state: &AppState) -> anyhow::Result<DashboardView> {
    let window = Duration::hours(state.dashboard.window_hours);
    let latest = state.aggregator.latest_readings().await?;
    let alerts = state
        .aggregator
        .recent_alerts(window, state.dashboard.alerts_limit)
        .await?;
    let summary = state.aggregator.summary().await;

    Ok(DashboardView {
        latest,
        alerts,
        summary,
        now: Utc::now(),
    })
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let s = &view.summary;
    let last_update = s
        .last_update
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "never".to_owned());

    let mut latest_rows = String::new();
    for r in &view.latest {
        let _ = write!(
            latest_rows,
            "<tr><td>{}</td><td>{:.1} &deg;C</td><td>{:.1} %</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{:.1} hPa</td><td>{} dBm</td><td>{}</td></tr>",
            html_escape(&r.context),
            r.temperature,
            r.humidity,
            r.co_level,
            r.co2_level,
            r.air_quality,
            r.light_level,
            r.pressure,
            r.signal_strength,
            r.timestamp.format(TIME_FORMAT),
        );
    }
    if view.latest.is_empty() {
        latest_rows.push_str(r#"<tr><td colspan="10" class="empty">No readings yet</td></tr>"#);
    }

    let mut alert_rows = String::new();
    for r in &view.alerts {
        let _ = write!(
            alert_rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            r.timestamp.format(TIME_FORMAT),
            html_escape(&r.context),
            html_escape(&r.level),
            html_escape(&r.alert),
        );
    }
    if view.alerts.is_empty() {
        alert_rows.push_str(r#"<tr><td colspan="4" class="empty">No recent alerts</td></tr>"#);
    }

    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="60">
<title>Weather dashboard</title>
<style>
  body {{ font-family: system-ui; padding: 2rem; background: #1a1a2e; color: #eee; }}
  .cards {{ display: flex; gap: 1rem; flex-wrap: wrap; }}
  .card {{ background: #16213e; padding: 1rem 1.5rem; border-radius: 8px; }}
  .card b {{ display: block; font-size: 1.6rem; }}
  table {{ border-collapse: collapse; width: 100%; margin-top: 1rem; }}
  th, td {{ padding: 0.4rem 0.8rem; border-bottom: 1px solid #333; text-align: left; }}
  .empty {{ color: #888; }}
</style>
</head>
<body>
<h1>Weather dashboard</h1>
<p>Generated {now}</p>
<div class="cards">
  <div class="card"><b>{total}</b>records</div>
  <div class="card"><b>{contexts}</b>active contexts</div>
  <div class="card"><b>{day}</b>records (24h)</div>
  <div class="card"><b>{day_alerts}</b>alerts (24h)</div>
  <div class="card"><b>{last_update}</b>last update</div>
</div>
<h2>Latest readings</h2>
<table>
<tr><th>Context</th><th>Temperature</th><th>Humidity</th><th>CO</th><th>CO2</th><th>Air quality</th><th>Light</th><th>Pressure</th><th>Signal</th><th>Time</th></tr>
{latest_rows}
</table>
<h2>Recent alerts</h2>
<table>
<tr><th>Time</th><th>Context</th><th>Level</th><th>Alert</th></tr>
{alert_rows}
</table>
</body>
</html>"#,
        now = view.now.format(TIME_FORMAT),
        total = s.total_records,
        contexts = s.active_contexts,
        day = s.records_last_24h,
        day_alerts = s.alerts_last_24h,
    )
}

pub fn render_error() -> String {
    r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Weather dashboard - error</title></head>
<body style="font-family: system-ui; padding: 2rem; background: #1a1a2e; color: #eee;">
    <h1 style="color: #ff6b6b;">Dashboard unavailable</h1>
    <p>The readings could not be loaded. Details have been logged; try again shortly.</p>
</body>
</html>"#
        .to_owned()
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
