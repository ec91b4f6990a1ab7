use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::history::HistoryTable;

const HOT_LIST_LEN: usize = 10;
const CHART_DAYS: usize = 7;
const CHART_TOP_MEMES: usize = 3;
const SERIES_COLORS: [&str; 3] = ["#1890ff", "#ff4d4f", "#52c41a"];

/// Public entry point: render the merged history into the display-ready JSON
/// files the miniprogram consumes.
pub fn write_all_projection(
    display_dir: &Path,
    history: &HistoryTable,
    last_update: &str,
) -> Result<()> {
    fs::create_dir_all(display_dir).with_context(|| format!("create {:?}", display_dir))?;

    let hot_list = build_hot_list(history);
    write_json(display_dir.join("hot_list.json"), &hot_list)?;
    debug!("Wrote hot_list.json - entries={}", hot_list.len());

    let chart = build_chart_data(history);
    write_json(display_dir.join("chart_data.json"), &chart)?;
    debug!("Wrote chart_data.json - series={}", chart.series.len());

    let info = json!({
        "last_update": last_update,
        "data_count": history.len(),
        "latest_date": history.latest_date().unwrap_or_else(|| "N/A".to_string()),
    });
    write_json(display_dir.join("update_info.json"), &info)?;
    debug!("Wrote update_info.json");

    Ok(())
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .map(|_| ())
        .map_err(|e| e.into())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct HotEntry {
    pub name: String,
    pub desc: String,
    pub heat: String, // abbreviated display label, e.g. "5.2w"
    pub trend: i64,
    pub source: String,
}

/// Ranked top list for the latest date in the history.
fn build_hot_list(history: &HistoryTable) -> Vec<HotEntry> {
    let Some(latest) = history.latest_date() else {
        return Vec::new();
    };

    let mut slice = history.slice_for(&latest);
    slice.sort_by(|a, b| b.heat.partial_cmp(&a.heat).unwrap_or(std::cmp::Ordering::Equal));

    slice
        .into_iter()
        .take(HOT_LIST_LEN)
        .map(|r| HotEntry {
            name: r.name.clone(),
            desc: r.explanation.clone(),
            heat: format_heat(r.heat),
            trend: r.heat_change_pct as i64,
            source: r.source.clone(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ChartData {
    pub dates: Vec<String>,
    pub series: Vec<serde_json::Value>,
}

/// Multi-day time series for the top memes by all-time peak heat. Heat is
/// rescaled into a 0–100 display range; a date with no record for a meme
/// carries the previous day's value forward (0 if none exists yet).
fn build_chart_data(history: &HistoryTable) -> ChartData {
    let all_dates = history.dates();
    let window: Vec<String> = all_dates
        .iter()
        .skip(all_dates.len().saturating_sub(CHART_DAYS))
        .cloned()
        .collect();

    let mut peaks: Vec<(String, f64)> = Vec::new();
    for r in history.records() {
        match peaks.iter_mut().find(|(name, _)| name == &r.name) {
            Some((_, peak)) => *peak = peak.max(r.heat),
            None => peaks.push((r.name.clone(), r.heat)),
        }
    }
    peaks.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    peaks.truncate(CHART_TOP_MEMES);

    let mut series = Vec::with_capacity(peaks.len());
    for (i, (name, _)) in peaks.iter().enumerate() {
        let mut points: Vec<f64> = Vec::with_capacity(window.len());
        for date in &window {
            let day_heat = history
                .slice_for(date)
                .into_iter()
                .find(|r| &r.name == name)
                .map(|r| scale_for_chart(r.heat));
            match day_heat {
                Some(v) => points.push(v),
                None => points.push(points.last().copied().unwrap_or(0.0)),
            }
        }

        let color = SERIES_COLORS.get(i).copied().unwrap_or(SERIES_COLORS[0]);
        series.push(json!({
            "name": name,
            "type": "line",
            "smooth": true,
            "data": points,
            "symbol": "circle",
            "symbolSize": 8,
            "emphasis": { "itemStyle": { "borderWidth": 3 } },
            "endLabel": {
                "show": true,
                "formatter": "{a}",
                "distance": 8,
                "color": color,
                "fontSize": 14
            }
        }));
    }

    ChartData {
        dates: window.iter().map(|d| date_label(d)).collect(),
        series,
    }
}

/// Linear rescale into the chart's 0–100 band, one decimal place.
fn scale_for_chart(heat: f64) -> f64 {
    let scaled = (heat / 10_000.0).clamp(0.0, 100.0);
    (scaled * 10.0).round() / 10.0
}

/// "2025-06-02" → "06月02日"; anything unparsable passes through as-is.
fn date_label(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%m月%d日").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Human-readable heat label: tens of thousands as "w", thousands as "k".
fn format_heat(heat: f64) -> String {
    if heat >= 10_000.0 {
        format!("{:.1}w", heat / 10_000.0)
    } else if heat >= 1_000.0 {
        format!("{:.1}k", heat / 1_000.0)
    } else {
        format!("{}", heat as i64)
    }
}
