use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::MemeRecord;

/// The append-only historical table, one row per `(date, name)`.
///
/// Loaded in full, mutated once per run via `merge`, then rewritten in full.
/// A missing or unparsable file is an empty history, not a failed run; only
/// the final persist is allowed to fail the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    records: Vec<MemeRecord>,
}

impl HistoryTable {
    pub fn new() -> Self {
        HistoryTable::default()
    }

    pub fn from_records(records: Vec<MemeRecord>) -> Self {
        HistoryTable { records }
    }

    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            warn!("History file missing, starting empty - path={}", path.display());
            return HistoryTable::new();
        }
        match read_records_csv(path) {
            Ok(records) => {
                debug!(
                    "History loaded - path={}, records={}",
                    path.display(),
                    records.len()
                );
                HistoryTable { records }
            }
            Err(e) => {
                warn!(
                    "History file unreadable, starting empty - path={}, error={:#}",
                    path.display(),
                    e
                );
                HistoryTable::new()
            }
        }
    }

    /// Upsert today's slice: every record already carrying `today` is dropped
    /// and the new batch appended, so a same-day re-run replaces rather than
    /// accumulates. Applying the same batch twice is a no-op the second time.
    pub fn merge(&mut self, todays_records: &[MemeRecord], today: &str) {
        let before = self.records.len();
        self.records.retain(|r| r.date != today);
        let replaced = before - self.records.len();
        if replaced > 0 {
            debug!("Replacing existing slice for {} - records={}", today, replaced);
        }
        self.records.extend_from_slice(todays_records);
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_records_csv(path, &self.records)
            .with_context(|| format!("persisting history to {}", path.display()))
    }

    /// Heat per name for one date, first occurrence winning. This is the
    /// prior-day table the trend calculator consumes.
    pub fn heat_by_name(&self, date: &str) -> HashMap<String, f64> {
        let mut out = HashMap::new();
        for r in self.records.iter().filter(|r| r.date == date) {
            out.entry(r.name.clone()).or_insert(r.heat);
        }
        out
    }

    pub fn slice_for(&self, date: &str) -> Vec<&MemeRecord> {
        self.records.iter().filter(|r| r.date == date).collect()
    }

    /// Distinct dates in ascending calendar order (ISO dates sort lexically).
    pub fn dates(&self) -> Vec<String> {
        let mut dates: Vec<String> = self.records.iter().map(|r| r.date.clone()).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    pub fn latest_date(&self) -> Option<String> {
        self.dates().pop()
    }

    pub fn records(&self) -> &[MemeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_records_csv(path: &Path) -> Result<Vec<MemeRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Full rewrite of a record set as CSV. Shared by the history table and the
/// per-day snapshot file.
pub fn write_records_csv(path: &Path, records: &[MemeRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn record(date: &str, name: &str, heat: f64) -> MemeRecord {
        MemeRecord {
            date: date.to_string(),
            name: name.to_string(),
            heat,
            explanation: "与测试相关的网络流行语".to_string(),
            source: "微博热搜".to_string(),
            heat_change_pct: 0.0,
        }
    }

    #[test]
    fn merge_replaces_todays_slice_and_keeps_the_rest() {
        let mut history = HistoryTable::from_records(vec![
            record("2025-06-01", "老梗", 900.0),
            record("2025-06-02", "旧榜", 500.0),
        ]);
        let todays = vec![record("2025-06-02", "新梗", 52_000.0)];

        history.merge(&todays, "2025-06-02");

        assert_eq!(history.len(), 2);
        assert_eq!(history.slice_for("2025-06-01").len(), 1);
        assert_eq!(history.slice_for("2025-06-02")[0].name, "新梗");
    }

    #[test]
    fn merge_is_idempotent() {
        let base = HistoryTable::from_records(vec![record("2025-06-01", "老梗", 900.0)]);
        let todays = vec![
            record("2025-06-02", "梗A", 52_000.0),
            record("2025-06-02", "梗B", 800.0),
        ];

        let mut once = base.clone();
        once.merge(&todays, "2025-06-02");

        let mut twice = base;
        twice.merge(&todays, "2025-06-02");
        twice.merge(&todays, "2025-06-02");

        assert_eq!(once, twice);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = HistoryTable::load(&dir.path().join("nope.csv"));
        assert!(table.is_empty());
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meme_data_history.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "this is not,a history\nfile at all").unwrap();

        let table = HistoryTable::load(&path);
        assert!(table.is_empty());
    }

    #[test]
    fn save_then_load_preserves_all_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meme_data_history.csv");

        let mut history = HistoryTable::from_records(vec![
            record("2025-06-01", "老梗", 900.0),
            record("2025-06-02", "梗A", 52_000.0),
        ]);
        history.merge(&[record("2025-06-03", "梗B", 800.0)], "2025-06-03");
        history.save(&path).unwrap();

        let reloaded = HistoryTable::load(&path);
        assert_eq!(reloaded, history);
        assert_eq!(
            reloaded.dates(),
            vec!["2025-06-01", "2025-06-02", "2025-06-03"]
        );
        assert_eq!(reloaded.latest_date().as_deref(), Some("2025-06-03"));
    }

    #[test]
    fn heat_by_name_first_occurrence_wins() {
        let history = HistoryTable::from_records(vec![
            record("2025-06-01", "梗A", 100.0),
            record("2025-06-01", "梗A", 999.0),
            record("2025-06-02", "梗A", 500.0),
        ]);
        let prior = history.heat_by_name("2025-06-01");
        assert_eq!(prior.get("梗A"), Some(&100.0));
    }
}
