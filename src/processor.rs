use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::explain::ExplanationGenerator;
use crate::models::{Candidate, MemeRecord};
use crate::normalize::normalize_heat;
use crate::trend::heat_change_pct;

/// How many ranked memes one day keeps.
pub const TOP_N: usize = 20;

/// Turn the day's candidate pool into ranked `MemeRecord`s.
///
/// Dedup is stable and first-wins, so collection order decides which source
/// (and which heat) survives a name collision. Output is rank order by
/// normalized heat, highest first, ties kept in pre-sort order.
pub async fn process_batch(
    candidates: Vec<Candidate>,
    prior_day: &HashMap<String, f64>,
    explainer: &mut ExplanationGenerator,
    today: &str,
) -> Vec<MemeRecord> {
    let pooled = candidates.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if seen.insert(c.name.clone()) {
            unique.push(c);
        }
    }
    let removed = pooled - unique.len();
    if removed > 0 {
        info!(
            "Deduplication - removed={} duplicates, retained={} unique candidates",
            removed,
            unique.len()
        );
    } else {
        debug!("Deduplication - no duplicates found, retained={}", unique.len());
    }

    let mut scored: Vec<(Candidate, f64)> = unique
        .into_iter()
        .map(|c| {
            let heat = normalize_heat(&c.raw_heat);
            (c, heat)
        })
        .collect();

    // Vec::sort_by is stable, so equal heats keep collection order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(TOP_N);
    debug!("Ranked and truncated - kept={}", scored.len());

    let mut records = Vec::with_capacity(scored.len());
    for (candidate, heat) in scored {
        let explanation = explainer.explain(&candidate.name).await;
        let change = heat_change_pct(&candidate.name, heat, prior_day);
        records.push(MemeRecord {
            date: today.to_string(),
            name: candidate.name,
            heat,
            explanation: explanation.value,
            source: candidate.source,
            heat_change_pct: change,
        });
    }

    info!("Batch processed - date={}, records={}", today, records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawHeat;
    use crate::oracle::CompletionParams;

    fn candidate(name: &str, raw_heat: RawHeat, source: &str) -> Candidate {
        Candidate {
            name: name.to_string(),
            raw_heat,
            source: source.to_string(),
        }
    }

    fn offline_explainer() -> ExplanationGenerator {
        ExplanationGenerator::new(
            None,
            CompletionParams {
                max_tokens: 200,
                temperature: 0.5,
            },
        )
    }

    #[tokio::test]
    async fn dedup_keeps_the_first_occurrence() {
        let candidates = vec![
            candidate("A", RawHeat::Number(5.0), "S1"),
            candidate("A", RawHeat::Number(9.0), "S2"),
        ];
        let records =
            process_batch(candidates, &HashMap::new(), &mut offline_explainer(), "2025-06-02")
                .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].heat, 5.0);
        assert_eq!(records[0].source, "S1");
    }

    #[tokio::test]
    async fn output_is_ranked_by_heat_descending() {
        let candidates = vec![
            candidate("低", RawHeat::Text("800".into()), "S"),
            candidate("高", RawHeat::Text("5.2万".into()), "S"),
            candidate("中", RawHeat::Number(9_000.0), "S"),
        ];
        let records =
            process_batch(candidates, &HashMap::new(), &mut offline_explainer(), "2025-06-02")
                .await;

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["高", "中", "低"]);
        assert_eq!(records[0].heat, 52_000.0);
    }

    #[tokio::test]
    async fn truncates_to_top_twenty() {
        let candidates: Vec<Candidate> = (0..30)
            .map(|i| candidate(&format!("梗{i}"), RawHeat::Number(i as f64), "S"))
            .collect();
        let records =
            process_batch(candidates, &HashMap::new(), &mut offline_explainer(), "2025-06-02")
                .await;

        assert_eq!(records.len(), TOP_N);
        assert_eq!(records[0].name, "梗29");
    }

    #[tokio::test]
    async fn ties_keep_collection_order() {
        let candidates = vec![
            candidate("先到", RawHeat::Number(100.0), "S1"),
            candidate("后到", RawHeat::Number(100.0), "S2"),
        ];
        let records =
            process_batch(candidates, &HashMap::new(), &mut offline_explainer(), "2025-06-02")
                .await;
        assert_eq!(records[0].name, "先到");
    }

    #[tokio::test]
    async fn records_carry_delta_against_prior_day() {
        let prior: HashMap<String, f64> = [("涨".to_string(), 100.0)].into();
        let candidates = vec![
            candidate("涨", RawHeat::Number(150.0), "S"),
            candidate("新", RawHeat::Number(120.0), "S"),
        ];
        let records =
            process_batch(candidates, &prior, &mut offline_explainer(), "2025-06-02").await;

        assert_eq!(records[0].heat_change_pct, 50.0);
        assert_eq!(records[1].heat_change_pct, 100.0);
        assert!(records.iter().all(|r| !r.explanation.is_empty()));
        assert!(records.iter().all(|r| r.date == "2025-06-02"));
    }
}
