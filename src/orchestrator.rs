use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use chrono_tz::Asia::Shanghai;
use tracing::{debug, info, warn};

use crate::classify::MemeClassifier;
use crate::config::PipelineConfig;
use crate::explain::ExplanationGenerator;
use crate::feed::FeedClient;
use crate::history::{write_records_csv, HistoryTable};
use crate::oracle::{OpenAiOracle, Oracle};
use crate::processor::process_batch;
use crate::project::write_all_projection;

pub const HISTORY_FILE: &str = "meme_data_history.csv";

/// What a finished run reports back to the caller.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub records: usize,
    /// True when the whole run operated without an oracle.
    pub degraded: bool,
}

/// One full day's pipeline: collect → classify → process → merge → project.
///
/// Only two conditions fail the run: an entirely empty candidate harvest and
/// a failed persist of the merged history (or its per-day snapshot). Oracle
/// trouble, unparsable history, and projection errors all degrade with a
/// warning and the run still produces output.
pub async fn run_daily(
    cfg: &PipelineConfig,
    today: &str,
    yesterday: &str,
    data_dir: &Path,
    display_dir: &Path,
) -> Result<RunSummary> {
    let pipeline_start = std::time::Instant::now();
    info!("Pipeline started - today={}, yesterday={}", today, yesterday);

    // 1) collect raw candidates from every source feed
    let fetch_start = std::time::Instant::now();
    let feed = FeedClient::new(cfg.feed.clone())?;
    let candidates = feed.collect_all().await;
    if candidates.is_empty() {
        bail!("No candidates collected from any source feed");
    }
    info!(
        "Collection completed - duration={:.2}s, candidates={}",
        fetch_start.elapsed().as_secs_f32(),
        candidates.len()
    );

    // 2) oracle + run-scoped caches
    let oracle: Option<Arc<dyn Oracle>> = match OpenAiOracle::from_config(&cfg.oracle)? {
        Some(o) => Some(Arc::new(o)),
        None => {
            warn!("No oracle credential configured - classification passes everything, explanations use templates");
            None
        }
    };
    let degraded = oracle.is_none();
    let mut classifier = MemeClassifier::new(oracle.clone(), cfg.oracle.classify_params());
    let mut explainer = ExplanationGenerator::new(oracle, cfg.oracle.explain_params());

    // 3) filter to genuine memes
    let classify_start = std::time::Instant::now();
    let pooled = candidates.len();
    let mut memes = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if classifier.is_meme(&candidate.name).await.value {
            memes.push(candidate);
        }
    }
    info!(
        "Classification completed - duration={:.2}s, kept={}, dropped={}",
        classify_start.elapsed().as_secs_f32(),
        memes.len(),
        pooled - memes.len()
    );
    if memes.is_empty() {
        warn!("Classifier rejected every candidate - today's slice will be empty");
    }

    // 4) prior-day table from persisted history
    let history_path = data_dir.join(HISTORY_FILE);
    let mut history = HistoryTable::load(&history_path);
    let prior_day = history.heat_by_name(yesterday);
    debug!(
        "Prior-day table - date={}, entries={}",
        yesterday,
        prior_day.len()
    );

    // 5) dedup, normalize, rank, explain, delta
    let records = process_batch(memes, &prior_day, &mut explainer, today).await;

    // 6) merge and persist; these are the only fatal writes
    history.merge(&records, today);
    history.save(&history_path)?;
    info!(
        "History persisted - path={}, records={}",
        history_path.display(),
        history.len()
    );

    let snapshot_path = data_dir.join(format!("meme_data_{today}.csv"));
    write_records_csv(&snapshot_path, &records)
        .with_context(|| format!("persisting daily snapshot to {}", snapshot_path.display()))?;
    debug!("Snapshot written - path={}", snapshot_path.display());

    // 7) project for the display surface; failure here never fails the run
    let last_update = Utc::now()
        .with_timezone(&Shanghai)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    if let Err(e) = write_all_projection(display_dir, &history, &last_update) {
        warn!("Projection failed, history is persisted regardless: {:#}", e);
    } else {
        info!("Projection written - dir={}", display_dir.display());
    }

    info!(
        "Pipeline completed - total_duration={:.2}s, records={}, degraded={}",
        pipeline_start.elapsed().as_secs_f32(),
        records.len(),
        degraded
    );
    Ok(RunSummary {
        records: records.len(),
        degraded,
    })
}
