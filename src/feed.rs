use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::{BiliSearchSquare, WeiboHotSearch};
use crate::config::FeedConfig;
use crate::models::{Candidate, RawHeat};

const WEIBO_HOT_SEARCH_URL: &str = "https://weibo.com/ajax/side/hotSearch";
const BILI_SEARCH_SQUARE_URL: &str = "https://api.bilibili.com/x/web-interface/search/square";

pub const SOURCE_WEIBO: &str = "微博热搜";
pub const SOURCE_BILIBILI: &str = "B站热搜";

/// Fetches raw trending-topic candidates from the configured origins.
///
/// Each source fails soft: a dead endpoint logs a warning and contributes
/// nothing, and only the caller decides whether an entirely empty harvest is
/// fatal.
pub struct FeedClient {
    client: Client,
    cfg: FeedConfig,
}

impl FeedClient {
    pub fn new(cfg: FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("building feed HTTP client")?;
        Ok(FeedClient { client, cfg })
    }

    /// Run every collector in order and pool the results. Collection order is
    /// preserved because it decides which source wins a name collision
    /// downstream.
    pub async fn collect_all(&self) -> Vec<Candidate> {
        let mut pooled = Vec::new();

        match self.collect_weibo().await {
            Ok(mut candidates) => {
                info!("Weibo collection completed - candidates={}", candidates.len());
                pooled.append(&mut candidates);
            }
            Err(e) => warn!("Weibo collection failed: {:#}", e),
        }

        match self.collect_bilibili().await {
            Ok(mut candidates) => {
                info!("Bilibili collection completed - candidates={}", candidates.len());
                pooled.append(&mut candidates);
            }
            Err(e) => warn!("Bilibili collection failed: {:#}", e),
        }

        pooled
    }

    async fn collect_weibo(&self) -> Result<Vec<Candidate>> {
        let start = std::time::Instant::now();
        debug!("Fetching Weibo hot search");

        let resp = self
            .client
            .get(WEIBO_HOT_SEARCH_URL)
            .send()
            .await
            .with_context(|| format!("Request failed for {}", WEIBO_HOT_SEARCH_URL))?
            .error_for_status()
            .with_context(|| format!("HTTP error for {}", WEIBO_HOT_SEARCH_URL))?;

        let body: WeiboHotSearch = resp
            .json()
            .await
            .with_context(|| format!("Decoding JSON for {}", WEIBO_HOT_SEARCH_URL))?;

        let topics = body.data.map(|d| d.realtime).unwrap_or_default();
        let candidates: Vec<Candidate> = topics
            .into_iter()
            .take(self.cfg.max_topics_per_source)
            .map(|t| Candidate {
                name: t.word,
                raw_heat: t.num.unwrap_or(RawHeat::Number(0.0)),
                source: SOURCE_WEIBO.to_string(),
            })
            .collect();

        debug!(
            "Weibo fetch completed - duration={:.2}s, topics={}",
            start.elapsed().as_secs_f32(),
            candidates.len()
        );
        Ok(candidates)
    }

    async fn collect_bilibili(&self) -> Result<Vec<Candidate>> {
        let start = std::time::Instant::now();
        let url = format!("{}?limit={}", BILI_SEARCH_SQUARE_URL, self.cfg.bilibili_limit);
        debug!("Fetching Bilibili trending - url={}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request failed for {}", url))?
            .error_for_status()
            .with_context(|| format!("HTTP error for {}", url))?;

        let body: BiliSearchSquare = resp
            .json()
            .await
            .with_context(|| format!("Decoding JSON for {}", url))?;

        if body.code != 0 {
            anyhow::bail!("Bilibili API returned code {}", body.code);
        }

        let topics = body
            .data
            .and_then(|d| d.trending)
            .map(|t| t.list)
            .unwrap_or_default();
        let candidates: Vec<Candidate> = topics
            .into_iter()
            .take(self.cfg.max_topics_per_source)
            .map(|t| Candidate {
                name: t.keyword,
                raw_heat: t.heat_score.unwrap_or(RawHeat::Number(0.0)),
                source: SOURCE_BILIBILI.to_string(),
            })
            .collect();

        debug!(
            "Bilibili fetch completed - duration={:.2}s, topics={}",
            start.elapsed().as_secs_f32(),
            candidates.len()
        );
        Ok(candidates)
    }
}
