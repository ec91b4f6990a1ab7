use serde::{Deserialize, Serialize};

/// Heat as reported by a source: some feeds give plain numbers, others give
/// display strings like "1.2万" or "5200w". Kept raw until normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawHeat {
    Number(f64),
    Text(String),
}

impl From<&str> for RawHeat {
    fn from(s: &str) -> Self {
        RawHeat::Text(s.to_string())
    }
}

impl From<f64> for RawHeat {
    fn from(n: f64) -> Self {
        RawHeat::Number(n)
    }
}

/// One trending topic as pooled from a source feed. No identity beyond
/// `name` within a run; collection order matters for dedup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub raw_heat: RawHeat,
    pub source: String,
}

/// The unit of historical state, keyed by `(date, name)`. Column names match
/// the CSV layout the miniprogram side already consumes, so history files
/// written by earlier versions of the pipeline keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemeRecord {
    #[serde(rename = "更新日期")]
    pub date: String, // "YYYY-MM-DD"
    #[serde(rename = "梗的名称")]
    pub name: String,
    #[serde(rename = "热度")]
    pub heat: f64,
    #[serde(rename = "梗的简单解释")]
    pub explanation: String,
    #[serde(rename = "梗的来源")]
    pub source: String,
    #[serde(rename = "环比昨天热度变化")]
    pub heat_change_pct: f64,
}
