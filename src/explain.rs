use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::oracle::{CompletionParams, Judged, Oracle};
use crate::prompts;

const GENERIC_EXPLANATION: &str = "当下流行的网络热梗";

/// Function words that make useless keywords.
const STOPWORDS: &[&str] = &[
    "的", "了", "是", "我", "你", "他", "她", "它", "们", "在", "有", "和", "与", "就",
    "都", "而", "及", "这", "那", "被", "把", "着", "吗", "吧", "呢", "啊",
];

/// Produces a short human-readable gloss for a meme name.
///
/// Memoized by exact name with the same one-oracle-call-per-key guarantee as
/// the classifier. Every path is total: when the oracle is unconfigured or a
/// call fails, a keyword-template explanation is produced locally instead.
pub struct ExplanationGenerator {
    oracle: Option<Arc<dyn Oracle>>,
    params: CompletionParams,
    cache: HashMap<String, Judged<String>>,
}

impl ExplanationGenerator {
    pub fn new(oracle: Option<Arc<dyn Oracle>>, params: CompletionParams) -> Self {
        ExplanationGenerator {
            oracle,
            params,
            cache: HashMap::new(),
        }
    }

    pub async fn explain(&mut self, name: &str) -> Judged<String> {
        if let Some(hit) = self.cache.get(name) {
            debug!("Explanation cache hit - name='{}'", name);
            return hit.clone();
        }

        let judged = match &self.oracle {
            None => Judged::fallback(template_explanation(name)),
            Some(oracle) => {
                let user = prompts::user_explain(name);
                match oracle
                    .complete(prompts::SYSTEM_EXPLAIN, &user, self.params)
                    .await
                {
                    Ok(answer) => Judged::oracle(answer.trim().to_string()),
                    Err(e) => {
                        warn!(
                            "Oracle explanation failed ('{}'): {:#}, using template",
                            name, e
                        );
                        Judged::fallback(template_explanation(name))
                    }
                }
            }
        };

        self.cache.insert(name.to_string(), judged.clone());
        judged
    }
}

fn template_explanation(name: &str) -> String {
    let keywords = extract_keywords(name, 2);
    if keywords.is_empty() {
        GENERIC_EXPLANATION.to_string()
    } else {
        format!("与{}相关的网络流行语", keywords.join("、"))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RunKind {
    Han,
    Word,
    Separator,
}

fn is_han(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}

fn grapheme_kind(g: &str) -> RunKind {
    match g.chars().next() {
        Some(c) if is_han(c) => RunKind::Han,
        Some(c) if c.is_alphanumeric() => RunKind::Word,
        _ => RunKind::Separator,
    }
}

/// Salient-keyword heuristic standing in for a proper segmenter: the name is
/// split into same-script runs (Han, Latin/digit words), pure-digit runs and
/// stopwords are dropped, and the longest runs win.
fn extract_keywords(name: &str, max: usize) -> Vec<String> {
    let mut runs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_kind = RunKind::Separator;

    for g in name.graphemes(true) {
        let kind = grapheme_kind(g);
        if kind == RunKind::Separator || (kind != current_kind && !current.is_empty()) {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if kind != RunKind::Separator {
            current.push_str(g);
            current_kind = kind;
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    let mut seen = HashSet::new();
    let mut keywords: Vec<String> = runs
        .into_iter()
        .filter(|r| !r.chars().all(|c| c.is_ascii_digit()))
        .filter(|r| !STOPWORDS.contains(&r.as_str()))
        .filter(|r| seen.insert(r.clone()))
        .collect();

    // Stable sort keeps collection order among equal-length runs.
    keywords.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));
    keywords.truncate(max);
    keywords
}
