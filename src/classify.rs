use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::oracle::{CompletionParams, Judged, Oracle};
use crate::prompts;

/// Decides whether a candidate topic is a genuine meme.
///
/// Memoized by exact name: the oracle is consulted at most once per distinct
/// string per run. With no oracle configured, or when a call fails, every
/// candidate passes — over-including beats starving the pipeline of a run's
/// worth of data.
pub struct MemeClassifier {
    oracle: Option<Arc<dyn Oracle>>,
    params: CompletionParams,
    cache: HashMap<String, Judged<bool>>,
}

impl MemeClassifier {
    pub fn new(oracle: Option<Arc<dyn Oracle>>, params: CompletionParams) -> Self {
        MemeClassifier {
            oracle,
            params,
            cache: HashMap::new(),
        }
    }

    pub async fn is_meme(&mut self, name: &str) -> Judged<bool> {
        if let Some(hit) = self.cache.get(name) {
            debug!("Classification cache hit - name='{}'", name);
            return hit.clone();
        }

        let judged = match &self.oracle {
            None => {
                warn!("Oracle unavailable, passing candidate through - name='{}'", name);
                Judged::fallback(true)
            }
            Some(oracle) => {
                let user = prompts::user_classify(name);
                match oracle
                    .complete(prompts::SYSTEM_CLASSIFY, &user, self.params)
                    .await
                {
                    // Only the exact affirmative token counts; "否" and any
                    // chatter around it both classify as not-a-meme.
                    Ok(answer) => Judged::oracle(answer.trim() == prompts::AFFIRMATIVE),
                    Err(e) => {
                        warn!(
                            "Oracle classification failed ('{}'): {:#}, passing candidate through",
                            name, e
                        );
                        Judged::fallback(true)
                    }
                }
            }
        };

        self.cache.insert(name.to_string(), judged.clone());
        judged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Via;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PARAMS: CompletionParams = CompletionParams {
        max_tokens: 10,
        temperature: 0.1,
    };

    struct ScriptedOracle {
        reply: Option<String>, // None means every call errors
        calls: AtomicUsize,
    }

    impl ScriptedOracle {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(ScriptedOracle {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(ScriptedOracle {
                reply: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Oracle for ScriptedOracle {
        async fn complete(&self, _: &str, _: &str, _: CompletionParams) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(r) => Ok(r.clone()),
                None => bail!("connection refused"),
            }
        }
    }

    #[tokio::test]
    async fn affirmative_token_classifies_true() {
        let oracle = ScriptedOracle::replying("是");
        let mut classifier = MemeClassifier::new(Some(oracle), PARAMS);
        let judged = classifier.is_meme("挖呀挖").await;
        assert!(judged.value);
        assert_eq!(judged.via, Via::Oracle);
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_tolerated() {
        let oracle = ScriptedOracle::replying(" 是\n");
        let mut classifier = MemeClassifier::new(Some(oracle), PARAMS);
        assert!(classifier.is_meme("显眼包").await.value);
    }

    #[tokio::test]
    async fn anything_else_classifies_false() {
        let oracle = ScriptedOracle::replying("否");
        let mut classifier = MemeClassifier::new(Some(oracle.clone()), PARAMS);
        assert!(!classifier.is_meme("某地地震").await.value);

        let chatty = ScriptedOracle::replying("是的，这是一个网络梗");
        let mut classifier = MemeClassifier::new(Some(chatty), PARAMS);
        assert!(!classifier.is_meme("某地地震").await.value);
    }

    #[tokio::test]
    async fn no_oracle_passes_everything_through() {
        let mut classifier = MemeClassifier::new(None, PARAMS);
        let judged = classifier.is_meme("任何话题").await;
        assert!(judged.value);
        assert_eq!(judged.via, Via::Fallback);
    }

    #[tokio::test]
    async fn oracle_failure_passes_candidate_through() {
        let oracle = ScriptedOracle::failing();
        let mut classifier = MemeClassifier::new(Some(oracle.clone()), PARAMS);
        let judged = classifier.is_meme("断网话题").await;
        assert!(judged.value);
        assert_eq!(judged.via, Via::Fallback);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_cache() {
        let oracle = ScriptedOracle::replying("是");
        let mut classifier = MemeClassifier::new(Some(oracle.clone()), PARAMS);

        for _ in 0..3 {
            assert!(classifier.is_meme("电子榨菜").await.value);
        }
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);

        // Failures are cached too: the oracle is never re-consulted.
        let failing = ScriptedOracle::failing();
        let mut classifier = MemeClassifier::new(Some(failing.clone()), PARAMS);
        classifier.is_meme("电子榨菜").await;
        classifier.is_meme("电子榨菜").await;
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }
}
