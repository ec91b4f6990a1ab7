use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::OracleConfig;

/// Per-call sampling knobs. Classification and explanation use different
/// budgets, so these travel with the request rather than the client.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// How a value was produced: a real oracle answer, or the local fallback
/// taken when the oracle is unconfigured or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via {
    Oracle,
    Fallback,
}

/// A value plus its provenance, so callers can tell degraded results from
/// confident ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Judged<T> {
    pub value: T,
    pub via: Via,
}

impl<T> Judged<T> {
    pub fn oracle(value: T) -> Self {
        Judged { value, via: Via::Oracle }
    }

    pub fn fallback(value: T) -> Self {
        Judged { value, via: Via::Fallback }
    }
}

/// The remote text-completion service, seam included so tests can substitute
/// a counting fake.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, system: &str, user: &str, params: CompletionParams)
        -> Result<String>;
}

/// Production oracle over an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiOracle {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiOracle {
    /// Build the client, or `None` when no credential is configured — the
    /// caller then routes every lookup through the local fallback path
    /// instead of failing per-call.
    pub fn from_config(cfg: &OracleConfig) -> Result<Option<Self>> {
        let Some(api_key) = cfg.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = cfg.api_base.as_deref().filter(|b| !b.trim().is_empty()) {
            openai_config = openai_config.with_api_base(base);
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("building oracle HTTP client")?;

        let client = Client::with_config(openai_config).with_http_client(http_client);

        Ok(Some(OpenAiOracle {
            client,
            model: cfg.model.clone(),
        }))
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: CompletionParams,
    ) -> Result<String> {
        let start = std::time::Instant::now();
        debug!("Oracle call starting - prompt_length={} chars", user.len());

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(messages)
            .max_tokens(params.max_tokens)
            .temperature(params.temperature)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("oracle response contained no choices"))?
            .message
            .content
            .unwrap_or_default();

        let elapsed = start.elapsed();
        info!(
            "Oracle call completed - duration={:.2}s, response_length={} chars",
            elapsed.as_secs_f32(),
            answer.len()
        );

        Ok(answer)
    }
}
