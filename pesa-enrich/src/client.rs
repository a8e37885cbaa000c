//! Remote enrichment client: the contract the orchestrator depends on,
//! plus an HTTP implementation against an OpenAI-compatible chat endpoint.
//!
//! The model is asked for strict JSON; anything unparsable is an error and
//! goes back through the retry wrapper like a transport failure.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::cache::{EnrichedData, MerchantInfo};
use crate::retry::{RetryPolicy, with_backoff};

/// A learned categorization example, passed along to bias the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryExample {
    pub description: String,
    pub merchant: String,
    pub category: String,
}

/// One unresolved description in a batch request. `index` is the caller's
/// position in its own collection and must come back on the output.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub index: usize,
    pub description: String,
    pub cache_key: String,
    pub identified_merchant: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResolution {
    pub index: usize,
    pub data: EnrichedData,
}

#[allow(async_fn_in_trait)]
pub trait RemoteEnricher {
    /// Resolve one description. `merchant_hint` biases the task toward
    /// categorization when a heuristic already identified the merchant.
    async fn resolve_one(
        &self,
        description: &str,
        merchant_hint: Option<&str>,
        examples: &[CategoryExample],
    ) -> Result<EnrichedData>;

    /// Resolve a batch in a single round-trip.
    async fn resolve_batch(
        &self,
        items: &[BatchItem],
        examples: &[CategoryExample],
    ) -> Result<Vec<BatchResolution>>;

    /// Spot-check whether a cached category still fits a description.
    /// Non-critical: callers use a single-attempt policy.
    async fn validate_category(&self, description: &str, category: &str) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct EnricherConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

pub struct HttpEnricher {
    config: EnricherConfig,
    client: reqwest::Client,
    retry: RetryPolicy,
}

const SYSTEM_PROMPT: &str = "You are a financial transaction enrichment service. \
Given a raw bank or mobile-money statement line, identify the merchant and a \
spending category. Respond with strict JSON only, no prose and no code fences.";

impl HttpEnricher {
    pub fn new(config: EnricherConfig, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;
        Ok(Self {
            config,
            client,
            retry,
        })
    }

    async fn chat(&self, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: &self.config.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
        };

        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("enrichment request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("enrichment service error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse enrichment response")?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        Ok(content.trim().to_string())
    }

    fn examples_block(examples: &[CategoryExample]) -> String {
        if examples.is_empty() {
            return String::new();
        }
        let mut s = String::from("\nKnown examples (description => merchant, category):\n");
        for ex in examples {
            s.push_str(&format!(
                "- {} => {}, {}\n",
                ex.description, ex.merchant, ex.category
            ));
        }
        s
    }
}

/// Strip accidental markdown fences before JSON parsing.
fn json_payload(text: &str) -> &str {
    let t = text.trim();
    let t = t.strip_prefix("```json").or_else(|| t.strip_prefix("```")).unwrap_or(t);
    t.strip_suffix("```").unwrap_or(t).trim()
}

#[derive(Deserialize)]
struct WireEnrichment {
    merchant: String,
    category: String,
    #[serde(default)]
    official_name: Option<String>,
    #[serde(default)]
    website: Option<String>,
}

impl WireEnrichment {
    fn into_data(self) -> EnrichedData {
        let enriched_info = self.official_name.map(|official_name| MerchantInfo {
            official_name,
            website: self.website,
        });
        EnrichedData {
            merchant: self.merchant,
            category: self.category,
            enriched_info,
        }
    }
}

#[derive(Deserialize)]
struct WireBatchEnrichment {
    index: usize,
    #[serde(flatten)]
    item: WireEnrichment,
}

impl RemoteEnricher for HttpEnricher {
    async fn resolve_one(
        &self,
        description: &str,
        merchant_hint: Option<&str>,
        examples: &[CategoryExample],
    ) -> Result<EnrichedData> {
        let hint = match merchant_hint {
            Some(m) => format!("\nThe merchant was already identified as \"{m}\"; keep it and only categorize."),
            None => String::new(),
        };
        let prompt = format!(
            "Statement line: {description}{hint}{examples}\n\
             Reply as {{\"merchant\": str, \"category\": str, \"official_name\": str|null, \"website\": str|null}}",
            examples = Self::examples_block(examples),
        );

        with_backoff(self.retry, "enrich one", || async {
            let text = self.chat(&prompt).await?;
            debug!("enrichment reply: {text}");
            let wire: WireEnrichment =
                serde_json::from_str(json_payload(&text)).context("malformed enrichment JSON")?;
            Ok(wire.into_data())
        })
        .await
    }

    async fn resolve_batch(
        &self,
        items: &[BatchItem],
        examples: &[CategoryExample],
    ) -> Result<Vec<BatchResolution>> {
        let mut listing = String::new();
        for item in items {
            match &item.identified_merchant {
                Some(m) => listing.push_str(&format!(
                    "{}: {} (merchant already identified: {m})\n",
                    item.index, item.description
                )),
                None => listing.push_str(&format!("{}: {}\n", item.index, item.description)),
            }
        }
        let prompt = format!(
            "Statement lines, one per row as index: description\n{listing}{examples}\
             Reply as a JSON array of {{\"index\": int, \"merchant\": str, \"category\": str, \
             \"official_name\": str|null, \"website\": str|null}}, one entry per input row.",
            examples = Self::examples_block(examples),
        );

        with_backoff(self.retry, "enrich batch", || async {
            let text = self.chat(&prompt).await?;
            debug!("batch enrichment reply: {text}");
            let wire: Vec<WireBatchEnrichment> =
                serde_json::from_str(json_payload(&text)).context("malformed batch JSON")?;
            Ok(wire
                .into_iter()
                .map(|w| BatchResolution {
                    index: w.index,
                    data: w.item.into_data(),
                })
                .collect())
        })
        .await
    }

    async fn validate_category(&self, description: &str, category: &str) -> Result<bool> {
        let prompt = format!(
            "Statement line: {description}\nAssigned category: {category}\n\
             Does the category fit? Reply as {{\"matches\": bool}}"
        );

        #[derive(Deserialize)]
        struct WireVerdict {
            matches: bool,
        }

        with_backoff(RetryPolicy::single(), "validate category", || async {
            let text = self.chat(&prompt).await?;
            let wire: WireVerdict =
                serde_json::from_str(json_payload(&text)).context("malformed verdict JSON")?;
            Ok(wire.matches)
        })
        .await
    }
}
