//! LLM assistant service
//!
//! Natural-language access to the business data. The assistant only ever
//! reads through the aggregate reporting queries; it has no write path.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::{groq::ChatMessage, GroqClient};
use crate::services::{ReportCache, ReportService};

/// Assistant service
#[derive(Clone)]
pub struct AssistantService {
    reports: ReportService,
    groq: GroqClient,
}

/// Answer to a natural-language question
#[derive(Debug, Serialize)]
pub struct AssistantAnswer {
    pub answer: String,
    pub intent: String,
}

/// Intent classification returned by the model
#[derive(Debug, Deserialize)]
struct QueryIntent {
    action: String,
    #[serde(default)]
    days: Option<i64>,
    #[serde(default)]
    from: Option<DateTime<Utc>>,
    #[serde(default)]
    to: Option<DateTime<Utc>>,
}

const INTENT_PROMPT: &str = "You classify questions about a retail shop's data. \
Respond with ONLY a JSON object, no prose: \
{\"action\": one of \"report_summary\", \"low_stock_list\", \"top_products\", \"general\", \
\"days\": optional integer lookback window, \
\"from\"/\"to\": optional RFC 3339 timestamps}.";

const ANSWER_PROMPT: &str = "You are a friendly business mentor who explains store \
performance in simple, encouraging language. Answer the owner's question using only \
the provided data. Be specific with numbers and product names. Keep it short.";

const INSIGHTS_PROMPT: &str = "You are a friendly business mentor helping a store owner \
succeed. Given a snapshot of the shop's data, provide 3-5 bullet points of specific, \
actionable recommendations in everyday language. Avoid business jargon.";

impl AssistantService {
    pub fn new(db: PgPool, cache: Arc<ReportCache>, config: &Config) -> Self {
        Self {
            reports: ReportService::new(db, cache),
            groq: GroqClient::new(&config.groq),
        }
    }

    /// Answer a natural-language question about the business
    pub async fn query(&self, question: &str) -> AppResult<AssistantAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation {
                field: "query".to_string(),
                message: "Query is required".to_string(),
            });
        }

        let intent = self.classify(question).await;
        let data = self.gather(&intent).await?;

        let answer = self
            .groq
            .chat(&[
                ChatMessage::system(ANSWER_PROMPT),
                ChatMessage::user(format!(
                    "Question: {}\n\nBusiness data: {}",
                    question, data
                )),
            ])
            .await?;

        Ok(AssistantAnswer {
            answer,
            intent: intent.action,
        })
    }

    /// Narrative insights over the last 30 days
    pub async fn insights(&self) -> AppResult<String> {
        let context = self.business_context().await?;

        self.groq
            .chat(&[
                ChatMessage::system(INSIGHTS_PROMPT),
                ChatMessage::user(format!("Current business snapshot: {}", context)),
            ])
            .await
    }

    /// Ask the model to classify the question; fall back to a general
    /// context answer when the reply is not parseable JSON
    async fn classify(&self, question: &str) -> QueryIntent {
        let reply = self
            .groq
            .chat(&[
                ChatMessage::system(INTENT_PROMPT),
                ChatMessage::user(question.to_string()),
            ])
            .await;

        match reply {
            Ok(text) => serde_json::from_str(text.trim()).unwrap_or(QueryIntent {
                action: "general".to_string(),
                days: None,
                from: None,
                to: None,
            }),
            Err(err) => {
                tracing::warn!("Intent classification failed: {}", err);
                QueryIntent {
                    action: "general".to_string(),
                    days: None,
                    from: None,
                    to: None,
                }
            }
        }
    }

    async fn gather(&self, intent: &QueryIntent) -> AppResult<serde_json::Value> {
        match intent.action.as_str() {
            "report_summary" => {
                let from = intent
                    .from
                    .unwrap_or_else(|| Utc::now() - Duration::days(intent.days.unwrap_or(30)));
                let summary = self.reports.summary(Some(from), intent.to).await?;
                Ok(json!({ "summary": summary }))
            }
            "low_stock_list" => {
                let products = self
                    .reports
                    .low_stock(crate::services::report::DEFAULT_LOW_STOCK_LIMIT)
                    .await?;
                Ok(json!({ "low_stock_products": products }))
            }
            "top_products" => {
                let days = intent.days.unwrap_or(30);
                let products = self.reports.top_products(days, 10).await?;
                Ok(json!({ "top_products": products, "period_days": days }))
            }
            _ => self.business_context().await,
        }
    }

    /// Snapshot of the last 30 days assembled from the reporting queries
    async fn business_context(&self) -> AppResult<serde_json::Value> {
        let from = Utc::now() - Duration::days(30);

        let summary = self.reports.summary(Some(from), None).await?;
        let top_products = self.reports.top_products(30, 10).await?;
        let low_stock = self
            .reports
            .low_stock(crate::services::report::DEFAULT_LOW_STOCK_LIMIT)
            .await?;

        let low_stock_count = low_stock.len();
        let is_loss_making = summary.net_profit.is_sign_negative();

        Ok(json!({
            "period": "last 30 days",
            "summary": summary,
            "top_products": top_products,
            "low_stock_products": low_stock,
            "alerts": {
                "low_stock_count": low_stock_count,
                "is_loss_making": is_loss_making,
            },
        }))
    }
}
