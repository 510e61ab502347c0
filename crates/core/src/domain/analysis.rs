use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// One analysis as produced by the model, plus the metadata the proxy stamps on it.
///
/// `body` is the model's JSON object kept verbatim (minus `id`/`created_at`, which
/// are always ours). Use [`AnalysisResult::report`] for typed access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: i64,
    #[serde(serialize_with = "millis_rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl AnalysisResult {
    /// `id` and `created_at` come from the same instant, truncated to milliseconds.
    pub fn stamp(mut body: Map<String, Value>, now: DateTime<Utc>) -> Self {
        body.remove("id");
        body.remove("created_at");

        let created_at = now.trunc_subsecs(3);
        Self {
            id: created_at.timestamp_millis(),
            created_at,
            body,
        }
    }

    pub fn ticker(&self) -> Option<&str> {
        self.body.get("ticker").and_then(Value::as_str)
    }

    pub fn report(&self) -> AnalysisReport {
        serde_json::from_value(Value::Object(self.body.clone())).unwrap_or_default()
    }
}

/// Always three fractional digits, even on a whole second.
fn millis_rfc3339<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisReport {
    #[serde(default, deserialize_with = "lenient")]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub analysis_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub executive_summary: Option<ExecutiveSummary>,
    #[serde(default, deserialize_with = "lenient")]
    pub detailed_analysis: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecutiveSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub recommendation: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub target_price: Option<Price>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_price: Option<Price>,
    #[serde(default, deserialize_with = "lenient")]
    pub conviction_level: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub key_thesis: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub primary_catalysts: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub key_risks: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub time_horizon: Option<String>,
}

/// The model is asked for a number but frequently answers with a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Number(n) => write!(f, "{n}"),
            Price::Text(s) => f.write_str(s.trim_start_matches('$')),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
    Unrated,
}

impl Rating {
    pub fn from_recommendation(recommendation: Option<&str>) -> Self {
        match recommendation.map(|r| r.trim().to_lowercase()).as_deref() {
            Some("strong buy") => Rating::StrongBuy,
            Some("buy") => Rating::Buy,
            Some("hold") | Some("neutral") => Rating::Hold,
            Some("sell") => Rating::Sell,
            Some("strong sell") => Rating::StrongSell,
            _ => Rating::Unrated,
        }
    }

    pub fn is_bullish(self) -> bool {
        matches!(self, Rating::StrongBuy | Rating::Buy)
    }

    pub fn is_bearish(self) -> bool {
        matches!(self, Rating::Sell | Rating::StrongSell)
    }
}

impl AnalysisReport {
    pub fn rating(&self) -> Rating {
        Rating::from_recommendation(
            self.executive_summary
                .as_ref()
                .and_then(|s| s.recommendation.as_deref()),
        )
    }

    /// Detailed report sections as (key, text) pairs. Non-string values are
    /// rendered as compact JSON.
    pub fn sections(&self) -> Vec<(String, String)> {
        let Some(detailed) = &self.detailed_analysis else {
            return Vec::new();
        };
        detailed
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
