// src/models.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "USD".to_string()
}

/// The signed-in user as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default = "default_currency")]
    pub preferred_currency: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default = "default_currency")]
    pub preferred_currency: String,
}

impl AuthResponse {
    pub fn user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            preferred_currency: self.preferred_currency.clone(),
        }
    }
}

/// One row of the portfolio list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock_count: u32,
    pub total_value: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percentage: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// A portfolio with its holdings, as shown on the detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub holdings: Vec<StockHolding>,
    pub total_value: f64,
    #[serde(default)]
    pub total_cost: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percentage: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHolding {
    pub id: i64,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub current_price: f64,
    pub current_value: f64,
    pub profit_loss: f64,
    pub profit_loss_percentage: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub day_high: Option<f64>,
    #[serde(default)]
    pub day_low: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub percent_change: f64,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, with = "timestamp")]
    pub last_updated: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: String,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, with = "timestamp")]
    pub published_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub related_symbols: Option<String>,
}

impl NewsItem {
    /// Symbols from the comma-joined `relatedSymbols` field, trimmed, blanks dropped.
    pub fn symbols(&self) -> Vec<String> {
        self.related_symbols
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Id of a record the backend just created or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EntityRef {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CurrencyUpdate<'a> {
    pub currency: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PortfolioRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHoldingRequest<'a> {
    pub symbol: &'a str,
    pub quantity: f64,
    pub purchase_price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHoldingRequest {
    pub quantity: f64,
    pub purchase_price: f64,
}

/// Backend timestamps arrive either as local date-times (`2024-03-01T09:30:00`)
/// or RFC 3339 with an offset; both are kept as naive UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        if let Ok(ts) = raw.parse::<NaiveDateTime>() {
            return Ok(Some(ts));
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| Some(ts.naive_utc()))
            .map_err(serde::de::Error::custom)
    }
}
