// src/api.rs
use std::sync::Arc;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{ApiError, ErrorBody};
use crate::models::{
    AddHoldingRequest, AuthResponse, CurrencyUpdate, EntityRef, LoginRequest, NewsItem, Portfolio,
    PortfolioRequest, PortfolioSummary, RegisterRequest, Stock, UpdateHoldingRequest, User,
};
use crate::token::{FileTokenStore, TokenStore};

pub const DEFAULT_NEWS_COUNT: u32 = 10;
pub const DEFAULT_STOCK_NEWS_COUNT: u32 = 5;

/// Thin client over the portfolio backend. One method per endpoint, one request per call.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            tokens,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.token_file));
        Self::new(&config.api_url, tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Every outgoing request goes through here so the stored token, if any, rides along.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, &url);
        match self.tokens.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = check_status(builder.send().await?).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        check_status(builder.send().await?).await?;
        Ok(())
    }

    // Authentication

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest { username, password };
        self.send_json(self.request(Method::POST, "/auth/login").json(&body))
            .await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        self.send_json(self.request(Method::POST, "/auth/register").json(&body))
            .await
    }

    // User

    pub async fn get_current_user(&self) -> Result<User, ApiError> {
        self.send_json(self.request(Method::GET, "/users/me")).await
    }

    pub async fn update_preferred_currency(&self, currency: &str) -> Result<User, ApiError> {
        let body = CurrencyUpdate { currency };
        self.send_json(self.request(Method::PUT, "/users/currency").json(&body))
            .await
    }

    // Stocks

    pub async fn search_stocks(&self, query: &str) -> Result<Vec<Stock>, ApiError> {
        self.send_json(
            self.request(Method::GET, "/stocks/public/search")
                .query(&[("query", query)]),
        )
        .await
    }

    pub async fn get_stock(&self, symbol: &str) -> Result<Stock, ApiError> {
        self.send_json(self.request(Method::GET, &stock_path(symbol)))
            .await
    }

    pub async fn get_multiple_stocks(&self, symbols: &[String]) -> Result<Vec<Stock>, ApiError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        let joined = symbols.join(",");
        self.send_json(
            self.request(Method::GET, "/stocks/batch")
                .query(&[("symbols", joined.as_str())]),
        )
        .await
    }

    // Portfolios

    pub async fn get_user_portfolios(&self) -> Result<Vec<PortfolioSummary>, ApiError> {
        self.send_json(self.request(Method::GET, "/portfolios")).await
    }

    pub async fn get_portfolio(&self, portfolio_id: i64) -> Result<Portfolio, ApiError> {
        self.send_json(self.request(Method::GET, &format!("/portfolios/{}", portfolio_id)))
            .await
    }

    pub async fn create_portfolio(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<EntityRef, ApiError> {
        let body = PortfolioRequest { name, description };
        self.send_json(self.request(Method::POST, "/portfolios").json(&body))
            .await
    }

    pub async fn update_portfolio(
        &self,
        portfolio_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<EntityRef, ApiError> {
        let body = PortfolioRequest { name, description };
        self.send_json(
            self.request(Method::PUT, &format!("/portfolios/{}", portfolio_id))
                .json(&body),
        )
        .await
    }

    pub async fn delete_portfolio(&self, portfolio_id: i64) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("/portfolios/{}", portfolio_id)))
            .await
    }

    pub async fn add_stock_to_portfolio(
        &self,
        portfolio_id: i64,
        symbol: &str,
        quantity: f64,
        purchase_price: f64,
    ) -> Result<EntityRef, ApiError> {
        let body = AddHoldingRequest {
            symbol,
            quantity,
            purchase_price,
        };
        self.send_json(
            self.request(Method::POST, &format!("/portfolios/{}/stocks", portfolio_id))
                .json(&body),
        )
        .await
    }

    pub async fn update_stock_holding(
        &self,
        portfolio_id: i64,
        holding_id: i64,
        quantity: f64,
        purchase_price: f64,
    ) -> Result<EntityRef, ApiError> {
        let body = UpdateHoldingRequest {
            quantity,
            purchase_price,
        };
        self.send_json(
            self.request(
                Method::PUT,
                &format!("/portfolios/{}/stocks/{}", portfolio_id, holding_id),
            )
            .json(&body),
        )
        .await
    }

    pub async fn remove_stock_from_portfolio(
        &self,
        portfolio_id: i64,
        holding_id: i64,
    ) -> Result<(), ApiError> {
        self.send_empty(self.request(
            Method::DELETE,
            &format!("/portfolios/{}/stocks/{}", portfolio_id, holding_id),
        ))
        .await
    }

    // News

    pub async fn get_latest_news(&self, count: u32) -> Result<Vec<NewsItem>, ApiError> {
        self.send_json(self.request(Method::GET, "/news").query(&[("count", count)]))
            .await
    }

    pub async fn get_news_for_stock(
        &self,
        symbol: &str,
        count: u32,
    ) -> Result<Vec<NewsItem>, ApiError> {
        self.send_json(
            self.request(Method::GET, &stock_news_path(symbol))
                .query(&[("count", count)]),
        )
        .await
    }

    pub async fn get_news_for_portfolio(&self, count: u32) -> Result<Vec<NewsItem>, ApiError> {
        self.send_json(
            self.request(Method::GET, "/news/portfolio")
                .query(&[("count", count)]),
        )
        .await
    }
}

/// Symbols are a single path segment; `/`, `?` and `#` must not escape it.
fn stock_path(symbol: &str) -> String {
    format!("/stocks/{}", urlencoding::encode(symbol))
}

fn stock_news_path(symbol: &str) -> String {
    format!("/news/stock/{}", urlencoding::encode(symbol))
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(ErrorBody::into_message);
    warn!(
        "Backend rejected request: HTTP {} {}",
        status,
        message.as_deref().unwrap_or_default()
    );
    Err(ApiError::Status { status, message })
}
