// src/pages.rs
//! Route containers. Each one fetches on load, keeps a `LoadState`, and turns
//! failures into the message shown in place of the page.

use chrono::NaiveDate;
use log::{error, info};
use rand::Rng;

use crate::analytics::DashboardTotals;
use crate::api::{ApiClient, DEFAULT_NEWS_COUNT, DEFAULT_STOCK_NEWS_COUNT};
use crate::chart::{generate_mock_data, price_change, DataPoint, TimeRange};
use crate::company::CompanyProfile;
use crate::currency;
use crate::error::{ApiError, ValidationError};
use crate::forms::{AddToPortfolioForm, PortfolioChoice};
use crate::models::{NewsItem, Portfolio, PortfolioSummary, Stock};
use crate::routes::Route;
use crate::session::SessionContext;

pub const DEFAULT_WATCHLIST: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

const LOGIN_REQUIRED: &str = "Please log in to view this page.";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    NotLoaded,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::NotLoaded
    }
}

impl<T> LoadState<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Logs the failure and keeps only the user-facing message.
    fn from_result(result: Result<T, ApiError>, message: &str) -> Self {
        match result {
            Ok(data) => LoadState::Loaded(data),
            Err(e) => {
                error!("{} ({})", message, e);
                LoadState::Error(message.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub portfolios: Vec<PortfolioSummary>,
    pub news: Vec<NewsItem>,
    pub totals: DashboardTotals,
}

#[derive(Debug, Default)]
pub struct DashboardPage {
    pub data: LoadState<DashboardData>,
    pub watchlist: WatchlistPage,
}

impl DashboardPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Portfolios and portfolio news are fetched concurrently; either failing fails the page.
    pub async fn load(&mut self, session: &SessionContext) {
        if session.user().is_none() {
            self.data = LoadState::Error("Please log in to view your dashboard.".to_string());
            return;
        }
        self.data = LoadState::Loading;
        let api = session.api();
        let (portfolios, news) = tokio::join!(
            api.get_user_portfolios(),
            api.get_news_for_portfolio(DEFAULT_NEWS_COUNT)
        );
        let result = portfolios.and_then(|portfolios| {
            news.map(|news| DashboardData {
                totals: DashboardTotals::from_portfolios(&portfolios),
                portfolios,
                news,
            })
        });
        self.data = LoadState::from_result(result, "Failed to load dashboard data.");

        self.watchlist.load(api).await;
    }
}

#[derive(Debug, Default)]
pub struct PortfolioListPage {
    pub portfolios: LoadState<Vec<PortfolioSummary>>,
}

impl PortfolioListPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, session: &SessionContext) {
        if session.user().is_none() {
            self.portfolios = LoadState::Error(LOGIN_REQUIRED.to_string());
            return;
        }
        self.portfolios = LoadState::Loading;
        let result = session.api().get_user_portfolios().await;
        self.portfolios = LoadState::from_result(
            result,
            "Failed to load your portfolios. Please try again later.",
        );
    }

    /// Deletes on the backend, then re-fetches so the list mirrors it.
    pub async fn delete(&mut self, session: &SessionContext, portfolio_id: i64) -> Result<(), ApiError> {
        if let Err(e) = session.api().delete_portfolio(portfolio_id).await {
            error!("Failed to delete portfolio {}: {}", portfolio_id, e);
            self.portfolios =
                LoadState::Error("Failed to delete portfolio. Please try again later.".to_string());
            return Err(e);
        }
        info!("Deleted portfolio {}", portfolio_id);
        self.load(session).await;
        Ok(())
    }
}

#[derive(Debug)]
pub struct PortfolioDetailPage {
    pub portfolio_id: i64,
    pub portfolio: LoadState<Portfolio>,
    pub deleting: bool,
}

impl PortfolioDetailPage {
    pub fn new(portfolio_id: i64) -> Self {
        Self {
            portfolio_id,
            portfolio: LoadState::NotLoaded,
            deleting: false,
        }
    }

    pub async fn load(&mut self, session: &SessionContext) {
        if session.user().is_none() {
            self.portfolio = LoadState::Error(LOGIN_REQUIRED.to_string());
            return;
        }
        self.portfolio = LoadState::Loading;
        let result = session.api().get_portfolio(self.portfolio_id).await;
        self.portfolio = LoadState::from_result(
            result,
            "Failed to load portfolio details. Please try again later.",
        );
    }

    /// Re-fetch after a form succeeded. A failed refresh keeps what is on screen.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        match api.get_portfolio(self.portfolio_id).await {
            Ok(portfolio) => {
                self.portfolio = LoadState::Loaded(portfolio);
                Ok(())
            }
            Err(e) => {
                error!("Failed to refresh portfolio {}: {}", self.portfolio_id, e);
                Err(e)
            }
        }
    }

    /// Deletes the holding, drops it from the loaded portfolio, then re-fetches totals.
    pub async fn remove_holding(&mut self, api: &ApiClient, holding_id: i64) -> Result<(), ApiError> {
        if let Err(e) = api.remove_stock_from_portfolio(self.portfolio_id, holding_id).await {
            error!("Failed to remove stock: {}", e);
            self.portfolio =
                LoadState::Error("Failed to remove stock. Please try again later.".to_string());
            return Err(e);
        }
        if let Some(portfolio) = self.portfolio.as_mut() {
            portfolio.holdings.retain(|h| h.id != holding_id);
        }
        // the filtered list stands if the re-fetch fails
        let _ = self.refresh(api).await;
        Ok(())
    }

    /// Deletes the portfolio and sends the user back to the list.
    pub async fn delete(&mut self, session: &mut SessionContext) -> Result<(), ApiError> {
        self.deleting = true;
        match session.api().delete_portfolio(self.portfolio_id).await {
            Ok(()) => {
                info!("Deleted portfolio {}", self.portfolio_id);
                session.navigate(Route::Portfolios);
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete portfolio: {}", e);
                self.portfolio =
                    LoadState::Error("Failed to delete portfolio. Please try again later.".to_string());
                self.deleting = false;
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockDetail {
    pub stock: Stock,
    pub news: Vec<NewsItem>,
    pub portfolios: Vec<PortfolioChoice>,
}

#[derive(Debug)]
pub struct StockDetailPage {
    pub symbol: String,
    pub detail: LoadState<StockDetail>,
    pub range: TimeRange,
    pub chart: Vec<DataPoint>,
}

impl StockDetailPage {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            detail: LoadState::NotLoaded,
            range: TimeRange::default(),
            chart: Vec::new(),
        }
    }

    pub async fn load(&mut self, session: &SessionContext) {
        if session.user().is_none() {
            self.detail = LoadState::Error(LOGIN_REQUIRED.to_string());
            return;
        }
        self.detail = LoadState::Loading;
        let api = session.api();
        let result = tokio::try_join!(
            api.get_stock(&self.symbol),
            api.get_news_for_stock(&self.symbol, DEFAULT_STOCK_NEWS_COUNT),
            api.get_user_portfolios()
        )
        .map(|(stock, news, portfolios)| StockDetail {
            stock,
            news,
            portfolios: portfolios.iter().map(PortfolioChoice::from).collect(),
        });
        self.detail =
            LoadState::from_result(result, "Failed to load stock details. Please try again later.");
    }

    /// Switches the chart window and regenerates its series.
    pub fn set_range<R: Rng>(&mut self, range: TimeRange, today: NaiveDate, rng: &mut R) {
        self.range = range;
        self.chart = generate_mock_data(range, &self.symbol, today, rng);
    }

    pub fn chart_change(&self) -> (f64, f64) {
        price_change(&self.chart)
    }

    pub fn profile<R: Rng>(&self, rng: &mut R) -> Option<CompanyProfile> {
        self.detail
            .as_ref()
            .map(|d| CompanyProfile::mock(&d.stock.symbol, &d.stock.name, rng))
    }

    pub fn add_to_portfolio_form(&self) -> Option<AddToPortfolioForm> {
        self.detail
            .as_ref()
            .map(|d| AddToPortfolioForm::new(&d.stock, d.portfolios.clone()))
    }
}

#[derive(Debug, Default)]
pub struct NewsPage {
    pub news: LoadState<Vec<NewsItem>>,
}

impl NewsPage {
    pub async fn load(&mut self, api: &ApiClient, count: u32) {
        self.news = LoadState::Loading;
        let result = api.get_latest_news(count).await;
        self.news = LoadState::from_result(result, "Failed to load news. Please try again later.");
    }
}

#[derive(Debug, Clone)]
pub struct SettingsPage {
    pub selected: String,
    pub updating: bool,
    pub success: bool,
    pub error: Option<String>,
}

impl SettingsPage {
    pub fn new(session: &SessionContext) -> Self {
        Self {
            selected: session.currency().to_string(),
            updating: false,
            success: false,
            error: None,
        }
    }

    pub fn select(&mut self, code: &str) -> Result<(), ValidationError> {
        let found = currency::find(code)
            .ok_or_else(|| ValidationError::UnsupportedCurrency(code.trim().to_string()))?;
        self.selected = found.code.to_string();
        Ok(())
    }

    pub async fn submit(&mut self, session: &mut SessionContext) -> Result<(), ApiError> {
        if session.user().is_none() {
            return Ok(());
        }
        self.updating = true;
        self.error = None;
        self.success = false;

        let result = session.update_currency(&self.selected).await;
        match &result {
            Ok(()) => self.success = true,
            Err(e) => {
                error!("Failed to update currency: {}", e);
                self.error = Some(
                    "Failed to update currency preference. Please try again later.".to_string(),
                );
            }
        }
        self.updating = false;
        result
    }
}

/// Client-only list of followed symbols, priced through the batch endpoint.
#[derive(Debug, Clone)]
pub struct WatchlistPage {
    pub symbols: Vec<String>,
    pub stocks: LoadState<Vec<Stock>>,
    pub search_results: Vec<Stock>,
    pub searching: bool,
}

impl Default for WatchlistPage {
    fn default() -> Self {
        Self::with_symbols(DEFAULT_WATCHLIST.iter().map(|s| s.to_string()))
    }
}

impl WatchlistPage {
    pub fn with_symbols<I: IntoIterator<Item = String>>(symbols: I) -> Self {
        let mut page = Self {
            symbols: Vec::new(),
            stocks: LoadState::NotLoaded,
            search_results: Vec::new(),
            searching: false,
        };
        for symbol in symbols {
            page.add(&symbol);
        }
        page
    }

    /// Adds an upper-cased symbol; false when blank or already followed.
    pub fn add(&mut self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() || self.symbols.contains(&symbol) {
            return false;
        }
        self.symbols.push(symbol);
        true
    }

    pub fn remove(&mut self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        let before = self.symbols.len();
        self.symbols.retain(|s| *s != symbol);
        self.symbols.len() != before
    }

    pub async fn load(&mut self, api: &ApiClient) {
        if self.symbols.is_empty() {
            self.stocks = LoadState::Loaded(Vec::new());
            return;
        }
        self.stocks = LoadState::Loading;
        let result = api.get_multiple_stocks(&self.symbols).await;
        self.stocks = LoadState::from_result(result, "Failed to load watchlist.");
    }

    pub async fn search(&mut self, api: &ApiClient, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.searching = true;
        match api.search_stocks(query).await {
            Ok(results) => self.search_results = results,
            Err(e) => error!("Error searching stocks: {}", e),
        }
        self.searching = false;
    }
}
