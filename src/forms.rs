// src/forms.rs
//! Form state for the modals: validate locally, then make exactly one API call.

use log::{error, info};

use crate::analytics::{holding_preview, purchase_total, HoldingPreview};
use crate::api::ApiClient;
use crate::error::{FormError, ValidationError};
use crate::models::{EntityRef, Portfolio, PortfolioSummary, Stock, StockHolding};

/// Parsed quantity and cost basis of a holding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldingInput {
    pub quantity: f64,
    pub purchase_price: f64,
}

/// Both fields must be present and parse to finite numbers greater than zero.
pub fn parse_holding_input(quantity: &str, purchase_price: &str) -> Result<HoldingInput, ValidationError> {
    let (quantity, purchase_price) = (quantity.trim(), purchase_price.trim());
    if quantity.is_empty() || purchase_price.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    let quantity = parse_positive(quantity)?;
    let purchase_price = parse_positive(purchase_price)?;
    Ok(HoldingInput {
        quantity,
        purchase_price,
    })
}

fn parse_positive(raw: &str) -> Result<f64, ValidationError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(ValidationError::NotPositive),
    }
}

fn parse_preview(quantity: &str, purchase_price: &str) -> Option<(f64, f64)> {
    let q = quantity.trim().parse::<f64>().ok()?;
    let p = purchase_price.trim().parse::<f64>().ok()?;
    Some((q, p))
}

/// Records a failed submit on the form and hands the error back.
fn reject(slot: &mut Option<String>, err: FormError, fallback: &str) -> FormError {
    if let FormError::Api(e) = &err {
        error!("{}: {}", fallback, e);
    }
    *slot = Some(err.user_message(fallback));
    err
}

/// Portfolio entry in the "add to portfolio" picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioChoice {
    pub id: i64,
    pub name: String,
}

impl From<&PortfolioSummary> for PortfolioChoice {
    fn from(p: &PortfolioSummary) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddStockForm {
    pub portfolio_id: i64,
    pub symbol: String,
    pub quantity: String,
    pub purchase_price: String,
    pub search_results: Vec<Stock>,
    pub selected: Option<Stock>,
    pub searching: bool,
    pub submitting: bool,
    pub error: Option<String>,
}

impl AddStockForm {
    pub fn new(portfolio_id: i64) -> Self {
        Self {
            portfolio_id,
            symbol: String::new(),
            quantity: String::new(),
            purchase_price: String::new(),
            search_results: Vec::new(),
            selected: None,
            searching: false,
            submitting: false,
            error: None,
        }
    }

    /// Looks up the typed symbol or company name. A blank field does nothing.
    pub async fn search(&mut self, api: &ApiClient) {
        let query = self.symbol.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.error = None;
        self.searching = true;
        match api.search_stocks(&query).await {
            Ok(results) => {
                if results.is_empty() {
                    self.error = Some("No stocks found with this symbol or name.".to_string());
                }
                self.search_results = results;
            }
            Err(e) => {
                error!("Stock search failed: {}", e);
                self.error = Some("Failed to search for stocks. Please try again.".to_string());
            }
        }
        self.searching = false;
    }

    pub fn select(&mut self, stock: Stock) {
        self.symbol = stock.symbol.clone();
        self.selected = Some(stock);
        self.search_results.clear();
    }

    pub fn preview_total(&self) -> Option<f64> {
        parse_preview(&self.quantity, &self.purchase_price).map(|(q, p)| purchase_total(q, p))
    }

    pub fn validate(&self) -> Result<(String, HoldingInput), ValidationError> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        let input = parse_holding_input(&self.quantity, &self.purchase_price)?;
        Ok((symbol.to_uppercase(), input))
    }

    pub async fn submit(&mut self, api: &ApiClient) -> Result<EntityRef, FormError> {
        const FALLBACK: &str = "Failed to add stock to portfolio";
        let (symbol, input) = match self.validate() {
            Ok(v) => v,
            Err(e) => return Err(reject(&mut self.error, e.into(), FALLBACK)),
        };
        self.error = None;
        self.submitting = true;
        let result = api
            .add_stock_to_portfolio(self.portfolio_id, &symbol, input.quantity, input.purchase_price)
            .await;
        self.submitting = false;
        match result {
            Ok(created) => {
                info!("Added {} x {} to portfolio {}", input.quantity, symbol, self.portfolio_id);
                Ok(created)
            }
            Err(e) => Err(reject(&mut self.error, e.into(), FALLBACK)),
        }
    }
}

/// Inline edit of one holdings-table row.
#[derive(Debug, Clone)]
pub struct EditHoldingForm {
    pub portfolio_id: i64,
    pub holding: StockHolding,
    pub quantity: String,
    pub purchase_price: String,
    pub submitting: bool,
    pub error: Option<String>,
}

impl EditHoldingForm {
    pub fn new(portfolio_id: i64, holding: &StockHolding) -> Self {
        Self {
            portfolio_id,
            holding: holding.clone(),
            quantity: holding.quantity.to_string(),
            purchase_price: holding.purchase_price.to_string(),
            submitting: false,
            error: None,
        }
    }

    pub fn preview(&self) -> Option<HoldingPreview> {
        parse_preview(&self.quantity, &self.purchase_price)
            .map(|(q, p)| holding_preview(&self.holding, q, p))
    }

    pub fn cancel(&mut self) {
        self.quantity = self.holding.quantity.to_string();
        self.purchase_price = self.holding.purchase_price.to_string();
        self.error = None;
    }

    pub async fn submit(&mut self, api: &ApiClient) -> Result<EntityRef, FormError> {
        const FALLBACK: &str = "Failed to update stock holding";
        let input = match parse_holding_input(&self.quantity, &self.purchase_price) {
            Ok(v) => v,
            Err(e) => return Err(reject(&mut self.error, e.into(), FALLBACK)),
        };
        self.error = None;
        self.submitting = true;
        let result = api
            .update_stock_holding(
                self.portfolio_id,
                self.holding.id,
                input.quantity,
                input.purchase_price,
            )
            .await;
        self.submitting = false;
        match result {
            Ok(updated) => {
                self.holding.quantity = input.quantity;
                self.holding.purchase_price = input.purchase_price;
                Ok(updated)
            }
            Err(e) => Err(reject(&mut self.error, e.into(), FALLBACK)),
        }
    }
}

/// Create or rename a portfolio.
#[derive(Debug, Clone, Default)]
pub struct PortfolioForm {
    pub portfolio_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub submitting: bool,
    pub error: Option<String>,
}

impl PortfolioForm {
    pub fn for_create() -> Self {
        Self::default()
    }

    pub fn for_edit(portfolio: &Portfolio) -> Self {
        Self {
            portfolio_id: Some(portfolio.id),
            name: portfolio.name.clone(),
            description: portfolio.description.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::NameRequired);
        }
        Ok(())
    }

    pub async fn submit(&mut self, api: &ApiClient) -> Result<EntityRef, FormError> {
        let fallback = match self.portfolio_id {
            Some(_) => "Failed to update portfolio",
            None => "Failed to create portfolio",
        };
        if let Err(e) = self.validate() {
            return Err(reject(&mut self.error, e.into(), fallback));
        }
        self.error = None;
        self.submitting = true;

        let name = self.name.trim();
        let description = Some(self.description.trim()).filter(|d| !d.is_empty());
        let result = match self.portfolio_id {
            Some(id) => api.update_portfolio(id, name, description).await,
            None => api.create_portfolio(name, description).await,
        };
        self.submitting = false;
        result.map_err(|e| reject(&mut self.error, e.into(), fallback))
    }
}

/// "Add to portfolio" modal on the stock detail page.
#[derive(Debug, Clone)]
pub struct AddToPortfolioForm {
    pub stock: Stock,
    pub portfolios: Vec<PortfolioChoice>,
    pub selected: Option<i64>,
    pub quantity: String,
    pub purchase_price: String,
    pub submitting: bool,
    pub success: bool,
    pub error: Option<String>,
}

impl AddToPortfolioForm {
    pub fn new(stock: &Stock, portfolios: Vec<PortfolioChoice>) -> Self {
        Self {
            purchase_price: stock.current_price.to_string(),
            stock: stock.clone(),
            portfolios,
            selected: None,
            quantity: "1".to_string(),
            submitting: false,
            success: false,
            error: None,
        }
    }

    pub fn preview_total(&self) -> Option<f64> {
        parse_preview(&self.quantity, &self.purchase_price).map(|(q, p)| purchase_total(q, p))
    }

    pub fn validate(&self) -> Result<(i64, HoldingInput), ValidationError> {
        let portfolio_id = self
            .selected
            .filter(|id| self.portfolios.iter().any(|p| p.id == *id))
            .ok_or(ValidationError::NoPortfolioSelected)?;
        let input = parse_holding_input(&self.quantity, &self.purchase_price)?;
        Ok((portfolio_id, input))
    }

    pub async fn submit(&mut self, api: &ApiClient) -> Result<EntityRef, FormError> {
        const FALLBACK: &str = "Failed to add stock to portfolio";
        let (portfolio_id, input) = match self.validate() {
            Ok(v) => v,
            Err(e) => return Err(reject(&mut self.error, e.into(), FALLBACK)),
        };
        self.error = None;
        self.submitting = true;
        let result = api
            .add_stock_to_portfolio(
                portfolio_id,
                &self.stock.symbol,
                input.quantity,
                input.purchase_price,
            )
            .await;
        self.submitting = false;
        match result {
            Ok(created) => {
                self.success = true;
                Ok(created)
            }
            Err(e) => Err(reject(&mut self.error, e.into(), FALLBACK)),
        }
    }

    pub fn success_message(&self) -> String {
        format!(
            "{} shares of {} have been added to your portfolio.",
            self.quantity.trim(),
            self.stock.symbol
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;
    use std::sync::Arc;

    // Nothing listens here: any test that reached the network would fail with a
    // transport error instead of the validation error it asserts on.
    fn offline_api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9/api", Arc::new(MemoryTokenStore::new())).unwrap()
    }

    fn stock() -> Stock {
        Stock {
            symbol: "AAPL".into(),
            name: "Apple Inc.".into(),
            current_price: 189.5,
            previous_close: Some(187.0),
            day_high: None,
            day_low: None,
            volume: None,
            percent_change: 1.3,
            exchange: Some("NASDAQ".into()),
            currency: "USD".into(),
            last_updated: None,
        }
    }

    #[test]
    fn holding_input_rules() {
        assert_eq!(parse_holding_input("", "10"), Err(ValidationError::MissingFields));
        assert_eq!(parse_holding_input("0", "10"), Err(ValidationError::NotPositive));
        assert_eq!(parse_holding_input("5", "-1"), Err(ValidationError::NotPositive));
        assert_eq!(parse_holding_input("abc", "1"), Err(ValidationError::NotPositive));
        assert_eq!(parse_holding_input("NaN", "1"), Err(ValidationError::NotPositive));
        assert_eq!(
            parse_holding_input(" 2.5 ", "100"),
            Ok(HoldingInput {
                quantity: 2.5,
                purchase_price: 100.0
            })
        );
    }

    #[tokio::test]
    async fn non_positive_quantity_never_reaches_the_api() {
        let api = offline_api();
        let mut form = AddStockForm::new(1);
        form.symbol = "aapl".into();
        form.quantity = "0".into();
        form.purchase_price = "150".into();

        let err = form.submit(&api).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            form.error.as_deref(),
            Some("Quantity and purchase price must be positive values")
        );
    }

    #[tokio::test]
    async fn missing_symbol_is_reported() {
        let mut form = AddStockForm::new(1);
        form.quantity = "1".into();
        form.purchase_price = "1".into();
        let err = form.submit(&offline_api()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(form.error.as_deref(), Some("Please fill in all fields"));
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingFields);
    }

    #[tokio::test]
    async fn blank_search_is_a_no_op() {
        let mut form = AddStockForm::new(1);
        form.symbol = "   ".into();
        form.search(&offline_api()).await;
        assert!(form.error.is_none());
        assert!(!form.searching);
    }

    #[test]
    fn selecting_a_result_fills_the_symbol() {
        let mut form = AddStockForm::new(1);
        form.search_results = vec![stock()];
        form.select(stock());
        assert_eq!(form.symbol, "AAPL");
        assert!(form.search_results.is_empty());
        form.quantity = "2".into();
        form.purchase_price = "10.5".into();
        assert_eq!(form.preview_total(), Some(21.0));
    }

    #[test]
    fn edit_form_prefills_and_cancels() {
        let holding = StockHolding {
            id: 9,
            symbol: "MSFT".into(),
            name: "Microsoft".into(),
            quantity: 10.0,
            purchase_price: 300.0,
            current_price: 400.0,
            current_value: 4000.0,
            profit_loss: 1000.0,
            profit_loss_percentage: 33.33,
            currency: "USD".into(),
        };
        let mut form = EditHoldingForm::new(3, &holding);
        assert_eq!(form.quantity, "10");
        assert_eq!(form.purchase_price, "300");
        form.quantity = "4".into();
        assert_eq!(form.preview().unwrap().profit_loss, 400.0);
        form.cancel();
        assert_eq!(form.quantity, "10");
    }

    #[tokio::test]
    async fn portfolio_name_is_required() {
        let mut form = PortfolioForm::for_create();
        form.name = "  ".into();
        let err = form.submit(&offline_api()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(form.error.as_deref(), Some("Portfolio name is required"));
    }

    #[tokio::test]
    async fn add_to_portfolio_requires_a_choice() {
        let mut form = AddToPortfolioForm::new(
            &stock(),
            vec![PortfolioChoice {
                id: 5,
                name: "Core".into(),
            }],
        );
        assert_eq!(form.quantity, "1");
        assert_eq!(form.purchase_price, "189.5");

        let err = form.submit(&offline_api()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(form.error.as_deref(), Some("Please select a portfolio"));

        form.selected = Some(99);
        assert_eq!(form.validate().unwrap_err(), ValidationError::NoPortfolioSelected);
        form.selected = Some(5);
        assert!(form.validate().is_ok());
        assert_eq!(
            form.success_message(),
            "1 shares of AAPL have been added to your portfolio."
        );
    }
}
