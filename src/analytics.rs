// src/analytics.rs
use crate::models::{PortfolioSummary, StockHolding};

pub const PALETTE: [&str; 7] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884D8", "#82CA9D", "#A4DE6C",
];
pub const GAIN_COLOR: &str = "#00C49F";
pub const LOSS_COLOR: &str = "#FF8042";

/// Figures on the dashboard's stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardTotals {
    pub total_value: f64,
    pub total_profit_loss: f64,
    pub return_percentage: f64,
}

impl DashboardTotals {
    pub fn from_portfolios(portfolios: &[PortfolioSummary]) -> Self {
        let total_value: f64 = portfolios.iter().map(|p| p.total_value).sum();
        let total_profit_loss: f64 = portfolios.iter().map(|p| p.total_profit_loss).sum();
        let return_percentage = if portfolios.is_empty() || total_value == 0.0 {
            0.0
        } else {
            total_profit_loss / total_value * 100.0
        };
        Self {
            total_value,
            total_profit_loss,
            return_percentage,
        }
    }

    pub fn is_gain(&self) -> bool {
        self.total_profit_loss >= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Allocation,
    Performance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub portfolio_id: i64,
    pub name: String,
    pub value: f64,
    pub color: &'static str,
}

pub fn allocation_slices(portfolios: &[PortfolioSummary]) -> Vec<Slice> {
    portfolios
        .iter()
        .enumerate()
        .map(|(i, p)| Slice {
            portfolio_id: p.id,
            name: p.name.clone(),
            value: p.total_value,
            color: PALETTE[i % PALETTE.len()],
        })
        .collect()
}

pub fn performance_slices(portfolios: &[PortfolioSummary]) -> Vec<Slice> {
    portfolios
        .iter()
        .map(|p| Slice {
            portfolio_id: p.id,
            name: p.name.clone(),
            value: p.total_profit_loss,
            color: if p.total_profit_loss >= 0.0 {
                GAIN_COLOR
            } else {
                LOSS_COLOR
            },
        })
        .collect()
}

pub fn slices(kind: ChartKind, portfolios: &[PortfolioSummary]) -> Vec<Slice> {
    match kind {
        ChartKind::Allocation => allocation_slices(portfolios),
        ChartKind::Performance => performance_slices(portfolios),
    }
}

/// Share of all portfolios' value held in one slice, as shown in the allocation tooltip.
pub fn share_of_total(value: f64, portfolios: &[PortfolioSummary]) -> f64 {
    let total: f64 = portfolios.iter().map(|p| p.total_value).sum();
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}

/// What the holdings row shows while a quantity/price edit is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldingPreview {
    pub current_value: f64,
    pub profit_loss: f64,
}

pub fn holding_preview(holding: &StockHolding, quantity: f64, purchase_price: f64) -> HoldingPreview {
    HoldingPreview {
        current_value: quantity * holding.current_price,
        profit_loss: quantity * (holding.current_price - purchase_price),
    }
}

/// Cost of a prospective purchase, shown under the add-stock form.
pub fn purchase_total(quantity: f64, purchase_price: f64) -> f64 {
    quantity * purchase_price
}
