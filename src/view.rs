// src/view.rs
//! Plain-text rendering of page data for the terminal.

use std::fmt::Write;

use crate::analytics::{share_of_total, slices, ChartKind, DashboardTotals};
use crate::chart::{DataPoint, TimeRange};
use crate::company::CompanyProfile;
use crate::format::{
    format_chart_date, format_currency, format_currency_whole, format_integer, format_last_updated,
    format_news_time, format_number, format_signed_currency, format_signed_percent,
};
use crate::models::{NewsItem, Portfolio, PortfolioSummary, Stock};

fn gain_marker(gain: bool) -> &'static str {
    if gain {
        "▲"
    } else {
        "▼"
    }
}

pub fn render_stats(totals: &DashboardTotals, currency: &str) -> String {
    format!(
        "Total Value:   {}\nTotal Gain/Loss: {} {}\nTotal Return:  {}\n",
        format_currency(totals.total_value, currency),
        gain_marker(totals.is_gain()),
        format_signed_currency(totals.total_profit_loss, currency),
        format_signed_percent(totals.return_percentage),
    )
}

pub fn render_portfolio_list(portfolios: &[PortfolioSummary], currency: &str) -> String {
    if portfolios.is_empty() {
        return "You don't have any portfolios yet. Create one to get started.\n".to_string();
    }
    let mut out = String::new();
    for p in portfolios {
        let _ = writeln!(
            out,
            "#{:<4} {:<24} {:>3} stocks  {:>16}  {} ({})",
            p.id,
            p.name,
            p.stock_count,
            format_currency(p.total_value, currency),
            format_signed_currency(p.total_profit_loss, currency),
            format_signed_percent(p.total_profit_loss_percentage),
        );
        if let Some(description) = p.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(out, "      {}", description);
        }
    }
    out
}

/// Allocation or performance breakdown, one line per portfolio.
pub fn render_breakdown(kind: ChartKind, portfolios: &[PortfolioSummary], currency: &str) -> String {
    let mut out = String::new();
    for slice in slices(kind, portfolios) {
        let detail = match kind {
            ChartKind::Allocation => format!(
                "{} ({}%)",
                format_currency_whole(slice.value, currency),
                format_number(share_of_total(slice.value, portfolios), 1)
            ),
            ChartKind::Performance => format_signed_currency(slice.value, currency),
        };
        let _ = writeln!(out, "{:<24} {}  [{}]", slice.name, detail, slice.color);
    }
    out
}

pub fn render_portfolio(portfolio: &Portfolio) -> String {
    let currency = portfolio.currency.as_str();
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", portfolio.name, portfolio.id);
    if let Some(description) = &portfolio.description {
        let _ = writeln!(out, "{}", description);
    }
    let _ = writeln!(
        out,
        "Value {}  Cost {}  P/L {} ({})",
        format_currency(portfolio.total_value, currency),
        format_currency(portfolio.total_cost, currency),
        format_signed_currency(portfolio.total_profit_loss, currency),
        format_signed_percent(portfolio.total_profit_loss_percentage),
    );
    out.push('\n');
    if portfolio.holdings.is_empty() {
        out.push_str("This portfolio doesn't have any stocks yet.\n");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<6} {:<8} {:>10} {:>12} {:>12} {:>14} {:>22}",
        "ID", "Symbol", "Qty", "Avg Price", "Price", "Value", "Gain/Loss"
    );
    for h in &portfolio.holdings {
        let _ = writeln!(
            out,
            "{:<6} {:<8} {:>10} {:>12} {:>12} {:>14} {:>22}",
            h.id,
            h.symbol,
            format_number(h.quantity, 2),
            format_currency(h.purchase_price, currency),
            format_currency(h.current_price, currency),
            format_currency(h.current_value, currency),
            format!(
                "{} ({})",
                format_signed_currency(h.profit_loss, currency),
                format_signed_percent(h.profit_loss_percentage)
            ),
        );
    }
    out
}

pub fn render_stock(stock: &Stock) -> String {
    let currency = stock.currency.as_str();
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", stock.symbol, stock.name);
    let _ = writeln!(
        out,
        "{} {} {}",
        format_currency(stock.current_price, currency),
        gain_marker(stock.percent_change >= 0.0),
        format_signed_percent(stock.percent_change)
    );
    let optional = |v: Option<f64>| {
        v.map(|v| format_currency(v, currency))
            .unwrap_or_else(|| "N/A".to_string())
    };
    let _ = writeln!(out, "Previous Close: {}", optional(stock.previous_close));
    let _ = writeln!(out, "Day Range:      {} - {}", optional(stock.day_low), optional(stock.day_high));
    let _ = writeln!(
        out,
        "Volume:         {}",
        stock.volume.map(format_integer).unwrap_or_else(|| "N/A".to_string())
    );
    if let Some(exchange) = &stock.exchange {
        let _ = writeln!(out, "Exchange:       {}", exchange);
    }
    if let Some(ts) = &stock.last_updated {
        let _ = writeln!(out, "Last Updated:   {}", format_last_updated(ts));
    }
    out
}

pub fn render_profile(profile: &CompanyProfile) -> String {
    format!(
        "{}\n\nSector: {}\nIndustry: {}\nEmployees: {}\nCEO: {}\nFounded: {}\nHeadquarters: {}\nWebsite: {}\n",
        profile.description,
        profile.sector,
        profile.industry,
        format_integer(u64::from(profile.employees)),
        profile.ceo,
        profile.founded,
        profile.headquarters,
        profile.website,
    )
}

pub fn render_news(news: &[NewsItem]) -> String {
    if news.is_empty() {
        return "No news available.\n".to_string();
    }
    let mut out = String::new();
    for item in news {
        let when = item
            .published_at
            .as_ref()
            .map(format_news_time)
            .unwrap_or_default();
        let _ = writeln!(out, "* {}", item.title);
        let _ = writeln!(out, "  {} | {}", item.source, when);
        let symbols = item.symbols();
        if !symbols.is_empty() {
            let _ = writeln!(out, "  {}", symbols.join(" "));
        }
        let _ = writeln!(out, "  {}", item.url);
    }
    out
}

pub fn render_watchlist(stocks: &[Stock]) -> String {
    if stocks.is_empty() {
        return "Your watchlist is empty.\n".to_string();
    }
    let mut out = String::new();
    for s in stocks {
        let _ = writeln!(
            out,
            "{:<8} {:<28} {:>14} {:>9}",
            s.symbol,
            s.name,
            format_currency(s.current_price, &s.currency),
            format_signed_percent(s.percent_change)
        );
    }
    out
}

pub fn render_search_results(stocks: &[Stock]) -> String {
    let mut out = String::new();
    for s in stocks {
        let _ = writeln!(
            out,
            "{:<8} {:<28} {}",
            s.symbol,
            s.name,
            format_currency(s.current_price, &s.currency)
        );
    }
    out
}

/// First and last points of the series with the overall move.
pub fn render_chart_summary(points: &[DataPoint], range: TimeRange, currency: &str) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return format!("{}: no data\n", range);
    };
    let (change, pct) = crate::chart::price_change(points);
    format!(
        "{}: {} {} -> {} {}  {} ({})\n",
        range,
        format_chart_date(&first.date, range),
        format_currency(first.price, currency),
        format_chart_date(&last.date, range),
        format_currency(last.price, currency),
        format_signed_currency(change, currency),
        format_signed_percent(pct),
    )
}
