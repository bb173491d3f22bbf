// src/routes.rs
use std::fmt;

/// Client-side locations. Everything under `/dashboard` needs a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    Portfolios,
    NewPortfolio,
    Portfolio(i64),
    Stocks,
    Stock(String),
    News,
    Settings,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/auth/login".to_string(),
            Route::Register => "/auth/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Portfolios => "/dashboard/portfolio".to_string(),
            Route::NewPortfolio => "/dashboard/portfolio/new".to_string(),
            Route::Portfolio(id) => format!("/dashboard/portfolio/{}", id),
            Route::Stocks => "/dashboard/stock".to_string(),
            Route::Stock(symbol) => format!("/dashboard/stock/{}", symbol),
            Route::News => "/dashboard/news".to_string(),
            Route::Settings => "/dashboard/settings".to_string(),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Route::Home,
            ["auth", "login"] => Route::Login,
            ["auth", "register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["dashboard", "portfolio"] => Route::Portfolios,
            ["dashboard", "portfolio", "new"] => Route::NewPortfolio,
            ["dashboard", "portfolio", id] => Route::Portfolio(id.parse().ok()?),
            ["dashboard", "stock"] => Route::Stocks,
            ["dashboard", "stock", symbol] => Route::Stock(symbol.to_uppercase()),
            ["dashboard", "news"] => Route::News,
            ["dashboard", "settings"] => Route::Settings,
            _ => return None,
        };
        Some(route)
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Home | Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
