// src/main.rs
use std::process::ExitCode;

use chrono::Local;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use thiserror::Error;

use stockfolio::analytics::ChartKind;
use stockfolio::chart::TimeRange;
use stockfolio::currency::SUPPORTED;
use stockfolio::error::{ApiError, FormError, ValidationError};
use stockfolio::forms::{AddStockForm, AddToPortfolioForm, EditHoldingForm, PortfolioForm};
use stockfolio::pages::{
    DashboardPage, NewsPage, PortfolioDetailPage, PortfolioListPage, SettingsPage, StockDetailPage,
    WatchlistPage,
};
use stockfolio::routes::Route;
use stockfolio::session::{validate_credentials, SessionContext};
use stockfolio::{view, ApiClient, Config};

const USAGE: &str = "\
usage: stockfolio <command> [args]

  login <username> <password>
  register <username> <email> <password>
  logout
  whoami
  dashboard
  portfolios
  portfolio <id>
  create-portfolio <name> [description]
  edit-portfolio <id> <name> [description]
  delete-portfolio <id>
  add-stock <portfolio-id> <symbol> <quantity> <purchase-price>
  edit-holding <portfolio-id> <holding-id> <quantity> <purchase-price>
  remove-holding <portfolio-id> <holding-id>
  stock <symbol> [1D|1W|1M|3M|1Y|5Y]
  buy <symbol> <portfolio-id> <quantity> [purchase-price]
  search <query>
  news [count]
  watchlist [symbol...]
  currency [code]

environment: STOCKFOLIO_API_URL, STOCKFOLIO_TOKEN_FILE, RUST_LOG";

const RELOAD_FAILED: &str = "Failed to load portfolio details. Please try again later.";
const LIST_FAILED: &str = "Failed to load your portfolios. Please try again later.";
const REMOVE_FAILED: &str = "Failed to remove stock. Please try again later.";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}\n\n{usage}", usage = USAGE)]
    Usage(String),

    #[error("Please log in first.")]
    NotLoggedIn,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CliError {
    fn form(form_error: Option<String>, e: FormError, fallback: &str) -> Self {
        CliError::Failed(form_error.unwrap_or_else(|| e.user_message(fallback)))
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Login { username: String, password: String },
    Register { username: String, email: String, password: String },
    Logout,
    WhoAmI,
    Dashboard,
    Portfolios,
    Portfolio(i64),
    CreatePortfolio { name: String, description: String },
    EditPortfolio { id: i64, name: String, description: Option<String> },
    DeletePortfolio(i64),
    AddStock { portfolio_id: i64, symbol: String, quantity: String, price: String },
    EditHolding { portfolio_id: i64, holding_id: i64, quantity: String, price: String },
    RemoveHolding { portfolio_id: i64, holding_id: i64 },
    Stock { symbol: String, range: TimeRange },
    Buy { symbol: String, portfolio_id: i64, quantity: String, price: Option<String> },
    Search(String),
    News(u32),
    Watchlist(Vec<String>),
    Currency(Option<String>),
}

fn parse_id(value: &str, what: &str) -> Result<i64, CliError> {
    value
        .parse()
        .map_err(|_| CliError::Usage(format!("invalid {}: '{}'", what, value)))
}

impl Command {
    fn parse(args: &[String]) -> Result<Self, CliError> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            ["login", username, password] => Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            ["register", username, email, password] => Command::Register {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            },
            ["logout"] => Command::Logout,
            ["whoami"] => Command::WhoAmI,
            ["dashboard"] => Command::Dashboard,
            ["portfolios"] => Command::Portfolios,
            ["portfolio", id] => Command::Portfolio(parse_id(id, "portfolio id")?),
            ["create-portfolio", name, rest @ ..] if rest.len() <= 1 => Command::CreatePortfolio {
                name: name.to_string(),
                description: rest.first().map(|d| d.to_string()).unwrap_or_default(),
            },
            ["edit-portfolio", id, name, rest @ ..] if rest.len() <= 1 => Command::EditPortfolio {
                id: parse_id(id, "portfolio id")?,
                name: name.to_string(),
                description: rest.first().map(|d| d.to_string()),
            },
            ["delete-portfolio", id] => Command::DeletePortfolio(parse_id(id, "portfolio id")?),
            ["add-stock", id, symbol, quantity, price] => Command::AddStock {
                portfolio_id: parse_id(id, "portfolio id")?,
                symbol: symbol.to_string(),
                quantity: quantity.to_string(),
                price: price.to_string(),
            },
            ["edit-holding", id, holding, quantity, price] => Command::EditHolding {
                portfolio_id: parse_id(id, "portfolio id")?,
                holding_id: parse_id(holding, "holding id")?,
                quantity: quantity.to_string(),
                price: price.to_string(),
            },
            ["remove-holding", id, holding] => Command::RemoveHolding {
                portfolio_id: parse_id(id, "portfolio id")?,
                holding_id: parse_id(holding, "holding id")?,
            },
            ["stock", symbol, rest @ ..] if rest.len() <= 1 => Command::Stock {
                symbol: symbol.to_string(),
                range: match rest.first() {
                    Some(r) => r.parse().map_err(CliError::Usage)?,
                    None => TimeRange::default(),
                },
            },
            ["buy", symbol, id, quantity, rest @ ..] if rest.len() <= 1 => Command::Buy {
                symbol: symbol.to_string(),
                portfolio_id: parse_id(id, "portfolio id")?,
                quantity: quantity.to_string(),
                price: rest.first().map(|p| p.to_string()),
            },
            ["search", query @ ..] => Command::Search(query.join(" ")),
            ["news"] => Command::News(stockfolio::api::DEFAULT_NEWS_COUNT),
            ["news", count] => Command::News(
                count
                    .parse()
                    .map_err(|_| CliError::Usage(format!("invalid count: '{}'", count)))?,
            ),
            ["watchlist", symbols @ ..] => Command::Watchlist(symbols.iter().map(|s| s.to_string()).collect()),
            ["currency"] => Command::Currency(None),
            ["currency", code] => Command::Currency(Some(code.to_string())),
            [] => return Err(CliError::Usage("missing command".to_string())),
            [other, ..] => return Err(CliError::Usage(format!("unknown command or arguments: '{}'", other))),
        };
        Ok(command)
    }

    fn route(&self) -> Route {
        match self {
            Command::Login { .. } => Route::Login,
            Command::Register { .. } => Route::Register,
            Command::Logout => Route::Home,
            Command::WhoAmI | Command::Currency(_) => Route::Settings,
            Command::Dashboard | Command::Watchlist(_) => Route::Dashboard,
            Command::Portfolios | Command::DeletePortfolio(_) => Route::Portfolios,
            Command::CreatePortfolio { .. } => Route::NewPortfolio,
            Command::Portfolio(id)
            | Command::EditPortfolio { id, .. }
            | Command::AddStock { portfolio_id: id, .. }
            | Command::EditHolding { portfolio_id: id, .. }
            | Command::RemoveHolding { portfolio_id: id, .. } => Route::Portfolio(*id),
            Command::Stock { symbol, .. } | Command::Buy { symbol, .. } => {
                Route::Stock(symbol.trim().to_uppercase())
            }
            Command::Search(_) => Route::Stocks,
            Command::News(_) => Route::News,
        }
    }
}

async fn run(command: Command, session: &mut SessionContext) -> Result<(), CliError> {
    if session.guard(command.route()) == Route::Login && command.route().is_protected() {
        return Err(CliError::NotLoggedIn);
    }
    let currency = session.currency().to_string();

    match command {
        Command::Login { username, password } => {
            validate_credentials(&username, &password)?;
            session
                .login(&username, &password)
                .await
                .map_err(|e| CliError::Failed(e.user_message("Invalid username or password")))?;
            println!("Logged in as {}.", username);
        }
        Command::Register { username, email, password } => {
            if email.trim().is_empty() {
                return Err(ValidationError::MissingFields.into());
            }
            validate_credentials(&username, &password)?;
            session
                .register(&username, &email, &password)
                .await
                .map_err(|e| CliError::Failed(e.user_message("Registration failed")))?;
            println!("Account created. Logged in as {}.", username);
        }
        Command::Logout => {
            session.logout();
            println!("Logged out.");
        }
        Command::WhoAmI => {
            if let Some(user) = session.user() {
                println!("{} <{}> (#{}), currency {}", user.username, user.email, user.id, user.preferred_currency);
            }
        }
        Command::Dashboard => {
            let mut page = DashboardPage::new();
            page.load(session).await;
            let data = page
                .data
                .as_ref()
                .ok_or_else(|| CliError::Failed(page.data.error().unwrap_or_default().to_string()))?;
            print!("{}", view::render_stats(&data.totals, &currency));
            println!("\nAllocation");
            print!("{}", view::render_breakdown(ChartKind::Allocation, &data.portfolios, &currency));
            println!("\nPerformance");
            print!("{}", view::render_breakdown(ChartKind::Performance, &data.portfolios, &currency));
            println!("\nWatchlist");
            print!("{}", view::render_watchlist(page.watchlist.stocks.as_ref().map(Vec::as_slice).unwrap_or_default()));
            println!("\nNews");
            print!("{}", view::render_news(&data.news));
        }
        Command::Portfolios => {
            let mut page = PortfolioListPage::new();
            page.load(session).await;
            print_list(&page, &currency)?;
        }
        Command::Portfolio(id) => {
            let mut page = PortfolioDetailPage::new(id);
            page.load(session).await;
            print_portfolio(&page)?;
        }
        Command::CreatePortfolio { name, description } => {
            let mut form = PortfolioForm::for_create();
            form.name = name;
            form.description = description;
            match form.submit(session.api()).await {
                Ok(created) => {
                    session.navigate(Route::Portfolio(created.id));
                    println!("Created portfolio #{}.", created.id);
                }
                Err(e) => return Err(CliError::form(form.error, e, "Failed to create portfolio")),
            }
        }
        Command::EditPortfolio { id, name, description } => {
            let portfolio = session.api().get_portfolio(id).await?;
            let mut form = PortfolioForm::for_edit(&portfolio);
            form.name = name;
            if let Some(description) = description {
                form.description = description;
            }
            if let Err(e) = form.submit(session.api()).await {
                return Err(CliError::form(form.error, e, "Failed to update portfolio"));
            }
            println!("Updated portfolio #{}.", id);
        }
        Command::DeletePortfolio(id) => {
            let mut page = PortfolioListPage::new();
            if page.delete(session, id).await.is_err() {
                return Err(CliError::Failed(page.portfolios.error().unwrap_or_default().to_string()));
            }
            println!("Deleted portfolio #{}.", id);
            if let Err(e) = print_list(&page, &currency) {
                eprintln!("warning: {}", e);
            }
        }
        Command::AddStock { portfolio_id, symbol, quantity, price } => {
            let mut form = AddStockForm::new(portfolio_id);
            form.symbol = symbol;
            form.quantity = quantity;
            form.purchase_price = price;
            if let Err(e) = form.submit(session.api()).await {
                return Err(CliError::form(form.error, e, "Failed to add stock to portfolio"));
            }
            println!("Added {} to portfolio #{}.", form.symbol.trim().to_uppercase(), portfolio_id);
            let mut page = PortfolioDetailPage::new(portfolio_id);
            print_reloaded(&mut page, session.api()).await;
        }
        Command::EditHolding { portfolio_id, holding_id, quantity, price } => {
            let mut page = PortfolioDetailPage::new(portfolio_id);
            page.load(session).await;
            let holding = page
                .portfolio
                .as_ref()
                .and_then(|p| p.holdings.iter().find(|h| h.id == holding_id))
                .cloned()
                .ok_or_else(|| CliError::Failed(format!("No holding #{} in portfolio #{}", holding_id, portfolio_id)))?;
            let mut form = EditHoldingForm::new(portfolio_id, &holding);
            form.quantity = quantity;
            form.purchase_price = price;
            if let Err(e) = form.submit(session.api()).await {
                return Err(CliError::form(form.error, e, "Failed to update stock holding"));
            }
            println!("Updated holding #{}.", holding_id);
            print_reloaded(&mut page, session.api()).await;
        }
        Command::RemoveHolding { portfolio_id, holding_id } => {
            let mut page = PortfolioDetailPage::new(portfolio_id);
            if page.remove_holding(session.api(), holding_id).await.is_err() {
                return Err(CliError::Failed(page.portfolio.error().unwrap_or(REMOVE_FAILED).to_string()));
            }
            println!("Removed holding #{}.", holding_id);
            if page.portfolio.is_loaded() {
                print_portfolio(&page)?;
            } else {
                eprintln!("warning: {}", RELOAD_FAILED);
            }
        }
        Command::Stock { symbol, range } => {
            let mut page = StockDetailPage::new(&symbol);
            page.load(session).await;
            let detail = page
                .detail
                .as_ref()
                .ok_or_else(|| CliError::Failed(page.detail.error().unwrap_or_default().to_string()))?
                .clone();
            let mut rng = rand::thread_rng();
            page.set_range(range, Local::now().date_naive(), &mut rng);
            print!("{}", view::render_stock(&detail.stock));
            println!();
            print!("{}", view::render_chart_summary(&page.chart, page.range, &detail.stock.currency));
            if let Some(profile) = page.profile(&mut rng) {
                println!();
                print!("{}", view::render_profile(&profile));
            }
            println!("\nNews");
            print!("{}", view::render_news(&detail.news));
        }
        Command::Buy { symbol, portfolio_id, quantity, price } => {
            let mut page = StockDetailPage::new(&symbol);
            page.load(session).await;
            let mut form = page
                .add_to_portfolio_form()
                .ok_or_else(|| CliError::Failed(page.detail.error().unwrap_or_default().to_string()))?;
            form.selected = Some(portfolio_id);
            form.quantity = quantity;
            if let Some(price) = price {
                form.purchase_price = price;
            }
            submit_purchase(&mut form, session.api()).await?;
        }
        Command::Search(query) => {
            let query = query.trim();
            if query.is_empty() {
                return Err(ValidationError::EmptyQuery.into());
            }
            let results = session.api().search_stocks(query).await?;
            if results.is_empty() {
                println!("No stocks found with this symbol or name.");
            } else {
                print!("{}", view::render_search_results(&results));
            }
        }
        Command::News(count) => {
            let mut page = NewsPage::default();
            page.load(session.api(), count).await;
            let news = page
                .news
                .as_ref()
                .ok_or_else(|| CliError::Failed(page.news.error().unwrap_or_default().to_string()))?;
            print!("{}", view::render_news(news));
        }
        Command::Watchlist(symbols) => {
            let mut watchlist = if symbols.is_empty() {
                WatchlistPage::default()
            } else {
                WatchlistPage::with_symbols(symbols)
            };
            watchlist.load(session.api()).await;
            let stocks = watchlist
                .stocks
                .as_ref()
                .ok_or_else(|| CliError::Failed(watchlist.stocks.error().unwrap_or_default().to_string()))?;
            print!("{}", view::render_watchlist(stocks));
        }
        Command::Currency(None) => {
            for c in SUPPORTED {
                let marker = if c.code == currency { "*" } else { " " };
                println!("{} {} {:<5} {}", marker, c.code, c.symbol, c.name);
            }
        }
        Command::Currency(Some(code)) => {
            let mut settings = SettingsPage::new(session);
            settings.select(&code)?;
            if settings.submit(session).await.is_err() {
                return Err(CliError::Failed(settings.error.unwrap_or_default()));
            }
            println!("Currency preference updated to {}.", settings.selected);
        }
    }
    Ok(())
}

async fn submit_purchase(form: &mut AddToPortfolioForm, api: &ApiClient) -> Result<(), CliError> {
    if let Err(e) = form.submit(api).await {
        return Err(CliError::form(form.error.take(), e, "Failed to add stock to portfolio"));
    }
    println!("{}", form.success_message());
    Ok(())
}

fn print_list(page: &PortfolioListPage, currency: &str) -> Result<(), CliError> {
    let portfolios = page
        .portfolios
        .as_ref()
        .ok_or_else(|| CliError::Failed(page.portfolios.error().unwrap_or(LIST_FAILED).to_string()))?;
    print!("{}", view::render_portfolio_list(portfolios, currency));
    Ok(())
}

fn print_portfolio(page: &PortfolioDetailPage) -> Result<(), CliError> {
    let portfolio = page
        .portfolio
        .as_ref()
        .ok_or_else(|| CliError::Failed(page.portfolio.error().unwrap_or(RELOAD_FAILED).to_string()))?;
    print!("{}", view::render_portfolio(portfolio));
    Ok(())
}

/// Shows the portfolio after a change the backend accepted. A failed reload
/// only warns: the change itself went through.
async fn print_reloaded(page: &mut PortfolioDetailPage, api: &ApiClient) {
    match page.refresh(api).await {
        Ok(()) => {
            if let Some(portfolio) = page.portfolio.as_ref() {
                print!("{}", view::render_portfolio(portfolio));
            }
        }
        Err(_) => eprintln!("warning: {}", RELOAD_FAILED),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_env("RUST_LOG")
        .format_timestamp_secs()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let config = Config::from_env();
    info!("Using backend at {}", config.api_url);
    let api = match ApiClient::from_config(&config) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut session = SessionContext::new(api);
    session.initialize().await;

    match run(command, &mut session).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
