// tests/common/mod.rs
//! In-process stand-in for the portfolio backend, served on an ephemeral port.
#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use warp::http::{Method, StatusCode};
use warp::path::FullPath;
use warp::reply::Response;
use warp::{Filter, Reply};

use stockfolio::token::{MemoryTokenStore, TokenStore};
use stockfolio::ApiClient;

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";

#[derive(Debug)]
pub struct Backend {
    pub portfolios: Vec<Value>,
    /// Full portfolio documents served by `GET /portfolios/{id}`.
    pub details: HashMap<i64, Value>,
    pub currency: String,
    /// When set, `GET /portfolios/{id}` answers 500.
    pub fail_detail: bool,
    pub next_id: i64,
    /// Body of the last POST or PUT received.
    pub last_body: Option<Value>,
    /// `"METHOD /path?query"` for every request received, in order.
    pub requests: Vec<String>,
    /// Authorization header of every request received, in order.
    pub auth_headers: Vec<Option<String>>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            portfolios: Vec::new(),
            details: HashMap::new(),
            currency: "USD".to_string(),
            fail_detail: false,
            next_id: 100,
            last_body: None,
            requests: Vec::new(),
            auth_headers: Vec::new(),
        }
    }
}

impl Backend {
    pub fn requests_matching(&self, prefix: &str) -> Vec<String> {
        self.requests
            .iter()
            .filter(|r| r.starts_with(prefix))
            .cloned()
            .collect()
    }
}

pub type Shared = Arc<Mutex<Backend>>;

pub fn portfolio(id: i64, name: &str, value: f64, profit_loss: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "stockCount": 2,
        "totalValue": value,
        "totalProfitLoss": profit_loss,
        "totalProfitLossPercentage": 0.0,
        "currency": "USD"
    })
}

pub fn holding(id: i64, symbol: &str, quantity: f64, purchase_price: f64) -> Value {
    json!({
        "id": id,
        "symbol": symbol,
        "name": format!("{} Inc", symbol),
        "quantity": quantity,
        "purchasePrice": purchase_price,
        "currentPrice": 100.0,
        "currentValue": quantity * 100.0,
        "profitLoss": quantity * (100.0 - purchase_price),
        "profitLossPercentage": 0.0,
        "currency": "USD"
    })
}

pub fn portfolio_detail(id: i64, name: &str, holdings: Vec<Value>) -> Value {
    let value: f64 = holdings.iter().filter_map(|h| h["currentValue"].as_f64()).sum();
    json!({
        "id": id,
        "name": name,
        "description": "Long term",
        "holdings": holdings,
        "totalValue": value,
        "totalCost": value,
        "totalProfitLoss": 0.0,
        "totalProfitLossPercentage": 0.0,
        "currency": "USD"
    })
}

pub fn backend_with(portfolios: Vec<Value>) -> Shared {
    Arc::new(Mutex::new(Backend {
        portfolios,
        ..Backend::default()
    }))
}

pub fn backend_with_detail(detail: Value) -> Shared {
    let id = detail["id"].as_i64().unwrap_or_default();
    let mut backend = Backend::default();
    backend.portfolios.push(portfolio(id, detail["name"].as_str().unwrap_or_default(), 0.0, 0.0));
    backend.details.insert(id, detail);
    Arc::new(Mutex::new(backend))
}

pub fn client(base_url: &str, tokens: Arc<MemoryTokenStore>) -> ApiClient {
    let tokens: Arc<dyn TokenStore> = tokens;
    ApiClient::new(base_url, tokens).unwrap()
}

fn with_backend(backend: Shared) -> impl Filter<Extract = (Shared,), Error = Infallible> + Clone {
    warp::any().map(move || backend.clone())
}

fn error(status: StatusCode, message: &str) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "message": message })), status).into_response()
}

/// 401 unless the request carries the token handed out at login.
fn deny(auth: &Option<String>) -> Option<Response> {
    if auth.as_deref() == Some(&format!("Bearer {}", TOKEN)[..]) {
        None
    } else {
        Some(error(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

fn user(username: &str, email: &str, currency: &str) -> Value {
    json!({
        "id": 1,
        "username": username,
        "email": email,
        "preferredCurrency": currency
    })
}

fn stock(symbol: &str) -> Value {
    json!({
        "symbol": symbol,
        "name": format!("{} Inc", symbol),
        "currentPrice": 100.0,
        "percentChange": 1.5,
        "currency": "USD"
    })
}

fn news_items(count: usize, symbols: &str) -> Vec<Value> {
    (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "title": format!("Headline {}", i),
                "summary": "Markets moved.",
                "source": "Wire",
                "url": format!("https://news.example.com/{}", i),
                "publishedAt": "2024-03-01T14:00:00",
                "relatedSymbols": symbols
            })
        })
        .collect()
}

fn count(query: &HashMap<String, String>) -> usize {
    query.get("count").and_then(|c| c.parse().ok()).unwrap_or(10)
}

fn created(id: i64) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "id": id })), StatusCode::CREATED).into_response()
}

/// Starts the mock and returns its API base URL.
pub async fn spawn(backend: Shared) -> String {
    let auth = warp::header::optional::<String>("authorization");
    let raw_query = warp::query::raw().or(warp::any().map(String::new)).unify();

    let recorder = warp::method()
        .and(warp::path::full())
        .and(raw_query)
        .and(auth.clone())
        .and(with_backend(backend.clone()))
        .map(|method: Method, path: FullPath, query: String, auth: Option<String>, backend: Shared| {
            let mut backend = backend.lock().unwrap();
            let line = if query.is_empty() {
                format!("{} {}", method, path.as_str())
            } else {
                format!("{} {}?{}", method, path.as_str(), query)
            };
            backend.requests.push(line);
            backend.auth_headers.push(auth);
        })
        .untuple_one();

    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_backend(backend.clone()))
        .map(|body: Value, backend: Shared| {
            let backend = backend.lock().unwrap();
            if body["password"] != PASSWORD {
                return error(StatusCode::UNAUTHORIZED, "Invalid username or password");
            }
            let mut response = user("ada", "ada@example.com", &backend.currency);
            response["token"] = json!(TOKEN);
            warp::reply::json(&response).into_response()
        });

    let register = warp::path!("api" / "auth" / "register")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_backend(backend.clone()))
        .map(|body: Value, backend: Shared| {
            let mut backend = backend.lock().unwrap();
            backend.last_body = Some(body.clone());
            let username = body["username"].as_str().unwrap_or_default();
            if username == "taken" {
                return error(StatusCode::BAD_REQUEST, "Username is already taken");
            }
            let email = body["email"].as_str().unwrap_or_default();
            let mut response = user(username, email, &backend.currency);
            response["token"] = json!(TOKEN);
            warp::reply::json(&response).into_response()
        });

    let me = warp::path!("api" / "users" / "me")
        .and(warp::get())
        .and(auth.clone())
        .and(with_backend(backend.clone()))
        .map(|auth: Option<String>, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            let backend = backend.lock().unwrap();
            warp::reply::json(&user("ada", "ada@example.com", &backend.currency)).into_response()
        });

    let currency = warp::path!("api" / "users" / "currency")
        .and(warp::put())
        .and(auth.clone())
        .and(warp::body::json())
        .and(with_backend(backend.clone()))
        .map(|auth: Option<String>, body: Value, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            let mut backend = backend.lock().unwrap();
            backend.currency = body["currency"].as_str().unwrap_or_default().to_string();
            warp::reply::json(&user("ada", "ada@example.com", &backend.currency)).into_response()
        });

    let list = warp::path!("api" / "portfolios")
        .and(warp::get())
        .and(auth.clone())
        .and(with_backend(backend.clone()))
        .map(|auth: Option<String>, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            warp::reply::json(&backend.lock().unwrap().portfolios).into_response()
        });

    let create = warp::path!("api" / "portfolios")
        .and(warp::post())
        .and(auth.clone())
        .and(warp::body::json())
        .and(with_backend(backend.clone()))
        .map(|auth: Option<String>, body: Value, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            let mut backend = backend.lock().unwrap();
            let id = backend.next_id;
            backend.next_id += 1;
            let name = body["name"].as_str().unwrap_or_default().to_string();
            let mut summary = portfolio(id, &name, 0.0, 0.0);
            summary["description"] = body["description"].clone();
            backend.portfolios.push(summary);
            backend.details.insert(id, portfolio_detail(id, &name, Vec::new()));
            backend.last_body = Some(body);
            created(id)
        });

    let detail = warp::path!("api" / "portfolios" / i64)
        .and(warp::get())
        .and(auth.clone())
        .and(with_backend(backend.clone()))
        .map(|id: i64, auth: Option<String>, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            let backend = backend.lock().unwrap();
            if backend.fail_detail {
                return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
            }
            match backend.details.get(&id) {
                Some(detail) => {
                    let mut detail = detail.clone();
                    let holdings = detail["holdings"].as_array().cloned().unwrap_or_default();
                    detail["totalValue"] = json!(holdings
                        .iter()
                        .filter_map(|h| h["currentValue"].as_f64())
                        .sum::<f64>());
                    warp::reply::json(&detail).into_response()
                }
                None => error(StatusCode::NOT_FOUND, "Portfolio not found"),
            }
        });

    let update = warp::path!("api" / "portfolios" / i64)
        .and(warp::put())
        .and(auth.clone())
        .and(warp::body::json())
        .and(with_backend(backend.clone()))
        .map(|id: i64, auth: Option<String>, body: Value, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            let mut backend = backend.lock().unwrap();
            let Some(detail) = backend.details.get_mut(&id) else {
                return error(StatusCode::NOT_FOUND, "Portfolio not found");
            };
            detail["name"] = body["name"].clone();
            detail["description"] = body["description"].clone();
            backend.last_body = Some(body);
            warp::reply::json(&json!({ "id": id })).into_response()
        });

    let delete = warp::path!("api" / "portfolios" / i64)
        .and(warp::delete())
        .and(auth.clone())
        .and(with_backend(backend.clone()))
        .map(|id: i64, auth: Option<String>, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            let mut backend = backend.lock().unwrap();
            let before = backend.portfolios.len();
            backend.portfolios.retain(|p| p["id"] != id);
            backend.details.remove(&id);
            if backend.portfolios.len() == before {
                return error(StatusCode::NOT_FOUND, "Portfolio not found");
            }
            StatusCode::NO_CONTENT.into_response()
        });

    let add_stock = warp::path!("api" / "portfolios" / i64 / "stocks")
        .and(warp::post())
        .and(auth.clone())
        .and(warp::body::json())
        .and(with_backend(backend.clone()))
        .map(|_id: i64, auth: Option<String>, body: Value, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            let symbol = body["symbol"].as_str().unwrap_or_default().to_string();
            backend.lock().unwrap().last_body = Some(body);
            if symbol == "ZZZZ" {
                return error(StatusCode::BAD_REQUEST, "Stock not found: ZZZZ");
            }
            created(99)
        });

    let update_holding = warp::path!("api" / "portfolios" / i64 / "stocks" / i64)
        .and(warp::put())
        .and(auth.clone())
        .and(warp::body::json())
        .and(with_backend(backend.clone()))
        .map(|id: i64, holding_id: i64, auth: Option<String>, body: Value, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            let mut backend = backend.lock().unwrap();
            let target = backend
                .details
                .get_mut(&id)
                .and_then(|d| d["holdings"].as_array_mut())
                .and_then(|hs| hs.iter_mut().find(|h| h["id"] == holding_id));
            let Some(target) = target else {
                return error(StatusCode::NOT_FOUND, "Holding not found");
            };
            target["quantity"] = body["quantity"].clone();
            target["purchasePrice"] = body["purchasePrice"].clone();
            backend.last_body = Some(body);
            warp::reply::json(&json!({ "id": holding_id })).into_response()
        });

    let remove_holding = warp::path!("api" / "portfolios" / i64 / "stocks" / i64)
        .and(warp::delete())
        .and(auth.clone())
        .and(with_backend(backend.clone()))
        .map(|id: i64, holding_id: i64, auth: Option<String>, backend: Shared| {
            if let Some(denied) = deny(&auth) {
                return denied;
            }
            let mut backend = backend.lock().unwrap();
            let Some(holdings) = backend.details.get_mut(&id).and_then(|d| d["holdings"].as_array_mut())
            else {
                return error(StatusCode::NOT_FOUND, "Portfolio not found");
            };
            let before = holdings.len();
            holdings.retain(|h| h["id"] != holding_id);
            if holdings.len() == before {
                return error(StatusCode::NOT_FOUND, "Holding not found");
            }
            StatusCode::NO_CONTENT.into_response()
        });

    let batch = warp::path!("api" / "stocks" / "batch")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(|query: HashMap<String, String>| {
            let stocks: Vec<Value> = query
                .get("symbols")
                .map(|s| s.split(',').map(stock).collect())
                .unwrap_or_default();
            warp::reply::json(&stocks).into_response()
        });

    let search = warp::path!("api" / "stocks" / "public" / "search")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(|query: HashMap<String, String>| {
            let term = query.get("query").map(String::as_str).unwrap_or_default();
            let results: Vec<Value> = if term == "nothing" {
                Vec::new()
            } else {
                vec![stock(&term.to_uppercase())]
            };
            warp::reply::json(&results).into_response()
        });

    let get_stock = warp::path!("api" / "stocks" / String)
        .and(warp::get())
        .map(|symbol: String| {
            if symbol == "ZZZZ" {
                return error(StatusCode::NOT_FOUND, "Stock not found: ZZZZ");
            }
            warp::reply::json(&stock(&symbol)).into_response()
        });

    let latest_news = warp::path!("api" / "news")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(|query: HashMap<String, String>| {
            warp::reply::json(&news_items(count(&query), "AAPL")).into_response()
        });

    let stock_news = warp::path!("api" / "news" / "stock" / String)
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(|symbol: String, query: HashMap<String, String>| {
            warp::reply::json(&news_items(count(&query), &symbol)).into_response()
        });

    let portfolio_news = warp::path!("api" / "news" / "portfolio")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(|query: HashMap<String, String>| {
            warp::reply::json(&news_items(count(&query).min(2), "AAPL, MSFT")).into_response()
        });

    let auth_routes = login.or(register).unify().or(me).unify().or(currency).unify();
    let portfolio_routes = list
        .or(create)
        .unify()
        .or(detail)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(add_stock)
        .unify()
        .or(update_holding)
        .unify()
        .or(remove_holding)
        .unify();
    // batch and search are matched before the `{symbol}` route
    let stock_routes = batch.or(search).unify().or(get_stock).unify();
    let news_routes = latest_news.or(stock_news).unify().or(portfolio_news).unify();

    let routes = recorder.and(
        auth_routes
            .or(portfolio_routes)
            .unify()
            .or(stock_routes)
            .unify()
            .or(news_routes)
            .unify(),
    );

    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    format!("http://{}/api", addr)
}
