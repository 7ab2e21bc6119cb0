//! AWS Lambda handler exposing the savings pipeline over HTTP
//!
//! Routes (Lambda Function URL, paths matched by suffix):
//!   POST .../transactions:parse      expenses -> transactions + totals
//!   POST .../transactions:validator  transactions -> valid / invalid / duplicate
//!   POST .../transactions:filter     q, p, transactions -> valid / invalid
//!   POST .../returns:nps             NPS projection per k window
//!   POST .../returns:index           index fund projection per k window
//!   GET  /health
//!
//! Request `wage` is monthly; the core works on annual wage.
//! Money goes out as decimal strings. `savingsByDates[].profits` is
//! `realValue - amount` for both funds; `realValue` carries the real value itself.

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{info, warn};
use retirement_autosave::{
    periods::{filter_transactions, RuleSet},
    returns::{money, FundKind, InvestorProfile, ReturnsEngine},
    transactions::{
        build_transactions, validate_transactions, Expense, Transaction, TransactionTotals,
    },
    ReturnsConfig, SavingsError,
};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

const MONTHS_PER_YEAR: i64 = 12;

#[derive(Debug, Deserialize)]
struct ValidatorRequest {
    transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
struct FilterRequest {
    #[serde(flatten)]
    rules: RuleSet,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
struct ReturnsRequest {
    age: i32,
    /// Monthly wage
    wage: Decimal,
    inflation: Decimal,
    #[serde(flatten)]
    rules: RuleSet,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseResponse {
    transactions: Vec<Transaction>,
    #[serde(flatten)]
    totals: TransactionTotals,
}

fn cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn error_response(status: u16, code: &str, message: &str) -> Result<Response<Body>, Error> {
    let body = json!({ "code": code, "error": message });
    Ok(cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(body.to_string()))?)
}

fn json_response<T: Serialize>(body: &T) -> Result<Response<Body>, Error> {
    Ok(cors(Response::builder())
        .status(200)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

fn savings_error(err: SavingsError) -> Result<Response<Body>, Error> {
    warn!("request rejected: {}", err);
    error_response(422, err.code(), &err.to_string())
}

fn parse_body<T: DeserializeOwned>(event: &Request) -> Result<T, serde_json::Error> {
    match event.body() {
        Body::Text(s) => serde_json::from_str(s),
        Body::Binary(b) => serde_json::from_slice(b),
        Body::Empty => serde_json::from_str("{}"),
    }
}

macro_rules! body_or_400 {
    ($event:expr) => {
        match parse_body($event) {
            Ok(parsed) => parsed,
            Err(e) => return error_response(400, "INVALID_JSON", &format!("Invalid JSON: {}", e)),
        }
    };
}

fn parse_expenses(event: &Request) -> Result<Response<Body>, Error> {
    let expenses: Vec<Expense> = body_or_400!(event);

    match build_transactions(&expenses) {
        Ok(transactions) => {
            let totals = TransactionTotals::of(&transactions);
            json_response(&ParseResponse {
                transactions,
                totals: TransactionTotals {
                    total_amount: money(totals.total_amount),
                    total_ceiling: money(totals.total_ceiling),
                    total_remanent: money(totals.total_remanent),
                },
            })
        }
        Err(e) => savings_error(e),
    }
}

fn validate(event: &Request) -> Result<Response<Body>, Error> {
    let request: ValidatorRequest = body_or_400!(event);
    json_response(&validate_transactions(&request.transactions))
}

fn filter(event: &Request) -> Result<Response<Body>, Error> {
    let request: FilterRequest = body_or_400!(event);

    match filter_transactions(&request.transactions, &request.rules.q, &request.rules.p) {
        Ok(report) => json_response(&report),
        Err(e) => savings_error(e),
    }
}

fn returns(
    engine: &ReturnsEngine,
    kind: FundKind,
    event: &Request,
) -> Result<Response<Body>, Error> {
    let request: ReturnsRequest = body_or_400!(event);

    let investor = InvestorProfile::new(
        request.age,
        request.wage * Decimal::from(MONTHS_PER_YEAR),
        request.inflation,
    );

    match engine.savings_by_windows(&investor, kind, &request.rules, &request.transactions) {
        Ok(report) => json_response(&report.rounded()),
        Err(e) => savings_error(e),
    }
}

/// Lambda handler function
async fn handler(engine: &ReturnsEngine, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str().to_string();
    let path = event.uri().path().to_string();

    // Handle CORS preflight
    if method == "OPTIONS" {
        return Ok(cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    info!("{} {}", method, path);

    match (method.as_str(), path.as_str()) {
        ("GET", p) if p.ends_with("/health") => json_response(&json!({ "status": "ok" })),
        ("POST", p) if p.ends_with("transactions:parse") => parse_expenses(&event),
        ("POST", p) if p.ends_with("transactions:validator") => validate(&event),
        ("POST", p) if p.ends_with("transactions:filter") => filter(&event),
        ("POST", p) if p.ends_with("returns:nps") => returns(engine, FundKind::Nps, &event),
        ("POST", p) if p.ends_with("returns:index") => returns(engine, FundKind::Index, &event),
        _ => error_response(404, "NOT_FOUND", &format!("No route for {} {}", method, path)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = ReturnsConfig::from_env()?;
    info!(
        "retirement age {}, NPS rate {}, index rate {}",
        config.retirement_age, config.nps.annual_rate, config.index.annual_rate
    );
    let engine = Arc::new(ReturnsEngine::new(config));

    run(service_fn(move |event: Request| {
        let engine = Arc::clone(&engine);
        async move { handler(&engine, event).await }
    }))
    .await
}
