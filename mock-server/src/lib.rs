use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

/// Browsing this database answers 429.
pub const THROTTLED_DATABASE: &str = "throttled";
/// Browsing this database answers 200 with a body that is not JSON.
pub const BROKEN_DATABASE: &str = "broken";
/// Browsing this database answers only after `SLOW_DELAY`.
pub const SLOW_DATABASE: &str = "slow";
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseRecord {
    pub database_id: String,
    pub name: String,
    pub jurisdiction: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub database_id: String,
    pub case_id: String,
    pub title: String,
    pub citation: String,
    pub url: String,
    pub decision_date: String,
}

/// Fixture data served by the mock API.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub api_key: String,
    pub databases: Vec<DatabaseRecord>,
    pub cases: Vec<CaseRecord>,
}

impl Catalog {
    pub fn sample() -> Self {
        let database = |id: &str, name: &str, jurisdiction: &str| DatabaseRecord {
            database_id: id.to_string(),
            name: name.to_string(),
            jurisdiction: jurisdiction.to_string(),
        };
        let case = |db: &str, id: &str, title: &str, citation: &str, date: &str| CaseRecord {
            database_id: db.to_string(),
            case_id: id.to_string(),
            title: title.to_string(),
            citation: citation.to_string(),
            url: format!("https://canlii.ca/t/{id}"),
            decision_date: date.to_string(),
        };

        Self {
            api_key: "test_key".to_string(),
            databases: vec![
                database("csc-scc", "Supreme Court of Canada", "ca"),
                database("onca", "Court of Appeal for Ontario", "on"),
            ],
            cases: vec![
                case("csc-scc", "2025scc21", "Test Case v. Canada", "2025 SCC 21", "2025-06-27"),
                case("csc-scc", "2025scc20", "Another Case", "2025 SCC 20", "2025-06-20"),
                case("csc-scc", "2024scc40", "Older Case", "2024 SCC 40", "2024-11-08"),
                case("onca", "2025onca100", "R. v. Example", "2025 ONCA 100", "2025-02-14"),
            ],
        }
    }
}

pub type SharedCatalog = Arc<Catalog>;

pub fn app() -> Router {
    app_with(Catalog::sample())
}

pub fn app_with(catalog: Catalog) -> Router {
    Router::new()
        .route("/caseBrowse/{lang}", get(list_databases))
        .route("/caseBrowse/{lang}/{database_id}", get(browse_cases))
        .route("/caseBrowse/{lang}/{database_id}/{case_id}", get(case_detail))
        .with_state(Arc::new(catalog))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type Params = HashMap<String, String>;

fn authorize(catalog: &Catalog, params: &Params) -> Result<(), Response> {
    if params.get("api_key") == Some(&catalog.api_key) {
        return Ok(());
    }
    Err((
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Invalid API key"})),
    )
        .into_response())
}

async fn list_databases(
    State(catalog): State<SharedCatalog>,
    Path(_lang): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(denied) = authorize(&catalog, &params) {
        return denied;
    }
    Json(json!({ "caseDatabases": catalog.databases })).into_response()
}

async fn browse_cases(
    State(catalog): State<SharedCatalog>,
    Path((lang, database_id)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(denied) = authorize(&catalog, &params) {
        return denied;
    }

    match database_id.as_str() {
        THROTTLED_DATABASE => return StatusCode::TOO_MANY_REQUESTS.into_response(),
        BROKEN_DATABASE => {
            return ([(header::CONTENT_TYPE, "text/html")], "<html>maintenance</html>")
                .into_response()
        }
        SLOW_DATABASE => tokio::time::sleep(SLOW_DELAY).await,
        _ => {}
    }

    if !catalog.databases.iter().any(|db| db.database_id == database_id) {
        // The real API reports unknown databases as a 200 with an array body.
        return Json(json!([{ "error": "Unknown database" }])).into_response();
    }

    let offset = number(&params, "offset", 0);
    let count = number(&params, "resultCount", 20);
    let after = params.get("decisionDateAfter");
    let before = params.get("decisionDateBefore");

    let cases: Vec<_> = catalog
        .cases
        .iter()
        .filter(|c| c.database_id == database_id)
        .filter(|c| after.is_none_or(|d| c.decision_date.as_str() > d.as_str()))
        .filter(|c| before.is_none_or(|d| c.decision_date.as_str() < d.as_str()))
        .skip(offset)
        .take(count)
        .map(|c| {
            let mut case_id = serde_json::Map::new();
            case_id.insert(lang.clone(), json!(c.case_id));
            json!({
                "databaseId": c.database_id,
                "caseId": case_id,
                "title": c.title,
                "citation": c.citation,
                "decisionDate": c.decision_date,
            })
        })
        .collect();

    Json(json!({ "cases": cases })).into_response()
}

async fn case_detail(
    State(catalog): State<SharedCatalog>,
    Path((lang, database_id, case_id)): Path<(String, String, String)>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(denied) = authorize(&catalog, &params) {
        return denied;
    }

    let found = catalog
        .cases
        .iter()
        .find(|c| c.database_id == database_id && c.case_id == case_id);
    match found {
        Some(c) => Json(json!({
            "databaseId": c.database_id,
            "caseId": c.case_id,
            "title": c.title,
            "citation": c.citation,
            "url": c.url,
            "decisionDate": c.decision_date,
            "language": lang,
        }))
        .into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn number(params: &Params, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
