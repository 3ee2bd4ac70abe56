//! Read operations on databases and cases.
//!
//! Each operation resolves its client through [`with_client`] (so an
//! installed override wins), builds the `caseBrowse` path for the configured
//! language, and maps the payload into records.

use serde_json::Value;

use crate::client::{ApiClient, QueryParams};
use crate::config;
use crate::context::with_client;
use crate::error::{Error, Result};
use crate::types::{BrowseOptions, Case, Database};

impl Database {
    /// Every case database available in the configured language.
    pub fn all() -> Result<Vec<Database>> {
        with_client(None, |client| {
            let language = config::current_language();
            let response = client.get(&format!("/caseBrowse/{language}"), &QueryParams::new())?;
            Ok(records(&response, "caseDatabases")
                .iter()
                .map(Database::from_record)
                .collect())
        })
    }
}

impl Case {
    /// One page of cases from `database_id`.
    pub fn browse(database_id: &str, options: &BrowseOptions) -> Result<Vec<Case>> {
        with_client(None, |client| {
            let language = config::current_language();
            let response = client.get(
                &format!("/caseBrowse/{language}/{database_id}"),
                &options.to_query(),
            )?;

            // The API answers some bad requests with a bare array.
            if response.is_array() {
                return Ok(Vec::new());
            }
            Ok(records(&response, "cases")
                .iter()
                .map(|data| Case::from_browse(data, &language))
                .collect())
        })
    }

    /// Case detail, or `None` when the API answers 404.
    pub fn find(database_id: &str, case_id: &str) -> Result<Option<Case>> {
        match with_client(None, |client| fetch_detail(client, database_id, case_id)) {
            Ok(case) => Ok(Some(case)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Like [`Case::find`], but a missing case is an `Error::NotFound`.
    pub fn find_required(database_id: &str, case_id: &str) -> Result<Case> {
        Case::find(database_id, case_id)?.ok_or_else(|| {
            Error::NotFound(format!("Case not found: {database_id}/{case_id}"))
        })
    }
}

fn fetch_detail(client: &dyn ApiClient, database_id: &str, case_id: &str) -> Result<Case> {
    let language = config::current_language();
    let response = client.get(
        &format!("/caseBrowse/{language}/{database_id}/{case_id}"),
        &QueryParams::new(),
    )?;
    Ok(Case::from_detail(&response))
}

/// The array under `key`; missing or non-array means no records.
fn records<'a>(response: &'a Value, key: &str) -> &'a [Value] {
    response
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::client::Client;
    use crate::config::with_language;
    use crate::test_support::{lock_global, RecordingClient, StubTransport};

    fn stub(outcome: Result<Value>) -> Rc<RecordingClient> {
        Rc::new(RecordingClient::returning(outcome))
    }

    fn run<T>(client: &Rc<RecordingClient>, body: impl FnOnce() -> Result<T>) -> Result<T> {
        let installed: Rc<dyn ApiClient> = client.clone();
        with_client(Some(installed), |_| body())
    }

    #[test]
    fn all_maps_databases() {
        let _lock = lock_global();
        let client = stub(Ok(json!({
            "caseDatabases": [
                {"databaseId": "csc-scc", "name": "Supreme Court of Canada", "jurisdiction": "ca"},
                {"databaseId": "onca", "name": "Court of Appeal for Ontario", "jurisdiction": "on"}
            ]
        })));

        let databases = run(&client, Database::all).unwrap();

        assert_eq!(databases.len(), 2);
        assert_eq!(databases[0].database_id.as_deref(), Some("csc-scc"));
        assert_eq!(databases[1].name.as_deref(), Some("Court of Appeal for Ontario"));
        assert_eq!(databases[1].jurisdiction.as_deref(), Some("on"));
        assert_eq!(
            client.calls(),
            vec![("/caseBrowse/en".to_string(), QueryParams::new())]
        );
    }

    #[test]
    fn all_treats_missing_key_as_empty() {
        let _lock = lock_global();
        let client = stub(Ok(json!({})));
        assert!(run(&client, Database::all).unwrap().is_empty());
    }

    #[test]
    fn all_uses_configured_language() {
        let _lock = lock_global();
        let client = stub(Ok(json!({"caseDatabases": []})));
        with_language("fr", || run(&client, Database::all)).unwrap();
        assert_eq!(client.calls()[0].0, "/caseBrowse/fr");
    }

    #[test]
    fn all_propagates_client_errors() {
        let _lock = lock_global();
        let client = stub(Err(Error::RateLimit("Rate limit exceeded".to_string())));
        let err = run(&client, Database::all).unwrap_err();
        assert!(matches!(err, Error::RateLimit(_)));
    }

    #[test]
    fn all_without_api_key_is_a_validation_error() {
        let _lock = lock_global();
        config::configure(|c| c.api_key = None);
        let err = Database::all().unwrap_err();
        assert_eq!(err, Error::Validation("API key is required".to_string()));
    }

    #[test]
    fn browse_maps_cases_and_sends_default_paging() {
        let _lock = lock_global();
        let client = stub(Ok(json!({
            "cases": [
                {
                    "databaseId": "csc-scc",
                    "caseId": {"en": "2025scc21"},
                    "title": "Test Case v. Canada",
                    "citation": "2025 SCC 21"
                },
                {
                    "databaseId": "csc-scc",
                    "caseId": "2025scc20",
                    "title": "Another Case",
                    "citation": "2025 SCC 20",
                    "decisionDate": "2025-06-20"
                }
            ]
        })));

        let cases = run(&client, || Case::browse("test-db", &BrowseOptions::default())).unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].case_id.as_deref(), Some("2025scc21"));
        assert_eq!(cases[0].title.as_deref(), Some("Test Case v. Canada"));
        assert_eq!(cases[1].decision_date, NaiveDate::from_ymd_opt(2025, 6, 20));

        let (path, params) = &client.calls()[0];
        assert_eq!(path, "/caseBrowse/en/test-db");
        assert_eq!(
            params,
            &QueryParams::from([
                ("offset".to_string(), "0".to_string()),
                ("resultCount".to_string(), "20".to_string()),
            ])
        );
    }

    #[test]
    fn browse_normalizes_case_ids_with_configured_language() {
        let _lock = lock_global();
        let client = stub(Ok(json!({
            "cases": [{"caseId": {"en": "2025scc21", "fr": "2025csc21"}}]
        })));
        let cases = with_language("fr", || {
            run(&client, || Case::browse("csc-scc", &BrowseOptions::default()))
        })
        .unwrap();
        assert_eq!(cases[0].case_id.as_deref(), Some("2025csc21"));
        assert_eq!(client.calls()[0].0, "/caseBrowse/fr/csc-scc");
    }

    #[test]
    fn browse_on_array_response_is_empty() {
        let _lock = lock_global();
        let client = stub(Ok(json!([])));
        let cases = run(&client, || Case::browse("invalid", &BrowseOptions::default())).unwrap();
        assert!(cases.is_empty());
    }

    #[test]
    fn browse_missing_cases_key_is_empty() {
        let _lock = lock_global();
        let client = stub(Ok(json!({"unexpected": true})));
        let cases = run(&client, || Case::browse("csc-scc", &BrowseOptions::default())).unwrap();
        assert!(cases.is_empty());
    }

    #[test]
    fn browse_sends_paging_and_dates_over_the_wire() {
        let _lock = lock_global();
        let transport = StubTransport::responding(200, r#"{"cases": []}"#);
        let client: Rc<dyn ApiClient> = Rc::new(Client::with_transport(
            config::configuration(),
            transport.clone(),
        ));
        let options = BrowseOptions::default()
            .offset(50)
            .limit(100)
            .published_after(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .published_before(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        with_client(Some(client), |_| Case::browse("csc-scc", &options)).unwrap();

        let req = &transport.requests()[0];
        assert_eq!(req.url, "https://api.canlii.org/v1/caseBrowse/en/csc-scc");
        assert_eq!(req.query_param("offset"), Some("50"));
        assert_eq!(req.query_param("resultCount"), Some("100"));
        assert_eq!(req.query_param("decisionDateAfter"), Some("2025-01-01"));
        assert_eq!(req.query_param("decisionDateBefore"), Some("2025-12-31"));
        assert_eq!(req.query_param("api_key"), Some("test_key"));
        assert_eq!(req.query_param("language"), Some("en"));
    }

    #[test]
    fn find_maps_detail() {
        let _lock = lock_global();
        let client = stub(Ok(json!({
            "databaseId": "csc-scc",
            "caseId": "mock123",
            "title": "Mock Case"
        })));
        let case = run(&client, || Case::find("csc-scc", "mock123"))
            .unwrap()
            .unwrap();
        assert_eq!(case.case_id.as_deref(), Some("mock123"));
        assert_eq!(case.title.as_deref(), Some("Mock Case"));
        assert_eq!(client.calls()[0].0, "/caseBrowse/en/csc-scc/mock123");
    }

    #[test]
    fn find_returns_none_on_not_found() {
        let _lock = lock_global();
        let client = stub(Err(Error::NotFound("Resource not found".to_string())));
        let found = run(&client, || Case::find("csc-scc", "missing")).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn find_propagates_other_errors() {
        let _lock = lock_global();
        let client = stub(Err(Error::Authentication("Invalid API key".to_string())));
        let err = run(&client, || Case::find("csc-scc", "x")).unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn find_propagates_validation_errors() {
        let _lock = lock_global();
        config::configure(|c| c.api_key = Some(String::new()));
        let err = Case::find("csc-scc", "2025scc21").unwrap_err();
        assert_eq!(err, Error::Validation("API key is required".to_string()));
    }

    #[test]
    fn find_required_reports_missing_case() {
        let _lock = lock_global();
        let client = stub(Err(Error::NotFound("Resource not found".to_string())));
        let err = run(&client, || Case::find_required("csc-scc", "missing")).unwrap_err();
        assert_eq!(
            err,
            Error::NotFound("Case not found: csc-scc/missing".to_string())
        );
    }

    #[test]
    fn find_required_returns_found_case() {
        let _lock = lock_global();
        let client = stub(Ok(json!({"databaseId": "test", "caseId": "123"})));
        let case = run(&client, || Case::find_required("test", "123")).unwrap();
        assert_eq!(case.to_string(), "test/123");
    }
}
