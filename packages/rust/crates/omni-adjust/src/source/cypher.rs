//! Graph backend: Cypher over the Neo4j transactional HTTP endpoint.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use super::{RowSource, SourceQuery};
use crate::error::SourceError;
use crate::row::{RowSet, Scalar};
use crate::settings::GraphSettings;

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<TransactionError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataRow>,
}

#[derive(Debug, Deserialize)]
struct DataRow {
    #[serde(default)]
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TransactionError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Decode a transactional endpoint response body into rows.
///
/// # Errors
///
/// [`SourceError::Decode`] for malformed JSON, [`SourceError::Query`] when the
/// server reported statement errors.
pub fn parse_transaction_response(body: &str) -> Result<RowSet, SourceError> {
    let response: TransactionResponse = serde_json::from_str(body)
        .map_err(|err| SourceError::Decode(format!("invalid cypher response: {err}")))?;

    if let Some(first) = response.errors.first() {
        return Err(SourceError::Query(format!("{}: {}", first.code, first.message)));
    }

    let mut rows = Vec::new();
    for result in response.results {
        let data: Vec<Vec<Scalar>> = result
            .data
            .into_iter()
            .map(|entry| entry.row.iter().map(Scalar::from).collect())
            .collect();
        rows.extend(RowSet::from_columns(&result.columns, data).rows);
    }
    Ok(RowSet::from_rows(rows))
}

/// Cypher row source talking to `{url}/db/{database}/tx/commit`.
pub struct CypherHttpSource {
    client: reqwest::blocking::Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
}

impl CypherHttpSource {
    /// Build a source from graph settings.
    ///
    /// # Errors
    ///
    /// [`SourceError::Connection`] if the HTTP client cannot be initialised.
    pub fn new(settings: &GraphSettings) -> Result<Self, SourceError> {
        let timeout = (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SourceError::Connection(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            endpoint: commit_endpoint(&settings.url, &settings.database),
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    /// Resolved commit endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn commit_endpoint(url: &str, database: &str) -> String {
    format!("{}/db/{}/tx/commit", url.trim().trim_end_matches('/'), database.trim())
}

impl RowSource for CypherHttpSource {
    fn backend_name(&self) -> &'static str {
        "cypher"
    }

    fn execute(&self, query: &SourceQuery) -> Result<RowSet, SourceError> {
        let body = json!({
            "statements": [{
                "statement": query.text,
                "parameters": query.parameters,
                "resultDataContents": ["row"],
            }]
        });
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        log::debug!("cypher query to {}: {}", self.endpoint, query.text);
        let response = request.send()?.error_for_status()?;
        let text = response.text()?;
        parse_transaction_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::{commit_endpoint, parse_transaction_response};
    use crate::error::SourceError;
    use crate::row::Scalar;

    #[test]
    fn test_parse_rows() {
        let body = r#"{
            "results": [{
                "columns": ["id", "score"],
                "data": [
                    {"row": [1, 2.5], "meta": [null, null]},
                    {"row": ["abc", null], "meta": [null, null]}
                ]
            }],
            "errors": []
        }"#;
        let rows = parse_transaction_response(body).unwrap_or_default();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0].get("id"), Some(&Scalar::Int(1)));
        assert_eq!(rows.rows[0].get("score"), Some(&Scalar::Float(2.5)));
        assert_eq!(rows.rows[1].get("id"), Some(&Scalar::Text("abc".into())));
        assert_eq!(rows.rows[1].get("score"), Some(&Scalar::Null));
    }

    #[test]
    fn test_parse_statement_error() {
        let body = r#"{"results": [], "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]}"#;
        let err = parse_transaction_response(body);
        assert!(matches!(err, Err(SourceError::Query(ref msg)) if msg.contains("SyntaxError")));
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_transaction_response("<html>"),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_empty_result() {
        let rows = parse_transaction_response(r#"{"results": [{"columns": ["id"], "data": []}]}"#);
        assert!(matches!(rows, Ok(ref set) if set.is_empty()));
    }

    #[test]
    fn test_commit_endpoint() {
        assert_eq!(
            commit_endpoint("http://localhost:7474/", "neo4j"),
            "http://localhost:7474/db/neo4j/tx/commit"
        );
    }
}
