//! Request parsing: page window, adjuster clause, and source rewrite.
//!
//! Parsing produces a per-call [`AdjustRequest`]; adjusters never store
//! request state, so one instance serves concurrent requests.

use serde_json::{Map, Value};

use crate::error::{AdjustError, AdjustResult};
use crate::mapping::{DEFAULT_ID_COLUMN, DEFAULT_SCORE_COLUMN};
use crate::settings::AdjusterSettings;
use crate::source::SourceQuery;
use crate::window::PageWindow;

/// Clause carrying membership-filter parameters.
pub const FILTER_CLAUSE: &str = "gas-filter";
/// Clause carrying rescoring parameters.
pub const BOOSTER_CLAUSE: &str = "gas-booster";

/// Page size when the request names none.
pub const DEFAULT_SIZE: usize = 10;
/// Page offset when the request names none.
pub const DEFAULT_FROM: usize = 0;

const SIZE: &str = "size";
const FROM: &str = "from";
const QUERY: &str = "query";
const MAX_RESULT_SIZE: &str = "maxResultSize";
const EXCLUDE: &str = "exclude";
const IDENTIFIER: &str = "identifier";
const SCORE_NAME: &str = "scoreName";
const CONNECTION_STRING: &str = "connectionString";
const PARAMS: &str = "params";

/// Everything one adjustment call needs, parsed from the request source.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustRequest {
    /// Page the caller asked for.
    pub window: PageWindow,
    /// External query (text, parameters, connection descriptor).
    pub query: SourceQuery,
    /// Membership direction: drop remote identifiers (`true`) or keep only them.
    pub exclude: bool,
    /// Result column naming the hit identifier.
    pub id_column: String,
    /// Result column carrying the rescoring factor.
    pub score_column: String,
    /// Upstream fetch size written back into the request source.
    pub max_result_size: Option<usize>,
}

impl AdjustRequest {
    /// Request with default columns, exclude-mode, and no size override.
    #[must_use]
    pub fn new(query: impl Into<String>, window: PageWindow) -> Self {
        Self {
            window,
            query: SourceQuery::new(query),
            exclude: true,
            id_column: DEFAULT_ID_COLUMN.to_string(),
            score_column: DEFAULT_SCORE_COLUMN.to_string(),
            max_result_size: None,
        }
    }

    /// Set the membership direction.
    #[must_use]
    pub fn with_exclude(mut self, exclude: bool) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set the identifier column.
    #[must_use]
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Set the factor column.
    #[must_use]
    pub fn with_score_column(mut self, column: impl Into<String>) -> Self {
        self.score_column = column.into();
        self
    }

    /// Set the connection descriptor.
    #[must_use]
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.query.connection = Some(connection.into());
        self
    }

    /// Rewrite the request source before the underlying search executes.
    ///
    /// `size` becomes the max result size; `reset_from` also forces `from` to 0
    /// so the whole candidate set is fetched.
    pub fn rewrite_source(&self, source: &mut Map<String, Value>, reset_from: bool) {
        if let Some(max) = self.max_result_size {
            source.insert(SIZE.to_string(), Value::from(max));
        }
        if reset_from {
            source.insert(FROM.to_string(), Value::from(0_u64));
        }
    }
}

/// Integer view of a JSON number or numeric string.
fn int_param(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn usize_param(value: Option<&Value>, default: usize) -> usize {
    int_param(value)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

fn text_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn column_param(clause: &Map<String, Value>, key: &str, default: &str) -> String {
    clause
        .get(key)
        .map(text_param)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse `size`/`from` and the named adjuster clause out of a request source.
///
/// # Errors
///
/// Configuration errors when the clause, `query`, or (if
/// `requires_connection`) `connectionString` is absent, or when a clause
/// value has the wrong shape. Nothing is executed before these checks.
pub fn parse_request(
    source: &Map<String, Value>,
    clause_name: &'static str,
    settings: &AdjusterSettings,
    requires_connection: bool,
) -> AdjustResult<AdjustRequest> {
    let window = PageWindow::new(
        usize_param(source.get(FROM), DEFAULT_FROM),
        usize_param(source.get(SIZE), DEFAULT_SIZE),
    );

    let missing = |parameter| AdjustError::MissingParameter {
        clause: clause_name,
        parameter,
    };

    let clause = match source.get(clause_name) {
        Some(Value::Object(clause)) => clause,
        Some(_) => {
            return Err(AdjustError::InvalidParameter {
                parameter: "clause",
                reason: format!("{clause_name} must be an object"),
            });
        }
        None => return Err(missing(QUERY)),
    };

    let text = match clause.get(QUERY) {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => return Err(missing(QUERY)),
        Some(_) => {
            return Err(AdjustError::InvalidParameter {
                parameter: QUERY,
                reason: "expected a string".to_string(),
            });
        }
    };

    let connection = clause
        .get(CONNECTION_STRING)
        .map(text_param)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    if requires_connection && connection.is_none() {
        return Err(missing(CONNECTION_STRING));
    }

    let parameters = match clause.get(PARAMS) {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(params)) => params.clone(),
        Some(_) => {
            return Err(AdjustError::InvalidParameter {
                parameter: PARAMS,
                reason: "expected an object".to_string(),
            });
        }
    };

    let exclude = match clause.get(EXCLUDE) {
        None => true,
        Some(value) => text_param(value).trim().eq_ignore_ascii_case("true"),
    };

    let max_result_size = match int_param(clause.get(MAX_RESULT_SIZE)) {
        Some(value) => usize::try_from(value).ok().filter(|v| *v > 0),
        None => Some(settings.max_result_window).filter(|v| *v > 0),
    };

    log::debug!(
        "{clause_name}: from={} size={} exclude={exclude} max_result_size={max_result_size:?}",
        window.from,
        window.size
    );

    Ok(AdjustRequest {
        window,
        query: SourceQuery {
            text,
            parameters,
            connection,
        },
        exclude,
        id_column: column_param(clause, IDENTIFIER, DEFAULT_ID_COLUMN),
        score_column: column_param(clause, SCORE_NAME, DEFAULT_SCORE_COLUMN),
        max_result_size,
    })
}
