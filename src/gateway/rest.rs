//! PostgREST-style HTTP gateway.
//!
//! Reads become `GET /rest/v1/{table}` with `select`, `eq.`, `or=(…ilike…)`, `order` and
//! `limit` parameters; writes ask for `return=representation` so the stored row comes back
//! in the same round trip. Realtime and auth are not spoken here; a platform using this
//! gateway is handed its change feed and auth provider separately.

use crate::gateway::{Embed, Filter, Gateway, GatewayError, Select};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

const REST_PREFIX: &str = "rest/v1";

/// Postgres error code for unique violations.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct RestGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl RestGateway {
    /// Creates a gateway for the project at `base_url`, authenticating with `anon_key`.
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::Network(format!("invalid backend url {base_url}: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(anon_key)
            .map_err(|e| GatewayError::Network(format!("invalid api key: {e}")))?;
        headers.insert("apikey", key);
        let bearer = HeaderValue::from_str(&format!("Bearer {anon_key}"))
            .map_err(|e| GatewayError::Network(format!("invalid api key: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str, pairs: &[(String, String)]) -> Result<Url, GatewayError> {
        let mut url = self
            .base_url
            .join(&format!("{REST_PREFIX}/{path}"))
            .map_err(|e| GatewayError::Network(format!("invalid endpoint {path}: {e}")))?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        tracing::debug!(%method, %url, "backend request");
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request
                .header("Prefer", "return=representation")
                .json(body);
        }
        let response = request.send().await?;
        handle_response(response).await
    }
}

async fn handle_response(response: reqwest::Response) -> Result<Value, GatewayError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(error_from_body(status, &body));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

/// Maps a failed response to a gateway error, keeping the backend's own message.
fn error_from_body(status: StatusCode, body: &str) -> GatewayError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());
    let code = parsed
        .as_ref()
        .and_then(|v| v.get("code"))
        .and_then(Value::as_str);

    if code == Some(UNIQUE_VIOLATION) || status == StatusCode::CONFLICT {
        GatewayError::Constraint(message)
    } else {
        GatewayError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

/// Renders the `select` parameter for a row plus its embeds.
pub fn render_select(embeds: &[Embed]) -> String {
    let mut out = String::from("*");
    for embed in embeds {
        out.push(',');
        match embed {
            Embed::One { alias, table, .. } => {
                out.push_str(&format!("{alias}:{table}(*)"));
            }
            Embed::Many {
                alias,
                table,
                nested,
                ..
            } => {
                out.push_str(&format!("{alias}:{table}({})", render_select(nested)));
            }
        }
    }
    out
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| (filter.column.clone(), format!("eq.{}", render_value(&filter.value))))
        .collect()
}

/// A contains-pattern for `term`, double-quoted so commas and parentheses in it stay part of
/// the value inside an `or=(…)` group.
fn quoted_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 4);
    pattern.push_str("\"*");
    for c in term.chars() {
        if matches!(c, '"' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push_str("*\"");
    pattern
}

/// Query-string pairs for a read.
pub fn query_pairs(select: &Select) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_string(), render_select(&select.embeds))];
    pairs.extend(filter_pairs(&select.filters));
    if let Some(text) = &select.text {
        let pattern = quoted_pattern(&text.term);
        let clauses: Vec<String> = text
            .columns
            .iter()
            .map(|column| format!("{column}.ilike.{pattern}"))
            .collect();
        pairs.push(("or".to_string(), format!("({})", clauses.join(","))));
    }
    if let Some(order) = select.order {
        let direction = if order.descending { "desc" } else { "asc" };
        pairs.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = select.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }
    pairs
}

fn first_row(table: &str, id: Option<&str>, value: Value) -> Result<Value, GatewayError> {
    match value {
        Value::Array(rows) => rows.into_iter().next().ok_or_else(|| match id {
            Some(id) => GatewayError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            },
            None => GatewayError::Decode(format!("{table}: empty representation")),
        }),
        Value::Object(_) => Ok(value),
        other => Err(GatewayError::Decode(format!(
            "{table}: expected row representation, got {other}"
        ))),
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, GatewayError> {
        let url = self.endpoint(query.table, &query_pairs(query))?;
        match self.send(Method::GET, url, None).await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(GatewayError::Decode(format!(
                "{}: expected an array, got {other}",
                query.table
            ))),
        }
    }

    async fn insert(
        &self,
        table: &str,
        row: Value,
        embeds: &[Embed],
    ) -> Result<Value, GatewayError> {
        let pairs = vec![("select".to_string(), render_select(embeds))];
        let url = self.endpoint(table, &pairs)?;
        let stored = self.send(Method::POST, url, Some(&row)).await?;
        first_row(table, None, stored)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        embeds: &[Embed],
    ) -> Result<Value, GatewayError> {
        let mut pairs = filter_pairs(&[Filter::eq("id", id)]);
        pairs.push(("select".to_string(), render_select(embeds)));
        let url = self.endpoint(table, &pairs)?;
        let stored = self.send(Method::PATCH, url, Some(&patch)).await?;
        first_row(table, Some(id), stored)
    }

    async fn delete_where(&self, table: &str, filters: &[Filter]) -> Result<(), GatewayError> {
        let url = self.endpoint(table, &filter_pairs(filters))?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, GatewayError> {
        let url = self.endpoint(&format!("rpc/{function}"), &[])?;
        tracing::debug!(%url, "backend rpc");
        let response = self.client.post(url).json(&args).send().await?;
        handle_response(response).await
    }
}
