// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use roster_app::{
    ActorId, GatewayError, GatewayResult, ListQuery, MonitoredEntry, Record, RecordFields,
    RecordGateway, RecordId,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const ACTOR_HEADER: &str = "X-User-Id";

/// Bodies at least this long, or that look like JSON, are never shown verbatim.
const PLAIN_REASON_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: Url,
    collection: String,
    timeout: Duration,
    http: HttpClient,
}

impl HttpGateway {
    pub fn new(base_url: &str, collection: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("remote.base_url must not be empty");
        }
        let collection = collection.trim().trim_matches('/');
        if collection.is_empty() {
            bail!("remote.collection must not be empty");
        }
        if collection.contains('/') {
            bail!("remote.collection must be a single path segment, got {collection:?}");
        }

        let base_url = Url::parse(trimmed).with_context(|| format!("parse base url {trimmed:?}"))?;
        if base_url.cannot_be_a_base() {
            bail!("remote.base_url {trimmed:?} cannot carry a path");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            collection: collection.to_owned(),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn collection_url(&self) -> Url {
        self.url_with_segments(&[self.collection.as_str()])
    }

    pub fn record_url(&self, id: RecordId) -> Url {
        let id = id.to_string();
        self.url_with_segments(&[self.collection.as_str(), id.as_str()])
    }

    pub fn monitored_url(&self) -> Url {
        let segment = format!("monitored-{}", self.collection);
        self.url_with_segments(&[segment.as_str()])
    }

    pub fn list_url(&self, query: &ListQuery) -> Url {
        let mut url = self.collection_url();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        url
    }

    fn url_with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn send(&self, request: RequestBuilder, method: &str, url: &Url) -> GatewayResult<Response> {
        debug!(method, url = url.as_str(), "sending request");
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), &error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let error = clean_error_response(status, &body);
            warn!(method, url = url.as_str(), status = status.as_u16(), "request rejected");
            return Err(error);
        }
        Ok(response)
    }

    fn with_actor(request: RequestBuilder, actor: Option<&ActorId>) -> RequestBuilder {
        request.header(ACTOR_HEADER, actor.map(ActorId::as_str).unwrap_or_default())
    }
}

impl RecordGateway for HttpGateway {
    fn list(&self, query: &ListQuery) -> GatewayResult<Vec<Record>> {
        let url = self.list_url(query);
        let response = self.send(self.http.get(url.clone()), "GET", &url)?;
        decode(response, "record list")
    }

    fn create(&self, fields: &RecordFields) -> GatewayResult<()> {
        let url = self.collection_url();
        self.send(self.http.post(url.clone()).json(fields), "POST", &url)?;
        Ok(())
    }

    fn update(
        &self,
        id: RecordId,
        fields: &RecordFields,
        actor: Option<&ActorId>,
    ) -> GatewayResult<()> {
        let url = self.record_url(id);
        let request = Self::with_actor(self.http.patch(url.clone()).json(fields), actor);
        self.send(request, "PATCH", &url)?;
        Ok(())
    }

    fn delete(&self, id: RecordId, actor: Option<&ActorId>) -> GatewayResult<()> {
        let url = self.record_url(id);
        let request = Self::with_actor(self.http.delete(url.clone()), actor);
        self.send(request, "DELETE", &url)?;
        Ok(())
    }

    fn list_monitored(&self) -> GatewayResult<Vec<MonitoredEntry>> {
        let url = self.monitored_url();
        let response = self.send(self.http.get(url.clone()), "GET", &url)?;
        decode(response, "monitored list")
    }
}

/// Runs one list request with the given query. Used by `--check`.
pub fn check_connection(gateway: &HttpGateway, query: &ListQuery) -> Result<usize> {
    let rows = gateway
        .list(query)
        .with_context(|| format!("list {}", gateway.collection_url()))?;
    Ok(rows.len())
}

fn decode<T: DeserializeOwned>(response: Response, what: &str) -> GatewayResult<T> {
    let body = response.text().map_err(|error| GatewayError::Decode {
        what: what.to_owned(),
        detail: error.to_string(),
    })?;
    serde_json::from_str(&body).map_err(|error| GatewayError::Decode {
        what: what.to_owned(),
        detail: error.to_string(),
    })
}

fn connection_error(endpoint: &str, error: &reqwest::Error) -> GatewayError {
    let detail = if error.is_timeout() {
        "request timed out".to_owned()
    } else {
        error.to_string()
    };
    GatewayError::Transport {
        endpoint: endpoint.to_owned(),
        detail,
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    message: Option<String>,
}

fn clean_error_response(status: StatusCode, body: &str) -> GatewayError {
    let status = status.as_u16();

    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(reason) = parsed.error.or(parsed.message)
        && !reason.trim().is_empty()
    {
        return GatewayError::Rejected {
            status,
            reason: Some(reason.trim().to_owned()),
        };
    }

    let trimmed = body.trim();
    let reason = (!trimmed.is_empty()
        && trimmed.len() < PLAIN_REASON_LIMIT
        && !trimmed.contains('{')
        && !trimmed.starts_with('<'))
    .then(|| trimmed.to_owned());
    GatewayError::Rejected { status, reason }
}

#[cfg(test)]
mod tests {
    use super::{HttpGateway, clean_error_response};
    use reqwest::StatusCode;
    use roster_app::{FilterField, GatewayError, ListQuery, QueryState, RecordId};
    use std::time::Duration;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(base, "users", Duration::from_secs(1)).expect("gateway")
    }

    #[test]
    fn urls_append_collection_to_base_path() {
        let gateway = gateway("http://localhost:5000/api/");
        assert_eq!(
            gateway.collection_url().as_str(),
            "http://localhost:5000/api/users"
        );
        assert_eq!(
            gateway.record_url(RecordId::new(7)).as_str(),
            "http://localhost:5000/api/users/7"
        );
        assert_eq!(
            gateway.monitored_url().as_str(),
            "http://localhost:5000/api/monitored-users"
        );
    }

    #[test]
    fn list_url_encodes_every_parameter() {
        let gateway = gateway("http://localhost:5000");
        let mut state = QueryState::default();
        state.filters.set(FilterField::Type, "Agent imobiliar".to_owned());
        let url = gateway.list_url(&ListQuery::from_state(&state, 10));
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/users?limit=10&offset=0&name=&email=&type=Agent+imobiliar&sort=name&order=asc"
        );
    }

    #[test]
    fn rejects_blank_settings() {
        assert!(HttpGateway::new("  ", "users", Duration::from_secs(1)).is_err());
        assert!(HttpGateway::new("http://localhost", "", Duration::from_secs(1)).is_err());
        assert!(HttpGateway::new("http://localhost", "a/b", Duration::from_secs(1)).is_err());
        assert!(HttpGateway::new("not a url", "users", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn error_reason_comes_from_json_envelope() {
        let error = clean_error_response(StatusCode::FORBIDDEN, r#"{"error":"admins only"}"#);
        assert_eq!(
            error,
            GatewayError::Rejected {
                status: 403,
                reason: Some("admins only".to_owned()),
            }
        );

        let error = clean_error_response(StatusCode::BAD_REQUEST, r#"{"message":"bad email"}"#);
        assert_eq!(error.reason(), Some("bad email"));
    }

    #[test]
    fn short_plain_bodies_become_reasons() {
        let error = clean_error_response(StatusCode::NOT_FOUND, "user not found\n");
        assert_eq!(error.reason(), Some("user not found"));
    }

    #[test]
    fn noisy_bodies_are_dropped() {
        let html = "<html><body>Internal Server Error</body></html>";
        assert_eq!(
            clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, html).reason(),
            None
        );
        let long = "x".repeat(200);
        assert_eq!(
            clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, &long).reason(),
            None
        );
        assert_eq!(
            clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":1}"#).reason(),
            None
        );
    }
}
