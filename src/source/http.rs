use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde_json::{Map, Value};

use super::MetricsSource;
use crate::error::DashboardError;

/// One JSON endpoint. Requests bypass caches; no timeout is applied.
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: Client::new(), url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MetricsSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Value, DashboardError> {
        let resp = self
            .client
            .get(&self.url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| DashboardError::fetch(&self.url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DashboardError::fetch(&self.url, format!("HTTP {}: {}", status, body.trim())));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| DashboardError::fetch(&self.url, format!("invalid json: {}", e)))
    }
}

/// Several endpoints whose payloads are merged into one dataset.
pub struct EndpointSet {
    endpoints: Vec<HttpSource>,
}

impl EndpointSet {
    pub fn new(endpoints: Vec<HttpSource>) -> Self {
        Self { endpoints }
    }
}

/// Merges top-level keys in endpoint order; the first endpoint to supply a key
/// keeps it. A payload with an `error` key, or one that is not an object,
/// fails the whole set.
pub fn merge_payloads(payloads: Vec<(String, Value)>) -> Result<Value, DashboardError> {
    let mut merged = Map::new();
    for (name, payload) in payloads {
        let Value::Object(map) = payload else {
            return Err(DashboardError::fetch(name, "payload is not a JSON object"));
        };
        if let Some(err) = map.get("error") {
            let reason = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
            return Err(DashboardError::fetch(name, reason));
        }
        for (k, v) in map {
            merged.entry(k).or_insert(v);
        }
    }
    Ok(Value::Object(merged))
}

#[async_trait]
impl MetricsSource for EndpointSet {
    fn describe(&self) -> String {
        let urls: Vec<&str> = self.endpoints.iter().map(|e| e.url()).collect();
        format!("endpoints[{}]", urls.join(", "))
    }

    async fn fetch(&self) -> Result<Value, DashboardError> {
        let payloads = try_join_all(self.endpoints.iter().map(|e| async move {
            let v = e.fetch().await?;
            Ok::<_, DashboardError>((e.describe(), v))
        }))
        .await?;
        merge_payloads(payloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_writer_wins() {
        let merged = merge_payloads(vec![
            ("culture".into(), json!({"metadata": {"generated_at_utc": "A"}, "culture_score": {}})),
            ("trend".into(), json!({"metadata": {"generated_at_utc": "B"}, "culture_trends": {}})),
        ])
        .unwrap();
        assert_eq!(merged["metadata"]["generated_at_utc"], "A");
        let keys: Vec<_> = merged.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["metadata", "culture_score", "culture_trends"]);
    }

    #[test]
    fn error_payload_fails_the_set() {
        let err = merge_payloads(vec![
            ("culture".into(), json!({"culture_score": {}})),
            ("trend".into(), json!({"error": "db locked"})),
        ])
        .unwrap_err();
        assert_eq!(err, DashboardError::fetch("trend", "db locked"));
    }

    #[test]
    fn non_object_payload_fails() {
        assert_eq!(merge_payloads(vec![("x".into(), json!([1, 2]))]).unwrap_err().kind(), "fetch");
    }
}
