//! Solr `select` client over blocking HTTP

use crate::engine::{EngineConfig, EnginePage, EngineRequest, Hit, HitFields, IndexEngine};
use crate::error::{BibqError, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Error bodies are cut to this many characters in messages
const MAX_ERROR_BODY: usize = 200;

#[derive(Clone)]
pub struct SolrEngine {
    config: EngineConfig,
    http: Client,
}

impl std::fmt::Debug for SolrEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolrEngine")
            .field("base_url", &self.config.base_url)
            .field("core", &self.config.core)
            .finish_non_exhaustive()
    }
}

impl SolrEngine {
    pub fn new(mut config: EngineConfig) -> Result<Self> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        if config.base_url.is_empty() {
            return Err(BibqError::Config("engine base_url is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn select_url(&self) -> String {
        format!("{}/{}/select", self.config.base_url, self.config.core)
    }

    fn params(&self, request: &EngineRequest) -> Vec<(&'static str, String)> {
        let fields = &self.config.fields;
        let fl = [
            &fields.work,
            &fields.unit,
            &fields.manifestation,
            &fields.collection,
        ]
        .map(|f| f.as_str())
        .join(",");

        let mut params = vec![
            ("q", request.query.clone()),
            ("start", request.offset.to_string()),
            ("rows", request.rows.to_string()),
            ("fl", fl),
            ("wt", "json".to_string()),
            ("trackingId", request.tracking.to_string()),
        ];
        if let Some(sort) = &request.sort {
            params.push(("sort", sort.clone()));
        }
        params
    }
}

impl IndexEngine for SolrEngine {
    fn search(&self, request: &EngineRequest) -> Result<EnginePage> {
        let url = self.select_url();
        debug!(
            url = %url,
            offset = request.offset,
            rows = request.rows,
            tracking = %request.tracking,
            "engine select"
        );

        let resp = self.http.get(&url).query(&self.params(request)).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(BibqError::Engine(format!(
                "select returned {}: {}",
                status, snippet
            )));
        }

        let value = resp.json::<Value>()?;
        parse_select_response(&value, &self.config.fields)
    }
}

/// Decode a Solr JSON `select` response
pub fn parse_select_response(value: &Value, fields: &HitFields) -> Result<EnginePage> {
    let total = value
        .pointer("/response/numFound")
        .and_then(Value::as_u64)
        .ok_or_else(|| BibqError::Engine("response has no numFound".to_string()))?;
    let docs = value
        .pointer("/response/docs")
        .and_then(Value::as_array)
        .ok_or_else(|| BibqError::Engine("response has no docs".to_string()))?;

    let hits = docs
        .iter()
        .map(|doc| {
            Ok(Hit {
                work_id: required(doc, &fields.work)?,
                unit_id: required(doc, &fields.unit)?,
                manifestation_id: required(doc, &fields.manifestation)?,
                collections: values(doc.get(&fields.collection)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EnginePage {
        hits,
        total: usize::try_from(total).unwrap_or(usize::MAX),
    })
}

/// String values of a field that may hold a scalar or an array
fn values(field: Option<&Value>) -> Vec<String> {
    match field {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(ToString::to_string))
            .collect(),
        Some(Value::Number(n)) => vec![n.to_string()],
        _ => Vec::new(),
    }
}

fn required(doc: &Value, field: &str) -> Result<String> {
    values(doc.get(field))
        .into_iter()
        .next()
        .ok_or_else(|| BibqError::Engine(format!("hit is missing field '{}'", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TrackingId;
    use serde_json::json;

    #[test]
    fn test_parse_scalar_and_array_fields() {
        let body = json!({
            "responseHeader": {"status": 0},
            "response": {
                "numFound": 42,
                "docs": [
                    {
                        "rec.workId": "W1",
                        "rec.unitId": ["U1"],
                        "rec.manifestationId": ["M1", "M1b"],
                        "rec.collectionIdentifier": ["a", "b"]
                    },
                    {
                        "rec.workId": ["W2"],
                        "rec.unitId": "U2",
                        "rec.manifestationId": "M2"
                    }
                ]
            }
        });
        let page = parse_select_response(&body, &HitFields::default()).unwrap();
        assert_eq!(page.total, 42);
        assert_eq!(page.hits[0].manifestation_id, "M1");
        assert_eq!(page.hits[0].collections, vec!["a", "b"]);
        assert_eq!(page.hits[1].work_id, "W2");
        assert!(page.hits[1].collections.is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_select_response(&json!({"error": "x"}), &HitFields::default()).unwrap_err();
        assert!(matches!(err, BibqError::Engine(_)));

        let body = json!({"response": {"numFound": 1, "docs": [{"rec.workId": "W1"}]}});
        let err = parse_select_response(&body, &HitFields::default()).unwrap_err();
        assert!(err.to_string().contains("rec.unitId"));
    }

    #[test]
    fn test_params() {
        let engine = SolrEngine::new(EngineConfig {
            base_url: "http://solr:8983/solr/".to_string(),
            ..EngineConfig::default()
        })
        .unwrap();
        assert_eq!(engine.select_url(), "http://solr:8983/solr/bibdk/select");

        let request = EngineRequest {
            query: "term.title:foo".to_string(),
            sort: Some("term.year desc".to_string()),
            offset: 10,
            rows: 5,
            tracking: TrackingId::new("abc").next(),
        };
        let params = engine.params(&request);
        assert!(params.contains(&("start", "10".to_string())));
        assert!(params.contains(&("trackingId", "abc:1".to_string())));
        assert!(params.contains(&("sort", "term.year desc".to_string())));
        assert!(params.contains(&(
            "fl",
            "rec.workId,rec.unitId,rec.manifestationId,rec.collectionIdentifier".to_string()
        )));
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let err = SolrEngine::new(EngineConfig {
            base_url: "/".to_string(),
            ..EngineConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, BibqError::Config(_)));
    }
}
