#![doc = "Elasticsearch-backed document store: implements the core `Store` contract over the REST API."]
//
//! # Elasticsearch store (CLI <-> Core)
//!
//! This module wires the [`Store`] trait from `regstore-core` to a real
//! Elasticsearch-compatible HTTP endpoint, using `reqwest`.
//!
//! ## Index layout
//!
//! One index per document type: `{index_prefix}_{doc_type}`, e.g.
//! `regcore_reg_tree`, `regcore_notice`.
//!
//! ## Client Usage
//!
//! - Build an [`EsConfig`] (usually via `load_config`) and call [`EsStore::new`].
//! - Ids are sent as single, percent-encoded path segments, so `version/label`
//!   ids are safe.
//! - A 404 on `get` is "not found", not an error. Everything else that is not
//!   a 2xx is returned as a [`StoreError`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use regstore_core::contract::{
    BulkDoc, DocType, Document, Hit, Query, SearchRequest, Store, StoreError,
};

/// Connection settings for [`EsStore`].
#[derive(Debug, Clone)]
pub struct EsConfig {
    pub url: String,
    pub index_prefix: String,
    /// Maximum hits returned by one search.
    pub search_size: usize,
    pub api_key: Option<String>,
}

pub struct EsStore {
    http: reqwest::Client,
    base_url: Url,
    index_prefix: String,
    search_size: usize,
}

impl EsStore {
    pub fn new(config: EsConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.url).map_err(|e| {
            error!(error = ?e, url = %config.url, "[ES] Invalid Elasticsearch URL");
            e
        })?;
        if base_url.cannot_be_a_base() {
            return Err(format!("Elasticsearch URL cannot be a base: {}", config.url).into());
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("ApiKey {key}"))?);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        info!(
            url = %base_url,
            index_prefix = %config.index_prefix,
            api_key_set = config.api_key.is_some(),
            "[ES] Initialised Elasticsearch store"
        );
        Ok(Self {
            http,
            base_url,
            index_prefix: config.index_prefix,
            search_size: config.search_size,
        })
    }

    pub fn index_name(&self, doc_type: DocType) -> String {
        format!("{}_{}", self.index_prefix, doc_type.as_str())
    }

    /// `base_url` plus the given path segments, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn doc_endpoint(&self, doc_type: DocType, id: &str) -> Url {
        let index = self.index_name(doc_type);
        self.endpoint(&[index.as_str(), "_doc", id])
    }
}

/// Translate a core query into Elasticsearch query DSL.
///
/// Matches are exact `term` queries. Dynamically mapped strings are analysed
/// `text` fields, so string values go against the `.keyword` sub-field;
/// otherwise `"111"` would also hit `"111-2"`.
pub fn query_dsl(query: &Query) -> Value {
    match query {
        Query::Match { field, value } => {
            let target = match value {
                Value::String(_) => format!("{field}.keyword"),
                _ => field.clone(),
            };
            let mut clause = Document::new();
            clause.insert(target, value.clone());
            json!({ "term": clause })
        }
        Query::MatchAll => json!({ "match_all": {} }),
    }
}

/// The request body for a search.
pub fn search_body(request: &SearchRequest, size: usize) -> Value {
    let mut body = json!({
        "query": query_dsl(&request.query),
        "size": size,
        "_source": false,
    });
    if !request.fields.is_empty() {
        body["fields"] = json!(request.fields);
    }
    body
}

/// Newline-delimited `index` actions for the `_bulk` endpoint.
pub fn bulk_body(index: &str, docs: &[BulkDoc]) -> Result<String, StoreError> {
    let mut body = String::new();
    for entry in docs {
        body.push_str(&serde_json::to_string(
            &json!({ "index": { "_index": index, "_id": entry.id } }),
        )?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&entry.doc)?);
        body.push('\n');
    }
    Ok(body)
}

/// Elasticsearch returns every projected field as an array. Single values
/// are unwrapped and empty arrays dropped.
fn flatten_fields(raw: Option<&Value>) -> Document {
    let mut fields = Document::new();
    if let Some(Value::Object(map)) = raw {
        for (name, value) in map {
            match value {
                Value::Array(items) if items.is_empty() => {}
                Value::Array(items) if items.len() == 1 => {
                    fields.insert(name.clone(), items[0].clone());
                }
                other => {
                    fields.insert(name.clone(), other.clone());
                }
            }
        }
    }
    fields
}

/// Turn a raw search response into hits, in response order.
pub fn parse_hits(response: &Value) -> Result<Vec<Hit>, StoreError> {
    let raw_hits = response
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or("search response has no hits.hits array")?;

    raw_hits
        .iter()
        .map(|raw| {
            let id = match raw.get("_id") {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => return Err(StoreError::from("search hit without _id")),
            };
            Ok(Hit {
                id,
                fields: flatten_fields(raw.get("fields")),
            })
        })
        .collect()
}

async fn error_for_status(
    response: reqwest::Response,
    action: &str,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!(%status, action, body = %body, "[ES][ERROR] Request failed");
    Err(format!("Elasticsearch {action} failed with {status}: {body}").into())
}

#[async_trait]
impl Store for EsStore {
    async fn get(&self, doc_type: DocType, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.doc_endpoint(doc_type, id);
        debug!(%url, "[ES] GET document");
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%doc_type, id, "[ES] Document not found");
            return Ok(None);
        }

        let body: Value = error_for_status(response, "get").await?.json().await?;
        if body.get("found") == Some(&Value::Bool(false)) {
            return Ok(None);
        }
        match body.get("_source") {
            Some(Value::Object(source)) => Ok(Some(source.clone())),
            _ => Err(format!("get {doc_type}/{id}: response has no _source object").into()),
        }
    }

    async fn put(&self, doc_type: DocType, id: &str, doc: Document) -> Result<(), StoreError> {
        let url = self.doc_endpoint(doc_type, id);
        debug!(%url, "[ES] PUT document");
        let response = self.http.put(url).json(&doc).send().await?;
        error_for_status(response, "put").await?;
        info!(%doc_type, id, "[ES] Stored document");
        Ok(())
    }

    async fn bulk_put(&self, doc_type: DocType, docs: Vec<BulkDoc>) -> Result<(), StoreError> {
        if docs.is_empty() {
            debug!(%doc_type, "[ES] Empty bulk batch, nothing to send");
            return Ok(());
        }

        let body = bulk_body(&self.index_name(doc_type), &docs)?;
        let response = self
            .http
            .post(self.endpoint(&["_bulk"]))
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let result: Value = error_for_status(response, "bulk").await?.json().await?;

        if result.get("errors") == Some(&Value::Bool(true)) {
            let first = result
                .get("items")
                .and_then(Value::as_array)
                .and_then(|items| {
                    items
                        .iter()
                        .find_map(|item| item.pointer("/index/error").cloned())
                })
                .unwrap_or(Value::Null);
            error!(%doc_type, count = docs.len(), error = %first, "[ES][ERROR] Bulk batch rejected");
            return Err(format!("bulk write of {} {doc_type} documents failed: {first}", docs.len()).into());
        }

        info!(%doc_type, count = docs.len(), "[ES] Stored bulk batch");
        Ok(())
    }

    async fn search(
        &self,
        doc_type: DocType,
        request: SearchRequest,
    ) -> Result<Vec<Hit>, StoreError> {
        let index = self.index_name(doc_type);
        let url = self.endpoint(&[index.as_str(), "_search"]);
        let body = search_body(&request, self.search_size);
        debug!(%url, body = %body, "[ES] Search");
        let response = self.http.post(url).json(&body).send().await?;
        let result: Value = error_for_status(response, "search").await?.json().await?;
        let hits = parse_hits(&result)?;
        debug!(%doc_type, count = hits.len(), "[ES] Search returned hits");
        Ok(hits)
    }
}
