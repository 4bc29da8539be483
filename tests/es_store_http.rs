//! HTTP contract tests for the Elasticsearch store, against a wiremock server.

use regstore::es_store::{EsConfig, EsStore};
use regstore_core::contract::{BulkDoc, DocType, Query, SearchRequest, Store};
use regstore_core::{Notices, Regulations};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer, api_key: Option<&str>) -> EsStore {
    EsStore::new(EsConfig {
        url: server.uri(),
        index_prefix: "regcore".into(),
        search_size: 100,
        api_key: api_key.map(str::to_string),
    })
    .expect("store should build")
}

#[tokio::test]
async fn get_returns_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regcore_notice/_doc/docdoc"))
        .and(header("Authorization", "ApiKey secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_index": "regcore_notice", "_id": "docdoc", "found": true,
            "_source": {"some": "body"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, Some("secret"));
    let doc = store.get(DocType::Notice, "docdoc").await.unwrap();
    assert_eq!(doc, json!({"some": "body"}).as_object().cloned());
}

#[tokio::test]
async fn get_404_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regcore_reg_tree/_doc/verver%2Flablab"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "_index": "regcore_reg_tree", "_id": "verver/lablab", "found": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, None);
    let node = Regulations::new(&store).get("lablab", "verver").await.unwrap();
    assert!(node.is_none());
}

#[tokio::test]
async fn server_error_is_propagated() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/regcore_preamble/_doc/docdoc"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = store_for(&server, None);
    let doc = json!({"some": "structure"}).as_object().cloned().unwrap();
    let err = store.put(DocType::Preamble, "docdoc", doc).await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn put_sends_document_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/regcore_diff/_doc/lablab%2Foldold%2Fnewnew"))
        .and(body_json(json!({"label": "lablab", "diff": {}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"result": "created"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, None);
    let doc = json!({"label": "lablab", "diff": {}}).as_object().cloned().unwrap();
    store
        .put(DocType::Diff, "lablab/oldold/newnew", doc)
        .await
        .expect("put should succeed");
}

#[tokio::test]
async fn bulk_put_fails_when_any_item_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(header("Content-Type", "application/x-ndjson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 3, "errors": true,
            "items": [
                {"index": {"_id": "v/1", "status": 201}},
                {"index": {"_id": "v/1-2", "status": 400,
                           "error": {"type": "mapper_parsing_exception"}}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, None);
    let docs = vec![
        BulkDoc { id: "v/1".into(), doc: Default::default() },
        BulkDoc { id: "v/1-2".into(), doc: Default::default() },
    ];
    let err = store.bulk_put(DocType::RegTree, docs).await.unwrap_err();
    assert!(err.to_string().contains("mapper_parsing_exception"));
}

#[tokio::test]
async fn bulk_put_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"took": 3, "errors": false, "items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, None);
    let docs = vec![BulkDoc { id: "v/1".into(), doc: Default::default() }];
    store
        .bulk_put(DocType::Layer, docs)
        .await
        .expect("bulk put should succeed");
}

#[tokio::test]
async fn search_posts_query_and_reads_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/regcore_notice/_search"))
        .and(body_json(json!({
            "query": {"term": {"cfr_parts.keyword": "876"}},
            "size": 100,
            "_source": false,
            "fields": ["effective_on", "fr_url", "publication_date"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {"total": {"value": 2}, "hits": [
                {"_id": "22", "_score": 1.0, "fields": {"effective_on": ["2005-05-05"]}},
                {"_id": "9", "_score": 0.5}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, None);
    let summaries = Notices::new(&store).listing(Some("876")).await.unwrap();
    let printed = serde_json::to_value(&summaries).unwrap();
    assert_eq!(
        printed,
        json!([
            {"document_number": "22", "effective_on": "2005-05-05"},
            {"document_number": "9"}
        ])
    );
}

#[tokio::test]
async fn regulation_listing_uses_exact_label_match() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/regcore_reg_tree/_search"))
        .and(body_json(json!({
            "query": {"term": {"label_string.keyword": "111"}},
            "size": 100,
            "_source": false,
            "fields": ["version", "label_string"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {"hits": [
                {"_id": "v2/111", "fields": {"version": ["v2"], "label_string": ["111"]}},
                {"_id": "v1/111", "fields": {"version": ["v1"], "label_string": ["111"]}}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, None);
    let entries = Regulations::new(&store).listing(Some("111")).await.unwrap();
    assert_eq!(
        entries,
        vec![
            ("v1".to_string(), "111".to_string()),
            ("v2".to_string(), "111".to_string())
        ]
    );
}

#[tokio::test]
async fn regulation_listing_of_roots_uses_boolean_term() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/regcore_reg_tree/_search"))
        .and(body_json(json!({
            "query": {"term": {"root": true}},
            "size": 100,
            "_source": false,
            "fields": ["version", "label_string"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": {"hits": []}})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, None);
    assert!(Regulations::new(&store).listing(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_match_all() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/regcore_layer/_search"))
        .and(body_json(json!({"query": {"match_all": {}}, "size": 100, "_source": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": {"hits": []}})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, None);
    let hits = store
        .search(DocType::Layer, SearchRequest::new(Query::MatchAll, &[]))
        .await
        .unwrap();
    assert!(hits.is_empty());
}
