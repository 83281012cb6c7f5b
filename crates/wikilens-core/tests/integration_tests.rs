//! Integration tests against mock Wikidata and Gemini HTTP servers

use std::sync::Arc;

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Value, json};

use wikilens_core::config::{Config, InsightConfig, WikidataConfig};
use wikilens_core::domain::Entity;
use wikilens_core::error::Error;
use wikilens_core::explorer::{Explorer, SEARCH_ERROR};
use wikilens_core::insight::{GeminiClient, InsightService};
use wikilens_core::wikidata::{EntityRepository, SEARCH_LIMIT, WikidataClient};

const API_KEY: &str = "test-gemini-key";

fn wikidata_client(server: &ServerGuard) -> WikidataClient {
    let config = WikidataConfig {
        base_url: server.url(),
        commons_url: "https://commons.example".to_string(),
        timeout_secs: 5,
        ..WikidataConfig::default()
    };
    WikidataClient::new(config).expect("Failed to create Wikidata client")
}

fn gemini_client(server: &ServerGuard) -> GeminiClient {
    let config = InsightConfig {
        base_url: server.url(),
        analysis_model: "flash".to_string(),
        insight_model: "pro".to_string(),
        comparison_model: "flash".to_string(),
        timeout_secs: 5,
        ..InsightConfig::default()
    };
    GeminiClient::new(config, API_KEY).expect("Failed to create Gemini client")
}

fn hit(id: &str, label: &str, description: &str) -> Value {
    json!({
        "id": id,
        "label": label,
        "description": description,
        "display": {
            "label": {"value": label, "language": "en"},
            "description": {"value": description, "language": "en"}
        }
    })
}

async fn mock_search(server: &mut ServerGuard, query: &str, hits: Vec<Value>) -> Mock {
    server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "wbsearchentities".into()),
            Matcher::UrlEncoded("search".into(), query.into()),
            Matcher::UrlEncoded("language".into(), "en".into()),
            Matcher::UrlEncoded("limit".into(), "15".into()),
            Matcher::UrlEncoded("format".into(), "json".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "search": hits }).to_string())
        .create_async()
        .await
}

async fn mock_image(server: &mut ServerGuard, id: &str, status: usize, body: String) -> Mock {
    server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "wbgetclaims".into()),
            Matcher::UrlEncoded("entity".into(), id.into()),
            Matcher::UrlEncoded("property".into(), "P18".into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

fn claims(file_name: &str) -> String {
    json!({
        "claims": {
            "P18": [{
                "mainsnak": {
                    "snaktype": "value",
                    "property": "P18",
                    "datavalue": {"value": file_name, "type": "string"}
                }
            }]
        }
    })
    .to_string()
}

fn gemini_text(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

async fn mock_generate(
    server: &mut ServerGuard,
    model: &str,
    body_matcher: Matcher,
    status: usize,
    body: String,
) -> Mock {
    server
        .mock("POST", format!("/v1beta/models/{}:generateContent", model).as_str())
        .match_header("x-goog-api-key", API_KEY)
        .match_body(body_matcher)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

fn black_hole_hits() -> Vec<Value> {
    vec![
        hit("Q589", "black hole", "region of spacetime"),
        hit("Q1088624", "Black Hole", "1979 film"),
        hit("Q3099019", "supermassive black hole", "largest type of black hole"),
    ]
}

async fn mock_black_hole_images(server: &mut ServerGuard) -> Vec<Mock> {
    vec![
        mock_image(server, "Q589", 200, claims("Black hole - Messier 87.jpg")).await,
        mock_image(server, "Q1088624", 200, claims("Black Hole poster.jpg")).await,
        mock_image(server, "Q3099019", 200, claims("Sagittarius A*.jpg")).await,
    ]
}

// ---- entity repository ----

#[tokio::test]
async fn test_search_resolves_all_images() {
    let mut server = Server::new_async().await;
    let search = mock_search(&mut server, "black hole", black_hole_hits()).await;
    let images = mock_black_hole_images(&mut server).await;

    let entities = wikidata_client(&server)
        .search("black hole")
        .await
        .expect("search should succeed");

    search.assert_async().await;
    for mock in &images {
        mock.assert_async().await;
    }

    assert_eq!(entities.len(), 3);
    let ids: Vec<&str> = entities.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["Q589", "Q1088624", "Q3099019"]);

    let first = &entities[0];
    assert_eq!(first.label, "black hole");
    assert_eq!(first.description, "region of spacetime");
    assert_eq!(first.entity_type, "Wikidata Item");
    assert_eq!(first.relevance, Some(1.0));
    assert_eq!(
        first.image_url.as_deref(),
        Some("https://commons.example/wiki/Special:FilePath/Black%20hole%20-%20Messier%2087.jpg?width=400")
    );
    assert!(entities.iter().all(Entity::has_image));
}

#[tokio::test]
async fn test_image_failure_is_scoped_to_one_entity() {
    let mut server = Server::new_async().await;
    let hits = vec![
        hit("Q1", "failing", ""),
        hit("Q2", "working", ""),
        hit("Q3", "garbled", ""),
        hit("Q4", "imageless", ""),
    ];
    let _search = mock_search(&mut server, "mixed", hits).await;
    let _q1 = mock_image(&mut server, "Q1", 500, "{}".to_string()).await;
    let _q2 = mock_image(&mut server, "Q2", 200, claims("Working.png")).await;
    let _q3 = mock_image(&mut server, "Q3", 200, "not json".to_string()).await;
    let _q4 = mock_image(&mut server, "Q4", 200, json!({"claims": {}}).to_string()).await;

    let entities = wikidata_client(&server)
        .search("mixed")
        .await
        .expect("search should succeed despite image failures");

    assert_eq!(entities.len(), 4);
    assert!(entities[0].image_url.is_none());
    assert!(entities[1].image_url.as_deref().unwrap().contains("Working.png"));
    assert!(entities[2].image_url.is_none());
    assert!(entities[3].image_url.is_none());
}

#[tokio::test]
async fn test_search_prefers_display_label() {
    let mut server = Server::new_async().await;
    let hits = vec![json!({
        "id": "Q42",
        "label": "douglas adams",
        "display": {"label": {"value": "Douglas Adams", "language": "en"}}
    })];
    let _search = mock_search(&mut server, "adams", hits).await;
    let _image = mock_image(&mut server, "Q42", 200, json!({"claims": {}}).to_string()).await;

    let entities = wikidata_client(&server).search("adams").await.unwrap();
    assert_eq!(entities[0].label, "Douglas Adams");
    assert_eq!(entities[0].display_description(), "Global Knowledge Entity");
}

#[tokio::test]
async fn test_search_is_bounded_to_limit() {
    let mut server = Server::new_async().await;
    let hits: Vec<Value> = (0..20)
        .map(|i| hit(&format!("Q{}", i), &format!("star {}", i), "star"))
        .collect();
    let _search = mock_search(&mut server, "star", hits).await;
    let images = server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::UrlEncoded("action".into(), "wbgetclaims".into()))
        .with_status(200)
        .with_body(json!({"claims": {}}).to_string())
        .expect(15)
        .create_async()
        .await;

    let entities = wikidata_client(&server).search("star").await.unwrap();
    assert_eq!(entities.len(), 15);
    images.assert_async().await;
}

#[tokio::test]
async fn test_file_cannot_raise_search_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut server = Server::new_async().await;

    let contents = toml::to_string_pretty(&Config::default())
        .unwrap()
        .replace("[wikidata]\n", "[wikidata]\nsearch_limit = 50\n")
        .replace("https://www.wikidata.org", &server.url());
    std::fs::write(&path, contents).unwrap();
    let config = Config::load_from(&path).unwrap();

    let hits: Vec<Value> = (0..40)
        .map(|i| hit(&format!("Q{}", i), &format!("x {}", i), ""))
        .collect();
    let _search = mock_search(&mut server, "x", hits).await;
    let _images = server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::UrlEncoded("action".into(), "wbgetclaims".into()))
        .with_status(200)
        .with_body(json!({"claims": {}}).to_string())
        .create_async()
        .await;

    let entities = WikidataClient::new(config.wikidata)
        .unwrap()
        .search("x")
        .await
        .unwrap();
    assert_eq!(entities.len(), SEARCH_LIMIT);
}

#[tokio::test]
async fn test_search_http_error_is_service_unavailable() {
    let mut server = Server::new_async().await;
    let _search = server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::UrlEncoded("action".into(), "wbsearchentities".into()))
        .with_status(503)
        .create_async()
        .await;

    let err = wikidata_client(&server).search("black hole").await.unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(_)));
    assert_eq!(err.code(), "E100");
}

#[tokio::test]
async fn test_search_unparseable_body_is_service_unavailable() {
    let mut server = Server::new_async().await;
    let _search = server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::UrlEncoded("action".into(), "wbsearchentities".into()))
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let err = wikidata_client(&server).search("black hole").await.unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(_)));
}

#[tokio::test]
async fn test_search_unreachable_host_is_service_unavailable() {
    let client = WikidataClient::builder()
        .base_url("http://127.0.0.1:1")
        .timeout_secs(2)
        .build()
        .unwrap();

    let err = client.search("black hole").await.unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(_)));
}

// ---- insight service ----

#[tokio::test]
async fn test_analyze_corpus_requests_structured_output() {
    let mut server = Server::new_async().await;
    let analysis = json!({
        "summary": "Compact astrophysical objects and their namesakes",
        "semanticClusters": [
            {"name": "Astrophysics", "entities": ["black hole", "supermassive black hole"], "description": "collapsed stars"},
            {"name": "Film", "entities": ["Black Hole"], "description": "1979 Disney film"}
        ],
        "sparqlSuggestion": "SELECT ?item WHERE { ?item wdt:P279 wd:Q589 }"
    });
    let mock = mock_generate(
        &mut server,
        "flash",
        Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })),
            Matcher::Regex("black hole".to_string()),
        ]),
        200,
        gemini_text(&analysis.to_string()),
    )
    .await;

    let entities = vec![
        Entity::new("Q589", "black hole", "region of spacetime"),
        Entity::new("Q1088624", "Black Hole", "1979 film"),
    ];
    let result = gemini_client(&server)
        .analyze_corpus("black hole", &entities)
        .await
        .expect("analysis should succeed");

    mock.assert_async().await;
    assert_eq!(result.semantic_clusters.len(), 2);
    assert_eq!(result.cluster_of("Black Hole"), Some("Astrophysics"));
    assert!(result.sparql_suggestion.is_some());
}

#[tokio::test]
async fn test_analyze_corpus_malformed_payload() {
    let mut server = Server::new_async().await;
    let _mock = mock_generate(
        &mut server,
        "flash",
        Matcher::Any,
        200,
        gemini_text(r#"{"summary": "missing clusters"}"#),
    )
    .await;

    let err = gemini_client(&server)
        .analyze_corpus("q", &[Entity::new("Q1", "a", "")])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
    assert_eq!(err.code(), "E101");
}

#[tokio::test]
async fn test_get_insight_uses_web_grounding() {
    let mut server = Server::new_async().await;
    let body = json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "A black hole is a region of spacetime..."}]},
            "groundingMetadata": {
                "groundingChunks": [
                    {"web": {"uri": "https://news.example/eht", "title": "Event Horizon Telescope"}},
                    {"web": {"uri": "https://science.example/m87", "title": "M87*"}}
                ]
            }
        }]
    });
    let mock = mock_generate(
        &mut server,
        "pro",
        Matcher::PartialJson(json!({"tools": [{"googleSearch": {}}]})),
        200,
        body.to_string(),
    )
    .await;

    let insight = gemini_client(&server)
        .get_insight(&Entity::new("Q589", "black hole", "region of spacetime"))
        .await
        .expect("insight should succeed");

    mock.assert_async().await;
    assert!(insight.text.starts_with("A black hole"));
    assert_eq!(insight.grounding.len(), 2);
    assert_eq!(insight.sources().next().unwrap().title, "Event Horizon Telescope");
}

#[tokio::test]
async fn test_get_insight_without_grounding_metadata() {
    let mut server = Server::new_async().await;
    let body = gemini_text("Plain text");
    let _mock = mock_generate(&mut server, "pro", Matcher::Any, 200, body).await;

    let insight = gemini_client(&server)
        .get_insight(&Entity::new("Q1", "Universe", ""))
        .await
        .unwrap();
    assert_eq!(insight.text, "Plain text");
    assert!(insight.grounding.is_empty());
}

#[tokio::test]
async fn test_compare_entities() {
    let mut server = Server::new_async().await;
    let comparison = json!({
        "commonGround": "Both concern gravitational collapse",
        "divergence": "One is an object, the other a film",
        "semanticDistance": "A light-year apart",
        "influence": "The film borrowed its name from the object"
    });
    let _mock = mock_generate(
        &mut server,
        "flash",
        Matcher::AllOf(vec![
            Matcher::Regex("Entity A: black hole".to_string()),
            Matcher::Regex("Entity B: Black Hole".to_string()),
        ]),
        200,
        gemini_text(&comparison.to_string()),
    )
    .await;

    let result = gemini_client(&server)
        .compare_entities(
            &Entity::new("Q589", "black hole", "region of spacetime"),
            &Entity::new("Q1088624", "Black Hole", "1979 film"),
        )
        .await
        .unwrap();
    assert_eq!(result.semantic_distance, "A light-year apart");
}

#[tokio::test]
async fn test_compare_entities_server_error() {
    let mut server = Server::new_async().await;
    let _mock = mock_generate(
        &mut server,
        "flash",
        Matcher::Any,
        500,
        json!({"error": {"message": "internal"}}).to_string(),
    )
    .await;

    let err = gemini_client(&server)
        .compare_entities(&Entity::new("Q1", "a", ""), &Entity::new("Q2", "b", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(_)));
}

#[tokio::test]
async fn test_wrong_api_key_is_service_unavailable() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/pro:generateContent")
        .with_status(403)
        .with_body(json!({"error": {"status": "PERMISSION_DENIED"}}).to_string())
        .create_async()
        .await;

    let err = gemini_client(&server)
        .get_insight(&Entity::new("Q1", "Universe", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable(_)));
}

// ---- end to end ----

#[tokio::test]
async fn test_explorer_black_hole_session() {
    let mut server = Server::new_async().await;
    let _search = mock_search(&mut server, "black hole", black_hole_hits()).await;
    let _images = mock_black_hole_images(&mut server).await;
    let analysis = mock_generate(
        &mut server,
        "flash",
        Matcher::PartialJson(json!({
            "generationConfig": {"responseMimeType": "application/json"}
        })),
        200,
        gemini_text(
            &json!({
                "summary": "s",
                "semanticClusters": [{"name": "All", "entities": ["black hole"], "description": "d"}]
            })
            .to_string(),
        ),
    )
    .await;
    let _insight = mock_generate(&mut server, "pro", Matcher::Any, 503, String::new()).await;

    let repository = Arc::new(wikidata_client(&server));
    let insight = Arc::new(gemini_client(&server));
    let mut explorer = Explorer::new(repository, insight);

    let effects = explorer.submit_search("black hole");
    explorer.settle(effects).await;

    analysis.assert_async().await;
    let state = explorer.state();
    assert_eq!(state.entities.len(), 3);
    assert!(state.error.is_none());
    assert!(!state.loading);
    assert!(state.analysis.is_some());
    assert!(state.entities.iter().all(Entity::has_image));

    let first = state.entities[0].clone();
    let effects = explorer.select_entity(first);
    explorer.settle(effects).await;

    let insight = explorer.state().insight.as_ref().unwrap();
    assert_eq!(insight.text, "Contextual reasoning failed.");
    assert!(insight.grounding.is_empty());
}

#[tokio::test]
async fn test_explorer_search_outage() {
    let mut server = Server::new_async().await;
    let _search = server
        .mock("GET", "/w/api.php")
        .with_status(502)
        .create_async()
        .await;

    let mut explorer = Explorer::new(
        Arc::new(wikidata_client(&server)),
        Arc::new(gemini_client(&server)),
    );
    let effects = explorer.submit_search("black hole");
    explorer.settle(effects).await;

    let state = explorer.state();
    assert!(state.entities.is_empty());
    assert_eq!(state.error.as_deref(), Some(SEARCH_ERROR));
    assert!(!state.loading);
}
