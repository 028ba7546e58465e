//! Message router and message client tests.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use card_price_lookup::models::{CardQuery, LegacyCard, SearchMode};
use card_price_lookup::router::{await_reply, MessageClient, MessageRouter, Responder, Response};
use card_price_lookup::{AsyncCardPriceClient, LookupError};
use common::{record, FakeStore};

async fn router_with(store: Arc<FakeStore>) -> Arc<MessageRouter> {
    let client = AsyncCardPriceClient::builder()
        .store(store)
        .build()
        .await
        .unwrap();
    Arc::new(MessageRouter::new(client))
}

/// Send a raw request and return `(pending, response)`.
async fn roundtrip(router: &MessageRouter, request: Value) -> (bool, Response) {
    let (responder, rx) = Responder::channel();
    let pending = router.handle(request, responder);
    (pending, rx.await.expect("responder fired"))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_object_request_is_invalid() {
    let router = router_with(FakeStore::returning(vec![])).await;
    let (pending, resp) = roundtrip(&router, json!("searchCards")).await;

    assert!(!pending);
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("Invalid request format"));
}

#[tokio::test]
async fn missing_action_is_invalid() {
    let router = router_with(FakeStore::returning(vec![])).await;
    let (_, resp) = roundtrip(&router, json!({ "query": {} })).await;
    assert_eq!(resp.error.as_deref(), Some("Invalid request format"));
}

#[tokio::test]
async fn unknown_action_is_named() {
    let router = router_with(FakeStore::returning(vec![])).await;
    let (pending, resp) = roundtrip(&router, json!({ "action": "fly" })).await;
    assert!(!pending);
    assert_eq!(resp.error.as_deref(), Some("Unknown action: fly"));
}

#[tokio::test]
async fn queries_must_be_an_array() {
    let store = FakeStore::returning(vec![]);
    let router = router_with(store.clone()).await;
    let (_, resp) = roundtrip(
        &router,
        json!({ "action": "searchMultipleCards", "queries": { "set_number": "sv10" } }),
    )
    .await;

    assert_eq!(resp.error.as_deref(), Some("Invalid queries format"));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn cards_must_be_an_array() {
    let router = router_with(FakeStore::returning(vec![])).await;
    let (_, resp) = roundtrip(&router, json!({ "action": "querySupabase", "cards": "sv10" })).await;
    assert_eq!(resp.error.as_deref(), Some("Invalid cards format"));
}

#[tokio::test]
async fn malformed_query_is_rejected() {
    let router = router_with(FakeStore::returning(vec![])).await;
    let (pending, resp) =
        roundtrip(&router, json!({ "action": "searchCards", "query": "sv10 99" })).await;

    assert!(!pending);
    assert!(resp.error.unwrap().starts_with("Invalid query:"));
}

#[tokio::test]
async fn unknown_search_mode_is_rejected() {
    let router = router_with(FakeStore::returning(vec![])).await;
    let (_, resp) = roundtrip(
        &router,
        json!({ "action": "searchCards", "query": { "set_number": "sv10", "search_mode": "turbo" } }),
    )
    .await;
    assert!(resp.error.unwrap().starts_with("Invalid query:"));
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_action_answers_synchronously() {
    let router = router_with(FakeStore::returning(vec![])).await;
    let (pending, resp) = roundtrip(&router, json!({ "action": "test" })).await;

    assert!(!pending);
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["message"], "Background worker is active");
    assert!(data["timestamp"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn search_cards_is_pending_then_answers() {
    let router = router_with(FakeStore::table(common::sample_rows())).await;
    let (pending, resp) = roundtrip(
        &router,
        json!({
            "action": "searchCards",
            "query": { "set_number": "sv10", "card_number": 99, "search_mode": "normal" }
        }),
    )
    .await;

    assert!(pending);
    assert!(resp.success);
    let rows = resp.data.unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["name"], "team rocket's wanaider");
}

#[test]
fn error_response_omits_data() {
    let resp = Response::err("boom");
    assert_eq!(
        serde_json::to_value(&resp).unwrap(),
        json!({ "success": false, "error": "boom" })
    );
}

// ---------------------------------------------------------------------------
// MessageClient
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_reports_liveness() {
    let client = MessageClient::new(router_with(FakeStore::returning(vec![])).await);
    let data = client.ping().await.unwrap();
    assert_eq!(data["message"], "Background worker is active");
}

#[tokio::test]
async fn search_cards_forwards_product_category_flag() {
    let store = FakeStore::table(common::sample_rows());
    let client = MessageClient::new(router_with(store.clone()).await);
    let q = CardQuery::new(SearchMode::Normal).set_number("sv10");

    let rows = client.search_cards(&q, false).await.unwrap();
    assert_eq!(rows.len(), 2);

    let rows = client.search_cards(&q, true).await.unwrap();
    assert_eq!(rows.len(), 3);

    let calls = store.calls();
    assert_eq!(calls[0].param("product_category"), Some("is.null"));
    assert_eq!(calls[1].param("product_category"), None);
}

#[tokio::test]
async fn search_multiple_cards_keeps_row_errors() {
    let store = FakeStore::with(|req| {
        if req.param("card_number") == Some("eq.2") {
            Err(common::server_error())
        } else {
            Ok(vec![record("sv1", "1", "row")])
        }
    });
    let client = MessageClient::new(router_with(store).await);
    let queries: Vec<CardQuery> = (1..=3)
        .map(|n| {
            CardQuery::new(SearchMode::Normal)
                .set_number("sv1")
                .card_number(&n.to_string())
                .row_number(n)
        })
        .collect();

    let results = client.search_multiple_cards(&queries, false).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[0].success && results[2].success);
    assert!(!results[1].success);
    assert_eq!(results[1].query.row_number, Some(2));
}

#[tokio::test]
async fn query_legacy_echoes_unknown_fields() {
    let client = MessageClient::new(router_with(FakeStore::table(common::sample_rows())).await);
    let card: LegacyCard = serde_json::from_value(json!({
        "original": "Team Rocket's Mewtwo ex SAR sv10 130/098",
        "set_number": "sv10",
        "card_number": "130",
        "element_hint": "span.title"
    }))
    .unwrap();

    let results = client.query_legacy(&[card]).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].card.extra["element_hint"], "span.title");
    let rows = results[0].supabase_data.as_ref().unwrap();
    assert_eq!(rows[0].name, "team rocket's mewtwo ex");
}

#[tokio::test]
async fn failed_search_surfaces_as_remote_error() {
    let client = MessageClient::new(router_with(FakeStore::failing()).await);
    let q = CardQuery::new(SearchMode::Normal).card_number("25");

    let err = client.search_cards(&q, false).await.unwrap_err();
    match err {
        LookupError::Remote(msg) => assert!(msg.starts_with("All 1 search strategies failed")),
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_worker_times_out_on_the_client() {
    let store = FakeStore::with(|_| {
        std::thread::sleep(Duration::from_millis(500));
        Ok(vec![])
    });
    let router = router_with(store).await;
    let client = MessageClient::with_timeout(router, Duration::from_millis(50));
    let q = CardQuery::new(SearchMode::Normal).set_number("sv10");

    let err = client.search_cards(&q, false).await.unwrap_err();
    assert!(matches!(err, LookupError::Timeout(d) if d == Duration::from_millis(50)));
    assert_eq!(err.to_string(), "Request timeout after 50ms");
}

#[tokio::test]
async fn panicking_worker_still_answers() {
    let store = FakeStore::with(|_| panic!("store exploded"));
    let client = MessageClient::new(router_with(store).await);
    let q = CardQuery::new(SearchMode::Normal).set_number("sv10");

    let err = client.search_cards(&q, false).await.unwrap_err();
    match err {
        LookupError::Remote(msg) => assert!(msg.contains("Task"), "{msg}"),
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn dropped_responder_means_not_responding() {
    let (responder, rx) = Responder::channel();
    drop(responder);

    let err = await_reply(rx, Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(err, LookupError::NotResponding), "{err:?}");
    assert_eq!(err.to_string(), "Extension not responding");
}

#[tokio::test]
async fn await_reply_maps_replies() {
    let (responder, rx) = Responder::channel();
    responder.respond(Response::ok(json!({ "n": 1 })));
    assert_eq!(await_reply(rx, Duration::from_secs(1)).await.unwrap(), json!({ "n": 1 }));

    let (responder, rx) = Responder::channel();
    responder.respond(Response::err("nope"));
    let err = await_reply(rx, Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(err, LookupError::Remote(ref msg) if msg == "nope"), "{err:?}");

    let (_responder, rx) = Responder::channel();
    let err = await_reply(rx, Duration::from_millis(20)).await.unwrap_err();
    assert!(matches!(err, LookupError::Timeout(_)), "{err:?}");
}

#[test]
fn failure_without_message_is_unknown_error() {
    let resp = Response {
        success: false,
        data: None,
        error: None,
    };
    let err = resp.into_result().unwrap_err();
    assert_eq!(err.to_string(), "Unknown error");
}
