//! End-to-end dispatch tests: raw trigger event in, envelope out.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::{Engine, engine::general_purpose::STANDARD};
use portico::{
    App, Error, EventSource, Flow, Method, Middleware, Params, Response, Status,
};
use serde_json::{Value, json};

fn gateway_event(method: &str, path: &str) -> Value {
    json!({ "path": path, "httpMethod": method })
}

async fn hello(_params: Params) -> Response {
    Response::text("hi")
}

// ── Happy paths ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn gateway_round_trip() {
    let mut app = App::new(EventSource::ApiGatewayProxy).with_request_logging(false);
    app.route("/hello").on(Method::Get, hello);

    let envelope = app.handle(gateway_event("GET", "/hello")).await;
    assert_eq!(envelope, json!({ "statusCode": 200, "body": "hi" }));
}

#[tokio::test]
async fn gateway_body_is_always_a_string() {
    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route("/hello")
        .on(Method::Get, |_params: Params| async {
            Response::ok(json!({ "greeting": "hi" }))
        });

    let envelope = app.handle(gateway_event("GET", "/hello")).await;
    assert_eq!(
        envelope,
        json!({ "statusCode": 200, "body": r#"{"greeting":"hi"}"# })
    );
}

#[tokio::test]
async fn function_url_body_type_is_preserved() {
    let mut app = App::new(EventSource::FunctionUrl);
    app.route("/hello")
        .on(Method::Get, |_params: Params| async {
            Response::ok(json!({ "greeting": "hi" }))
        });

    let event = json!({
        "requestContext": { "http": { "path": "/hello", "method": "GET" } },
    });
    let envelope = app.handle(event).await;
    assert_eq!(
        envelope,
        json!({ "statusCode": 200, "body": { "greeting": "hi" } })
    );
}

#[tokio::test]
async fn raw_handler_return_wraps_as_200() {
    // The pinned default: a non-Response return becomes status 200 with the
    // value as body.
    let mut app = App::new(EventSource::FunctionUrl);
    app.route("/hello").on(Method::Get, |_params: Params| async { "hi" });

    let envelope = app
        .handle(json!({
            "requestContext": { "http": { "path": "/hello", "method": "GET" } },
        }))
        .await;
    assert_eq!(envelope, json!({ "statusCode": 200, "body": "hi" }));
}

#[tokio::test]
async fn path_params_reach_the_handler() {
    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route("/users/{id}")
        .on(Method::Get, |params: Params| async move {
            Response::ok(json!({ "id": params.get("id").cloned() }))
        });

    let envelope = app.handle(gateway_event("GET", "/users/42")).await;
    assert_eq!(envelope, json!({ "statusCode": 200, "body": r#"{"id":"42"}"# }));
}

#[tokio::test]
async fn merged_params_reach_the_handler() {
    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route_with("/items", &[Method::Post])
        .on(Method::Post, |params: Params| async move {
            Response::ok(Value::Object(params.fields().clone()))
        });

    let event = json!({
        "path": "/items",
        "httpMethod": "POST",
        "queryStringParameters": { "a": "query", "b": "query" },
        "headers": { "x-request-id": "r-1" },
        "body": "{\"b\":\"body\"}",
    });
    let envelope = app.handle(event).await;
    assert_eq!(envelope["statusCode"], 200);

    let body: Value = serde_json::from_str(envelope["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["a"], "query");
    assert_eq!(body["b"], "body");
    assert_eq!(body["headers"]["x-request-id"], "r-1");
}

#[tokio::test]
async fn base64_body_reaches_the_handler_decoded() {
    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route_with("/upload", &[Method::Post])
        .on(Method::Post, |params: Params| async move {
            assert!(params.is_base64());
            let size = params.file().map_or(0, |file| file.len());
            Response::ok(json!({ "bytes": size }))
        });

    let event = json!({
        "path": "/upload",
        "httpMethod": "POST",
        "body": STANDARD.encode(b"hello"),
        "isBase64Encoded": true,
    });
    let envelope = app.handle(event).await;
    assert_eq!(envelope, json!({ "statusCode": 200, "body": r#"{"bytes":5}"# }));
}

// ── Error paths ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn unregistered_path_answers_404() {
    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route("/hello").on(Method::Get, hello);

    let envelope = app.handle(gateway_event("GET", "/missing")).await;
    assert_eq!(envelope, json!({ "statusCode": 404, "body": "Route Not Found" }));
}

#[tokio::test]
async fn unregistered_method_answers_405() {
    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route("/hello").on(Method::Get, hello);

    let envelope = app.handle(gateway_event("DELETE", "/hello")).await;
    assert_eq!(
        envelope,
        json!({ "statusCode": 405, "body": "Method Not Allowed" })
    );
}

#[tokio::test]
async fn failing_handler_answers_500_error_shape() {
    let mut app = App::new(EventSource::FunctionUrl);
    app.route("/hello").on(Method::Get, |_params: Params| async {
        let result: Result<Response, &str> = Err("boom");
        result
    });

    let envelope = app
        .handle(json!({
            "requestContext": { "http": { "path": "/hello", "method": "GET" } },
        }))
        .await;
    assert_eq!(
        envelope,
        json!({ "statusCode": 500, "body": { "error": "boom" } })
    );
}

#[tokio::test]
async fn normalization_failure_answers_500() {
    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route("/hello").on(Method::Get, hello);

    // Gateway event without its `path`: normalization fails, the boundary
    // converts, the encoder still shapes the envelope.
    let envelope = app.handle(json!({ "httpMethod": "GET" })).await;
    assert_eq!(envelope["statusCode"], 500);
    assert_eq!(envelope["body"], r#"{"error":"event is missing `path`"}"#);
}

#[tokio::test]
async fn malformed_json_body_answers_500() {
    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route("/hello").on(Method::Get, hello);

    let event = json!({
        "path": "/hello",
        "httpMethod": "GET",
        "body": "{ not json",
    });
    let envelope = app.handle(event).await;
    assert_eq!(envelope["statusCode"], 500);
    let body: Value = serde_json::from_str(envelope["body"].as_str().unwrap()).unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("request body is not valid JSON")
    );
}

// ── Middleware semantics ──────────────────────────────────────────────────────

/// Counts how often it runs, then either continues or short-circuits.
struct Gate {
    calls: Arc<AtomicUsize>,
    open: bool,
}

impl Middleware for Gate {
    fn process_request(&self, params: Params) -> Result<Flow, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.open {
            Ok(Flow::Continue(params))
        } else {
            Ok(Flow::Respond(Response::status(Status::Forbidden)))
        }
    }
}

#[tokio::test]
async fn short_circuit_response_is_what_gets_encoded() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let handled = Arc::new(AtomicUsize::new(0));

    let mut app = App::new(EventSource::ApiGatewayProxy);
    let handler_calls = Arc::clone(&handled);
    app.route("/hello")
        .on(Method::Get, move |_params: Params| {
            let handler_calls = Arc::clone(&handler_calls);
            async move {
                handler_calls.fetch_add(1, Ordering::SeqCst);
                Response::text("never")
            }
        })
        .use_middleware(Method::Get, Gate { calls: Arc::clone(&first), open: true })
        .use_middleware(Method::Get, Gate { calls: Arc::clone(&second), open: false })
        .use_middleware(Method::Get, Gate { calls: Arc::new(AtomicUsize::new(0)), open: true });

    let envelope = app.handle(gateway_event("GET", "/hello")).await;

    assert_eq!(envelope, json!({ "statusCode": 403, "body": "" }));
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(handled.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn middleware_failure_collapses_at_the_boundary() {
    struct Fail;
    impl Middleware for Fail {
        fn process_request(&self, _params: Params) -> Result<Flow, Error> {
            Err(Error::middleware("token store unreachable"))
        }
    }

    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route("/hello")
        .on(Method::Get, hello)
        .use_middleware(Method::Get, Fail);

    let envelope = app.handle(gateway_event("GET", "/hello")).await;
    assert_eq!(envelope["statusCode"], 500);
    assert_eq!(
        envelope["body"],
        r#"{"error":"token store unreachable"}"#
    );
}

// ── Declarative registration ──────────────────────────────────────────────────

#[tokio::test]
async fn register_binds_every_method_with_the_shared_chain() {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.register(
        "/items",
        &[Method::Put, Method::Post],
        vec![Arc::new(Gate { calls: Arc::clone(&calls), open: true })],
        |_params: Params| async { Response::text("stored") },
    );

    for method in ["PUT", "POST"] {
        let envelope = app.handle(gateway_event(method, "/items")).await;
        assert_eq!(envelope["statusCode"], 200);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // GET was never part of the registration.
    let envelope = app.handle(gateway_event("GET", "/items")).await;
    assert_eq!(envelope["statusCode"], 405);
}

#[tokio::test]
async fn re_registering_a_path_accumulates_methods() {
    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.register("/items", &[Method::Get], Vec::new(), |_params: Params| async {
        Response::text("listed")
    });
    app.register("/items", &[Method::Post], Vec::new(), |_params: Params| async {
        Response::text("created")
    });

    let envelope = app.handle(gateway_event("GET", "/items")).await;
    assert_eq!(envelope["body"], "listed");
    let envelope = app.handle(gateway_event("POST", "/items")).await;
    assert_eq!(envelope["body"], "created");

    let route = app.router().get("/items").unwrap();
    assert_eq!(route.http_methods(), &[Method::Get, Method::Post]);
}
