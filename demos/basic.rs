//! Minimal portico example — JSON endpoints behind an API Gateway proxy.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! The events below stand in for what the Lambda runtime would deliver; in a
//! deployed function you pass the runtime's event straight to `app.handle`.

use std::sync::Arc;

use portico::{App, EventSource, Flow, Method, Middleware, Params, Response, Status};
use serde_json::json;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut app = App::new(EventSource::ApiGatewayProxy);
    app.route("/users/{id}").on(Method::Get, get_user);
    app.register(
        "/users",
        &[Method::Post],
        vec![Arc::new(RequireToken { token: "secret".into() })],
        create_user,
    );

    // GET /users/42
    let envelope = app
        .handle(json!({
            "path": "/users/42",
            "httpMethod": "GET",
            "queryStringParameters": null,
            "requestContext": { "identity": { "sourceIp": "203.0.113.9" } },
        }))
        .await;
    println!("GET /users/42    -> {envelope}");

    // POST /users with the right token
    let envelope = app
        .handle(json!({
            "path": "/users",
            "httpMethod": "POST",
            "headers": { "authorization": "Bearer secret" },
            "body": "{\"name\":\"alice\"}",
        }))
        .await;
    println!("POST /users      -> {envelope}");

    // POST /users without a token — the middleware answers before the handler
    let envelope = app
        .handle(json!({
            "path": "/users",
            "httpMethod": "POST",
            "body": "{\"name\":\"mallory\"}",
        }))
        .await;
    println!("POST /users (no token) -> {envelope}");
}

// GET /users/{id} — the path parameter arrives in the params mapping.
async fn get_user(params: Params) -> Response {
    let id = params.get("id").and_then(|v| v.as_str()).unwrap_or("unknown");
    Response::ok(json!({ "id": id, "name": "alice" }))
}

// POST /users — body fields are already merged into the params.
async fn create_user(params: Params) -> Response {
    let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
        return Response::status(Status::BadRequest);
    };
    Response::builder()
        .status(Status::Created)
        .header("location", "/users/99")
        .body(json!({ "id": 99, "name": name }))
}

/// Rejects requests that do not carry the expected bearer token.
struct RequireToken {
    token: String,
}

impl Middleware for RequireToken {
    fn process_request(&self, params: Params) -> Result<Flow, portico::Error> {
        match params.header("authorization") {
            Some(value) if value == format!("Bearer {}", self.token) => {
                Ok(Flow::Continue(params))
            }
            _ => Ok(Flow::Respond(Response::status(Status::Unauthorized))),
        }
    }
}
