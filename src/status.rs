//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted — `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use portico::{Response, Status};
//! use serde_json::json;
//!
//! // status-only, empty body
//! Response::status(Status::NoContent);
//!
//! // builder with a structured body
//! Response::builder()
//!     .status(Status::Created)
//!     .header("location", "/users/42")
//!     .body(json!({ "id": 42 }));
//!
//! // return Status directly from a handler — portico wraps it
//! async fn delete_user(_params: portico::Params) -> Status {
//!     Status::NoContent
//! }
//! ```

/// The status codes a Lambda-backed API plausibly answers with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    Created,              // 201
    Accepted,             // 202
    NoContent,            // 204

    // ── 3xx Redirection ───────────────────────────────────────────────────────
    MovedPermanently,     // 301
    Found,                // 302
    SeeOther,             // 303
    NotModified,          // 304
    TemporaryRedirect,    // 307
    PermanentRedirect,    // 308

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    Unauthorized,         // 401
    PaymentRequired,      // 402
    Forbidden,            // 403
    NotFound,             // 404
    MethodNotAllowed,     // 405
    NotAcceptable,        // 406
    RequestTimeout,       // 408
    Conflict,             // 409
    Gone,                 // 410
    ContentTooLarge,      // 413
    UnsupportedMediaType, // 415
    UnprocessableContent, // 422
    TooManyRequests,      // 429

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
    NotImplemented,       // 501
    BadGateway,           // 502
    ServiceUnavailable,   // 503
    GatewayTimeout,       // 504
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                   => 200,
            Status::Created              => 201,
            Status::Accepted             => 202,
            Status::NoContent            => 204,
            Status::MovedPermanently     => 301,
            Status::Found                => 302,
            Status::SeeOther             => 303,
            Status::NotModified          => 304,
            Status::TemporaryRedirect    => 307,
            Status::PermanentRedirect    => 308,
            Status::BadRequest           => 400,
            Status::Unauthorized         => 401,
            Status::PaymentRequired      => 402,
            Status::Forbidden            => 403,
            Status::NotFound             => 404,
            Status::MethodNotAllowed     => 405,
            Status::NotAcceptable        => 406,
            Status::RequestTimeout       => 408,
            Status::Conflict             => 409,
            Status::Gone                 => 410,
            Status::ContentTooLarge      => 413,
            Status::UnsupportedMediaType => 415,
            Status::UnprocessableContent => 422,
            Status::TooManyRequests      => 429,
            Status::InternalServerError  => 500,
            Status::NotImplemented       => 501,
            Status::BadGateway           => 502,
            Status::ServiceUnavailable   => 503,
            Status::GatewayTimeout       => 504,
        }
    }
}
