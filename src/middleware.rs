//! Middleware contract and chain control flow.
//!
//! Middleware intercepts the params mapping before the handler runs and is
//! the right place for cross-cutting concerns: token checks, field
//! validation, request-id injection, params rewriting.
//!
//! Each middleware in a chain receives the current [`Params`] by value and
//! answers with a [`Flow`]:
//!
//! - [`Flow::Continue`] hands a (possibly rewritten) mapping to the next
//!   stage — middleware never mutates a shared value in place.
//! - [`Flow::Respond`] short-circuits: the response is terminal, later
//!   middleware and the handler never run.
//! - `Err` aborts the request; the dispatcher converts it into the `500`
//!   error shape at its single recovery point.
//!
//! The order of a chain is the order of registration, and it never changes
//! afterwards.
//!
//! ```rust
//! use portico::{Error, Flow, Middleware, Params, Response, Status};
//!
//! /// Rejects requests that do not carry the expected bearer token.
//! struct RequireToken {
//!     token: String,
//! }
//!
//! impl Middleware for RequireToken {
//!     fn process_request(&self, params: Params) -> Result<Flow, Error> {
//!         match params.header("authorization") {
//!             Some(value) if value == format!("Bearer {}", self.token) => {
//!                 Ok(Flow::Continue(params))
//!             }
//!             _ => Ok(Flow::Respond(Response::status(Status::Unauthorized))),
//!         }
//!     }
//! }
//! ```

use crate::error::Error;
use crate::request::Params;
use crate::response::Response;

/// A request-transforming stage in a route's chain.
///
/// Implementations are stateless from the chain's perspective; configuration
/// is captured at construction. One instance may be shared across several
/// method chains, so `&self` receivers and `Send + Sync` are required.
pub trait Middleware: Send + Sync {
    fn process_request(&self, params: Params) -> Result<Flow, Error>;
}

/// What a middleware decided to do with the request.
#[derive(Debug)]
pub enum Flow {
    /// Keep going: pass this mapping to the next stage (or the handler).
    Continue(Params),
    /// Stop here: this response is final.
    Respond(Response),
}
