//! Route registry: radix-tree path lookup over method-keyed handler tables.
//!
//! One [`Route`] per registered path, one [`MethodHandler`] per bound method.
//! The registry is built once during configuration and is read-only for the
//! entire serving lifetime — concurrent invocations share it without locking.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler, MethodHandler};
use crate::method::Method;
use crate::middleware::Middleware;
use crate::request::Params;
use crate::response::Response;

// ── Route ─────────────────────────────────────────────────────────────────────

/// One registered path and the set of HTTP methods it answers.
pub struct Route {
    path: String,
    http_methods: Vec<Method>,
    methods: HashMap<Method, MethodHandler>,
}

impl Route {
    fn new(path: &str, http_methods: &[Method]) -> Self {
        Self {
            path: path.to_owned(),
            http_methods: http_methods.to_vec(),
            methods: HashMap::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The methods declared for this route, in registration order.
    pub fn http_methods(&self) -> &[Method] {
        &self.http_methods
    }

    /// Binds `handler` to `method`, overwriting any prior binding.
    ///
    /// Returns `&mut self` so bindings chain naturally:
    ///
    /// ```rust
    /// # use portico::{Method, Params, Response, Router};
    /// # async fn list(_: Params) -> Response { Response::text("") }
    /// # async fn create(_: Params) -> Response { Response::text("") }
    /// # let mut router = Router::new();
    /// router
    ///     .route_with("/users", &[Method::Get, Method::Post])
    ///     .on(Method::Get, list)
    ///     .on(Method::Post, create);
    /// ```
    pub fn on(&mut self, method: Method, handler: impl Handler) -> &mut Self {
        self.bind(method, handler.into_boxed_handler());
        self
    }

    pub(crate) fn bind(&mut self, method: Method, handler: BoxedHandler) {
        if !self.http_methods.contains(&method) {
            self.http_methods.push(method);
        }
        self.methods.insert(method, MethodHandler::new(handler));
    }

    /// Appends `middleware` to the chain of the handler bound to `method`.
    ///
    /// # Panics
    ///
    /// Panics if no handler is bound to `method` — attaching middleware to a
    /// method that cannot serve is a configuration bug that must stop
    /// startup.
    pub fn use_middleware(
        &mut self,
        method: Method,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.attach(method, Arc::new(middleware))
    }

    pub(crate) fn attach(&mut self, method: Method, middleware: Arc<dyn Middleware>) -> &mut Self {
        let path = &self.path;
        self.methods
            .get_mut(&method)
            .unwrap_or_else(|| panic!("no handler bound for {method} on `{path}`"))
            .push_middleware(middleware);
        self
    }

    /// Executes the handler bound to `method` (already uppercased by the
    /// dispatcher), or answers `405 Method Not Allowed`.
    pub(crate) async fn handle_request(
        &self,
        method: &str,
        params: Params,
    ) -> Result<Response, Error> {
        let handler = method
            .parse::<Method>()
            .ok()
            .and_then(|method| self.methods.get(&method));
        match handler {
            Some(handler) => handler.execute(params).await,
            None => Ok(Response::method_not_allowed()),
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The route registry: path → [`Route`].
///
/// Paths may contain `{name}` segments — the matched values join the params
/// mapping the way query fields do. Registration is idempotent: asking for a
/// path that already exists returns the existing route, so method
/// registrations accumulate.
pub struct Router {
    paths: HashMap<String, usize>,
    routes: Vec<Route>,
    tree: MatchitRouter<usize>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            paths: HashMap::new(),
            routes: Vec::new(),
            tree: MatchitRouter::new(),
        }
    }

    /// Returns the route for `path`, creating it (GET-only) if unknown.
    pub fn route(&mut self, path: &str) -> &mut Route {
        self.route_with(path, &[Method::Get])
    }

    /// Returns the route for `path`, creating it with the given method set if
    /// unknown. Re-registering extends the existing route's declared methods
    /// by union — it never replaces the route.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route template.
    pub fn route_with(&mut self, path: &str, methods: &[Method]) -> &mut Route {
        if let Some(&slot) = self.paths.get(path) {
            let route = &mut self.routes[slot];
            for &method in methods {
                if !route.http_methods.contains(&method) {
                    route.http_methods.push(method);
                }
            }
            return route;
        }

        let slot = self.routes.len();
        self.tree
            .insert(path, slot)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self.paths.insert(path.to_owned(), slot);
        self.routes.push(Route::new(path, methods));
        &mut self.routes[slot]
    }

    /// Exact-path read access, for introspection (doc generators and the
    /// like). Use [`lookup`](Router::lookup) for dispatch.
    pub fn get(&self, path: &str) -> Option<&Route> {
        self.paths.get(path).map(|&slot| &self.routes[slot])
    }

    /// The registered path templates, in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(Route::path)
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<(&Route, Vec<(String, String)>)> {
        let matched = self.tree.at(path).ok()?;
        let route = &self.routes[*matched.value];
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((route, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
