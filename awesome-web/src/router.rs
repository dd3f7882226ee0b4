use std::{future::Future, pin::Pin, sync::Arc};

use http::Method;

use crate::{ApiError, Args, BindingPlan, Param, PathPattern, Reply, Request, RouteError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type BoxedHandler<S> = Arc<dyn Fn(S, Args) -> BoxFuture<'static, Result<Reply, ApiError>> + Send + Sync>;

/// Innermost request handler of a middleware chain
#[async_trait::async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(&self, req: Request) -> Reply;
}

struct Route<S> {
    method: Method,
    pattern: PathPattern,
    plan: BindingPlan,
    handler: BoxedHandler<S>,
    name: String,
}

/// Route table. Every handler gets a clone of the shared state `S`.
pub struct Router<S> {
    state: S,
    routes: Vec<Route<S>>,
}

impl<S> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(state: S) -> Self {
        Self {
            state,
            routes: Vec::new(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Register a handler; the first registered match of a request wins
    pub fn route<F, Fut>(
        &mut self,
        method: Method,
        path: &str,
        params: &[Param],
        handler: F,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(S, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
    {
        let pattern = PathPattern::parse(path)?;
        let name = format!("{} {}", method, path);
        let plan = BindingPlan::new(&name, &pattern, params)?;

        log::info!("add route {} => {:?}", name, params);

        let handler: BoxedHandler<S> = Arc::new(move |state: S, args: Args| {
            Box::pin(handler(state, args)) as BoxFuture<'static, Result<Reply, ApiError>>
        });
        self.routes.push(Route {
            method,
            pattern,
            plan,
            handler,
            name,
        });

        Ok(self)
    }

    pub fn get<F, Fut>(&mut self, path: &str, params: &[Param], handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(S, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
    {
        self.route(Method::GET, path, params, handler)
    }

    pub fn post<F, Fut>(&mut self, path: &str, params: &[Param], handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(S, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
    {
        self.route(Method::POST, path, params, handler)
    }

    /// Route, bind and invoke.
    ///
    /// An [`ApiError`] other than `Internal` is answered with its JSON payload.
    pub async fn dispatch(&self, mut req: Request) -> Reply {
        let found = self.routes.iter().find_map(|r| {
            if r.method != req.method {
                return None;
            }
            r.pattern.matches(req.path()).map(|captures| (r, captures))
        });

        let (route, captures) = match found {
            Some(found) => found,
            None => return Reply::not_found(),
        };
        req.match_info = captures;

        let globals = req.template_globals().clone();
        let args = match route.plan.bind(req).await {
            Ok(args) => args,
            Err(reply) => return reply,
        };

        let mut reply = match (route.handler)(self.state.clone(), args).await {
            Ok(reply) => reply,
            Err(ApiError::Internal(e)) => {
                log::error!("{} failed: {}", route.name, e);
                return Reply::internal_error();
            }
            Err(e) => {
                log::info!("{} api error: {}", route.name, e);
                Reply::json(e.to_json())
            }
        };

        reply.merge_globals(&globals);
        reply
    }
}

#[async_trait::async_trait]
impl<S> Endpoint for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn call(&self, req: Request) -> Reply {
        self.dispatch(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReplyKind;
    use http::StatusCode;
    use serde_json::json;

    async fn echo(_: (), args: Args) -> Result<Reply, ApiError> {
        Ok(Reply::json(json!(args.values())))
    }

    fn router() -> Router<()> {
        let mut r = Router::new(());
        r.post("/api/users", &[Param::required("email"), Param::named("name")], echo)
            .unwrap();
        r.get("/api/blogs/{id}", &[Param::path("id")], echo).unwrap();
        r.get("/api/blogs", &[Param::named("page")], echo).unwrap();
        r.post("/api/fail", &[], |_, _| async { Err(ApiError::value("name", "bad")) })
            .unwrap();
        r.post("/api/{x}", &[Param::catch_all()], echo).unwrap();
        r
    }

    fn json_of(reply: Reply) -> serde_json::Value {
        match reply.kind {
            ReplyKind::Json(v) => v,
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[tokio::test]
    async fn required_argument_from_json() {
        let r = router();

        let req = Request::post("/api/users", "application/json", r#"{"email":"a@b.com","x":1}"#);
        assert_eq!(json_of(r.dispatch(req).await), json!({"email": "a@b.com"}));

        let req = Request::post("/api/users", "application/json", "{}");
        let reply = r.dispatch(req).await;
        assert_eq!(
            reply.kind,
            ReplyKind::Status(StatusCode::BAD_REQUEST, "Missing argument: email".into())
        );
    }

    #[tokio::test]
    async fn unknown_content_type() {
        let r = router();
        let req = Request::post("/api/users", "application/xml", "<a/>");
        assert_eq!(
            r.dispatch(req).await.kind,
            ReplyKind::Status(StatusCode::BAD_REQUEST, "Unsupported Content-Type: application/xml".into())
        );
    }

    #[tokio::test]
    async fn path_and_query() {
        let r = router();

        assert_eq!(json_of(r.dispatch(Request::get("/api/blogs/42")).await), json!({"id": "42"}));
        assert_eq!(
            json_of(r.dispatch(Request::get("/api/blogs?page=2&page=3&q=1")).await),
            json!({"page": "2"})
        );
        assert_eq!(r.dispatch(Request::get("/api/nope")).await.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn path_wins_over_body() {
        let r = router();
        let req = Request::post("/api/abc", "application/x-www-form-urlencoded", "x=body&y=2");
        assert_eq!(json_of(r.dispatch(req).await), json!({"x": "abc", "y": "2"}));
    }

    #[tokio::test]
    async fn api_error_payload() {
        let r = router();
        let reply = r.dispatch(Request::post("/api/fail", "application/json", "{}")).await;
        assert_eq!(reply.status_code(), StatusCode::OK);
        assert_eq!(
            json_of(reply),
            json!({"error": "value:invalid", "data": "name", "message": "bad"})
        );
    }

    #[test]
    fn request_must_be_last() {
        let mut r = Router::new(());
        let res = r.get("/", &[Param::request(), Param::named("page")], echo);
        assert!(matches!(res, Err(RouteError::Params { .. })));

        let res = r.get("/blog/{id}", &[Param::path("blog_id")], echo);
        assert!(matches!(res, Err(RouteError::Params { .. })));
    }
}
