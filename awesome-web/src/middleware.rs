use std::sync::Arc;

use crate::{Endpoint, Reply, Request};

/// A step wrapped around the endpoint. Call `next.run` to continue the chain.
#[async_trait::async_trait]
pub trait Middleware: Send + Sync {
    async fn process(&self, req: Request, next: Next<'_>) -> Reply;
}

/// Remainder of the chain after the current middleware
#[derive(Clone, Copy)]
pub struct Next<'a> {
    endpoint: &'a dyn Endpoint,
    middlewares: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub fn new(endpoint: &'a dyn Endpoint, middlewares: &'a [Arc<dyn Middleware>]) -> Self {
        Self {
            endpoint,
            middlewares,
        }
    }

    pub async fn run(self, req: Request) -> Reply {
        match self.middlewares.split_first() {
            Some((first, rest)) => first.process(req, Next::new(self.endpoint, rest)).await,
            None => self.endpoint.call(req).await,
        }
    }
}

/// Middlewares in registration order around an endpoint
#[derive(Clone)]
pub struct Chain {
    endpoint: Arc<dyn Endpoint>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new(endpoint: Arc<dyn Endpoint>) -> Self {
        Self {
            endpoint,
            middlewares: Vec::new(),
        }
    }

    pub fn with(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub async fn handle(&self, req: Request) -> Reply {
        Next::new(self.endpoint.as_ref(), &self.middlewares).run(req).await
    }
}

/// Logs every request line
pub struct Logger;

#[async_trait::async_trait]
impl Middleware for Logger {
    async fn process(&self, req: Request, next: Next<'_>) -> Reply {
        log::info!("Request: {} {}", req.method, req.path());
        next.run(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;

    struct Hello;

    #[async_trait::async_trait]
    impl Endpoint for Hello {
        async fn call(&self, req: Request) -> Reply {
            Reply::text(format!("hello {}", req.header("x-name").unwrap_or("?")))
        }
    }

    struct Tag(&'static str);

    #[async_trait::async_trait]
    impl Middleware for Tag {
        async fn process(&self, mut req: Request, next: Next<'_>) -> Reply {
            let name = format!("{}{}", req.header("x-name").unwrap_or(""), self.0);
            req.headers.insert("x-name", name.parse().unwrap());
            next.run(req).await.with_header(header::VARY, self.0)
        }
    }

    #[tokio::test]
    async fn runs_in_order() {
        let chain = Chain::new(Arc::new(Hello))
            .with(Arc::new(Logger))
            .with(Arc::new(Tag("a")))
            .with(Arc::new(Tag("b")));

        let reply = chain.handle(Request::get("/")).await;
        assert_eq!(reply.kind, crate::ReplyKind::Text("hello ab".into()));

        let vary = reply
            .headers
            .get_all(header::VARY)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(vary, ["b", "a"]);
    }
}
