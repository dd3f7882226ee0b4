use std::{future::Future, sync::Arc};

use awesome_blog::{AppState, Config};
use awesome_orm::{Pool, PoolOptions};
use awesome_web::{Chain, Reply, ReplyKind, Request};

/// In-memory SQLite pool holding the blog tables
pub async fn memory_pool() -> Pool {
    env_logger::try_init().ok();

    let pool = Pool::create(PoolOptions::memory()).await.unwrap();
    awesome_blog::models::create_tables(&pool).await.unwrap();

    pool
}

pub async fn run_test<Fn, Fut>(f: Fn)
where
    Fn: FnOnce(Pool) -> Fut,
    Fut: Future<Output = ()>,
{
    let pool = memory_pool().await;
    f(pool.clone()).await;
    pool.destroy().await;
}

/// Run the body with a fresh in-memory pool bound to the given name
#[macro_export]
macro_rules! run_async_test {
    (($pool:ident) => $body:block) => {
        $crate::run_test(|$pool: awesome_orm::Pool| async move $body).await
    };
}

/// The blog's middleware chain over `pool` with the default configuration
pub fn blog_app(pool: Pool) -> Chain {
    let config = Config::from_sources(None).unwrap();
    let state = AppState {
        pool,
        config: Arc::new(config),
    };

    awesome_blog::chain(state).unwrap()
}

pub fn json_of(reply: Reply) -> serde_json::Value {
    match reply.kind {
        ReplyKind::Json(v) => v,
        other => panic!("expected json reply, got {:?}", other),
    }
}

/// `name=value` of the first `Set-Cookie` header
pub fn set_cookie_of(reply: &Reply) -> Option<(String, String)> {
    let header = reply.headers.get(http::header::SET_COOKIE)?.to_str().ok()?;
    let pair = header.split(';').next()?;
    let (name, value) = pair.split_once('=')?;

    Some((name.trim().to_string(), value.trim().to_string()))
}

pub fn with_cookie(mut req: Request, name: &str, value: &str) -> Request {
    let header = http::HeaderValue::from_str(&format!("{}={}", name, value)).unwrap();
    req.headers.insert(http::header::COOKIE, header);
    req
}
