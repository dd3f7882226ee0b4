//! The awesome blog: configuration, models, handlers and the server entry.

use std::{net::SocketAddr, sync::Arc};

use awesome_orm::Pool;
use awesome_web::{Chain, HttpServer, Logger, RouteError, StaticFiles};

pub mod auth;
pub mod config;
pub mod handlers;
pub mod markup;
pub mod middleware;
pub mod models;
pub mod page;
pub mod render;

pub use config::{Config, ConfigError};
pub use handlers::AppState;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Database(#[from] awesome_orm::error::Error),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("load templates: {0}")]
    Template(#[from] tera::Error),
    #[error("invalid listen address {0}")]
    Address(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Middlewares around the route table, outermost first
pub fn chain(state: AppState) -> Result<Chain> {
    let web = &state.config.web;
    let session = &state.config.session;

    let auth = middleware::Auth::new(state.pool.clone(), &session.cookie_name, &session.secret);
    let statics = StaticFiles::new("/static/", &web.static_dir);
    let router = handlers::routes(state)?;

    Ok(Chain::new(Arc::new(router))
        .with(Arc::new(Logger))
        .with(Arc::new(statics))
        .with(Arc::new(auth)))
}

/// Serve until Ctrl-C, then release the pool
pub async fn run(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|_| Error::Address(format!("{}:{}", config.server.host, config.server.port)))?;

    let pool = Pool::create(config.db.pool_options()).await?;
    models::create_tables(&pool).await?;

    let renderer = render::TeraRenderer::new(&config.web.templates)?;
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config),
    };
    let server = HttpServer::new(chain(state)?, Arc::new(renderer));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("listen for ctrl-c failed: {}", e);
        }
    };
    let result = server.listen_with_shutdown(addr, shutdown).await;

    pool.destroy().await;
    result.map_err(Error::from)
}
