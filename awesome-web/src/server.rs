use std::{future::Future, net::SocketAddr, pin::Pin, sync::Arc};

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::{body::Incoming, server::conn::http1, service::Service};
use hyper_util::rt::TokioIo;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::watch,
};

use crate::{response, Chain, Renderer, Request, Response};

/// HTTP/1 server running a middleware chain
pub struct HttpServer {
    chain: Chain,
    renderer: Arc<dyn Renderer>,
}

impl HttpServer {
    pub fn new(chain: Chain, renderer: Arc<dyn Renderer>) -> Self {
        Self { chain, renderer }
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn listen_with_shutdown<F>(self, addr: SocketAddr, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Accept connections until `shutdown` resolves. Requests already being
    /// served are allowed to finish, idle keep-alive connections are closed.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        log::info!("server started at http://{}...", listener.local_addr()?);

        let service = RequestService {
            chain: self.chain,
            renderer: self.renderer,
            remote_addr: None,
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut connections = tokio::task::JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, socket_addr) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            log::warn!("accept failed: {}", e);
                            continue;
                        }
                    };

                    let mut service = service.clone();
                    service.remote_addr = Some(socket_addr);
                    let stop = stop_rx.clone();
                    connections.spawn(async move {
                        if let Err(err) = Self::handle_connection(stream, service, stop).await {
                            log::debug!("Error handling connection: {:?}", err);
                        }
                    });
                }
                _ = &mut shutdown => {
                    log::info!("shutdown signal received, stopping server...");
                    break;
                }
            }
        }

        drop(listener);
        stop_tx.send_replace(true);
        while connections.join_next().await.is_some() {}

        Ok(())
    }

    async fn handle_connection(
        stream: TcpStream,
        service: RequestService,
        mut stop: watch::Receiver<bool>,
    ) -> hyper::Result<()> {
        let io = TokioIo::new(stream);
        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            _ = stop.changed() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }
}

#[derive(Clone)]
struct RequestService {
    chain: Chain,
    renderer: Arc<dyn Renderer>,
    remote_addr: Option<SocketAddr>,
}

impl Service<hyper::Request<Incoming>> for RequestService {
    type Response = Response;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
        let this = self.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body: Bytes = body.collect().await?.to_bytes();

            let mut request = Request::new(parts.method, parts.uri, parts.headers, body);
            request.remote_addr = this.remote_addr;

            let reply = this.chain.handle(request).await;

            Ok(response::into_response(reply, this.renderer.as_ref()))
        })
    }
}
