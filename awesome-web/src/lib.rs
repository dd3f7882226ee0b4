//! Request routing, argument binding and the HTTP server of the blog.

mod binding;
mod error;
pub mod form;
mod middleware;
mod pattern;
mod reply;
mod request;
pub mod response;
mod router;
mod server;
mod static_files;

pub use binding::{Args, BindingPlan, Param};
pub use error::{ApiError, RenderError, RouteError};
pub use middleware::{Chain, Logger, Middleware, Next};
pub use pattern::{PathPattern, Segment};
pub use reply::{Reply, ReplyKind};
pub use request::Request;
pub use response::{Renderer, Response};
pub use router::{BoxFuture, Endpoint, Router};
pub use server::HttpServer;
pub use static_files::StaticFiles;

pub use http::{Method, StatusCode};
