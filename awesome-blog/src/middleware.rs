use awesome_orm::Pool;
use awesome_web::{Middleware, Next, Reply, Request};
use serde_json::Value as Json;

use crate::{auth, models::User};

/// User signed in on the current request, stored in the request extensions
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// Resolves the session cookie into a [`CurrentUser`] and guards `/manage/`
pub struct Auth {
    pool: Pool,
    cookie_name: String,
    secret: String,
}

impl Auth {
    pub fn new(pool: Pool, cookie_name: &str, secret: &str) -> Self {
        Self {
            pool,
            cookie_name: cookie_name.into(),
            secret: secret.into(),
        }
    }
}

#[async_trait::async_trait]
impl Middleware for Auth {
    async fn process(&self, mut req: Request, next: Next<'_>) -> Reply {
        log::info!("check user: {} {}", req.method, req.path());

        let user = match req.cookie(&self.cookie_name) {
            Some(cookie) => auth::cookie2user(&self.pool, &cookie, &self.secret).await,
            None => None,
        };
        if let Some(user) = &user {
            log::info!("set current user: {}", user.email);
        }

        let is_admin = user.as_ref().map_or(false, |u| u.admin);
        if req.path().starts_with("/manage/") && !is_admin {
            return Reply::redirect("/signin");
        }

        req.set_template_global("__user__", serde_json::to_value(&user).unwrap_or(Json::Null));
        req.extensions.insert(CurrentUser(user));

        next.run(req).await
    }
}
