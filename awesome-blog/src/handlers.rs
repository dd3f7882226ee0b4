//! Pages and JSON API of the blog.

use std::sync::Arc;

use awesome_orm::{FindOption, FromValue, Limit, Model, Pool, ToValue};
use awesome_web::{ApiError, Args, Param, Reply, RouteError, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value as Json};

use crate::{
    auth,
    config::Config,
    markup,
    middleware::CurrentUser,
    models::{next_id, Blog, Comment, User},
    page::{page_index, Page, PAGE_SIZE},
};

static RE_EMAIL: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-z0-9\.\-\_]+\@[a-z0-9\-\_]+(\.[a-z0-9\-\_]+){1,4}$"));
static RE_SHA1: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"^[0-9a-f]{40}$"));

type HandlerResult = Result<Reply, ApiError>;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
}

pub fn routes(state: AppState) -> Result<Router<AppState>, RouteError> {
    let mut r = Router::new(state);

    r.get("/", &[Param::named("page")], index)?;
    r.get("/blog/{id}", &[Param::path("id")], get_blog)?;
    r.get("/register", &[], register)?;
    r.get("/signin", &[], signin)?;
    r.get("/signout", &[Param::request()], signout)?;

    r.get("/manage/", &[], manage)?;
    r.get("/manage/comments", &[Param::named("page")], manage_comments)?;
    r.get("/manage/blogs", &[Param::named("page")], manage_blogs)?;
    r.get("/manage/blogs/create", &[], manage_create_blog)?;
    r.get("/manage/blogs/edit", &[Param::required("id")], manage_edit_blog)?;
    r.get("/manage/users", &[Param::named("page")], manage_users)?;

    r.post(
        "/api/authenticate",
        &[Param::required("email"), Param::required("passwd")],
        authenticate,
    )?;
    r.get("/api/users", &[Param::named("page")], api_get_users)?;
    r.post(
        "/api/users",
        &[Param::required("email"), Param::required("name"), Param::required("passwd")],
        api_register_user,
    )?;

    r.get("/api/comments", &[Param::named("page")], api_comments)?;
    r.post(
        "/api/blogs/{id}/comments",
        &[Param::path("id"), Param::required("content"), Param::request()],
        api_create_comment,
    )?;
    r.post(
        "/api/comments/{id}/delete",
        &[Param::path("id"), Param::request()],
        api_delete_comment,
    )?;

    r.get("/api/blogs", &[Param::named("page")], api_blogs)?;
    r.get("/api/blogs/{id}", &[Param::path("id")], api_get_blog)?;
    r.post(
        "/api/blogs",
        &[
            Param::required("name"),
            Param::required("summary"),
            Param::required("content"),
            Param::request(),
        ],
        api_create_blog,
    )?;
    r.post(
        "/api/blogs/{id}",
        &[
            Param::path("id"),
            Param::required("name"),
            Param::required("summary"),
            Param::required("content"),
            Param::request(),
        ],
        api_update_blog,
    )?;
    r.post(
        "/api/blogs/{id}/delete",
        &[Param::path("id"), Param::request()],
        api_delete_blog,
    )?;

    Ok(r)
}

fn current_user(args: &Args) -> Option<&User> {
    args.request()
        .and_then(|req| req.extensions.get::<CurrentUser>())
        .and_then(|c| c.0.as_ref())
}

fn check_admin(args: &Args) -> Result<&User, ApiError> {
    match current_user(args) {
        Some(user) if user.admin => Ok(user),
        _ => Err(ApiError::permission("Administrator required.")),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Json, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

fn compiled(re: &'static Result<Regex, regex::Error>) -> Result<&'static Regex, ApiError> {
    re.as_ref().map_err(|e| ApiError::Internal(e.to_string()))
}

/// `count(id)` of the rows matching `where_clause`
async fn count<M: Model>(pool: &Pool, where_clause: Option<&str>, params: Vec<awesome_orm::Value>) -> Result<u64, ApiError> {
    let n = match M::find_number(pool, "count(id)", where_clause, params).await? {
        Some(v) => i64::from_value(&v)?,
        None => 0,
    };
    Ok(n.max(0) as u64)
}

/// One page of `M` ordered by `order_by`, empty when nothing is stored
async fn page_of<M: Model>(pool: &Pool, page: &str, order_by: &str) -> Result<(Page, Vec<M>), ApiError> {
    let num = count::<M>(pool, None, vec![]).await?;
    let page = Page::new(num, page_index(page), PAGE_SIZE);
    if num == 0 || page.limit == 0 {
        return Ok((page, vec![]));
    }

    let option = FindOption::new()
        .order_by(order_by)
        .limit(Limit::Range(page.offset, page.limit));
    Ok((page, M::find_all(pool, option).await?))
}

/// Emails are stored and looked up trimmed and lowercased
fn email_of(args: &Args) -> String {
    args.str_or("email", "").trim().to_lowercase()
}

fn not_blank(args: &Args, name: &str, message: &str) -> Result<String, ApiError> {
    let value = args.str_or(name, "").trim().to_string();
    if value.is_empty() {
        return Err(ApiError::value(name, message));
    }
    Ok(value)
}

async fn index(state: AppState, args: Args) -> HandlerResult {
    let (page, blogs) = page_of::<Blog>(&state.pool, &args.str_or("page", "1"), "created_at desc").await?;

    Ok(Reply::template(
        "blogs.html",
        json!({"page": page, "blogs": blogs}),
    ))
}

async fn get_blog(state: AppState, args: Args) -> HandlerResult {
    let id = args.str_or("id", "");
    let blog = match Blog::find(&state.pool, id.as_str()).await? {
        Some(blog) => blog,
        None => return Ok(Reply::not_found()),
    };

    let option = FindOption::new()
        .filter("blog_id=?", vec![id.to_value()])
        .order_by("created_at");
    let comments = Comment::find_all(&state.pool, option)
        .await?
        .iter()
        .map(|c| -> Result<Json, ApiError> {
            let mut v = to_json(c)?;
            v["html_content"] = Json::String(markup::text2html(&c.content));
            Ok(v)
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let mut blog_json = to_json(&blog)?;
    blog_json["html_content"] = Json::String(markup::text2html(&blog.content));

    Ok(Reply::template(
        "blog.html",
        json!({"blog": blog_json, "comments": comments}),
    ))
}

async fn register(_: AppState, _: Args) -> HandlerResult {
    Ok(Reply::template("register.html", json!({})))
}

async fn signin(_: AppState, _: Args) -> HandlerResult {
    Ok(Reply::template("signin.html", json!({})))
}

async fn signout(state: AppState, args: Args) -> HandlerResult {
    let referer = args
        .request()
        .and_then(|req| req.header("referer"))
        .filter(|s| !s.is_empty())
        .unwrap_or("/")
        .to_string();

    log::info!("user signed out.");
    Ok(Reply::redirect(&referer).set_cookie(&state.config.session.cookie_name, "-deleted-", 0))
}

async fn manage(_: AppState, _: Args) -> HandlerResult {
    Ok("redirect:/manage/comments".into())
}

fn manage_page(template: &str, args: &Args) -> HandlerResult {
    Ok(Reply::template(
        template,
        json!({"page_index": page_index(&args.str_or("page", "1"))}),
    ))
}

async fn manage_comments(_: AppState, args: Args) -> HandlerResult {
    manage_page("manage_comments.html", &args)
}

async fn manage_blogs(_: AppState, args: Args) -> HandlerResult {
    manage_page("manage_blogs.html", &args)
}

async fn manage_users(_: AppState, args: Args) -> HandlerResult {
    manage_page("manage_users.html", &args)
}

async fn manage_create_blog(_: AppState, _: Args) -> HandlerResult {
    Ok(Reply::template(
        "manage_blog_edit.html",
        json!({"id": "", "action": "/api/blogs"}),
    ))
}

async fn manage_edit_blog(_: AppState, args: Args) -> HandlerResult {
    let id = args.str_or("id", "");
    Ok(Reply::template(
        "manage_blog_edit.html",
        json!({"action": format!("/api/blogs/{}", id), "id": id}),
    ))
}

async fn authenticate(state: AppState, args: Args) -> HandlerResult {
    let email = email_of(&args);
    let passwd = args.str_or("passwd", "");
    if email.is_empty() {
        return Err(ApiError::value("email", "Invalid email."));
    }
    if passwd.is_empty() {
        return Err(ApiError::value("passwd", "Invalid password."));
    }

    let option = FindOption::new().filter("email=?", vec![email.to_value()]);
    let user = match User::find_all(&state.pool, option).await?.into_iter().next() {
        Some(user) => user,
        None => return Err(ApiError::value("email", "Email not exist.")),
    };
    if user.passwd != auth::hash_password(user.id(), &passwd) {
        return Err(ApiError::value("passwd", "Invalid password."));
    }

    let session = &state.config.session;
    let cookie = auth::user2cookie(&user, session.max_age, &session.secret);
    Ok(Reply::json(to_json(&user.masked())?).set_cookie(&session.cookie_name, &cookie, session.max_age))
}

async fn api_register_user(state: AppState, args: Args) -> HandlerResult {
    let name = not_blank(&args, "name", "Invalid name.")?;
    let email = email_of(&args);
    let passwd = args.str_or("passwd", "");

    if !compiled(&RE_EMAIL)?.is_match(&email) {
        return Err(ApiError::value("email", "Invalid email."));
    }
    if !compiled(&RE_SHA1)?.is_match(&passwd) {
        return Err(ApiError::value("passwd", "Invalid password."));
    }

    let option = FindOption::new().filter("email=?", vec![email.to_value()]);
    if !User::find_all(&state.pool, option).await?.is_empty() {
        return Err(ApiError::Custom {
            error: "register:failed".into(),
            data: "email".into(),
            message: "Email is already in use.".into(),
        });
    }

    let uid = next_id();
    let mut user = User {
        passwd: auth::hash_password(&uid, &passwd),
        image: auth::gravatar(&email),
        id: Some(uid),
        email,
        name,
        ..Default::default()
    };
    user.save(&state.pool).await?;

    let session = &state.config.session;
    let cookie = auth::user2cookie(&user, session.max_age, &session.secret);
    Ok(Reply::json(to_json(&user.masked())?).set_cookie(&session.cookie_name, &cookie, session.max_age))
}

async fn api_get_users(state: AppState, args: Args) -> HandlerResult {
    let (page, users) = page_of::<User>(&state.pool, &args.str_or("page", "1"), "created_at desc").await?;
    let users = users.iter().map(User::masked).collect::<Vec<_>>();

    Ok(Reply::json(json!({"page": page, "users": users})))
}

async fn api_comments(state: AppState, args: Args) -> HandlerResult {
    let (page, comments) = page_of::<Comment>(&state.pool, &args.str_or("page", "1"), "created_at desc").await?;

    Ok(Reply::json(json!({"page": page, "comments": comments})))
}

async fn api_create_comment(state: AppState, args: Args) -> HandlerResult {
    let user = current_user(&args).ok_or_else(|| ApiError::permission("Please signin first."))?;
    let content = not_blank(&args, "content", "content cannot be empty.")?;

    let blog_id = args.str_or("id", "");
    if Blog::find(&state.pool, blog_id.as_str()).await?.is_none() {
        return Err(ApiError::not_found("Blog", "Blog not found."));
    }

    let mut comment = Comment {
        blog_id,
        user_id: user.id().into(),
        user_name: user.name.clone(),
        user_image: user.image.clone(),
        content,
        ..Default::default()
    };
    comment.save(&state.pool).await?;

    Ok(Reply::json(to_json(&comment)?))
}

async fn api_delete_comment(state: AppState, args: Args) -> HandlerResult {
    check_admin(&args)?;

    let id = args.str_or("id", "");
    let comment = Comment::find(&state.pool, id.as_str())
        .await?
        .ok_or_else(|| ApiError::not_found("Comment", "Comment not found."))?;
    comment.remove(&state.pool).await?;

    Ok(Reply::json(json!({"id": id})))
}

async fn api_blogs(state: AppState, args: Args) -> HandlerResult {
    let (page, blogs) = page_of::<Blog>(&state.pool, &args.str_or("page", "1"), "created_at").await?;

    Ok(Reply::json(json!({"page": page, "blogs": blogs})))
}

async fn api_get_blog(state: AppState, args: Args) -> HandlerResult {
    let id = args.str_or("id", "");
    let blog = Blog::find(&state.pool, id.as_str())
        .await?
        .ok_or_else(|| ApiError::not_found("Blog", "Blog not found."))?;

    Ok(Reply::json(to_json(&blog)?))
}

async fn api_create_blog(state: AppState, args: Args) -> HandlerResult {
    let user = check_admin(&args)?;
    let name = not_blank(&args, "name", "name cannot be empty.")?;
    let summary = not_blank(&args, "summary", "summary cannot be empty.")?;
    let content = not_blank(&args, "content", "content cannot be empty.")?;

    let mut blog = Blog {
        user_id: user.id().into(),
        user_name: user.name.clone(),
        user_image: user.image.clone(),
        name,
        summary,
        content,
        ..Default::default()
    };
    blog.save(&state.pool).await?;

    Ok(Reply::json(to_json(&blog)?))
}

async fn api_update_blog(state: AppState, args: Args) -> HandlerResult {
    check_admin(&args)?;
    let name = not_blank(&args, "name", "name cannot be empty.")?;
    let summary = not_blank(&args, "summary", "summary cannot be empty.")?;
    let content = not_blank(&args, "content", "content cannot be empty.")?;

    let id = args.str_or("id", "");
    let mut blog = Blog::find(&state.pool, id.as_str())
        .await?
        .ok_or_else(|| ApiError::not_found("Blog", "Blog not found."))?;
    blog.name = name;
    blog.summary = summary;
    blog.content = content;
    blog.update(&state.pool).await?;

    Ok(Reply::json(to_json(&blog)?))
}

async fn api_delete_blog(state: AppState, args: Args) -> HandlerResult {
    check_admin(&args)?;

    let id = args.str_or("id", "");
    let blog = Blog::find(&state.pool, id.as_str())
        .await?
        .ok_or_else(|| ApiError::not_found("Blog", "Blog not found."))?;
    blog.remove(&state.pool).await?;

    Ok(Reply::json(json!({"id": id})))
}
