use awesome_web::{ApiError, Args, Param, Reply, ReplyKind, Request, RouteError, Router, StatusCode};
use awesome_test::json_of;
use serde_json::json;

async fn echo(prefix: String, args: Args) -> Result<Reply, ApiError> {
    Ok(Reply::json(json!({"prefix": prefix, "args": args.values()})))
}

async fn whoami(_: String, args: Args) -> Result<Reply, ApiError> {
    let agent = args
        .request()
        .and_then(|r| r.header("user-agent"))
        .unwrap_or("")
        .to_string();
    Ok(Reply::json(json!({"agent": agent, "page": args.str_or("page", "1")})))
}

fn router() -> Router<String> {
    let mut r = Router::new("v1".to_string());
    r.post("/api/users", &[Param::required("email"), Param::named("name")], echo)
        .unwrap();
    r.get("/api/users/{id}", &[Param::path("id")], echo).unwrap();
    r.get("/api/users/{id}/posts/{post}", &[Param::path("id"), Param::path("post")], echo)
        .unwrap();
    r.get("/whoami", &[Param::named("page"), Param::request()], whoami).unwrap();
    r.post("/api/any", &[Param::catch_all()], echo).unwrap();
    r.get("/redirect", &[], |_, _| async { Ok("redirect:/signin".into()) })
        .unwrap();
    r
}

fn bad_request(message: &str) -> ReplyKind {
    ReplyKind::Status(StatusCode::BAD_REQUEST, message.into())
}

#[tokio::test]
async fn test_required_argument() {
    let r = router();

    let reply = r
        .dispatch(Request::post("/api/users", "application/json", r#"{"email":"a@b.com"}"#))
        .await;
    assert_eq!(json_of(reply), json!({"prefix": "v1", "args": {"email": "a@b.com"}}));

    let reply = r.dispatch(Request::post("/api/users", "application/json", "{}")).await;
    assert_eq!(reply.kind, bad_request("Missing argument: email"));
}

#[tokio::test]
async fn test_body_errors() {
    let r = router();

    let reply = r.dispatch(Request::post("/api/users", "", "email=x")).await;
    assert_eq!(reply.kind, bad_request("Missing Content-Type."));

    let reply = r.dispatch(Request::post("/api/users", "application/json", "[1, 2]")).await;
    assert_eq!(reply.kind, bad_request("JSON body must be object."));

    let reply = r.dispatch(Request::post("/api/users", "text/xml", "<a/>")).await;
    assert_eq!(reply.kind, bad_request("Unsupported Content-Type: text/xml"));
}

#[tokio::test]
async fn test_form_bodies() {
    let r = router();

    let reply = r
        .dispatch(Request::post(
            "/api/users",
            "application/x-www-form-urlencoded; charset=utf-8",
            "email=a%40b.com&name=bob&extra=1",
        ))
        .await;
    assert_eq!(
        json_of(reply),
        json!({"prefix": "v1", "args": {"email": "a@b.com", "name": "bob"}})
    );

    let body = "--XyZ\r\n\
        Content-Disposition: form-data; name=\"email\"\r\n\r\n\
        c@d.com\r\n\
        --XyZ\r\n\
        Content-Disposition: form-data; name=\"avatar\"; filename=\"a.png\"\r\n\
        Content-Type: image/png\r\n\r\n\
        PNG\r\n\
        --XyZ--\r\n";
    let reply = r
        .dispatch(Request::post("/api/any", "multipart/form-data; boundary=XyZ", body))
        .await;
    assert_eq!(json_of(reply), json!({"prefix": "v1", "args": {"email": "c@d.com"}}));
}

#[tokio::test]
async fn test_path_captures() {
    let r = router();

    let reply = r.dispatch(Request::get("/api/users/42/posts/hello%20world")).await;
    assert_eq!(
        json_of(reply),
        json!({"prefix": "v1", "args": {"id": "42", "post": "hello world"}})
    );

    // Captures never span segments and routes are matched exactly
    assert_eq!(r.dispatch(Request::get("/api/users/42/")).await.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(r.dispatch(Request::get("/api/users")).await.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(r.dispatch(Request::post("/api/users/42", "application/json", "{}")).await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_and_query() {
    let r = router();

    let mut req = Request::get("/whoami?page=3&page=4");
    req.headers.insert(http::header::USER_AGENT, http::HeaderValue::from_static("curl"));

    assert_eq!(json_of(r.dispatch(req).await), json!({"agent": "curl", "page": "3"}));
}

#[tokio::test]
async fn test_redirect_string() {
    let reply = router().dispatch(Request::get("/redirect")).await;
    assert_eq!(reply.kind, ReplyKind::Redirect("/signin".into()));
    assert_eq!(reply.status_code(), StatusCode::FOUND);
}

#[test]
fn test_bad_routes() {
    let mut r = Router::new(String::new());

    assert!(matches!(r.get("no-slash", &[], echo), Err(RouteError::Pattern { .. })));
    assert!(matches!(r.get("/a/{x}{y}", &[], echo), Err(RouteError::Pattern { .. })));
    assert!(matches!(
        r.post("/a", &[Param::request(), Param::required("x")], echo),
        Err(RouteError::Params { .. })
    ));
}
