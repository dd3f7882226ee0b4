use awesome_blog::{
    auth,
    models::{Blog, Comment, User},
};
use awesome_orm::Model;
use awesome_test::{blog_app, json_of, run_async_test, set_cookie_of, with_cookie};
use awesome_web::{ReplyKind, Request, StatusCode};
use serde_json::json;

// sha1("abc")
const PASSWD: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

fn register_req(email: &str, name: &str) -> Request {
    Request::post(
        "/api/users",
        "application/json",
        json!({"email": email, "name": name, "passwd": PASSWD}).to_string(),
    )
}

#[tokio::test]
async fn test_register_and_authenticate() {
    run_async_test!((pool) => {
        let app = blog_app(pool.clone());

        let reply = app.handle(register_req("Bob@Example.com", "bob")).await;
        let (name, cookie) = set_cookie_of(&reply).unwrap();
        let user = json_of(reply);
        assert_eq!(name, "awesession");
        assert_eq!(user["email"], "bob@example.com");
        assert_eq!(user["passwd"], "******");
        assert!(user["image"].as_str().unwrap().starts_with("http://www.gravatar.com/avatar/"));

        let stored = User::find(&pool, user["id"].as_str().unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.passwd, auth::hash_password(stored.id(), PASSWD));

        // The issued cookie resolves back to the same user
        let secret = awesome_blog::Config::from_sources(None).unwrap().session.secret;
        let current = auth::cookie2user(&pool, &cookie, &secret).await.unwrap();
        assert_eq!(current.id(), stored.id());
        assert_eq!(current.passwd, "******");

        let reply = app
            .handle(Request::post(
                "/api/authenticate",
                "application/x-www-form-urlencoded",
                format!("email=bob%40example.com&passwd={}", PASSWD),
            ))
            .await;
        assert!(set_cookie_of(&reply).is_some());
        assert_eq!(json_of(reply)["id"], user["id"]);

        // Signing in with the casing used at registration
        let reply = app
            .handle(Request::post(
                "/api/authenticate",
                "application/json",
                json!({"email": " Bob@Example.com", "passwd": PASSWD}).to_string(),
            ))
            .await;
        assert!(set_cookie_of(&reply).is_some());
        assert_eq!(json_of(reply)["id"], user["id"]);

        let reply = app
            .handle(Request::post(
                "/api/authenticate",
                "application/json",
                json!({"email": "bob@example.com", "passwd": "0".repeat(40)}).to_string(),
            ))
            .await;
        assert_eq!(
            json_of(reply),
            json!({"error": "value:invalid", "data": "passwd", "message": "Invalid password."})
        );

        let reply = app
            .handle(Request::post(
                "/api/authenticate",
                "application/json",
                json!({"email": "nobody@example.com", "passwd": PASSWD}).to_string(),
            ))
            .await;
        assert_eq!(json_of(reply)["data"], "email");
    });
}

#[tokio::test]
async fn test_register_validation() {
    run_async_test!((pool) => {
        let app = blog_app(pool);

        app.handle(register_req("a@b.com", "a")).await;
        let reply = app.handle(register_req("a@b.com", "again")).await;
        assert_eq!(
            json_of(reply),
            json!({"error": "register:failed", "data": "email", "message": "Email is already in use."})
        );

        let reply = app.handle(register_req("not-an-email", "x")).await;
        assert_eq!(json_of(reply)["data"], "email");

        let reply = app.handle(register_req("c@d.com", "  ")).await;
        assert_eq!(json_of(reply)["data"], "name");

        let reply = app
            .handle(Request::post(
                "/api/users",
                "application/json",
                json!({"email": "c@d.com", "name": "c", "passwd": "plain"}).to_string(),
            ))
            .await;
        assert_eq!(json_of(reply)["data"], "passwd");

        let reply = app
            .handle(Request::post("/api/users", "application/json", r#"{"email": "c@d.com"}"#))
            .await;
        assert_eq!(reply.status_code(), StatusCode::BAD_REQUEST);
    });
}

#[tokio::test]
async fn test_cookie_rejections() {
    run_async_test!((pool) => {
        let mut user = User {
            email: "e@f.com".into(),
            passwd: "hash".into(),
            name: "e".into(),
            ..Default::default()
        };
        user.save(&pool).await.unwrap();

        let good = auth::user2cookie(&user, 60, "s");
        assert!(auth::cookie2user(&pool, &good, "s").await.is_some());

        assert!(auth::cookie2user(&pool, &good, "other").await.is_none());
        assert!(auth::cookie2user(&pool, "", "s").await.is_none());
        assert!(auth::cookie2user(&pool, "a-b", "s").await.is_none());
        assert!(auth::cookie2user(&pool, "a-notanumber-c", "s").await.is_none());

        let expired = auth::user2cookie(&user, -10, "s");
        assert!(auth::cookie2user(&pool, &expired, "s").await.is_none());

        user.remove(&pool).await.unwrap();
        assert!(auth::cookie2user(&pool, &good, "s").await.is_none());
    });
}

#[tokio::test]
async fn test_manage_requires_admin() {
    run_async_test!((pool) => {
        let app = blog_app(pool.clone());

        let reply = app.handle(Request::get("/manage/blogs")).await;
        assert_eq!(reply.kind, ReplyKind::Redirect("/signin".into()));

        let reply = app.handle(register_req("admin@b.com", "admin")).await;
        let (name, cookie) = set_cookie_of(&reply).unwrap();
        let id = json_of(reply)["id"].as_str().unwrap().to_string();

        // Signed in but not an admin yet
        let reply = app.handle(with_cookie(Request::get("/manage/blogs"), &name, &cookie)).await;
        assert_eq!(reply.kind, ReplyKind::Redirect("/signin".into()));

        let mut admin = User::find(&pool, id.as_str()).await.unwrap().unwrap();
        admin.admin = true;
        admin.update(&pool).await.unwrap();

        let reply = app.handle(with_cookie(Request::get("/manage/"), &name, &cookie)).await;
        assert_eq!(reply.kind, ReplyKind::Redirect("/manage/comments".into()));

        let reply = app.handle(with_cookie(Request::get("/manage/blogs?page=2"), &name, &cookie)).await;
        match reply.kind {
            ReplyKind::Template { name, context } => {
                assert_eq!(name, "manage_blogs.html");
                assert_eq!(context["page_index"], 2);
                assert_eq!(context["__user__"]["id"], json!(id));
                assert_eq!(context["__user__"]["passwd"], "******");
            }
            other => panic!("unexpected reply {:?}", other),
        }
    });
}

#[tokio::test]
async fn test_blog_lifecycle() {
    run_async_test!((pool) => {
        let app = blog_app(pool.clone());

        let reply = app.handle(register_req("admin@b.com", "admin")).await;
        let (name, cookie) = set_cookie_of(&reply).unwrap();
        let uid = json_of(reply)["id"].as_str().unwrap().to_string();

        let create = || {
            Request::post(
                "/api/blogs",
                "application/json",
                json!({"name": "Hello", "summary": "first", "content": "a <b>\n\nc"}).to_string(),
            )
        };

        let reply = app.handle(with_cookie(create(), &name, &cookie)).await;
        assert_eq!(json_of(reply)["error"], "permission:forbidden");

        let mut admin = User::find(&pool, uid.as_str()).await.unwrap().unwrap();
        admin.admin = true;
        admin.update(&pool).await.unwrap();

        let blog = json_of(app.handle(with_cookie(create(), &name, &cookie)).await);
        let blog_id = blog["id"].as_str().unwrap().to_string();
        assert_eq!(blog["user_id"], json!(uid));
        assert_eq!(blog["user_name"], "admin");

        let fetched = json_of(app.handle(Request::get(&format!("/api/blogs/{}", blog_id))).await);
        assert_eq!(fetched, blog);

        let listed = json_of(app.handle(Request::get("/api/blogs")).await);
        assert_eq!(listed["page"]["item_count"], 1);
        assert_eq!(listed["blogs"][0]["id"], json!(blog_id));

        let update = Request::post(
            &format!("/api/blogs/{}", blog_id),
            "application/json",
            json!({"name": "Hello again", "summary": "s", "content": "c"}).to_string(),
        );
        let updated = json_of(app.handle(with_cookie(update, &name, &cookie)).await);
        assert_eq!(updated["name"], "Hello again");
        assert_eq!(Blog::find(&pool, blog_id.as_str()).await.unwrap().unwrap().name, "Hello again");

        // Comments need a signed in user
        let comment = |body: &str| {
            Request::post(
                &format!("/api/blogs/{}/comments", blog_id),
                "application/json",
                json!({"content": body}).to_string(),
            )
        };
        let reply = app.handle(comment("nice")).await;
        assert_eq!(json_of(reply)["error"], "permission:forbidden");

        let c = json_of(app.handle(with_cookie(comment("nice <post>"), &name, &cookie)).await);
        assert_eq!(c["blog_id"], json!(blog_id));

        // The blog page lists comments oldest first
        let mut earlier = Comment {
            id: None,
            blog_id: blog_id.clone(),
            user_id: c["user_id"].as_str().unwrap().into(),
            user_name: "bob".into(),
            user_image: String::new(),
            content: "first".into(),
            created_at: Some(c["created_at"].as_f64().unwrap() - 60.0),
        };
        earlier.save(&pool).await.unwrap();

        let reply = app.handle(Request::get(&format!("/blog/{}", blog_id))).await;
        match reply.kind {
            ReplyKind::Template { name, context } => {
                assert_eq!(name, "blog.html");
                assert_eq!(context["blog"]["html_content"], "<p>c</p>");
                assert_eq!(context["comments"][0]["html_content"], "<p>first</p>");
                assert_eq!(context["comments"][1]["html_content"], "<p>nice &lt;post&gt;</p>");
                assert_eq!(context["__user__"], serde_json::Value::Null);
            }
            other => panic!("unexpected reply {:?}", other),
        }

        let comments = json_of(app.handle(Request::get("/api/comments")).await);
        assert_eq!(comments["comments"].as_array().unwrap().len(), 2);

        let delete_comment = Request::post(&format!("/api/comments/{}/delete", c["id"].as_str().unwrap()), "", "");
        let reply = app.handle(with_cookie(delete_comment, &name, &cookie)).await;
        assert_eq!(json_of(reply)["id"], c["id"]);

        let delete = Request::post(&format!("/api/blogs/{}/delete", blog_id), "", "");
        let reply = app.handle(with_cookie(delete, &name, &cookie)).await;
        assert_eq!(json_of(reply)["id"], json!(blog_id));

        let reply = app.handle(Request::get(&format!("/api/blogs/{}", blog_id))).await;
        assert_eq!(json_of(reply)["error"], "value:notfound");
        assert_eq!(app.handle(Request::get(&format!("/blog/{}", blog_id))).await.status_code(), StatusCode::NOT_FOUND);
    });
}

#[tokio::test]
async fn test_signout_and_index() {
    run_async_test!((pool) => {
        let app = blog_app(pool);

        let mut req = Request::get("/signout");
        req.headers.insert(http::header::REFERER, http::HeaderValue::from_static("/blog/1"));
        let reply = app.handle(req).await;
        assert_eq!(reply.kind, ReplyKind::Redirect("/blog/1".into()));
        assert_eq!(set_cookie_of(&reply), Some(("awesession".into(), "-deleted-".into())));

        let reply = app.handle(Request::get("/?page=5")).await;
        match reply.kind {
            ReplyKind::Template { name, context } => {
                assert_eq!(name, "blogs.html");
                assert_eq!(context["page"]["page_index"], 1);
                assert_eq!(context["blogs"], json!([]));
            }
            other => panic!("unexpected reply {:?}", other),
        }
    });
}
