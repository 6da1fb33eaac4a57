use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{AuthConfig, ServerState, router};

const PASSWORD: &str = "correct horse";

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    for user in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
            vec![
                user.into(),
                format!("{user}@example.com").into(),
                user.into(),
                hash.clone().into(),
                Utc::now().into(),
            ],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    router(ServerState::new(
        engine,
        db,
        AuthConfig::new("access-secret", "refresh-secret"),
    ))
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(res: Response<Body>) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn cookie_header(res: &Response<Body>) -> String {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

async fn login(app: &Router, email: &str, password: &str) -> Response<Body> {
    app.clone()
        .oneshot(request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ))
        .await
        .unwrap()
}

async fn session(app: &Router, email: &str) -> String {
    let res = login(app, email, PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    cookie_header(&res)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: &str,
    body: Option<Value>,
) -> Response<Body> {
    app.clone()
        .oneshot(request(method, uri, Some(cookie), body))
        .await
        .unwrap()
}

#[tokio::test]
async fn protected_routes_require_token_cookie() {
    let app = app().await;
    for uri in ["/accounts", "/transactions", "/budget", "/auth/me"] {
        let res = app
            .clone()
            .oneshot(request(Method::GET, uri, None, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let res = send(&app, Method::GET, "/accounts", "token=garbage", None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sets_cookies_and_refresh_issues_access_token() {
    let app = app().await;
    let res = login(&app, "Alice@Example.com", PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookies = cookie_header(&res);
    assert!(cookies.contains("token="));
    assert!(cookies.contains("refreshToken="));
    let body = json_body(res).await;
    assert_eq!(body["user"]["id"], "alice");

    let me = json_body(send(&app, Method::GET, "/auth/me", &cookies, None).await).await;
    assert_eq!(me["email"], "alice@example.com");

    let refresh_only = cookies
        .split("; ")
        .find(|c| c.starts_with("refreshToken="))
        .unwrap()
        .to_string();
    let res = send(&app, Method::POST, "/auth/refresh", &refresh_only, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(cookie_header(&res).starts_with("token="));
}

#[tokio::test]
async fn lockout_after_five_bad_passwords() {
    let app = app().await;
    for _ in 0..5 {
        let res = login(&app, "alice@example.com", "wrong").await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    let res = login(&app, "alice@example.com", PASSWORD).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    let res = login(&app, "bob@example.com", PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn account_and_transaction_flow() {
    let app = app().await;
    let cookies = session(&app, "alice@example.com").await;

    let res = send(
        &app,
        Method::POST,
        "/accounts",
        &cookies,
        Some(json!({ "name": "Checking", "balance": "100.00" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let account = json_body(res).await;
    let account_id = account["id"].as_str().unwrap().to_string();
    assert_eq!(account["balance_minor"], 10_000);
    assert_eq!(account["is_included_in_budget"], true);

    let res = send(
        &app,
        Method::POST,
        "/transactions",
        &cookies,
        Some(json!({
            "account_id": account_id,
            "type": "EXPENSE",
            "amount": "30.00",
            "date": "2024-03-15T10:00:00+01:00",
            "category": "Food",
            "description": "Coffee beans",
        })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let tx = json_body(res).await;
    assert_eq!(tx["amount_minor"], 3_000);
    assert_eq!(tx["type"], "EXPENSE");

    let detail = json_body(
        send(
            &app,
            Method::GET,
            &format!("/accounts/{account_id}"),
            &cookies,
            None,
        )
        .await,
    )
    .await;
    assert_eq!(detail["account"]["balance_minor"], 7_000);
    assert_eq!(detail["transactions"].as_array().unwrap().len(), 1);

    let list = json_body(
        send(
            &app,
            Method::GET,
            "/transactions?type=EXPENSE&recurring=non-recurring&search=COFFEE&limit=5",
            &cookies,
            None,
        )
        .await,
    )
    .await;
    assert_eq!(list["pagination"]["total"], 1);
    assert_eq!(list["pagination"]["limit"], 5);

    let res = send(
        &app,
        Method::POST,
        "/transactions",
        &cookies,
        Some(json!({
            "account_id": account_id,
            "type": "EXPENSE",
            "amount": "0",
            "date": "2024-03-15T10:00:00Z",
            "category": "Food",
        })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn foreign_resources_are_not_found_and_skipped_by_bulk_delete() {
    let app = app().await;
    let alice = session(&app, "alice@example.com").await;
    let bob = session(&app, "bob@example.com").await;

    let account = json_body(
        send(
            &app,
            Method::POST,
            "/accounts",
            &alice,
            Some(json!({ "name": "Checking", "balance": "50" })),
        )
        .await,
    )
    .await;
    let account_id = account["id"].as_str().unwrap().to_string();
    let tx = json_body(
        send(
            &app,
            Method::POST,
            "/transactions",
            &alice,
            Some(json!({
                "account_id": account_id,
                "type": "INCOME",
                "amount": "5",
                "date": "2024-03-15T10:00:00Z",
                "category": "Gift",
            })),
        )
        .await,
    )
    .await;
    let tx_id = tx["id"].as_str().unwrap().to_string();

    let res = send(&app, Method::GET, &format!("/accounts/{account_id}"), &bob, None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = send(
        &app,
        Method::PATCH,
        &format!("/transactions/{tx_id}"),
        &bob,
        Some(json!({ "amount": "1" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = send(
        &app,
        Method::POST,
        "/transactions/bulkDelete",
        &bob,
        Some(json!({ "transaction_ids": [tx_id] })),
    )
    .await;
    assert_eq!(json_body(res).await["deleted"], 0);

    let res = send(
        &app,
        Method::POST,
        "/transactions/bulkDelete",
        &alice,
        Some(json!({ "transaction_ids": [tx_id] })),
    )
    .await;
    assert_eq!(json_body(res).await["deleted"], 1);

    let account = json_body(
        send(&app, Method::GET, &format!("/accounts/{account_id}"), &alice, None).await,
    )
    .await;
    assert_eq!(account["account"]["balance_minor"], 5_000);
}

#[tokio::test]
async fn budget_round_trip() {
    let app = app().await;
    let cookies = session(&app, "alice@example.com").await;

    let empty = json_body(send(&app, Method::GET, "/budget", &cookies, None).await).await;
    assert!(empty["budget"].is_null());
    assert_eq!(empty["current_expenses_minor"], 0);

    let res = send(
        &app,
        Method::PUT,
        "/budget",
        &cookies,
        Some(json!({ "amount": "500" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["amount_minor"], 50_000);

    let progress = json_body(send(&app, Method::GET, "/budget", &cookies, None).await).await;
    assert_eq!(progress["budget"]["amount_minor"], 50_000);
    assert_eq!(progress["percentage_used"], 0.0);
}

#[tokio::test]
async fn profile_name_update_is_trimmed_and_required() {
    let app = app().await;
    let cookies = session(&app, "alice@example.com").await;

    let res = send(
        &app,
        Method::PATCH,
        "/auth/me",
        &cookies,
        Some(json!({ "name": "  Alice Liddell  " })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["name"], "Alice Liddell");

    let res = send(&app, Method::PATCH, "/auth/me", &cookies, Some(json!({ "name": "   " }))).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let me = json_body(send(&app, Method::GET, "/auth/me", &cookies, None).await).await;
    assert_eq!(me["name"], "Alice Liddell");

    let res = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            "/auth/me",
            None,
            Some(json!({ "name": "Mallory" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn contact_form_is_public_and_validated() {
    let app = app().await;

    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/contact",
            None,
            Some(json!({
                "name": " Ann ",
                "email": "ann@example.com",
                "message": "Hello from the contact page",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = json_body(res).await;
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["message"], "Hello from the contact page");

    let res = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/contact",
            None,
            Some(json!({ "name": "Ann", "email": "nope", "message": "hi" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn oversized_amounts_are_rejected() {
    let app = app().await;
    let cookies = session(&app, "alice@example.com").await;

    let res = send(
        &app,
        Method::POST,
        "/accounts",
        &cookies,
        Some(json!({ "name": "Checking", "balance": "0" })),
    )
    .await;
    let account_id = json_body(res).await["id"].as_str().unwrap().to_string();

    let res = send(
        &app,
        Method::POST,
        "/transactions",
        &cookies,
        Some(json!({
            "account_id": account_id,
            "type": "INCOME",
            "amount": "50000000000000000.00",
            "date": "2024-03-15T10:00:00Z",
            "category": "Salary",
        })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = send(&app, Method::GET, "/accounts", &cookies, None).await;
    assert_eq!(res.status(), StatusCode::OK);
}
