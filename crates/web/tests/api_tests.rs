//! Router-level tests driving the web service in-process

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use phdtrack_common::{config::AppConfig, db::DbPool};
use phdtrack_web::{create_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let db = DbPool::in_memory().await.unwrap();
    create_router(AppState::new(Arc::new(AppConfig::default()), db))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_form(fields: &[(&str, &str)]) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).unwrap();

    Request::builder()
        .method(Method::POST)
        .uri("/professors")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn post_json(uri: &str, value: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

fn professor_form<'a>(programs: &'a str, areas: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", "Ada Lovelace"),
        ("title", "Associate Professor"),
        ("university_name", "MIT"),
        ("university_country", "USA"),
        ("university_state", "MA"),
        ("university_city", "Cambridge"),
        ("university_ranking", "2"),
        ("department_name", "EECS"),
        ("email", "ada@mit.edu"),
        ("hiring_status", "hiring"),
        ("contact_through", "email"),
        ("program_names", programs),
        ("research_area_names", areas),
    ]
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "up");
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let app = app().await;
    let (status, _) = send(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_edit_and_read_professor() {
    let app = app().await;

    let response = tokio_test::assert_ok!(
        app.clone()
            .oneshot(post_form(&professor_form("PhD CS, Robotics", "AI")))
            .await
    );
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/professors");

    let (status, list) = send(&app, get("/professors")).await;
    assert_eq!(status, StatusCode::OK);
    let id = list[0]["id"].as_i64().unwrap();
    assert_eq!(list[0]["programs"], json!(["PhD CS", "Robotics"]));
    assert_eq!(list[0]["hiring_status_label"], "Hiring");

    // Edit: drop Robotics, add a research area
    let id_text = id.to_string();
    let mut edit = professor_form("PhD CS", "AI, Vision");
    edit.push(("professor_id", &id_text));
    let (status, _) = send(&app, post_form(&edit)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (status, record) = send(&app, get(&format!("/professors/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["university_name"], "MIT");
    assert_eq!(record["university_ranking"], 2);
    assert_eq!(record["department_name"], "EECS");
    assert_eq!(record["personal_website"], "");
    assert_eq!(record["hiring_status"], "hiring");
    assert_eq!(record["programs"], json!(["PhD CS"]));
    assert_eq!(record["research_areas"], json!(["AI", "Vision"]));

    // Robotics program stays with a zero count
    let (_, programs) = send(&app, get("/programs")).await;
    let rows = programs.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["program"], "PhD CS");
    assert_eq!(rows[0]["professor_count"], 1);
    assert_eq!(rows[1]["program"], "Robotics");
    assert_eq!(rows[1]["professor_count"], 0);
}

#[tokio::test]
async fn test_reserved_characters_survive_form_encoding() {
    let app = app().await;
    send(&app, post_form(&professor_form("PhD", "Vision & Graphics, C++/PL"))).await;

    let (_, list) = send(&app, get("/professors")).await;
    assert_eq!(list[0]["research_areas"], json!(["C++/PL", "Vision & Graphics"]));
}

#[tokio::test]
async fn test_form_validation_errors() {
    let app = app().await;

    let mut bad_ranking = professor_form("", "");
    bad_ranking.retain(|(k, _)| *k != "university_ranking");
    bad_ranking.push(("university_ranking", "first"));
    let (status, body) = send(&app, post_form(&bad_ranking)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "university_ranking");

    let mut bad_status = professor_form("", "");
    bad_status.retain(|(k, _)| *k != "hiring_status");
    bad_status.push(("hiring_status", "maybe"));
    let (status, _) = send(&app, post_form(&bad_status)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was written
    let (_, dashboard) = send(&app, get("/dashboard")).await;
    assert_eq!(dashboard["counts"]["universities"], 0);
}

#[tokio::test]
async fn test_missing_parent_id_is_unprocessable() {
    let app = app().await;

    let mut form = professor_form("", "");
    form.retain(|(k, _)| *k != "department_name");
    form.push(("department_id", "99"));

    let (status, body) = send(&app, post_form(&form)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "REFERENTIAL_INTEGRITY");
}

#[tokio::test]
async fn test_delete_professor() {
    let app = app().await;
    send(&app, post_form(&professor_form("PhD", "AI"))).await;

    let (_, list) = send(&app, get("/professors")).await;
    let id = list[0]["id"].as_i64().unwrap();

    let (status, _) = send(&app, delete(&format!("/professors/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, delete(&format!("/professors/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get(&format!("/professors/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_and_dashboard() {
    let app = app().await;
    send(&app, post_form(&professor_form("PhD", "AI, ML, ml"))).await;

    let (status, catalog) = send(&app, get("/catalog")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog["universities"][0]["name"], "MIT");
    assert_eq!(catalog["research_areas"].as_array().unwrap().len(), 3);
    assert_eq!(catalog["contact_methods"][1]["label"], "Through Application");

    let (status, dashboard) = send(&app, get("/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["counts"]["professors"], 1);
    assert_eq!(dashboard["hiring_status"][1]["count"], 1);
}

#[tokio::test]
async fn test_applicants() {
    let app = app().await;

    let (status, created) = send(
        &app,
        post_json(
            "/applicants",
            json!({"name": "Sam", "email": "sam@example.com", "gpa": 3.8, "gre": 325}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, get(&format!("/applicants/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["gre"], 325);

    let (status, _) = send(
        &app,
        post_json("/applicants", json!({"name": "Low", "email": "low@example.com", "gre": 200})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, delete(&format!("/applicants/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/applicants/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
