//! HTTP gateway integration tests: routing, response shape and feeds.
//! Each test serves its own temporary notes directory.

use axum::Router;
use axum::body::Body;
use axum::body::to_bytes;
use axum::http::{Request, StatusCode, header};
use dato_notes::SiteConfig;
use dato_site::router;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

fn seed_notes(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("alpha.md"),
        "---\ntitle: Project Alpha\ndate: 2024-06-01\ntags: [rust, graph]\ntype: essay\n---\nSee [[Project Beta|the other one]] & more.\n",
    )
    .unwrap();
    fs::write(
        dir.join("beta.md"),
        "---\ntitle: Project Beta\ndate: 2024-05-01\ntags: [rust]\n---\nShort note.\n",
    )
    .unwrap();
    fs::write(dir.join("broken.md"), "no front matter here\n").unwrap();
}

fn test_app(tmp: &TempDir) -> Router {
    let notes_dir = tmp.path().join("notes");
    seed_notes(&notes_dir);
    router(SiteConfig {
        notes_dir,
        site_url: "https://dato.example/".to_string(),
        ..SiteConfig::default()
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn health_reports_notes_and_issues() {
    let tmp = TempDir::new().unwrap();
    let (status, body) = get(test_app(&tmp), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["status"], "healthy");
    assert_eq!(payload["notes"], 2);
    assert_eq!(payload["issues"], 1);
}

#[tokio::test]
async fn list_notes_in_display_order_with_filters() {
    let tmp = TempDir::new().unwrap();
    let app = test_app(&tmp);

    let (status, body) = get(app.clone(), "/api/notes").await;
    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).unwrap();
    let slugs: Vec<&str> = payload
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["project-alpha", "project-beta"]);

    let (_, body) = get(app.clone(), "/api/notes?q=SHORT").await;
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload.as_array().unwrap().len(), 1);
    assert_eq!(payload[0]["slug"], "project-beta");

    let (_, body) = get(app, "/api/notes?tag=graph").await;
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload.as_array().unwrap().len(), 1);
    assert_eq!(payload[0]["slug"], "project-alpha");
}

#[tokio::test]
async fn long_form_route_is_not_captured_by_slug_route() {
    let tmp = TempDir::new().unwrap();
    let (status, body) = get(test_app(&tmp), "/api/notes/long-form").await;
    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload.as_array().unwrap().len(), 1);
    assert_eq!(payload[0]["slug"], "project-alpha");
    assert_eq!(payload[0]["hasPage"], true);
}

#[tokio::test]
async fn note_by_slug_includes_backlinks_or_404() {
    let tmp = TempDir::new().unwrap();
    let app = test_app(&tmp);

    let (status, body) = get(app.clone(), "/api/notes/project-beta").await;
    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["title"], "Project Beta");
    assert_eq!(payload["backlinks"][0]["slug"], "project-alpha");

    let (status, body) = get(app, "/api/notes/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["error"], "note 'missing' not found");
}

#[tokio::test]
async fn note_html_renders_wiki_links_for_long_form_only() {
    let tmp = TempDir::new().unwrap();
    let app = test_app(&tmp);

    let (status, html) = get(app.clone(), "/api/notes/project-alpha/html").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"<a href="/notes/project-beta">the other one</a>"#));
    assert!(html.contains("&amp; more"));

    let (status, _) = get(app, "/api/notes/project-beta/html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tags_and_slug_map() {
    let tmp = TempDir::new().unwrap();
    let app = test_app(&tmp);

    let (_, body) = get(app.clone(), "/api/tags").await;
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload[0]["tag"], "rust");
    assert_eq!(payload[0]["count"], 2);
    assert_eq!(payload[1]["tag"], "graph");

    let (_, body) = get(app, "/api/slug-map").await;
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload["project alpha"], "project-alpha");
    assert_eq!(payload["project-beta"], "project-beta");
}

#[tokio::test]
async fn feeds_use_site_url_and_xml_content_types() {
    let tmp = TempDir::new().unwrap();
    let app = test_app(&tmp);

    let response = app
        .clone()
        .oneshot(Request::get("/rss.xml").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/rss+xml; charset=utf-8"
    );
    let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let xml = String::from_utf8(body.to_vec()).unwrap();
    assert!(xml.contains("<link>https://dato.example/notes/project-alpha</link>"));
    assert!(!xml.contains("project-beta</link>"));

    let (status, xml) = get(app, "/sitemap.xml").await;
    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("<loc>https://dato.example/notes/project-beta</loc>"));
}

#[tokio::test]
async fn gateway_returns_404_for_unknown_route() {
    let tmp = TempDir::new().unwrap();
    let (status, _) = get(test_app(&tmp), "/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
