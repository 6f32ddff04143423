use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

use meld_gate::invite::{FetchStage, HttpInviteIssuer, InviteIssuer, fetch_invite};

/// Serve `router` on an ephemeral local port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn issuer(base: String) -> HttpInviteIssuer {
    HttpInviteIssuer::new(base, Some(Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn test_generate_link_success() {
    let base = serve(Router::new().route(
        "/generate-link",
        get(|| async { r#"{"inviteLink": "https://t.me/+AbCdEf"}"# }),
    ))
    .await;

    let link = issuer(base).generate_link().await.unwrap();
    assert_eq!(link.url, "https://t.me/+AbCdEf");
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let base = serve(Router::new().route(
        "/generate-link",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "bot offline") }),
    ))
    .await;

    let err = fetch_invite(&issuer(base), FetchStage::Prefetch).await.unwrap_err();
    assert_eq!(err.stage, FetchStage::Prefetch);
    assert!(err.reason.contains("500"), "{}", err.reason);
    assert!(err.reason.contains("bot offline"), "{}", err.reason);
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let base = serve(Router::new().route("/generate-link", get(|| async { r#"{"link": "x"}"# }))).await;
    let err = issuer(base).generate_link().await.unwrap_err();
    assert!(err.starts_with("parsing invite response"), "{err}");
}

#[tokio::test]
async fn test_empty_link_is_an_error() {
    let base = serve(Router::new().route("/generate-link", get(|| async { r#"{"inviteLink": "  "}"# }))).await;
    assert!(issuer(base).generate_link().await.is_err());
}

#[tokio::test]
async fn test_unreachable_service() {
    let err = fetch_invite(&issuer("http://127.0.0.1:1".into()), FetchStage::Reveal)
        .await
        .unwrap_err();
    assert_eq!(err.stage, FetchStage::Reveal);
    assert!(err.reason.starts_with("invite request failed"));
}
