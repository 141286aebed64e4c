use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use leadscope_client::Engine;
use leadscope_core::config::ScraperConfig;
use leadscope_core::pacing::PacingConfig;
use leadscope_server::routes;
use leadscope_server::state::AppState;

/// Config with every delay removed.
pub fn fast_config() -> ScraperConfig {
    let mut config = ScraperConfig::default();
    config.inspector.settle_delay = Duration::ZERO;
    config.retry.backoff_base = Duration::ZERO;
    config.pacing = PacingConfig::none();
    config
}

pub fn setup_test_app() -> Router {
    setup_test_app_with(Engine::Http, fast_config())
}

/// An app whose Chromium launches always fail.
pub fn setup_test_app_without_browser() -> Router {
    let mut config = fast_config();
    config.launch.executable = Some(PathBuf::from("/nonexistent/leadscope-test-chrome"));
    setup_test_app_with(Engine::Chrome, config)
}

pub fn setup_test_app_with(engine: Engine, config: ScraperConfig) -> Router {
    routes::router(Arc::new(AppState { config, engine }))
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Serve `pages` (path, html) on a loopback port until the test ends.
/// Unknown paths get a 404. Returns the base URL with a trailing slash.
pub async fn serve_pages(pages: &'static [(&'static str, &'static str)]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while read < buf.len() && !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => read += n,
                    }
                }
                let head = String::from_utf8_lossy(&buf[..read]);
                let path = head.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = pages
                    .iter()
                    .find(|(p, _)| *p == path)
                    .map(|(_, html)| ("200 OK", *html))
                    .unwrap_or(("404 Not Found", "<h1>Not found</h1>"));
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.ok();
                socket.shutdown().await.ok();
            });
        }
    });
    format!("http://{addr}/")
}
