use axum::{
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "web"]
struct WebAssets;

/// Serve embedded pages and assets
pub async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if path.starts_with("api/") {
        let body = serde_json::json!({
            "error": {
                "message": format!("no route for /{}", path),
                "type": "not_found",
            }
        });
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    }

    let path = if path.is_empty() { "index.html" } else { path };

    if let Some(content) = <WebAssets as Embed>::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.into_owned(),
        )
            .into_response();
    }

    // Unknown pages land on the home page
    if let Some(content) = <WebAssets as Embed>::get("index.html") {
        return Html(String::from_utf8_lossy(&content.data).to_string()).into_response();
    }

    Html(FALLBACK_HTML.to_string()).into_response()
}

const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Cataract Screening</title>
</head>
<body style="font-family: sans-serif; max-width: 40rem; margin: 3rem auto;">
    <h1>Cataract Screening</h1>
    <p>The web pages were not bundled with this build. The JSON API is available:</p>
    <ul>
        <li><code>GET /api/model</code> model status</li>
        <li><code>POST /api/predict</code> run a prediction</li>
        <li><code>GET /api/guide</code> input guide</li>
        <li><code>GET /api/dataset/preview</code> dataset preview</li>
        <li><code>GET /api/training</code> training history</li>
    </ul>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_serves_home_page() {
        let response = serve_static(Uri::from_static("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let response = serve_static(Uri::from_static("/api/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_assets_have_mime_types() {
        let response = serve_static(Uri::from_static("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.contains("javascript"));
    }
}
