//! Root redirect, OpenAPI document and the private docs page

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    Json,
};
use serde_json::{json, Value};

use super::state::AppState;
use crate::config::AppConfig;

pub const OPENAPI_PATH: &str = "/openapi.json";

pub async fn root_redirect(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.config.app.root_redirect)
}

pub async fn openapi_json(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.openapi.as_ref().clone())
}

pub async fn docs_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html>
<head>
  <title>{title} - Docs</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    SwaggerUIBundle({{ url: "{openapi}", dom_id: "#swagger-ui" }});
  </script>
</body>
</html>"##,
        title = state.config.app.title,
        openapi = OPENAPI_PATH,
    ))
}

/// OpenAPI document with the API key header declared as the security scheme
pub fn build_openapi(config: &AppConfig) -> Value {
    let header = &config.security.api_key_header;

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": config.app.title,
            "description": config.app.description,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "servers": [
            {"url": "https://api.YOURDOMAIN.com/", "description": "Production server"},
            {"url": format!("http://127.0.0.1:{}", config.server.port), "description": "Development server"},
        ],
        "paths": {
            "/": {"get": {"summary": "Redirect to the public site", "security": []}},
            "/health-check": {"get": {"summary": "Health check", "security": []}},
            "/test": {"get": {"summary": "Sample protected endpoint"}},
            "/test/{item_id}": {
                "get": {
                    "summary": "Sample protected endpoint with a path parameter",
                    "parameters": [
                        {"name": "item_id", "in": "path", "required": true, "schema": {"type": "integer"}}
                    ],
                },
            },
        },
        "components": {
            "securitySchemes": {
                header: {"type": "apiKey", "in": "header", "name": header},
            },
        },
        "security": [{header: []}],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_declares_api_key_scheme() {
        let mut config = AppConfig::default();
        config.security.api_key_header = "x-private-key".to_string();

        let doc = build_openapi(&config);

        assert_eq!(
            doc["components"]["securitySchemes"]["x-private-key"],
            json!({"type": "apiKey", "in": "header", "name": "x-private-key"})
        );
        assert_eq!(doc["security"], json!([{"x-private-key": []}]));
        assert_eq!(doc["info"]["title"], "API System");
    }

    #[tokio::test]
    async fn test_docs_page_points_at_openapi() {
        let state = AppState::new(std::sync::Arc::new(AppConfig::default()));

        let Html(page) = docs_page(State(state)).await;

        assert!(page.contains(r#"url: "/openapi.json""#));
        assert!(page.contains(r##"dom_id: "#swagger-ui""##));
        assert!(page.contains("<title>API System - Docs</title>"));
    }
}
