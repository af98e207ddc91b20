use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/articles", get(handlers::search_articles))
        .route("/api/articles/analyze", post(handlers::analyze_article))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "🌐 Listening");
    axum::serve(listener, app).await
}

pub mod prelude {
    pub use bw_core::{AnalyzedArticle, Article, Error, Result};
    pub use crate::AppState;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use bw_core::{RawCandidate, SearchQuery, SearchService};
    use bw_inference::models::OfflineModel;
    use bw_inference::{Config, TieBreakMode};
    use bw_pipeline::{Pipeline, RetrievalConfig};
    use bw_storage::MemoryCache;
    use serde_json::Value;
    use tower::ServiceExt;

    struct OneResult;

    #[async_trait]
    impl SearchService for OneResult {
        async fn search(&self, _query: &SearchQuery) -> bw_core::Result<Vec<RawCandidate>> {
            Ok(vec![RawCandidate {
                url: Some("https://apnews.com/article/1".to_string()),
                title: Some("Council passes budget".to_string()),
                text: Some("According to officials, the council passed the budget.".to_string()),
                ..Default::default()
            }])
        }
    }

    async fn app() -> Router {
        let config = Config {
            tie_break: TieBreakMode::Off,
            ..Config::default()
        };
        let pipeline = Pipeline::build(
            Arc::new(OneResult),
            Arc::new(OfflineModel),
            Arc::new(MemoryCache::new(config.article_ttl)),
            &config,
            RetrievalConfig::default(),
            2,
        );
        create_app(AppState {
            pipeline: Arc::new(pipeline),
        })
        .await
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .await
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let response = app()
            .await
            .oneshot(Request::get("/api/articles?q=%20").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_returns_analyzed_articles() {
        let response = app()
            .await
            .oneshot(Request::get("/api/articles?q=budget").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let articles = body.as_array().unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0]["url"], "https://apnews.com/article/1");
        assert_eq!(articles[0]["source"], "apnews.com");
        assert_eq!(articles[0]["bias"]["attribution"], "keyword");
    }

    #[tokio::test]
    async fn test_analyze_rejects_article_without_url() {
        let article = serde_json::json!({
            "url": "",
            "title": "t",
            "content": "c",
            "source": "s",
            "published_at": chrono::Utc::now(),
            "author": null,
            "image": null
        });
        let response = app()
            .await
            .oneshot(
                Request::post("/api/articles/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(article.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid article"));
    }
}
