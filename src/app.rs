use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{auth, weather, web};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(weather::router())
        .merge(web::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn send(req: Request<Body>) -> axum::response::Response {
        build_app(AppState::fake()).oneshot(req).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let res = send(get("/health")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn api_requires_authentication() {
        for uri in ["/weather", "/weather/1", "/weather/1/sun", "/me", "/export"] {
            let res = send(get(uri)).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
        let body = to_bytes(send(get("/weather")).await.into_body(), 1024)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["error"], "Not authenticated");
    }

    #[tokio::test]
    async fn garbage_token_is_anonymous_not_a_crash() {
        let req = Request::builder()
            .uri("/weather")
            .header(header::AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(req).await.status(), StatusCode::UNAUTHORIZED);

        let req = Request::builder()
            .uri("/login")
            .header(header::COOKIE, "access_token=garbage")
            .body(Body::empty())
            .unwrap();
        let res = send(req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn anonymous_browser_flows() {
        let res = send(get("/")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), 64 * 1024).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("Log in"));

        for uri in ["/history", "/weather-ui", "/history/3/edit"] {
            let res = send(get(uri)).await;
            assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(res.headers()[header::LOCATION], "/login");
        }
    }

    #[tokio::test]
    async fn anonymous_delete_redirects_to_login() {
        let req = Request::builder()
            .method("POST")
            .uri("/history/3/delete")
            .body(Body::empty())
            .unwrap();
        let res = send(req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn logout_clears_session_cookie() {
        let req = Request::builder()
            .uri("/logout")
            .header(header::COOKIE, "access_token=whatever")
            .body(Body::empty())
            .unwrap();
        let res = send(req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/");
        let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("access_token="));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn register_rejects_malformed_email() {
        let req = Request::builder()
            .method("POST")
            .uri("/users/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"nope","password":"pw"}"#))
            .unwrap();
        let res = send(req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
