//! API Middleware
//!
//! Bearer authentication and request logging.

use std::net::IpAddr;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::OperationContext;
use crate::error::AppError;

use super::AppState;

const CORRELATION_HEADER: &str = "x-correlation-id";
const REQUEST_ID_HEADER: &str = "x-request-id";

// =========================================================================
// Bearer Authentication Middleware
// =========================================================================

/// Extract the token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Verify the bearer token and attach the caller to the request context
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AppError::Unauthorized("Could not validate credentials".to_string())
    })?;

    // Role comes from the stored admin, not the token
    let admin = state
        .store
        .find_admin(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    let mut context = request
        .extensions()
        .get::<OperationContext>()
        .cloned()
        .unwrap_or_default()
        .with_admin(admin.id, admin.role);
    context.ensure_correlation_id();

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

/// `X-Correlation-Id`, else the request id, else a fresh one
fn correlation_id(headers: &HeaderMap) -> Uuid {
    [CORRELATION_HEADER, REQUEST_ID_HEADER]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| Uuid::parse_str(value).ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// First hop of `X-Forwarded-For`
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
///
/// Also seeds the request's [`OperationContext`] with its correlation id.
pub async fn logging_middleware(mut request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    // Mask sensitive headers
    let headers = mask_headers_for_logging(request.headers());

    let correlation_id = correlation_id(request.headers());
    let mut context = OperationContext::new().with_correlation_id(correlation_id);
    if let Some(ip) = forwarded_ip(request.headers()) {
        context = context.with_client_ip(ip);
    }
    request.extensions_mut().insert(context);

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        correlation_id = %correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        correlation_id = %correlation_id,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        headers.insert("x-correlation-id", "corr-123".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);

        let auth = masked.iter().find(|(k, _)| k == "authorization");
        let content_type = masked.iter().find(|(k, _)| k == "content-type");
        let correlation = masked.iter().find(|(k, _)| k == "x-correlation-id");

        assert_eq!(auth.unwrap().1, "[REDACTED]");
        assert_eq!(content_type.unwrap().1, "application/json");
        assert_eq!(correlation.unwrap().1, "corr-123");
    }

    #[test]
    fn test_sensitive_headers_list() {
        assert!(SENSITIVE_HEADERS.contains(&"authorization"));
        assert!(SENSITIVE_HEADERS.contains(&"cookie"));
        assert!(!SENSITIVE_HEADERS.contains(&"content-type"));
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert("authorization", "bearer   xyz".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("xyz"));

        headers.insert("authorization", "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_correlation_id_sources() {
        let correlation = Uuid::new_v4();
        let request_id = Uuid::new_v4();

        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", request_id.to_string().parse().unwrap());
        assert_eq!(correlation_id(&headers), request_id);

        headers.insert("x-correlation-id", correlation.to_string().parse().unwrap());
        assert_eq!(correlation_id(&headers), correlation);

        headers.insert("x-correlation-id", "not-a-uuid".parse().unwrap());
        assert_eq!(correlation_id(&headers), request_id);
    }

    #[test]
    fn test_forwarded_ip_takes_first_hop() {
        let mut headers = HeaderMap::new();
        assert_eq!(forwarded_ip(&headers), None);

        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(forwarded_ip(&headers), Some("203.0.113.7".parse().unwrap()));

        headers.insert("x-forwarded-for", "unknown".parse().unwrap());
        assert_eq!(forwarded_ip(&headers), None);
    }

    #[tokio::test]
    async fn test_logging_middleware_seeds_context() {
        use axum::{body::to_bytes, extract::Extension, routing::get, Router};
        use tower::util::ServiceExt;

        let app = Router::new()
            .route(
                "/",
                get(|Extension(context): Extension<OperationContext>| async move {
                    format!(
                        "{}|{}",
                        context.client_ip.map(|ip| ip.to_string()).unwrap_or_default(),
                        context.correlation_id.map(|id| id.to_string()).unwrap_or_default()
                    )
                }),
            )
            .layer(axum::middleware::from_fn(logging_middleware));

        let correlation = Uuid::new_v4();
        let request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.7")
            .header("x-correlation-id", correlation.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            String::from_utf8(body.to_vec()).unwrap(),
            format!("203.0.113.7|{}", correlation)
        );
    }
}
