use crate::core::{AppError, AppState};
use crate::dtos::TokenQuery;
use axum::extract::{Query, State};
use axum::{body::Body, extract::Request, http, http::HeaderMap, http::Response, http::Uri, middleware::Next};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Header alternativo ad Authorization per passare il token utente
pub const TOKEN_HEADER: &str = "x-token-usuario";

/// Estrae il token di sessione dalla richiesta.
///
/// Ordine di ricerca: query `?tokenusuario=`, header `X-TOKEN-USUARIO`,
/// header `Authorization` (con o senza prefisso `Bearer `).
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Ok(Query(query)) = Query::<TokenQuery>::try_from_uri(uri) {
        if let Some(token) = query.tokenusuario.filter(|t| !t.is_empty()) {
            return Some(token);
        }
    }

    let header = headers
        .get(TOKEN_HEADER)
        .or_else(|| headers.get(http::header::AUTHORIZATION))?
        .to_str()
        .ok()?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let token = extract_token(req.headers(), req.uri()).ok_or_else(|| {
        warn!("Missing user token");
        AppError::bad_request("Missing tokenusuario")
    })?;

    // Fetch the user details from the database
    let mut conn = state.pool.acquire().await?;
    let current_user = match state.user.find_by_token(&mut conn, &token).await? {
        Some(user) => {
            info!("User authenticated: {}", user.user_id);
            user
        }
        None => {
            warn!("No user found for the given token");
            return Err(AppError::not_found("User not found"));
        }
    };
    drop(conn);

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_from_query_first() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("from-header"));
        let uri: Uri = "/api/home?tokenusuario=from-query".parse().unwrap();

        assert_eq!(extract_token(&headers, &uri).as_deref(), Some("from-query"));
    }

    #[test]
    fn test_extract_token_from_custom_header() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("abc"));
        headers.insert(http::header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        let uri: Uri = "/api/home".parse().unwrap();

        assert_eq!(extract_token(&headers, &uri).as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_token_from_bearer_or_raw_authorization() {
        let uri: Uri = "/api/home".parse().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers, &uri).as_deref(), Some("xyz"));

        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, HeaderValue::from_static("raw-token"));
        assert_eq!(extract_token(&headers, &uri).as_deref(), Some("raw-token"));
    }

    #[test]
    fn test_extract_token_missing() {
        let uri: Uri = "/api/home?tokenusuario=".parse().unwrap();
        assert!(extract_token(&HeaderMap::new(), &uri).is_none());
    }
}
