use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use crate::auth::{decode_token, TokenKind};
use crate::error::ApiError;

/// Authenticated caller identity extracted from the access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub jti: String,
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    // Validate and decode JWT; refresh tokens are not accepted here
    let claims = decode_token(&token, TokenKind::Access).map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        ApiError::unauthorized(e.to_string())
    })?;

    let auth_user = AuthUser {
        user_id: claims.user_id()?,
        jti: claims.jti,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer_token(&headers), Err("Empty JWT token".to_string()));

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def");
    }
}
