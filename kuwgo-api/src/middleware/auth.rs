use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use kuwgo_shared::models::ANONYMOUS_USER;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

pub const ADMIN_ROLE: &str = "ADMIN";

// ============================================================================
// JWT Claims
// ============================================================================

/// Tokens are issued elsewhere; this service only verifies them
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CallerClaims {
    pub sub: String,
    #[serde(default)]
    pub role: String,
    pub exp: usize,
}

fn bearer_claims(headers: &HeaderMap, secret: &str) -> Result<Option<CallerClaims>, AppError> {
    let Some(auth_header) = headers.get("Authorization") else {
        return Ok(None);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::AuthenticationError("Malformed Authorization header".to_string()))?;

    let token_data = decode::<CallerClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map_err(|e| AppError::AuthenticationError(format!("Invalid token: {}", e)))?;

    Ok(Some(token_data.claims))
}

// ============================================================================
// Caller identity
// ============================================================================

/// Who is making the request; requests without a token act as the anonymous user
#[derive(Debug, Clone)]
pub struct Caller {
    pub claims: Option<CallerClaims>,
}

impl Caller {
    pub fn user_id(&self) -> &str {
        self.claims.as_ref().map(|c| c.sub.as_str()).unwrap_or(ANONYMOUS_USER)
    }

    /// The authenticated subject, None for anonymous callers
    pub fn subject(&self) -> Option<String> {
        self.claims.as_ref().map(|c| c.sub.clone())
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(&parts.headers, &state.auth.secret)?;
        Ok(Caller { claims })
    }
}

// ============================================================================
// Admin Authentication Middleware
// ============================================================================

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = bearer_claims(req.headers(), &state.auth.secret)?
        .ok_or_else(|| AppError::AuthenticationError("Missing bearer token".to_string()))?;

    if claims.role != ADMIN_ROLE {
        return Err(AppError::AuthorizationError("Admin role required".to_string()));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(sub: &str, role: &str, secret: &str) -> String {
        let claims = CallerClaims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        let claims = bearer_claims(&HeaderMap::new(), "secret").unwrap();
        let caller = Caller { claims };
        assert_eq!(caller.user_id(), ANONYMOUS_USER);
        assert!(caller.subject().is_none());
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token("user-7", "CUSTOMER", "secret"));
        headers.insert("Authorization", HeaderValue::from_str(&value).unwrap());

        let claims = bearer_claims(&headers, "secret").unwrap().unwrap();
        assert_eq!(claims.sub, "user-7");
        assert_eq!(claims.role, "CUSTOMER");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", token("user-7", "CUSTOMER", "other"));
        headers.insert("Authorization", HeaderValue::from_str(&value).unwrap());

        assert!(matches!(bearer_claims(&headers, "secret"), Err(AppError::AuthenticationError(_))));
    }
}
