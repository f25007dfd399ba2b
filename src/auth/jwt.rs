use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::users::model::{Role, User};

/// JWT payload: the user identifier plus issue/expiry timestamps, nothing
/// else. Roles are looked up fresh on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// Signing and verification keys derived from configuration.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            ttl: Duration::from_secs((jwt.ttl_hours as u64) * 3600),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::ExpiredToken,
                _ => ApiError::InvalidToken,
            }
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Pull the raw token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingToken)?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(ApiError::InvalidToken)
}

/// Authentication stage: validates the bearer token and loads the account it
/// names. A token whose account no longer exists is rejected, so deleted
/// users lose access immediately despite tokens being stateless.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!("invalid or expired token");
            e
        })?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or(ApiError::InvalidToken)?;
        Ok(AuthUser(user))
    }
}

/// Role stage: 403 unless the authenticated role is in the allow-list.
pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role.role()) {
        Ok(())
    } else {
        warn!(user_id = %user.id, role = %user.role.role(), "role not allowed");
        Err(ApiError::Forbidden)
    }
}

/// Both stages composed for administrator-only routes.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        require_role(&user, &[Role::Admin])?;
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::model::RoleDetails;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    fn make_user(role: RoleDetails) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            username: "test".into(),
            email: "test@example.com".into(),
            password_hash: "hash".into(),
            phone: "1234567890".into(),
            role,
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        // 24h expiry window
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn verify_rejects_expired_token_with_expiry_error() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now - 25 * 3600) as usize,
            exp: (now - 3600) as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::ExpiredToken));
    }

    #[tokio::test]
    async fn verify_rejects_garbage_and_tampered_tokens() {
        let keys = make_keys();
        assert!(matches!(
            keys.verify("not-a-jwt").unwrap_err(),
            ApiError::InvalidToken
        ));

        let token = keys.sign(Uuid::new_v4()).expect("sign");
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(matches!(
            keys.verify(&tampered).unwrap_err(),
            ApiError::InvalidToken
        ));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers).unwrap_err(),
            ApiError::MissingToken
        ));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Basic abc".parse().unwrap(),
        );
        assert!(matches!(
            bearer_token(&headers).unwrap_err(),
            ApiError::InvalidToken
        ));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer tok123".parse().unwrap(),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "tok123");
    }

    #[test]
    fn require_role_gates_by_allow_list() {
        let admin = make_user(RoleDetails::Admin);
        let student = make_user(RoleDetails::Student {
            roll_number: "R1".into(),
        });
        assert!(require_role(&admin, &[Role::Admin]).is_ok());
        assert!(matches!(
            require_role(&student, &[Role::Admin]).unwrap_err(),
            ApiError::Forbidden
        ));
        assert!(require_role(&student, &[Role::Teacher, Role::Student]).is_ok());
    }
}
