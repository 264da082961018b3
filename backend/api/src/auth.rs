//! Signup/login and bearer-token authentication.
//!
//! Credentials are exchanged for an HS256 token carrying the actor's
//! identity, role, and display name. Everything downstream of the extractor
//! trusts the resolved [`Actor`] completely — the coordinator performs no
//! credential checks of its own.

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use good2give_core::{Actor, Role};

use crate::api::AppState;
use crate::db::{self, UserRow};
use crate::errors::{ApiError, Result};

/// Claims carried in every bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Display name, stamped onto listings and reservations.
    pub name: String,
    /// `donor` or `recipient`.
    pub role: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

fn issue_token(user: &UserRow, secret: &str, ttl_hours: i64) -> Result<String> {
    let claims = Claims {
        sub: user.id.clone(),
        name: user.name.clone(),
        role: user.role.clone(),
        exp: (Utc::now() + Duration::hours(ttl_hours)).timestamp(),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: ProfileResponse,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl TryFrom<&UserRow> for ProfileResponse {
    type Error = ApiError;

    fn try_from(user: &UserRow) -> Result<Self> {
        let role = Role::parse(&user.role).ok_or(ApiError::InvalidToken)?;
        Ok(ProfileResponse {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role,
            organization: user.organization.clone(),
            address: user.address.clone(),
            phone: user.phone.clone(),
        })
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `POST /auth/signup`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    if db::get_user_by_email(&state.pool, &req.email).await?.is_some() {
        return Err(ApiError::EmailTaken);
    }

    let user = UserRow {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email,
        password_hash: bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)?,
        role: req.role.as_str().to_string(),
        organization: req.organization,
        address: req.address,
        phone: req.phone,
        created_at: Utc::now(),
    };
    db::insert_user(&state.pool, &user).await?;

    let token = issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_hours)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: ProfileResponse::try_from(&user)?,
        }),
    ))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = db::get_user_by_email(&state.pool, &req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !bcrypt::verify(&req.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_hours)?;
    Ok(Json(AuthResponse {
        token,
        user: ProfileResponse::try_from(&user)?,
    }))
}

// ─────────────────────────────────────────────────────────
// Extractor
// ─────────────────────────────────────────────────────────

/// The authenticated actor, resolved from the `Authorization: Bearer`
/// header. Routes that take this extractor reject unauthenticated requests
/// with 401.
pub struct AuthUser(pub Actor);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::MissingToken)?;
        let token = header.strip_prefix("Bearer ").ok_or(ApiError::MissingToken)?;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ApiError::InvalidToken)?
        .claims;

        let role = Role::parse(&claims.role).ok_or(ApiError::InvalidToken)?;
        Ok(AuthUser(Actor {
            id: claims.sub,
            role,
            name: claims.name,
        }))
    }
}
