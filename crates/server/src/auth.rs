//! Cookie based JWT authentication.
//!
//! Login issues two HS256 tokens signed with separate secrets: a short lived
//! access token in the `token` cookie and a refresh token in the
//! `refreshToken` cookie. Both carry the user id as `sub`.

use axum::{Extension, Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use engine::EngineError;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use api_types::auth::{AuthResponse, LoginRequest, ProfileUpdate, UserView};

use crate::{ServerError, server::ServerState, user};

pub const ACCESS_COOKIE: &str = "token";
pub const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("too many failed login attempts, locked until {0}")]
    Locked(DateTime<Utc>),
    #[error("token creation error")]
    TokenCreation,
    #[error("internal server error")]
    Internal,
}

/// Token signing settings.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: TimeDelta,
    pub refresh_ttl: TimeDelta,
    /// Marks the cookies `Secure`; off for plain-http development.
    pub secure_cookies: bool,
}

impl AuthConfig {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: TimeDelta::days(7),
            refresh_ttl: TimeDelta::days(30),
            secure_cookies: false,
        }
    }
}

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

pub(crate) fn encode_token(
    user_id: &str,
    secret: &str,
    ttl: TimeDelta,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: usize::try_from((now + ttl).timestamp()).map_err(|_| AuthError::TokenCreation)?,
        iat: usize::try_from(now.timestamp()).map_err(|_| AuthError::TokenCreation)?,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| {
        tracing::error!("failed to sign token: {err}");
        AuthError::TokenCreation
    })
}

pub(crate) fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::Unauthorized)
}

fn token_cookie(
    name: &'static str,
    value: String,
    ttl: TimeDelta,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

fn user_view(user: &user::Model) -> UserView {
    UserView {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
    }
}

async fn find_user_by_email(
    state: &ServerState,
    email: &str,
) -> Result<Option<user::Model>, AuthError> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to load user: {err}");
            AuthError::Internal
        })
}

pub(crate) async fn find_user_by_id(
    state: &ServerState,
    user_id: &str,
) -> Result<Option<user::Model>, AuthError> {
    user::Entity::find_by_id(user_id.to_string())
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to load user: {err}");
            AuthError::Internal
        })
}

/// Runs the bcrypt comparison on the blocking pool; it is too slow for an
/// async worker.
async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| {
            tracing::error!("password verification task failed: {err}");
            AuthError::Internal
        })?
        .map_err(|err| {
            tracing::error!("failed to verify password: {err}");
            AuthError::Internal
        })
}

/// Handler for sign-in requests.
///
/// Locked emails are refused before the password is checked. Every failed
/// attempt counts toward the lockout, unknown emails included.
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ServerError> {
    let key = payload.email.trim().to_lowercase();
    let now = Utc::now();
    if let Some(until) = state.login_attempts.locked_until(&key, now) {
        return Err(AuthError::Locked(until).into());
    }

    let user = find_user_by_email(&state, &key).await?;
    let verified = match &user {
        Some(user) => {
            verify_password(payload.password.clone(), user.password_hash.clone()).await?
        }
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        state.login_attempts.record_failure(&key, now);
        return Err(AuthError::Unauthorized.into());
    };
    state.login_attempts.reset(&key);

    let cfg = &state.auth;
    let access = encode_token(&user.id, &cfg.access_secret, cfg.access_ttl, now)?;
    let refresh = encode_token(&user.id, &cfg.refresh_secret, cfg.refresh_ttl, now)?;
    tracing::info!(user_id = %user.id, "user logged in");

    let jar = jar
        .add(token_cookie(
            ACCESS_COOKIE,
            access,
            cfg.access_ttl,
            cfg.secure_cookies,
        ))
        .add(token_cookie(
            REFRESH_COOKIE,
            refresh,
            cfg.refresh_ttl,
            cfg.secure_cookies,
        ));

    Ok((
        jar,
        Json(AuthResponse {
            user: user_view(&user),
            expires_in: cfg.access_ttl.num_seconds(),
        }),
    ))
}

/// Issues a new access token from the refresh cookie.
pub async fn refresh(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResponse>), ServerError> {
    let cfg = &state.auth;
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AuthError::Unauthorized)?;
    let claims = decode_token(&token, &cfg.refresh_secret)?;
    let user = find_user_by_id(&state, &claims.sub)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    let access = encode_token(&user.id, &cfg.access_secret, cfg.access_ttl, Utc::now())?;
    let jar = jar.add(token_cookie(
        ACCESS_COOKIE,
        access,
        cfg.access_ttl,
        cfg.secure_cookies,
    ));

    Ok((
        jar,
        Json(AuthResponse {
            user: user_view(&user),
            expires_in: cfg.access_ttl.num_seconds(),
        }),
    ))
}

pub async fn me(Extension(user): Extension<user::Model>) -> Json<UserView> {
    Json(user_view(&user))
}

/// Renames the signed-in user. The name is trimmed and must not be empty.
pub async fn update_me(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(EngineError::InvalidInput("name must not be empty".to_string()).into());
    }

    let active = user::ActiveModel {
        id: ActiveValue::Unchanged(user.id),
        name: ActiveValue::Set(Some(name.to_string())),
        ..Default::default()
    };
    let updated = active.update(&state.db).await.map_err(EngineError::from)?;
    tracing::info!(user_id = %updated.id, "profile updated");

    Ok(Json(user_view(&updated)))
}
