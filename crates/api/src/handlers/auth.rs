//! Handlers for the `/auth` resource (signup, login, refresh, logout, session).

use atrium_core::error::CoreError;
use atrium_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use atrium_core::types::DbId;
use atrium_db::models::profile::CreateProfile;
use atrium_db::models::user::CreateUser;
use atrium_db::repositories::{ProfileRepo, SessionRepo, UserRepo};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Consecutive bad passwords tolerated before the account locks.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// How long a lockout lasts, in minutes.
const LOCK_DURATION_MINS: i64 = 15;

/// Minimum password length enforced at sign-up.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Error message returned when an admin sign-up key fails verification.
const INVALID_ADMIN_KEY: &str = "INVALID ROOT KEY: Cryptographic verification failed.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    /// Secret phrase granting the `admin` role. Omitted for client accounts.
    pub admin_key: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by signup, login, and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`] and [`SessionResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub role: String,
    pub full_name: Option<String>,
}

/// Response body for `GET /auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserInfo,
    pub job_title: Option<String>,
    /// Whether the profile has completed onboarding (a full name exists).
    pub onboarded: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an account and sign it in. Providing `admin_key` requests the
/// `admin` role; the key is verified against the configured Argon2id digest
/// before any row is written, and a failed verification rejects the whole
/// sign-up. The key itself is never logged or persisted.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = input.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email address is required".into(),
        )));
    }

    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    // The admin gate runs before any database write so a failed verification
    // leaves no trace of the attempt.
    let role = match input.admin_key.as_deref() {
        Some(key) => {
            let verified = verify_password(key, &state.config.admin_signup_key_hash)
                .map_err(|e| AppError::InternalError(format!("Key verification error: {e}")))?;
            if !verified {
                return Err(AppError::Core(CoreError::Forbidden(INVALID_ADMIN_KEY.into())));
            }
            ROLE_ADMIN
        }
        None => ROLE_CLIENT,
    };

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: email.clone(),
            password_hash,
        },
    )
    .await?;

    // The profile carries the role, and the role never changes after this.
    let full_name = input
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let profile = ProfileRepo::create(
        &state.pool,
        &CreateProfile {
            user_id: user.id,
            full_name,
            role: role.to_string(),
        },
    )
    .await?;

    let response =
        create_auth_response(&state, user.id, &user.email, role, profile.full_name).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = input.email.trim().to_lowercase();

    // An unknown email and a bad password produce the same message, so the
    // endpoint cannot be used to probe which addresses have accounts.
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        // The row's counter predates this failure, hence the +1.
        if user.failed_login_count + 1 >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    // A correct password clears the counter and any expired lock.
    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let profile = ProfileRepo::find_by_user_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Account has no profile".into()))?;

    let response =
        create_auth_response(&state, user.id, &user.email, &profile.role, profile.full_name)
            .await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Sessions are stored by digest; hash the presented token to look it up.
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // Rotation: the presented token is spent whether or not the rest of the
    // exchange succeeds.
    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let profile = ProfileRepo::find_by_user_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Account has no profile".into()))?;

    let response =
        create_auth_response(&state, user.id, &user.email, &profile.role, profile.full_name)
            .await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke every session the caller holds; responds 204.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
///
/// Return the authenticated account with its profile state. The portal calls
/// this on startup to restore a session without re-entering credentials.
pub async fn session(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<SessionResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let profile = ProfileRepo::find_by_user_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Account has no profile".into()))?;

    let onboarded = profile.full_name.is_some();

    Ok(Json(SessionResponse {
        user: UserInfo {
            id: user.id,
            email: user.email,
            role: profile.role,
            full_name: profile.full_name,
        },
        job_title: profile.job_title,
        onboarded,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(
    state: &AppState,
    user_id: DbId,
    email: &str,
    role: &str,
    full_name: Option<String>,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user_id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let session_input = atrium_db::models::session::CreateSession {
        user_id,
        refresh_token_hash: refresh_hash,
        expires_at,
    };
    SessionRepo::create(&state.pool, &session_input).await?;

    let expires_in = state.config.jwt.access_token_expiry_mins * 60;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in,
        user: UserInfo {
            id: user_id,
            email: email.to_string(),
            role: role.to_string(),
            full_name,
        },
    })
}
