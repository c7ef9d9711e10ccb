//! Login and registration handlers.

use axum::{extract::State, http::StatusCode, response::Html, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    datastore,
    error::{get_db_conn, ApiError, ApiResult},
    models::User,
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    // No email-format validation here: the seeded admin account uses a
    // bare "admin" identifier, as the original demo does.
    #[schema(example = "admin")]
    pub email: String,
    #[schema(example = "admin")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "securepassword123", min_length = 8)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = true)]
    pub active: bool,
    pub confirmed_at: Option<chrono::NaiveDateTime>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            active: user.active,
            confirmed_at: user.confirmed_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Default)]
pub struct ErrorResponse {
    #[schema(example = "Invalid credentials")]
    pub error: String,
    #[schema(example = "INVALID_CREDENTIALS")]
    pub code: Option<String>,
}

/// Minimal login page; the redirect target for gated admin views.
#[utoipa::path(
    get,
    path = "/login",
    tag = "Authentication",
    responses(
        (status = 200, description = "Login page", content_type = "text/html")
    )
)]
pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<!doctype html>\n\
         <html data-theme=\"{theme}\">\n\
         <head><title>Sign in</title></head>\n\
         <body>\n\
         <h1>Sign in</h1>\n\
         <form method=\"post\" action=\"/login\">\n\
         <input name=\"email\" type=\"text\" placeholder=\"Email\">\n\
         <input name=\"password\" type=\"password\" placeholder=\"Password\">\n\
         <button type=\"submit\">Sign in</button>\n\
         </form>\n\
         </body>\n\
         </html>\n",
        theme = state.ui_theme
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials or inactive account", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let user = datastore::find_user_by_email(&mut conn, &payload.email)
        .map_err(|_| ApiError::db_error())?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials", "INVALID_CREDENTIALS"))?;

    let valid = state
        .passwords
        .verify(&payload.password, &user.password)
        .map_err(|e| {
            error!(error = %e, "Password verification failed");
            ApiError::internal("Failed to verify password", "PASSWORD_VERIFY_ERROR")
        })?;

    if !valid {
        warn!(email = %user.email, "Failed login attempt");
        return Err(ApiError::unauthorized(
            "Invalid credentials",
            "INVALID_CREDENTIALS",
        ));
    }

    if !user.active {
        return Err(ApiError::unauthorized(
            "Account is disabled",
            "ACCOUNT_DISABLED",
        ));
    }

    let access_token = state
        .tokens
        .generate_access_token(user.id, &user.email)
        .map_err(|e| {
            error!(error = %e, "Token generation failed");
            ApiError::internal("Token generation failed", "TOKEN_GENERATION_ERROR")
        })?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        user: user.into(),
        access_token,
    }))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Self-registration is disabled", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    if !state.registration_enabled {
        return Err(ApiError::forbidden(
            "Self-registration is disabled",
            "REGISTRATION_DISABLED",
        ));
    }

    if let Err(e) = payload.validate() {
        return Err(ApiError::bad_request(
            format!("Validation error: {}", e),
            "VALIDATION_ERROR",
        ));
    }

    let password_hash = state.passwords.hash(&payload.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ApiError::internal("Failed to process password", "PASSWORD_HASH_ERROR")
    })?;

    let mut conn = get_db_conn(&state.db_pool)?;

    let user = datastore::create_user(&mut conn, &payload.email, &password_hash, true).map_err(
        |e| {
            warn!(error = %e, email = %payload.email, "Failed to register user");
            ApiError::conflict("User with this email already exists", "USER_EXISTS")
        },
    )?;

    let access_token = state
        .tokens
        .generate_access_token(user.id, &user.email)
        .map_err(|e| {
            error!(error = %e, "Token generation failed");
            ApiError::internal("Token generation failed", "TOKEN_GENERATION_ERROR")
        })?;

    info!(user_id = %user.id, email = %user.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            access_token,
        }),
    ))
}
