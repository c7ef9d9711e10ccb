//! Admin CRUD over users and roles.
//!
//! Every route here sits behind `middleware::gate::admin_gate`, which
//! stores the authenticated user in request extensions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    datastore,
    error::{get_db_conn, ApiError, ApiResult},
    handlers::auth::UserResponse,
    models::{Role, User},
    pagination::{PaginationMeta, PaginationParams},
    schema::{roles, users},
    AppState,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "securepassword123", min_length = 8)]
    pub password: String,
    #[schema(example = true)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "renamed@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(example = false)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    #[schema(example = "superuser")]
    pub name: String,
    #[schema(example = "Full access to the admin interface")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRoleRequest {
    #[schema(example = "superuser")]
    pub role_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsersListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    pub role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RolesListResponse {
    pub data: Vec<Role>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserRolesResponse {
    pub data: Vec<Role>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
struct UserChanges {
    email: Option<String>,
    password: Option<String>,
    active: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated list of users", body = UsersListResponse),
        (status = 303, description = "Not authenticated or inactive; redirected to login"),
        (status = 500, description = "Internal server error", body = crate::handlers::auth::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<UsersListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let total_count: i64 = users::table
        .count()
        .get_result(&mut conn)
        .map_err(|_| ApiError::db_error())?;

    let (limit, offset) = pagination.limit_offset();

    let user_list: Vec<User> = users::table
        .order(users::id.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
        .map_err(|_| ApiError::db_error())?;

    Ok(Json(UsersListResponse {
        data: user_list.into_iter().map(Into::into).collect(),
        pagination: pagination.into_metadata(total_count),
    }))
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "Admin",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 303, description = "Not authenticated or inactive; redirected to login"),
        (status = 400, description = "Validation error", body = crate::handlers::auth::ErrorResponse),
        (status = 409, description = "Email already taken", body = crate::handlers::auth::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if let Err(e) = payload.validate() {
        return Err(ApiError::bad_request(
            format!("Validation error: {}", e),
            "VALIDATION_ERROR",
        ));
    }

    let password_hash = state
        .passwords
        .hash(&payload.password)
        .map_err(|_| ApiError::internal("Failed to process password", "PASSWORD_HASH_ERROR"))?;

    let mut conn = get_db_conn(&state.db_pool)?;

    let user = datastore::create_user(
        &mut conn,
        &payload.email,
        &password_hash,
        payload.active.unwrap_or(true),
    )
    .map_err(|_| ApiError::conflict("User with this email already exists", "USER_EXISTS"))?;

    info!(user_id = %user.id, email = %user.email, actor = %actor.email, "Created user");

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/admin/users/{user_id}",
    tag = "Admin",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 303, description = "Not authenticated or inactive; redirected to login"),
        (status = 404, description = "User not found", body = crate::handlers::auth::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<UserResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let user = datastore::find_user(&mut conn, user_id)
        .map_err(|_| ApiError::db_error())?
        .ok_or_else(|| ApiError::not_found("User not found", "USER_NOT_FOUND"))?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/admin/users/{user_id}",
    tag = "Admin",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 303, description = "Not authenticated or inactive; redirected to login"),
        (status = 400, description = "No fields to update", body = crate::handlers::auth::ErrorResponse),
        (status = 404, description = "User not found", body = crate::handlers::auth::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    if payload.email.is_none() && payload.password.is_none() && payload.active.is_none() {
        return Err(ApiError::bad_request(
            "At least one field (email, password or active) must be provided",
            "NO_FIELDS_TO_UPDATE",
        ));
    }

    let password = match payload.password {
        Some(password) => Some(state.passwords.hash(&password).map_err(|_| {
            ApiError::internal("Failed to process password", "PASSWORD_HASH_ERROR")
        })?),
        None => None,
    };

    let changes = UserChanges {
        email: payload.email.map(|e| e.to_lowercase()),
        password,
        active: payload.active,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let user: User = diesel::update(users::table.find(user_id))
        .set(&changes)
        .get_result(&mut conn)
        .map_err(|_| ApiError::not_found("User not found", "USER_NOT_FOUND"))?;

    info!(user_id = %user.id, "Updated user");

    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{user_id}",
    tag = "Admin",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted; association rows cascade"),
        (status = 303, description = "Not authenticated or inactive; redirected to login"),
        (status = 404, description = "User not found", body = crate::handlers::auth::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(user_id): Path<i32>,
) -> ApiResult<StatusCode> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let deleted_count = diesel::delete(users::table.find(user_id))
        .execute(&mut conn)
        .map_err(|_| ApiError::internal("Failed to delete user", "DELETE_FAILED"))?;

    if deleted_count == 0 {
        return Err(ApiError::not_found("User not found", "USER_NOT_FOUND"));
    }

    info!(user_id = %user_id, actor = %actor.email, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/roles",
    tag = "Admin",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated list of roles", body = RolesListResponse),
        (status = 303, description = "Not authenticated or inactive; redirected to login")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<RolesListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let total_count: i64 = roles::table
        .count()
        .get_result(&mut conn)
        .map_err(|_| ApiError::db_error())?;

    let (limit, offset) = pagination.limit_offset();

    let role_list: Vec<Role> = roles::table
        .order(roles::name.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
        .map_err(|_| ApiError::db_error())?;

    Ok(Json(RolesListResponse {
        data: role_list,
        pagination: pagination.into_metadata(total_count),
    }))
}

#[utoipa::path(
    post,
    path = "/admin/roles",
    tag = "Admin",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleResponse),
        (status = 303, description = "Not authenticated or inactive; redirected to login"),
        (status = 409, description = "Role name already taken", body = crate::handlers::auth::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let role = datastore::create_role(&mut conn, &payload.name, payload.description)
        .map_err(|_| ApiError::conflict("Role with this name already exists", "ROLE_EXISTS"))?;

    info!(role_id = %role.id, role_name = %role.name, "Created role");

    Ok((StatusCode::CREATED, Json(RoleResponse { role })))
}

#[utoipa::path(
    get,
    path = "/admin/users/{user_id}/roles",
    tag = "Admin",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Roles attached to the user", body = UserRolesResponse),
        (status = 303, description = "Not authenticated or inactive; redirected to login"),
        (status = 404, description = "User not found", body = crate::handlers::auth::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn user_roles(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<UserRolesResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    datastore::find_user(&mut conn, user_id)
        .map_err(|_| ApiError::db_error())?
        .ok_or_else(|| ApiError::not_found("User not found", "USER_NOT_FOUND"))?;

    let data = datastore::roles_for_user(&mut conn, user_id).map_err(|_| ApiError::db_error())?;

    Ok(Json(UserRolesResponse { data }))
}

#[utoipa::path(
    post,
    path = "/admin/users/{user_id}/roles",
    tag = "Admin",
    params(("user_id" = i32, Path, description = "User ID")),
    request_body = AssignRoleRequest,
    responses(
        (status = 201, description = "Role attached", body = RoleResponse),
        (status = 303, description = "Not authenticated or inactive; redirected to login"),
        (status = 404, description = "User or role not found", body = crate::handlers::auth::ErrorResponse),
        (status = 409, description = "Role already attached", body = crate::handlers::auth::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_role(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let user = datastore::find_user(&mut conn, user_id)
        .map_err(|_| ApiError::db_error())?
        .ok_or_else(|| ApiError::not_found("User not found", "USER_NOT_FOUND"))?;

    let role = datastore::find_role_by_name(&mut conn, &payload.role_name)
        .map_err(|_| ApiError::db_error())?
        .ok_or_else(|| {
            ApiError::not_found(
                format!("Role '{}' not found", payload.role_name),
                "ROLE_NOT_FOUND",
            )
        })?;

    let inserted = datastore::add_role_to_user(&mut conn, user.id, role.id)
        .map_err(|_| ApiError::db_error())?;

    if inserted == 0 {
        return Err(ApiError::conflict(
            "Role is already attached to this user",
            "ROLE_ALREADY_ATTACHED",
        ));
    }

    info!(user_id = %user.id, role_name = %role.name, "Attached role to user");

    Ok((StatusCode::CREATED, Json(RoleResponse { role })))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{user_id}/roles/{role_id}",
    tag = "Admin",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("role_id" = i32, Path, description = "Role ID")
    ),
    responses(
        (status = 204, description = "Role detached"),
        (status = 303, description = "Not authenticated or inactive; redirected to login"),
        (status = 404, description = "Association not found", body = crate::handlers::auth::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn unassign_role(
    State(state): State<AppState>,
    Path((user_id, role_id)): Path<(i32, i32)>,
) -> ApiResult<StatusCode> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let removed = datastore::remove_role_from_user(&mut conn, user_id, role_id)
        .map_err(|_| ApiError::db_error())?;

    if removed == 0 {
        return Err(ApiError::not_found(
            "Role is not attached to this user",
            "ROLE_NOT_ATTACHED",
        ));
    }

    info!(user_id = %user_id, role_id = %role_id, "Detached role from user");

    Ok(StatusCode::NO_CONTENT)
}
