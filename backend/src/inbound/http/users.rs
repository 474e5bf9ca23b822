//! User registry handlers.
//!
//! ```text
//! POST   /users/{email}          {"name":"Ada","photoUrl":"https://..."}
//! PATCH  /users/{email}
//! GET    /users/role/{email}
//! GET    /users
//! PUT    /users/{userId}/role    {"role":"agent"}
//! PUT    /users/{userId}/fraud
//! DELETE /users/{userId}
//! ```

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Role, User, UserPayload, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access_gate::{Authenticated, FORBIDDEN_MESSAGE};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{EMAIL, PROFILE, field_error, parse_email, parse_role, parse_user_id};

/// Optional profile captured on first login.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

/// Body for `GET /users/role/{email}`; `null` when the user is unknown.
#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct RoleResponse {
    pub role: Option<Role>,
}

/// Body for `PUT /users/{userId}/role`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RoleRequest {
    #[schema(example = "agent")]
    pub role: String,
}

/// Register the user on first login; existing users are returned unchanged.
#[utoipa::path(
    post,
    path = "/users/{email}",
    params(("email" = String, Path, description = "Login email")),
    request_body(content = ProfileRequest, description = "Optional profile; the body may be omitted"),
    responses(
        (status = 200, description = "Registered user", body = UserPayload),
        (status = 400, description = "Invalid email or profile", body = Error),
        (status = 503, description = "User store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "ensureUser",
    security([])
)]
pub async fn ensure_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: Option<web::Json<ProfileRequest>>,
) -> ApiResult<web::Json<User>> {
    let email = parse_email(EMAIL, &path)?;
    let ProfileRequest { name, photo_url } = payload.map(web::Json::into_inner).unwrap_or_default();
    let profile = UserProfile::new(name, photo_url).map_err(|err| field_error(PROFILE, err))?;
    let user = state.users.ensure_user(&email, &profile).await?;
    Ok(web::Json(user))
}

/// Ask for agent verification. Callers may only upgrade themselves.
#[utoipa::path(
    patch,
    path = "/users/{email}",
    params(("email" = String, Path, description = "Caller's own email")),
    responses(
        (status = 200, description = "Upgrade requested", body = UserPayload),
        (status = 400, description = "Already requested or fraud-flagged", body = Error),
        (status = 401, description = "No valid session", body = Error),
        (status = 403, description = "Email does not match the session", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 409, description = "Concurrent update, retry", body = Error)
    ),
    tags = ["users"],
    operation_id = "requestUpgrade",
    security(("cookieAuth" = []))
)]
pub async fn request_upgrade(
    state: web::Data<HttpState>,
    Authenticated(identity): Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let email = parse_email(EMAIL, &path)?;
    if identity.email() != &email {
        return Err(Error::forbidden(FORBIDDEN_MESSAGE));
    }
    let user = state.users.request_upgrade(&email).await?;
    Ok(web::Json(user))
}

/// Current role for an email.
#[utoipa::path(
    get,
    path = "/users/role/{email}",
    params(("email" = String, Path, description = "Login email")),
    responses(
        (status = 200, description = "Role, or null for unknown users", body = RoleResponse),
        (status = 400, description = "Invalid email", body = Error)
    ),
    tags = ["users"],
    operation_id = "getRole",
    security([])
)]
pub async fn get_role(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RoleResponse>> {
    let email = parse_email(EMAIL, &path)?;
    let role = state.users.role_of(&email).await?;
    Ok(web::Json(RoleResponse { role }))
}

/// All registered users.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [UserPayload]),
        (status = 401, description = "No valid session", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("cookieAuth" = []))
)]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    Ok(web::Json(state.users.list_users().await?))
}

/// Overwrite a user's role. The moderation status is left untouched.
#[utoipa::path(
    put,
    path = "/users/{userId}/role",
    params(("userId" = String, Path, description = "User identifier")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Updated user", body = UserPayload),
        (status = 400, description = "Unknown role or malformed id", body = Error),
        (status = 401, description = "No valid session", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "setRole",
    security(("cookieAuth" = []))
)]
pub async fn set_role(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RoleRequest>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let role = parse_role(&payload.role)?;
    Ok(web::Json(state.users.set_role(&id, role).await?))
}

/// Flag a user as fraudulent. The flag is terminal.
#[utoipa::path(
    put,
    path = "/users/{userId}/fraud",
    params(("userId" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Flagged user", body = UserPayload),
        (status = 401, description = "No valid session", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "flagFraud",
    security(("cookieAuth" = []))
)]
pub async fn flag_fraud(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    Ok(web::Json(state.users.flag_fraud(&id).await?))
}

/// Delete a user record.
#[utoipa::path(
    delete,
    path = "/users/{userId}",
    params(("userId" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User removed"),
        (status = 401, description = "No valid session", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "removeUser",
    security(("cookieAuth" = []))
)]
pub async fn remove_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users.remove_user(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
