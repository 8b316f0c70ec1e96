//! Users API handlers.
//!
//! ```text
//! GET /users
//! POST /users {"name":"Ada"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, User, UserName, UserValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::missing_field_error;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    /// Accepted for wire compatibility and ignored: the stored role is
    /// always `user`.
    #[serde(rename = "type")]
    pub role: Option<String>,
}

/// Wire representation of a user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.as_i64(),
            name: value.name.to_string(),
            role: value.role.to_string(),
        }
    }
}

fn map_name_validation_error(err: UserValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": "name",
        "code": "invalid_name",
    }))
}

fn parse_create_user_request(payload: CreateUserRequest) -> Result<UserName, Error> {
    let name = payload.name.ok_or_else(|| missing_field_error("name"))?;
    UserName::new(name).map_err(map_name_validation_error)
}

/// List known users.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Register a new user.
///
/// Any `type` supplied in the body is ignored; created users always carry
/// `type = "user"`.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Created user", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let name = parse_create_user_request(payload.into_inner())?;
    let user = state.onboarding.register_user(name).await?;
    Ok(web::Json(UserResponse::from(user)))
}
