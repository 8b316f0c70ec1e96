//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API: the user
//! directory, the relationship endpoints, and the health probes. The
//! generated document backs Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::relationships::{PreferenceRequest, RelationshipResponse};
use crate::inbound::http::users::{CreateUserRequest, UserResponse};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Matchwire API",
        description = "Directional user preferences with mutual-match promotion."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::relationships::list_relationships,
        crate::inbound::http::relationships::update_relationship,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateUserRequest,
        UserResponse,
        PreferenceRequest,
        RelationshipResponse,
        Error,
        ErrorCode
    )),
    tags(
        (name = "users", description = "User directory operations"),
        (name = "relationships", description = "Preference updates and relationship listings"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
