//! Relationship API handlers.
//!
//! ```text
//! GET /users/{user_id}/relationships
//! PUT /users/{user_id}/relationships/{other_user_id} {"state":"like"}
//! ```

use std::str::FromStr;

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::SetPreference;
use crate::domain::{Error, PreferenceState, RelationshipEdge, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::missing_field_error;

/// Request body for `PUT /users/{user_id}/relationships/{other_user_id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PreferenceRequest {
    /// Desired state: `like` or `dislike`. `matched` is never accepted.
    pub state: Option<String>,
}

/// Wire representation of a relationship edge, seen from its subject.
#[derive(Debug, Serialize, ToSchema)]
pub struct RelationshipResponse {
    /// The other endpoint of the edge.
    pub user_id: i64,
    pub state: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<RelationshipEdge> for RelationshipResponse {
    fn from(value: RelationshipEdge) -> Self {
        Self {
            user_id: value.object.as_i64(),
            state: value.state.to_string(),
            kind: value.kind.to_string(),
        }
    }
}

fn invalid_state_error(value: &str) -> Error {
    Error::invalid_request("state must be like or dislike").with_details(json!({
        "field": "state",
        "value": value,
        "code": "invalid_state",
    }))
}

fn parse_preference_request(payload: PreferenceRequest) -> Result<PreferenceState, Error> {
    let raw = payload.state.ok_or_else(|| missing_field_error("state"))?;
    PreferenceState::from_str(&raw).map_err(|_| invalid_state_error(&raw))
}

/// List a user's outgoing relationship edges.
#[utoipa::path(
    get,
    path = "/users/{user_id}/relationships",
    params(
        ("user_id" = i64, Path, description = "Subject user id")
    ),
    responses(
        (status = 200, description = "Relationship edges", body = [RelationshipResponse]),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["relationships"],
    operation_id = "listRelationships"
)]
#[get("/users/{user_id}/relationships")]
pub async fn list_relationships(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<RelationshipResponse>>> {
    let subject = UserId::new(path.into_inner());
    let edges = state.relationships_query.list_for_user(subject).await?;
    Ok(web::Json(
        edges.into_iter().map(RelationshipResponse::from).collect(),
    ))
}

/// Express a preference toward another user, reconciling the edge pair.
///
/// Returns the caller's own edge after reconciliation: `matched` when this
/// like completed a mutual pair, otherwise the state that was sent.
#[utoipa::path(
    put,
    path = "/users/{user_id}/relationships/{other_user_id}",
    request_body = PreferenceRequest,
    params(
        ("user_id" = i64, Path, description = "Requesting user id"),
        ("other_user_id" = i64, Path, description = "Target user id")
    ),
    responses(
        (status = 200, description = "The caller's edge after reconciliation", body = RelationshipResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["relationships"],
    operation_id = "updateRelationship"
)]
#[put("/users/{user_id}/relationships/{other_user_id}")]
pub async fn update_relationship(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
    payload: web::Json<PreferenceRequest>,
) -> ApiResult<web::Json<RelationshipResponse>> {
    let (subject, object) = path.into_inner();
    let desired = parse_preference_request(payload.into_inner())?;

    let edge = state
        .relationships
        .set_preference(SetPreference {
            subject: UserId::new(subject),
            object: UserId::new(object),
            desired,
        })
        .await?;

    Ok(web::Json(RelationshipResponse::from(edge)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::RelationshipStore;
    use crate::domain::{
        ErrorCode, MatchmakingService, RelationshipKind, RelationshipState,
    };
    use crate::outbound::persistence::MemoryRelationshipStore;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    fn test_state(store: Arc<MemoryRelationshipStore>) -> web::Data<HttpState> {
        let matchmaking = Arc::new(MatchmakingService::new(store));
        let directory = Arc::new(crate::domain::UserDirectoryService::new(Arc::new(
            crate::outbound::persistence::MemoryUserRepository::new(),
        )));
        web::Data::new(HttpState::new(
            directory.clone(),
            directory,
            matchmaking.clone(),
            matchmaking,
        ))
    }

    #[rstest]
    fn preference_request_without_state_is_rejected() {
        let err = parse_preference_request(PreferenceRequest { state: None })
            .expect_err("missing state");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case("matched")]
    #[case("liked")]
    #[case("LIKE")]
    fn preference_request_rejects_out_of_set_states(#[case] raw: &str) {
        let err = parse_preference_request(PreferenceRequest {
            state: Some(raw.to_owned()),
        })
        .expect_err("state outside closed set");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err
            .details()
            .and_then(|value| value.as_object())
            .expect("details");
        assert_eq!(details.get("value").and_then(|v| v.as_str()), Some(raw));
    }

    #[rstest]
    fn response_reports_the_edge_object_as_user_id() {
        let edge = RelationshipEdge {
            id: 1,
            subject: UserId::new(4),
            object: UserId::new(9),
            state: RelationshipState::Matched,
            kind: RelationshipKind::Relationship,
        };

        let response = RelationshipResponse::from(edge);
        assert_eq!(response.user_id, 9);
        assert_eq!(response.state, "matched");
        assert_eq!(response.kind, "relationship");
    }

    #[actix_rt::test]
    async fn mutual_likes_report_matched_over_http() {
        let store = Arc::new(MemoryRelationshipStore::new());
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state(store))
                .service(update_relationship)
                .service(list_relationships),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/users/1/relationships/2")
                .set_json(json!({ "state": "like" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("state").and_then(Value::as_str), Some("like"));

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/users/2/relationships/1")
                .set_json(json!({ "state": "like" }))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("state").and_then(Value::as_str), Some("matched"));
        assert_eq!(body.get("user_id").and_then(Value::as_i64), Some(1));
    }

    #[actix_rt::test]
    async fn explicit_matched_request_returns_400() {
        let store = Arc::new(MemoryRelationshipStore::new());
        let app = actix_test::init_service(
            App::new()
                .app_data(test_state(store))
                .service(update_relationship),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/users/1/relationships/2")
                .set_json(json!({ "state": "matched" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn listing_shows_edges_for_the_subject_only() {
        let store = Arc::new(MemoryRelationshipStore::new());
        store
            .upsert_edge(
                UserId::new(1),
                UserId::new(2),
                RelationshipKind::Relationship,
                RelationshipState::Like,
            )
            .await
            .expect("seed");
        store
            .upsert_edge(
                UserId::new(2),
                UserId::new(1),
                RelationshipKind::Relationship,
                RelationshipState::Dislike,
            )
            .await
            .expect("seed");

        let app = actix_test::init_service(
            App::new()
                .app_data(test_state(store))
                .service(list_relationships),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/users/1/relationships")
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(response).await;
        let edges = body.as_array().expect("array body");

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].get("user_id").and_then(Value::as_i64), Some(2));
        assert_eq!(edges[0].get("state").and_then(Value::as_str), Some("like"));
    }
}
