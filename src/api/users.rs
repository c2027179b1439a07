//! User self-service routes.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::Response,
};
use serde::Deserialize;

use crate::api::AppState;
use crate::gate::{AccessError, DeferredBody, GatedHandler, Reply};
use crate::security::{PermissionSet, Principal, TargetId};

#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub name: String,
}

/// `GET /users/{id}`: any permission, own record only.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request<Body>,
) -> Response {
    let handler = GatedHandler::new(
        state.guards.self_access(PermissionSet::any(), TargetId::parse(&id)),
        |principal: Principal| {
            DeferredBody::no_body(move || async move { Reply::json(StatusCode::OK, &principal) })
        },
    );
    state.serve("users.get", handler, request).await
}

/// `PUT /users/{id}`: rename, own record only.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request<Body>,
) -> Response {
    let directory = state.directory.clone();
    let handler = GatedHandler::new(
        state.guards.self_access(PermissionSet::any(), TargetId::parse(&id)),
        move |principal: Principal| {
            let directory = directory.clone();
            DeferredBody::structured(move |update: UserUpdate| async move {
                match directory.rename_user(principal.id, update.name) {
                    Some(user) => Reply::json(StatusCode::OK, &user),
                    None => AccessError::PrincipalNotFound.into(),
                }
            })
        },
    );
    state.serve("users.update", handler, request).await
}
