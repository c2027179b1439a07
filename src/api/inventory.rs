//! Department-scoped inventory routes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::Response,
};
use serde::Deserialize;

use crate::api::AppState;
use crate::gate::body::read_body;
use crate::gate::{AccessError, DeferredBody, GatedHandler, Reply};
use crate::security::{Owned, Permission, PermissionSet, Principal, TargetId};
use crate::store::{InventoryItem, ResourceRepository};

#[derive(Debug, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<u32>,
}

fn staff() -> PermissionSet {
    PermissionSet::of(&[Permission::Manager, Permission::Admin])
}

fn admins() -> PermissionSet {
    PermissionSet::of(&[Permission::Admin])
}

fn items(state: &AppState) -> Arc<dyn ResourceRepository<InventoryItem>> {
    state.directory.clone()
}

fn gone() -> Reply {
    AccessError::ResourceNotFound.into()
}

/// `GET /inventory/{id}`
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request<Body>,
) -> Response {
    let handler = GatedHandler::new(
        state.guards.ownership(staff(), items(&state), TargetId::parse(&id)),
        |owned: Owned<InventoryItem>| {
            DeferredBody::no_body(move || async move {
                Reply::json(StatusCode::OK, &owned.resource)
            })
        },
    );
    state.serve("inventory.get", handler, request).await
}

/// `POST /inventory`: the new item lands in the caller's department.
pub async fn create_item(State(state): State<AppState>, request: Request<Body>) -> Response {
    let directory = state.directory.clone();
    let handler = GatedHandler::new(
        state.guards.permission(staff()),
        move |principal: Principal| {
            let directory = directory.clone();
            DeferredBody::structured(move |new: NewItem| async move {
                match directory.create_item(new.name, new.quantity, principal.department) {
                    Some(item) => {
                        tracing::info!(item = item.id, by = principal.id, "Inventory item created");
                        Reply::json(StatusCode::CREATED, &item)
                    }
                    None => {
                        tracing::warn!(by = principal.id, "Inventory ids exhausted");
                        Reply::text(StatusCode::INSUFFICIENT_STORAGE, "Inventory Full")
                    }
                }
            })
        },
    );
    state.serve("inventory.create", handler, request).await
}

/// `PUT /inventory/{id}`
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request<Body>,
) -> Response {
    let directory = state.directory.clone();
    let handler = GatedHandler::new(
        state.guards.ownership(staff(), items(&state), TargetId::parse(&id)),
        move |owned: Owned<InventoryItem>| {
            let directory = directory.clone();
            DeferredBody::structured(move |update: ItemUpdate| async move {
                let updated = directory.update_item(owned.resource.id, |item| {
                    if let Some(name) = update.name {
                        item.name = name;
                    }
                    if let Some(quantity) = update.quantity {
                        item.quantity = quantity;
                    }
                });
                match updated {
                    Some(item) => Reply::json(StatusCode::OK, &item),
                    None => gone(),
                }
            })
        },
    );
    state.serve("inventory.update", handler, request).await
}

/// `DELETE /inventory/{id}`: admins only.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request<Body>,
) -> Response {
    let directory = state.directory.clone();
    let handler = GatedHandler::new(
        state.guards.ownership(admins(), items(&state), TargetId::parse(&id)),
        move |owned: Owned<InventoryItem>| {
            let directory = directory.clone();
            DeferredBody::no_body(move || async move {
                match directory.remove_item(owned.resource.id) {
                    Some(item) => {
                        tracing::info!(item = item.id, by = owned.principal.id, "Inventory item deleted");
                        Reply::ok()
                    }
                    None => gone(),
                }
            })
        },
    );
    state.serve("inventory.delete", handler, request).await
}

/// `PUT /inventory/{id}/manifest`: opaque upload, only its size is kept.
pub async fn upload_manifest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request<Body>,
) -> Response {
    let directory = state.directory.clone();
    let limit = state.body.max_body_size;
    let handler = GatedHandler::new(
        state.guards.ownership(staff(), items(&state), TargetId::parse(&id)),
        move |owned: Owned<InventoryItem>| {
            let directory = directory.clone();
            DeferredBody::raw(move |body| async move {
                let bytes = match read_body(body, limit).await {
                    Ok(bytes) => bytes,
                    Err(err) => return Reply::from(err),
                };
                let size = bytes.len() as u64;
                match directory.update_item(owned.resource.id, |item| item.manifest_bytes = Some(size)) {
                    Some(item) => Reply::json(StatusCode::OK, &item),
                    None => gone(),
                }
            })
        },
    );
    state.serve("inventory.manifest", handler, request).await
}
