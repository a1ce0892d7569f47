//! Item route handlers.
//!
//! Items are addressed by their type's REST base (`posts`, `pages`,
//! `video`). Writes store the core fields, then registered meta, then run
//! the insert hooks; every representation is the registered-meta projection
//! passed through the prepare filters.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use videometa_common::{Error, ItemId, ItemStatus, ItemType};
use videometa_db::models::{Item, ItemUpdate, NewItem};
use videometa_db::pool::get_conn;
use videometa_db::queries::items::{self, ItemFilter, Pagination};

use super::error::AppError;
use super::AppContext;
use crate::auth::{Capability, Principal};
use crate::rest::{RestRequest, RestResponse};

const MAX_PER_PAGE: u32 = 100;
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn item_routes() -> Router<AppContext> {
    Router::new()
        .route("/:type", get(list_items).post(create_item))
        .route(
            "/:type/:id",
            get(get_item)
                .post(update_item)
                .put(update_item)
                .patch(update_item)
                .delete(delete_item),
        )
}

/// Query parameters for listing items.
#[derive(Debug, Deserialize)]
pub struct ListItemsParams {
    pub search: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

fn resolve_type(rest_base: &str) -> Result<ItemType, AppError> {
    ItemType::from_rest_base(rest_base).ok_or_else(|| {
        AppError::new(Error::not_found(
            "No route was found matching the URL and request method.",
        ))
        .with_code("rest_no_route")
    })
}

fn invalid_id() -> AppError {
    AppError::new(Error::not_found("Invalid post ID."))
}

fn parse_id(raw: &str) -> Result<ItemId, AppError> {
    raw.parse::<ItemId>().map_err(|_| invalid_id())
}

fn require(
    principal: &Principal,
    capability: Capability,
    message: &str,
    code: &'static str,
) -> Result<(), AppError> {
    if !principal.is_authenticated() {
        return Err(AppError::new(Error::Unauthorized).with_code(code));
    }
    if !principal.has(capability) {
        return Err(AppError::new(Error::forbidden(message)).with_code(code));
    }
    Ok(())
}

/// A string field given either plainly or as `{"raw": ...}`.
fn text_param(request: &RestRequest, key: &str) -> Option<String> {
    let value = request.param(key)?;
    value
        .as_str()
        .or_else(|| value.get("raw").and_then(Value::as_str))
        .map(str::to_string)
}

fn status_param(request: &RestRequest) -> Result<Option<ItemStatus>, AppError> {
    let Some(value) = request.param("status") else {
        return Ok(None);
    };
    let status = value
        .as_str()
        .and_then(|s| s.parse::<ItemStatus>().ok())
        .ok_or_else(|| Error::invalid_input("Invalid parameter(s): status"))?;

    if status == ItemStatus::Publish && !request.principal().has(Capability::PublishPosts) {
        return Err(AppError::new(Error::forbidden(
            "Sorry, you are not allowed to publish posts in this post type.",
        ))
        .with_code("rest_cannot_publish"));
    }
    Ok(Some(status))
}

fn load_item(ctx: &AppContext, id: ItemId, item_type: ItemType) -> Result<Item, AppError> {
    let conn = get_conn(&ctx.db)?;
    items::get_item(&conn, id)?
        .filter(|item| item.item_type == item_type)
        .ok_or_else(invalid_id)
}

/// Build the REST representation of an item.
fn prepare_item(
    ctx: &AppContext,
    item: &Item,
    request: &RestRequest,
    status: u16,
) -> Result<RestResponse, AppError> {
    let meta = ctx.fields.project_meta(
        ctx.store.as_ref(),
        item.id,
        item.item_type,
        request.principal(),
    )?;

    let data = json!({
        "id": item.id,
        "type": item.item_type,
        "title": { "rendered": item.title },
        "content": { "rendered": item.content },
        "status": item.status,
        "date": item.created_at.format(DATE_FORMAT).to_string(),
        "modified": item.modified_at.format(DATE_FORMAT).to_string(),
        "meta": meta,
    });

    Ok(ctx
        .hooks
        .apply_prepare(RestResponse::new(status, data), item, request)?)
}

fn respond(response: RestResponse) -> (StatusCode, Json<Value>) {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    (status, Json(response.data))
}

/// Registered meta, then extension hooks, then the representation.
fn finish_write(
    ctx: &AppContext,
    item: &Item,
    request: &RestRequest,
    status: u16,
) -> Result<RestResponse, AppError> {
    ctx.fields
        .apply_request_meta(ctx.store.as_ref(), item.id, item.item_type, request)?;
    ctx.hooks.run_insert(item, request)?;
    prepare_item(ctx, item, request, status)
}

/// GET /wp/v2/:type
pub async fn list_items(
    State(ctx): State<AppContext>,
    Path(rest_base): Path<String>,
    Query(params): Query<ListItemsParams>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Value>>, AppError> {
    let item_type = resolve_type(&rest_base)?;

    let per_page = params.per_page.unwrap_or(10);
    if per_page == 0 || per_page > MAX_PER_PAGE {
        return Err(Error::invalid_input(format!(
            "per_page must be between 1 ({}) and {} (inclusive).",
            per_page, MAX_PER_PAGE
        ))
        .into());
    }
    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(Error::invalid_input("page must be greater than or equal to 1").into());
    }

    let filter = ItemFilter {
        item_type: Some(item_type),
        search: params.search,
    };
    let found = {
        let conn = get_conn(&ctx.db)?;
        items::list_items(&conn, &filter, Pagination { page, per_page })?
    };

    let request = RestRequest::empty(principal);
    let mut out = Vec::with_capacity(found.len());
    for item in &found {
        out.push(prepare_item(&ctx, item, &request, 200)?.data);
    }
    Ok(Json(out))
}

/// GET /wp/v2/:type/:id
pub async fn get_item(
    State(ctx): State<AppContext>,
    Path((rest_base, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let item_type = resolve_type(&rest_base)?;
    let item = load_item(&ctx, parse_id(&id)?, item_type)?;

    let request = RestRequest::empty(principal);
    Ok(respond(prepare_item(&ctx, &item, &request, 200)?))
}

/// POST /wp/v2/:type
pub async fn create_item(
    State(ctx): State<AppContext>,
    Path(rest_base): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let item_type = resolve_type(&rest_base)?;
    require(
        &principal,
        Capability::EditPosts,
        "Sorry, you are not allowed to create posts as this user.",
        "rest_cannot_create",
    )?;

    let request = RestRequest::new(body, principal);
    let status = status_param(&request)?.unwrap_or_default();
    ctx.fields.validate_request_meta(item_type, &request)?;

    let new = NewItem {
        item_type,
        title: text_param(&request, "title").unwrap_or_default(),
        content: text_param(&request, "content").unwrap_or_default(),
        status,
    };
    let item = {
        let conn = get_conn(&ctx.db)?;
        items::create_item(&conn, &new)?
    };
    tracing::info!(item_id = %item.id, %item_type, "Created item");

    Ok(respond(finish_write(&ctx, &item, &request, 201)?))
}

/// POST|PUT|PATCH /wp/v2/:type/:id
pub async fn update_item(
    State(ctx): State<AppContext>,
    Path((rest_base, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let item_type = resolve_type(&rest_base)?;
    let existing = load_item(&ctx, parse_id(&id)?, item_type)?;
    require(
        &principal,
        Capability::EditPosts,
        "Sorry, you are not allowed to edit this post.",
        "rest_cannot_edit",
    )?;

    let request = RestRequest::new(body, principal);
    let update = ItemUpdate {
        title: text_param(&request, "title"),
        content: text_param(&request, "content"),
        status: status_param(&request)?,
    };
    ctx.fields.validate_request_meta(item_type, &request)?;

    let item = {
        let conn = get_conn(&ctx.db)?;
        items::update_item(&conn, existing.id, &update)?
    };
    tracing::debug!(item_id = %item.id, "Updated item");

    Ok(respond(finish_write(&ctx, &item, &request, 200)?))
}

/// DELETE /wp/v2/:type/:id
pub async fn delete_item(
    State(ctx): State<AppContext>,
    Path((rest_base, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    let item_type = resolve_type(&rest_base)?;
    let item = load_item(&ctx, parse_id(&id)?, item_type)?;
    require(
        &principal,
        Capability::DeletePosts,
        "Sorry, you are not allowed to delete this post.",
        "rest_cannot_delete",
    )?;

    let request = RestRequest::empty(principal);
    let previous = prepare_item(&ctx, &item, &request, 200)?;

    let conn = get_conn(&ctx.db)?;
    if !items::delete_item(&conn, item.id)? {
        return Err(invalid_id());
    }
    tracing::info!(item_id = %item.id, "Deleted item");

    Ok(Json(json!({ "deleted": true, "previous": previous.data })))
}
