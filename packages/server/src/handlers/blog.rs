use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ImageRef;
use common::images::{image_from_json, image_to_json, images_from_json, images_to_json};
use sea_orm::*;
use tracing::instrument;

use crate::assets::CleanupPlan;
use crate::assets::reconcile::with_featured;
use crate::entity::blog;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthAdmin;
use crate::extractors::json::AppJson;
use crate::models::blog::*;
use crate::state::AppState;

/// Every image a stored post references, featured image included once.
fn referenced_images(model: &blog::Model) -> Vec<ImageRef> {
    with_featured(
        images_from_json(&model.images),
        model.featured_image.as_ref().and_then(image_from_json),
    )
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Blogs",
    operation_id = "listBlogs",
    summary = "List blog posts",
    responses(
        (status = 200, description = "Posts, newest first", body = Vec<BlogResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<BlogResponse>>, AppError> {
    let blogs = blog::Entity::find()
        .order_by_desc(blog::Column::CreatedAt)
        .order_by_desc(blog::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(blogs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Blogs",
    operation_id = "getBlog",
    summary = "Get a blog post by ID",
    params(("id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Post", body = BlogResponse),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BlogResponse>, AppError> {
    let model = find_blog(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Blogs",
    operation_id = "createBlog",
    summary = "Create a blog post",
    description = "When `featured_image` is omitted the first image becomes the featured image.",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Post created", body = BlogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth, payload), fields(title = %payload.title))]
pub async fn create_blog(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBlogRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_blog(&payload)?;

    let featured = resolve_featured(&payload.images, payload.featured_image);
    let now = chrono::Utc::now();
    let model = blog::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        content: Set(payload.content),
        author: Set(payload.author.trim().to_string()),
        images: Set(images_to_json(&payload.images)),
        featured_image: Set(featured.as_ref().map(image_to_json)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(BlogResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Blogs",
    operation_id = "updateBlog",
    summary = "Update a blog post",
    description = "Partially updates a post. Images (including the featured image) that the post no longer references are deleted from the asset host after the update is saved.",
    params(("id" = i32, Path, description = "Blog ID")),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Post updated", body = BlogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth, payload), fields(id))]
pub async fn update_blog(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateBlogRequest>,
) -> Result<Json<BlogResponse>, AppError> {
    validate_update_blog(&payload)?;

    let existing = find_blog(&state.db, id).await?;
    let old_refs = referenced_images(&existing);

    let mut active: blog::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(author) = payload.author {
        active.author = Set(author.trim().to_string());
    }
    let images_changed = payload.images.is_some() || payload.featured_image.is_some();
    if let Some(ref images) = payload.images {
        active.images = Set(images_to_json(images));
    }
    if let Some(ref featured) = payload.featured_image {
        active.featured_image = Set(featured.as_ref().map(image_to_json));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    if images_changed {
        let plan = CleanupPlan::for_update(&old_refs, &referenced_images(&model), state.asset_folder());
        state.cleanup(plan).await;
    }

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Blogs",
    operation_id = "deleteBlog",
    summary = "Delete a blog post",
    description = "Deletes the post, then its images and featured image from the asset host. An image used both in the list and as the featured image is deleted once.",
    params(("id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth), fields(id))]
pub async fn delete_blog(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let existing = find_blog(&state.db, id).await?;
    let plan = CleanupPlan::for_images(&referenced_images(&existing), state.asset_folder());

    let result = blog::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Blog not found".into()));
    }
    state.cleanup(plan).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_blog<C: ConnectionTrait>(db: &C, id: i32) -> Result<blog::Model, AppError> {
    blog::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".into()))
}
