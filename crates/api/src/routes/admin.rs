use agency_core::model::{BlogDraft, BlogPatch, BlogPost, RecordId};
use agency_core::validate::{validate_blog, BlogValidationError};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::AdminSession;
use crate::state::AppState;

const NOT_FOUND: &str = "Blog not found";

/// Admin login and blog management. Listing is public; every mutation
/// requires an [`AdminSession`].
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/verify", post(verify))
        .route("/blogs", get(list_blogs).post(create_blog))
        .route("/blogs/{id}", put(update_blog).delete(delete_blog))
}

#[derive(Debug, Default, Deserialize)]
struct VerifyRequest {
    password: Option<String>,
}

async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let token = state.gate().verify(request.password.as_deref())?;
    Ok(Json(json!({ "success": true, "token": token })))
}

async fn list_blogs(State(state): State<AppState>) -> ApiResult<Json<Vec<BlogPost>>> {
    Ok(Json(state.store().list_blogs().await?))
}

async fn create_blog(
    State(state): State<AppState>,
    _session: AdminSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
    let form = BlogForm::read(multipart?).await?;
    // A new post always needs an uploaded cover image.
    if form.upload.is_none() {
        return Err(BlogValidationError::MissingImage.into());
    }
    let saved = form.store_image(&state).await?;

    let draft = BlogDraft {
        title: form.title,
        excerpt: form.excerpt,
        category: form.category,
        read_time: form.read_time,
        image: saved.clone(),
    };

    match insert_post(&state, draft).await {
        Ok(post) => {
            tracing::info!(blog_id = %post.id, "blog created");
            Ok((StatusCode::CREATED, Json(post)))
        }
        Err(err) => {
            discard(&state, saved).await;
            Err(err)
        }
    }
}

async fn update_blog(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<BlogPost>> {
    let id = RecordId::parse(&id).ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    let form = BlogForm::read(multipart?).await?;
    let saved = form.store_image(&state).await?;

    let patch = BlogPatch {
        title: form.title,
        excerpt: form.excerpt,
        category: form.category,
        read_time: form.read_time,
        image: saved.clone(),
    };

    match apply_patch(&state, id, patch).await {
        Ok(post) => {
            tracing::info!(blog_id = %post.id, "blog updated");
            Ok(Json(post))
        }
        Err(err) => {
            discard(&state, saved).await;
            Err(err)
        }
    }
}

async fn insert_post(state: &AppState, draft: BlogDraft) -> ApiResult<BlogPost> {
    let new = validate_blog(draft)?;
    Ok(state.store().insert_blog(&new).await?)
}

/// Validators run on the stored post with the patch applied.
async fn apply_patch(state: &AppState, id: RecordId, patch: BlogPatch) -> ApiResult<BlogPost> {
    let current = state
        .store()
        .get_blog(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    let fields = validate_blog(patch.overlay(&current))?;
    state
        .store()
        .update_blog(id, &fields)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))
}

async fn delete_blog(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = RecordId::parse(&id).ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    let removed = state
        .store()
        .delete_blog(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;

    tracing::info!(blog_id = %removed.id, "blog deleted");
    Ok(Json(json!({ "message": "Blog deleted" })))
}

/// Multipart fields of the blog form. Unknown fields, and an `image` sent as
/// plain text, are ignored.
#[derive(Debug, Default)]
struct BlogForm {
    title: Option<String>,
    excerpt: Option<String>,
    category: Option<String>,
    read_time: Option<String>,
    /// `image` sent as a file: original name and contents.
    upload: Option<(String, Bytes)>,
}

impl BlogForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = BlogForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == "image" {
                let Some(file_name) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                let data = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if !data.is_empty() {
                    form.upload = Some((file_name, data));
                }
                continue;
            }

            let slot = match name.as_str() {
                "title" => &mut form.title,
                "excerpt" => &mut form.excerpt,
                "category" => &mut form.category,
                "readTime" => &mut form.read_time,
                _ => continue,
            };
            *slot = Some(field.text().await?);
        }

        Ok(form)
    }

    /// Write the uploaded file, if any, and return its stored name.
    async fn store_image(&self, state: &AppState) -> ApiResult<Option<String>> {
        let Some((file_name, data)) = &self.upload else {
            return Ok(None);
        };
        let stored = state
            .uploads()
            .save(Some(file_name.as_str()), data)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to store upload: {e}")))?;
        Ok(Some(stored))
    }
}

async fn discard(state: &AppState, saved: Option<String>) {
    if let Some(name) = saved {
        state.uploads().remove(&name).await;
    }
}
