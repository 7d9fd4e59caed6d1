use crate::auth::AdminSession;
use crate::blogs::NewBlog;
use crate::comments::CreateCommentRequest;
use crate::config::Config;
use crate::error::AppError;
use crate::gemini::{self, ContentGenerator};
use crate::imagekit::{ImageHost, BLOG_IMAGE_FOLDER};
use crate::routes::{get_blog_db, get_comment_db, IdRequest};
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::Deserialize;

/// JSON carried in the `blog` field of the create form.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlogForm {
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Image part of the create form.
struct ImageUpload {
    file_name: String,
    data: Vec<u8>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a multipart field, refusing anything past `limit` bytes.
async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk =
            chunk.map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?;
        if data.len() + chunk.len() > limit {
            return Err(AppError::BadRequest(format!(
                "Upload exceeds the {} byte limit",
                limit
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Create a blog from a multipart form: `blog` JSON plus an `image` file.
pub async fn add_blog(
    admin: AdminSession,
    mut payload: Multipart,
    config: web::Data<Config>,
    images: web::Data<dyn ImageHost>,
) -> Result<HttpResponse, AppError> {
    let limit = config.limits.max_image_bytes;
    let mut blog_json: Option<String> = None;
    let mut image: Option<ImageUpload> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?;
        let name = field.name().to_string();

        match name.as_str() {
            "blog" => {
                let data = read_field(&mut field, limit).await?;
                let text = String::from_utf8(data)
                    .map_err(|_| AppError::BadRequest("Blog data must be UTF-8".to_string()))?;
                blog_json = Some(text);
            }
            "image" => {
                let is_image = field
                    .content_type()
                    .map(|mime| mime.type_().as_str() == "image")
                    .unwrap_or(false);
                if !is_image {
                    return Err(AppError::BadRequest(
                        "The image field must be an image file".to_string(),
                    ));
                }
                let file_name = field
                    .content_disposition()
                    .get_filename()
                    .filter(|f| !f.is_empty())
                    .unwrap_or("upload")
                    .to_string();
                let data = read_field(&mut field, limit).await?;
                if !data.is_empty() {
                    image = Some(ImageUpload { file_name, data });
                }
            }
            other => {
                log::debug!("Ignoring unexpected form field: {}", other);
                read_field(&mut field, limit).await?;
            }
        }
    }

    let form = match blog_json {
        Some(text) => serde_json::from_str::<BlogForm>(&text).map_err(|_| {
            AppError::BadRequest(
                "Invalid blog data format. Please ensure the blog data is properly formatted JSON."
                    .to_string(),
            )
        })?,
        None => BlogForm::default(),
    };

    let (title, description, category, image) = match (
        non_empty(form.title),
        non_empty(form.description),
        non_empty(form.category),
        image,
    ) {
        (Some(title), Some(description), Some(category), Some(image)) => {
            (title, description, category, image)
        }
        _ => {
            return Err(AppError::BadRequest(
                "Missing required fields: title, description, category, and image are required"
                    .to_string(),
            ))
        }
    };

    let uploaded = images
        .upload(image.data, &image.file_name, BLOG_IMAGE_FOLDER)
        .await?;
    let image_url = images.optimized_url(&uploaded.file_path);

    let blog = get_blog_db(&config)?.add_blog(NewBlog {
        title,
        sub_title: non_empty(form.sub_title),
        description,
        category,
        image: image_url,
        is_published: form.is_published.unwrap_or(false),
    })?;

    log::info!("Blog {} created by {}: {}", blog.id, admin.email, blog.title);
    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "msg": "Blog added successfully",
        "blog": blog
    })))
}

/// Published blogs, newest first.
pub async fn get_published_blogs(config: web::Data<Config>) -> Result<HttpResponse, AppError> {
    let blogs = get_blog_db(&config)?.list_blogs(Some(true))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "blogs": blogs
    })))
}

pub async fn get_blog(
    path: web::Path<String>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let blog_id = path.into_inner();

    match get_blog_db(&config)?.get_blog(&blog_id)? {
        Some(blog) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "singleBlog": blog
        }))),
        None => Err(AppError::NotFound("Blog not found".to_string())),
    }
}

/// Delete a blog, then its comments.
pub async fn delete_blog(
    admin: AdminSession,
    body: web::Json<IdRequest>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let id = body.require_id()?;

    if !get_blog_db(&config)?.delete_blog(id)? {
        return Err(AppError::NotFound("Blog not found".to_string()));
    }
    let removed = get_comment_db(&config)?.delete_comments_for_blog(id)?;

    log::info!(
        "Blog {} deleted by {} with {} comments",
        id, admin.email, removed
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "msg": "Blog deleted successfully"
    })))
}

pub async fn toggle_publish(
    _admin: AdminSession,
    body: web::Json<IdRequest>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let id = body.require_id()?;

    let is_published = get_blog_db(&config)?
        .toggle_publish(id)?
        .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "msg": "Blog status updated",
        "isPublished": is_published
    })))
}

/// Submit a comment; it stays hidden until approved.
pub async fn add_comment(
    body: web::Json<CreateCommentRequest>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let request = CreateCommentRequest {
        blog: request.blog.trim().to_string(),
        name: request.name.trim().to_string(),
        content: request.content.trim().to_string(),
    };

    if request.blog.is_empty() || request.name.is_empty() || request.content.is_empty() {
        return Err(AppError::BadRequest(
            "Missing required fields: blog, name, and content are required".to_string(),
        ));
    }

    if !get_blog_db(&config)?.exists(&request.blog)? {
        return Err(AppError::NotFound("Blog not found".to_string()));
    }

    let comment = get_comment_db(&config)?.add_comment(request)?;
    log::info!("Comment {} submitted for blog {}", comment.id, comment.blog);

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "msg": "Comment submitted successfully",
        "comment": comment
    })))
}

/// Approved comments for one blog.
pub async fn get_blog_comments(
    path: web::Path<String>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let blog_id = path.into_inner();
    let comments = get_comment_db(&config)?.get_approved_comments(&blog_id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "comments": comments
    })))
}

pub async fn generate_content(
    _admin: AdminSession,
    body: web::Json<GenerateRequest>,
    generator: web::Data<dyn ContentGenerator>,
) -> Result<HttpResponse, AppError> {
    let topic = body.prompt.trim();
    if topic.is_empty() {
        return Err(AppError::BadRequest(
            "Missing required field: prompt".to_string(),
        ));
    }

    let content = generator.generate(&gemini::draft_prompt(topic)).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "content": content
    })))
}

pub fn configure_blog_routes(cfg: &mut web::ServiceConfig) {
    // static paths must be registered before {blog_id}
    cfg.route("/api/blog/add", web::post().to(add_blog))
        .route("/api/blog/all", web::get().to(get_published_blogs))
        .route("/api/blog/delete", web::post().to(delete_blog))
        .route("/api/blog/toggle-publish", web::post().to(toggle_publish))
        .route("/api/blog/add-comment", web::post().to(add_comment))
        .route("/api/blog/comments/{blog_id}", web::get().to(get_blog_comments))
        .route("/api/blog/generate", web::post().to(generate_content))
        .route("/api/blog/{blog_id}", web::get().to(get_blog));
}
