use crate::admin;
use crate::blog;
use crate::blogs::BlogDB;
use crate::comments::CommentDB;
use crate::config::Config;
use crate::error::AppError;
use actix_cors::Cors;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

/// Body of the moderation and blog management endpoints.
#[derive(Debug, Deserialize)]
pub struct IdRequest {
    #[serde(default)]
    pub id: String,
}

impl IdRequest {
    pub fn require_id(&self) -> Result<&str, AppError> {
        let id = self.id.trim();
        if id.is_empty() {
            Err(AppError::BadRequest("Missing required field: id".to_string()))
        } else {
            Ok(id)
        }
    }
}

/// Open the blog table for this request.
pub fn get_blog_db(config: &Config) -> Result<BlogDB, AppError> {
    BlogDB::new(&config.database_path()).map_err(AppError::from)
}

/// Open the comment table for this request.
pub fn get_comment_db(config: &Config) -> Result<CommentDB, AppError> {
    CommentDB::new(&config.database_path()).map_err(AppError::from)
}

/// Malformed JSON bodies become `400 {success:false,msg}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}

/// Any origin may call the API; the admin panel and the public site are
/// served from elsewhere.
pub fn cors() -> Cors {
    Cors::permissive()
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("API is working")
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "quill_blog"
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check));

    admin::configure_admin_routes(cfg);
    blog::configure_blog_routes(cfg);
}
