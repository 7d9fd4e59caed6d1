use crate::auth::{self, AdminSession};
use crate::blogs::Blog;
use crate::config::Config;
use crate::error::AppError;
use crate::routes::{get_blog_db, get_comment_db, IdRequest};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

/// 概览中展示的最新文章数量
const RECENT_BLOGS: usize = 5;

/// 管理员登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// 管理员登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

/// 后台概览
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub blogs: i64,
    pub comments: i64,
    pub drafts: i64,
    pub recent_blogs: Vec<Blog>,
}

/// 管理员登录
pub async fn admin_login(
    body: web::Json<LoginRequest>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    if !auth::credentials_match(&config.admin, &request.email, &request.password) {
        log::warn!("Failed admin login attempt");
        // 登录失败仍返回 200，由 success 字段区分
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": false,
            "msg": "Invalid Credentials"
        })));
    }

    let token = auth::issue_token(&config.admin, &request.email)?;
    log::info!("Admin {} logged in", request.email);
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        token,
    }))
}

/// 获取所有文章（包括草稿）
pub async fn get_all_blogs_admin(
    _admin: AdminSession,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let blogs = get_blog_db(&config)?.list_blogs(None)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "blogs": blogs
    })))
}

/// 获取所有评论
pub async fn get_all_comments(
    _admin: AdminSession,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let comments = get_comment_db(&config)?.get_all_comments()?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "comments": comments
    })))
}

pub async fn get_dashboard(
    _admin: AdminSession,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let blog_db = get_blog_db(&config)?;
    let comment_db = get_comment_db(&config)?;

    let dashboard_data = DashboardData {
        blogs: blog_db.count_blogs()?,
        comments: comment_db.count_comments()?,
        drafts: blog_db.count_drafts()?,
        recent_blogs: blog_db.recent_blogs(RECENT_BLOGS)?,
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "dashboardData": dashboard_data
    })))
}

/// 删除评论
pub async fn delete_comment(
    _admin: AdminSession,
    body: web::Json<IdRequest>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let id = body.require_id()?;

    if !get_comment_db(&config)?.delete_comment(id)? {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    log::info!("Comment {} deleted", id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "msg": "Comment has been deleted"
    })))
}

/// 审核评论
pub async fn approve_comment(
    _admin: AdminSession,
    body: web::Json<IdRequest>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let id = body.require_id()?;

    if !get_comment_db(&config)?.approve_comment(id)? {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    log::info!("Comment {} approved", id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "msg": "Comment has been approved"
    })))
}

pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    // 公开路由
    cfg.route("/api/admin/login", web::post().to(admin_login));

    // 需要认证的路由
    cfg.route("/api/admin/comments", web::get().to(get_all_comments))
        .route("/api/admin/blogs", web::get().to(get_all_blogs_admin))
        .route("/api/admin/delete-comment", web::post().to(delete_comment))
        .route("/api/admin/approve-comment", web::post().to(approve_comment))
        .route("/api/admin/dashboard", web::get().to(get_dashboard));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blogs::sample_blog;
    use crate::comments::CreateCommentRequest;
    use crate::test_support::TestContext;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_login_success_issues_token() {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(json!({"email": ctx.config.admin.email, "password": ctx.config.admin.password}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        let token = body["token"].as_str().unwrap();
        assert!(auth::verify_token(&ctx.config.admin, token).is_ok());
    }

    #[actix_web::test]
    async fn test_login_wrong_credentials_issues_nothing() {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;

        for (email, password) in [
            (ctx.config.admin.email.as_str(), "wrong"),
            ("intruder@quill.test", ctx.config.admin.password.as_str()),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/admin/login")
                .set_json(json!({"email": email, "password": password}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["msg"], "Invalid Credentials");
            assert!(body.get("token").is_none());
        }
    }

    #[actix_web::test]
    async fn test_admin_routes_require_token() {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;

        for uri in ["/api/admin/blogs", "/api/admin/comments", "/api/admin/dashboard"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }

        let req = test::TestRequest::get()
            .uri("/api/admin/blogs")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_admin_blog_list_includes_drafts() {
        let ctx = TestContext::new();
        let blogs = ctx.blogs();
        blogs.add_blog(sample_blog("Live", true)).unwrap();
        blogs.add_blog(sample_blog("Draft", false)).unwrap();
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/blogs")
            .insert_header(ctx.auth_header())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["blogs"].as_array().unwrap().len(), 2);
        assert_eq!(body["blogs"][0]["title"], "Draft");
    }

    #[actix_web::test]
    async fn test_moderation_flow() {
        let ctx = TestContext::new();
        let blog = ctx.blogs().add_blog(sample_blog("Moderated", true)).unwrap();
        let comment = ctx
            .comments()
            .add_comment(CreateCommentRequest {
                blog: blog.id.clone(),
                name: "reader".to_string(),
                content: "first!".to_string(),
            })
            .unwrap();
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/comments")
            .insert_header(ctx.auth_header())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["comments"][0]["blog"]["title"], "Moderated");
        assert_eq!(body["comments"][0]["isApproved"], false);

        let req = test::TestRequest::post()
            .uri("/api/admin/approve-comment")
            .insert_header(ctx.auth_header())
            .set_json(json!({"id": comment.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(ctx.comments().get_approved_comments(&blog.id).unwrap().len(), 1);

        let req = test::TestRequest::post()
            .uri("/api/admin/delete-comment")
            .insert_header(ctx.auth_header())
            .set_json(json!({"id": comment.id}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["msg"], "Comment has been deleted");
        assert_eq!(ctx.comments().count_comments().unwrap(), 0);

        let req = test::TestRequest::post()
            .uri("/api/admin/approve-comment")
            .insert_header(ctx.auth_header())
            .set_json(json!({"id": comment.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_moderation_requires_id() {
        let ctx = TestContext::new();
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::post()
            .uri("/api/admin/delete-comment")
            .insert_header(ctx.auth_header())
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_dashboard_counts() {
        let ctx = TestContext::new();
        let blogs = ctx.blogs();
        for i in 0..6 {
            blogs.add_blog(sample_blog(&format!("Post {}", i), i < 4)).unwrap();
        }
        let first = blogs.list_blogs(None).unwrap().pop().unwrap();
        ctx.comments()
            .add_comment(CreateCommentRequest {
                blog: first.id,
                name: "n".to_string(),
                content: "c".to_string(),
            })
            .unwrap();
        let app = test::init_service(ctx.app()).await;

        let req = test::TestRequest::get()
            .uri("/api/admin/dashboard")
            .insert_header(ctx.auth_header())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let data = &body["dashboardData"];
        assert_eq!(data["blogs"], 6);
        assert_eq!(data["comments"], 1);
        assert_eq!(data["drafts"], 2);
        assert_eq!(data["recentBlogs"].as_array().unwrap().len(), 5);
        assert_eq!(data["recentBlogs"][0]["title"], "Post 5");
    }
}
