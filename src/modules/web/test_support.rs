//! In-process fakes and an app builder for handler tests.

use crate::auth;
use crate::blogs::BlogDB;
use crate::comments::CommentDB;
use crate::config::{AdminConfig, Config};
use crate::error::ServiceError;
use crate::gemini::ContentGenerator;
use crate::imagekit::{transformed_url, ImageHost, UploadedImage, OPTIMIZE_TRANSFORM};
use crate::routes;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "quill-test-boundary";

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub file_name: String,
    pub folder: String,
    pub size: usize,
}

#[derive(Default)]
pub struct FakeImageHost {
    pub uploads: Mutex<Vec<RecordedUpload>>,
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(
        &self,
        file: Vec<u8>,
        file_name: &str,
        folder: &str,
    ) -> Result<UploadedImage, ServiceError> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            file_name: file_name.to_string(),
            folder: folder.to_string(),
            size: file.len(),
        });
        Ok(UploadedImage {
            file_id: format!("fake-{}", file_name),
            file_path: format!("{}/{}", folder, file_name),
        })
    }

    fn optimized_url(&self, file_path: &str) -> String {
        transformed_url("https://img.test", file_path, OPTIMIZE_TRANSFORM)
    }
}

/// Echoes the prompt back with a `DRAFT: ` prefix.
#[derive(Default)]
pub struct FakeGenerator {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!("DRAFT: {}", prompt))
    }
}

/// A temporary database plus fakes for the external services.
pub struct TestContext {
    _dir: tempfile::TempDir,
    pub config: Config,
    pub images: Arc<FakeImageHost>,
    pub generator: Arc<FakeGenerator>,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.database_path = dir.path().join("quill_test.db");
        config.admin = AdminConfig {
            email: "admin@quill.test".to_string(),
            password: "correct horse".to_string(),
            jwt_secret: "test-signing-secret".to_string(),
        };

        Self {
            _dir: dir,
            config,
            images: Arc::new(FakeImageHost::default()),
            generator: Arc::new(FakeGenerator::default()),
        }
    }

    pub fn blogs(&self) -> BlogDB {
        BlogDB::new(&self.config.database_path()).unwrap()
    }

    pub fn comments(&self) -> CommentDB {
        CommentDB::new(&self.config.database_path()).unwrap()
    }

    pub fn auth_header(&self) -> (&'static str, String) {
        let token = auth::issue_token(&self.config.admin, &self.config.admin.email).unwrap();
        ("Authorization", format!("Bearer {}", token))
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<EitherBody<BoxBody>>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let images: Arc<dyn ImageHost> = self.images.clone();
        let generator: Arc<dyn ContentGenerator> = self.generator.clone();

        App::new()
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::from(images))
            .app_data(web::Data::from(generator))
            .app_data(routes::json_config())
            .configure(routes::configure_routes)
            .wrap(routes::cors())
    }
}

/// Build a `multipart/form-data` body delimited by [`BOUNDARY`].
pub fn multipart_body(blog_json: Option<&str>, image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(json) = blog_json {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"blog\"\r\n\r\n{}\r\n",
                BOUNDARY, json
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, content_type, data)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
