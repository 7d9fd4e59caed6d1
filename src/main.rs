mod modules;

use modules::cli::{self, Cli, Commands};
use modules::config;
use modules::error;
use modules::database::{blogs, comments, schema};
use modules::services::{gemini, imagekit};
use modules::web::{admin, auth, blog, routes};
#[cfg(test)]
use modules::web::test_support;

use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use config::Config;
use gemini::{ContentGenerator, Gemini};
use imagekit::{ImageHost, ImageKit};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

fn main() -> std::io::Result<()> {
    let args = Cli::parse();

    match args.command {
        Some(Commands::InitConfig { force }) => {
            if let Err(e) = cli::init_config(&args.config, force) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Serve) | None => actix_web::rt::System::new().block_on(run_server(&args.config)),
    }
}

async fn run_server(config_path: &Path) -> std::io::Result<()> {
    // .env first so it can also carry RUST_LOG
    let dotenv_result = dotenvy::dotenv();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Quill Blog...");

    if let Err(e) = dotenv_result {
        if !e.not_found() {
            warn!("Failed to read .env file: {}", e);
        }
    }

    let config = Config::load(config_path).unwrap_or_else(|e| {
        eprintln!("Failed to load config {}: {}", config_path.display(), e);
        std::process::exit(1);
    });

    if config.admin.jwt_secret.is_empty() {
        eprintln!("JWT_SECRET is not set; refusing to start");
        std::process::exit(1);
    }
    if config.admin.password.is_empty() {
        warn!("ADMIN_PASSWORD is not set; admin login is disabled");
    }
    if config.imagekit.private_key.is_empty() {
        warn!("ImageKit is not configured; blog creation will fail");
    }
    if config.gemini.api_key.is_empty() {
        warn!("Gemini is not configured; draft generation will fail");
    }

    // Create tables up front so a bad database path fails at startup
    if let Err(e) = schema::open(&config.database_path()) {
        eprintln!("Failed to open database {}: {}", config.database_path(), e);
        std::process::exit(1);
    }
    info!("Database: {}", config.paths.database_path.display());

    let client = reqwest::Client::new();
    let images: Arc<dyn ImageHost> = Arc::new(ImageKit::new(client.clone(), config.imagekit.clone()));
    let generator: Arc<dyn ContentGenerator> = Arc::new(Gemini::new(client, config.gemini.clone()));
    let images = web::Data::from(images);
    let generator = web::Data::from(generator);

    let bind_address = (config.server.host.clone(), config.server.port);
    info!("Server starting on http://{}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(images.clone())
            .app_data(generator.clone())
            .app_data(routes::json_config())
            .wrap(routes::cors())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
