use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "quill_blog.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub paths: PathConfig,
    pub imagekit: ImageKitConfig,
    pub gemini: GeminiConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Static admin credentials plus the secret used to sign session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub database_path: PathBuf, // blogs + comments
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageKitConfig {
    pub public_key: String,
    pub private_key: String,
    pub url_endpoint: String,
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_image_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@example.com".to_string(),
            password: String::new(),
            jwt_secret: String::new(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("quill_blog.db"),
        }
    }
}

impl Default for ImageKitConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            private_key: String::new(),
            url_endpoint: String::new(),
            upload_url: "https://upload.imagekit.io/api/v1/files/upload".to_string(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load the TOML file at `path` (defaults when absent), then apply
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with the environment replaced by `lookup`.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<Config>(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(lookup)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay values from an environment-like lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| format!("invalid PORT '{}': {}", port, e))?;
        }

        let string_overrides: [(&str, &mut String); 9] = [
            ("ADMIN_EMAIL", &mut self.admin.email),
            ("ADMIN_PASSWORD", &mut self.admin.password),
            ("JWT_SECRET", &mut self.admin.jwt_secret),
            ("IMAGEKIT_PUBLIC_KEY", &mut self.imagekit.public_key),
            ("IMAGEKIT_PRIVATE_KEY", &mut self.imagekit.private_key),
            ("IMAGEKIT_URL_ENDPOINT", &mut self.imagekit.url_endpoint),
            ("GEMINI_API_KEY", &mut self.gemini.api_key),
            ("GEMINI_MODEL", &mut self.gemini.model),
            ("GEMINI_ENDPOINT", &mut self.gemini.endpoint),
        ];
        for (key, slot) in string_overrides {
            if let Some(value) = lookup(key) {
                *slot = value;
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            self.paths.database_path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn database_path(&self) -> String {
        self.paths.database_path.to_string_lossy().to_string()
    }
}
