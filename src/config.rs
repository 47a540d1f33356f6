/// Configuration management
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database_url: String,
    /// HMAC secret for signing session tokens
    pub jwt_secret: String,
    /// Shared secret required to self-register as organizer or admin;
    /// unset means those roles can only be created by an admin
    #[serde(default)]
    pub role_secret: Option<String>,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: String,
    /// Initial password for accounts created through the admin panel
    #[serde(default = "default_user_password")]
    pub default_user_password: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_cors_allowed_origins() -> String {
    "*".to_string()
}

fn default_user_password() -> String {
    "Password@123".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
