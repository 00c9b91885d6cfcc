use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. When absent the in-memory store is used.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub items_per_page: u32,
    pub max_items_per_page: u32,
    pub max_request_size_bytes: usize,
    pub enable_seed_endpoint: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub allow_registration: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub api_url: String,
    /// Empty means demo mode: curated payloads, no outbound calls.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_secs: u64,
    pub max_new_tokens: u32,
}

const DEFAULT_AI_API_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("testing") | Ok("test") => Environment::Testing,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Testing => Self::testing(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Some(v) = env::var("CIVIC_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ITEMS_PER_PAGE") {
            self.api.items_per_page = v.parse().unwrap_or(self.api.items_per_page);
        }
        if let Ok(v) = env::var("API_MAX_ITEMS_PER_PAGE") {
            self.api.max_items_per_page = v.parse().unwrap_or(self.api.max_items_per_page);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_ENABLE_SEED_ENDPOINT") {
            self.api.enable_seed_endpoint = v.parse().unwrap_or(self.api.enable_seed_endpoint);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_TOKEN_MINUTES") {
            self.security.access_token_minutes = v.parse().unwrap_or(self.security.access_token_minutes);
        }
        if let Ok(v) = env::var("JWT_REFRESH_TOKEN_DAYS") {
            self.security.refresh_token_days = v.parse().unwrap_or(self.security.refresh_token_days);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_ALLOW_REGISTRATION") {
            self.security.allow_registration = v.parse().unwrap_or(self.security.allow_registration);
        }

        // AI overrides
        if let Ok(v) = env::var("AI_API_URL") {
            self.ai.api_url = v;
        }
        if let Ok(v) = env::var("AI_API_KEY") {
            self.ai.api_key = v.trim().to_string();
        }
        if let Ok(v) = env::var("AI_TIMEOUT_SECS") {
            self.ai.timeout_secs = v.parse().unwrap_or(self.ai.timeout_secs);
        }
        if let Ok(v) = env::var("AI_MAX_NEW_TOKENS") {
            self.ai.max_new_tokens = v.parse().unwrap_or(self.ai.max_new_tokens);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 5000,
                items_per_page: 20,
                max_items_per_page: 100,
                max_request_size_bytes: 16 * 1024 * 1024, // 16MB
                enable_seed_endpoint: true,
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "jwt-secret-key-change-in-production".to_string(),
                access_token_minutes: 60,
                refresh_token_days: 7,
                allow_registration: true,
            },
            ai: AiConfig {
                api_url: DEFAULT_AI_API_URL.to_string(),
                api_key: String::new(),
                timeout_secs: 30,
                max_new_tokens: 2000,
            },
        }
    }

    fn testing() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Testing;
        config.database.run_migrations = true;
        config.security.jwt_secret = "testing-secret".to_string();
        config
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 5000,
                items_per_page: 20,
                max_items_per_page: 100,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                enable_seed_endpoint: false,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                access_token_minutes: 60,
                refresh_token_days: 7,
                allow_registration: false,
            },
            ai: AiConfig {
                api_url: DEFAULT_AI_API_URL.to_string(),
                api_key: String::new(),
                timeout_secs: 30,
                max_new_tokens: 2000,
            },
        }
    }

    /// Clamp a requested page size to the configured bounds
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.api.items_per_page)
            .clamp(1, self.api.max_items_per_page.max(1))
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.api.enable_seed_endpoint);
        assert!(config.security.allow_registration);
        assert!(config.database.url.is_none());
        assert_eq!(config.security.access_token_minutes, 60);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.api.enable_seed_endpoint);
        assert!(!config.security.allow_registration);
        assert!(config.security.jwt_secret.is_empty());
    }

    #[test]
    fn page_size_is_clamped() {
        let config = AppConfig::development();
        assert_eq!(config.page_size(None), 20);
        assert_eq!(config.page_size(Some(0)), 1);
        assert_eq!(config.page_size(Some(5000)), 100);
    }
}
