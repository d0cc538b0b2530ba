//! Application configuration
//!
//! Everything comes from environment variables with development
//! defaults, so a bare `cargo run` works against a local stack.

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    pub bind_addr: String,
    /// Base URL of the document store (PostgREST-compatible)
    pub store_url: String,
    /// API key sent on every store request
    pub store_api_key: String,
    /// Path to the analysis engine executable
    pub engine_path: String,
    /// Hard ceiling on one engine invocation, in seconds
    pub engine_timeout_secs: u64,
    /// Directory report artifacts are written to
    pub reports_dir: String,
    /// Baseline requests per minute per client
    pub rate_limit_rpm: u32,
    /// Project path prefixes analysis may be run against; empty = any
    pub allowed_project_paths: Vec<String>,
    /// "development" | "staging" | "production"
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!(
                "0.0.0.0:{}",
                std::env::var("PORT").unwrap_or_else(|_| "8080".to_string())
            ),
            store_url: std::env::var("STORE_URL")
                .unwrap_or_else(|_| "http://localhost:54321".to_string()),
            store_api_key: std::env::var("STORE_API_KEY")
                .unwrap_or_else(|_| "development-key".to_string()),
            engine_path: std::env::var("ENGINE_PATH")
                .unwrap_or_else(|_| "./analysis-engine/analysis-engine".to_string()),
            engine_timeout_secs: env_u64("ENGINE_TIMEOUT_SECONDS", 300),
            reports_dir: std::env::var("REPORTS_DIR").unwrap_or_else(|_| "./reports".to_string()),
            rate_limit_rpm: env_u32("RATE_LIMIT_REQUESTS_PER_MINUTE", 60),
            allowed_project_paths: env_list(
                "ALLOWED_PROJECT_PATHS",
                &["/home", "/Users", "/workspace"],
            ),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid integer for {}: {:?}, using default {}", key, value, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid integer for {}: {:?}, using default {}", key, value, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(value) => {
            let parts: Vec<String> = split_list(&value);
            if parts.is_empty() {
                default.iter().map(|s| s.to_string()).collect()
            } else {
                parts
            }
        }
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parsing_trims_and_drops_empties() {
        assert_eq!(
            split_list(" /home , /workspace ,, "),
            vec!["/home".to_string(), "/workspace".to_string()]
        );
        assert!(split_list("  ,, ").is_empty());
    }
}
