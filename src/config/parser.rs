use crate::config::types::ScanConfig;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads scan settings from a TOML file
///
/// Missing keys fall back to the defaults of [`ScanConfig`]. The result is not
/// validated here because command-line flags are usually layered on top; call
/// [`crate::config::validate`] on the effective configuration.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use paraxm::config::load_config;
///
/// let config = load_config(Path::new("scan.toml")).unwrap();
/// println!("Max depth: {}", config.depth);
/// ```
pub fn load_config(path: &Path) -> Result<ScanConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses scan settings from TOML text
pub fn parse_config(content: &str) -> Result<ScanConfig, ConfigError> {
    let config: ScanConfig = toml::from_str(content)?;
    Ok(config)
}

/// Computes a SHA-256 fingerprint of the settings that shape a scan
///
/// Output paths are left out so that the same scan written to different
/// files keeps the same fingerprint.
pub fn compute_config_hash(config: &ScanConfig) -> String {
    let canonical = format!(
        "target={}\ndepth={}\nthreads={}\nrate-limit={}\ntimeout={}\nproxy={}\nmax-retries={}\nfollow-redirects={}\nretry-backoff-ms={}\nuser-agents={}",
        config.target,
        config.depth,
        config.threads,
        config.rate_limit,
        config.timeout,
        config.proxy.as_deref().unwrap_or(""),
        config.max_retries,
        config.follow_redirects,
        config.retry_backoff_ms,
        config.user_agents.join("\u{1f}"),
    );

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
target = "https://example.com"
depth = 3
threads = 20
rate-limit = 2.5
timeout = 15
max-retries = 1
follow-redirects = false
user-agents = ["TestAgent/1.0"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.target, "https://example.com");
        assert_eq!(config.depth, 3);
        assert_eq!(config.threads, 20);
        assert!((config.rate_limit - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.timeout, 15);
        assert_eq!(config.max_retries, 1);
        assert!(!config.follow_redirects);
        assert_eq!(config.user_agents, vec!["TestAgent/1.0".to_string()]);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = parse_config("depth = 5\n").unwrap();
        assert_eq!(config.depth, 5);
        assert_eq!(config.threads, 10);
        assert_eq!(config.max_retries, 2);
        assert!(config.target.is_empty());
        assert!(!config.user_agents.is_empty());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/scan.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_hash_is_stable() {
        let config = ScanConfig::new("https://example.com");
        let hash1 = compute_config_hash(&config);
        let hash2 = compute_config_hash(&config.clone());
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_config_hash_ignores_output_paths() {
        let config = ScanConfig::new("https://example.com");
        let mut with_output = config.clone();
        with_output.output_file = Some("out.txt".to_string());
        assert_eq!(compute_config_hash(&config), compute_config_hash(&with_output));
    }

    #[test]
    fn test_different_settings_different_hash() {
        let config = ScanConfig::new("https://example.com");
        let mut deeper = config.clone();
        deeper.depth = 4;
        assert_ne!(compute_config_hash(&config), compute_config_hash(&deeper));
    }
}
