use crate::config::types::ScanConfig;
use crate::ConfigError;
use std::path::Path;

/// Validates the effective scan configuration
///
/// All problems are collected; the returned error lists every one of them.
pub fn validate(config: &ScanConfig) -> Result<(), ConfigError> {
    let errors = validation_errors(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.join("; ")))
    }
}

/// Returns every validation problem found in the configuration
pub fn validation_errors(config: &ScanConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if let Err(e) = validate_target(&config.target) {
        errors.push(e);
    }

    for path in [&config.output_file, &config.summary_file, &config.database]
        .into_iter()
        .flatten()
    {
        if let Err(e) = validate_output_path(path) {
            errors.push(e);
        }
    }

    if config.threads < 1 || config.threads > 100 {
        errors.push("Threads must be between 1 and 100".to_string());
    }

    if config.rate_limit < 0.0 || config.rate_limit.is_nan() {
        errors.push("Rate limit must be greater than or equal to 0".to_string());
    }

    if config.timeout < 1 || config.timeout > 60 {
        errors.push("Timeout must be between 1 and 60 seconds".to_string());
    }

    if let Some(proxy) = &config.proxy {
        if let Err(e) = validate_proxy(proxy) {
            errors.push(e);
        }
    }

    if config.max_retries > 10 {
        errors.push("Max retries must be between 0 and 10".to_string());
    }

    if config.user_agents.is_empty() {
        errors.push("User-agent pool cannot be empty".to_string());
    }

    errors
}

/// Validates the target URL
fn validate_target(target: &str) -> Result<(), String> {
    if target.is_empty() {
        return Err("Target URL is required".to_string());
    }

    if !target.starts_with("http://") && !target.starts_with("https://") {
        return Err("Target URL must start with http:// or https://".to_string());
    }

    url::Url::parse(target)
        .map_err(|e| format!("Target URL is malformed: {}", e))?
        .host_str()
        .ok_or_else(|| "Target URL has no host".to_string())?;

    Ok(())
}

/// Validates that the parent directory of an output path exists
fn validate_output_path(path: &str) -> Result<(), String> {
    let parent = match Path::new(path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };

    if parent.exists() {
        Ok(())
    } else {
        Err(format!("Output directory {} does not exist", parent.display()))
    }
}

/// Validates the proxy scheme
fn validate_proxy(proxy: &str) -> Result<(), String> {
    if proxy.is_empty()
        || proxy.starts_with("http://")
        || proxy.starts_with("https://")
        || proxy.starts_with("socks5://")
    {
        Ok(())
    } else {
        Err(
            "Proxy must be in format http://host:port, https://host:port or socks5://host:port"
                .to_string(),
        )
    }
}
