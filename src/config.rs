//! Configuration loader: merges .env, config.toml and environment variables.

use common::{EngineConfig, Error};
use std::path::Path;
use url::Url;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn check_url(issues: &mut Vec<String>, field: &str, raw: &str) {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => issues.push(format!("{field} must be http(s), got scheme '{}'", url.scheme())),
        Err(e) => issues.push(format!("{field} is not a valid URL ({raw}): {e}")),
    }
}

fn validate_config(config: &EngineConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    let sources = &config.sources;
    if sources.user_agent.trim().is_empty() {
        issues.push("sources.user_agent must not be empty".into());
    }
    if sources.attempt_timeout_secs == 0 {
        issues.push("sources.attempt_timeout_secs must be > 0".into());
    }
    if sources.nitter_instances.is_empty() {
        issues.push("sources.nitter_instances must contain at least one instance".into());
    }
    for (i, instance) in sources.nitter_instances.iter().enumerate() {
        check_url(&mut issues, &format!("sources.nitter_instances[{i}]"), instance);
    }
    if sources.forums.iter().any(|f| f.trim().is_empty() || f.contains('/')) {
        issues.push("sources.forums must be bare forum names".into());
    }
    check_url(&mut issues, "sources.community_base_url", &sources.community_base_url);
    check_url(&mut issues, "sources.news_base_url", &sources.news_base_url);

    let polymarket = &config.polymarket;
    check_url(&mut issues, "polymarket.base_url", &polymarket.base_url);
    if polymarket.default_limit == 0 {
        issues.push("polymarket.default_limit must be > 0".into());
    }
    if polymarket.reads_per_sec == 0 {
        issues.push("polymarket.reads_per_sec must be > 0".into());
    }
    if polymarket.request_timeout_secs == 0 {
        issues.push("polymarket.request_timeout_secs must be > 0".into());
    }

    if config.evaluation.max_concurrent_evaluations == 0 {
        issues.push("evaluation.max_concurrent_evaluations must be > 0".into());
    }
    if config.evaluation.max_markets == 0 {
        issues.push("evaluation.max_markets must be > 0".into());
    }
    if polymarket.default_limit > config.evaluation.max_markets {
        issues.push("polymarket.default_limit must be <= evaluation.max_markets".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply environment overrides. `lookup` is `std::env::var` outside tests.
fn apply_env_overrides<F>(config: &mut EngineConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("POLYMARKET_API_URL") {
        config.polymarket.base_url = url.trim().to_string();
    }
    if let Some(key) = lookup("POLYMARKET_API_KEY") {
        config.polymarket.api_key = key;
    }
    if let Some(raw) = lookup("ORAKEL_ATTEMPT_TIMEOUT_SECS") {
        config.sources.attempt_timeout_secs = parse_positive_u64(&raw, "ORAKEL_ATTEMPT_TIMEOUT_SECS")?;
    }
    if let Some(raw) = lookup("ORAKEL_NITTER_INSTANCES") {
        let instances = parse_list(&raw);
        if instances.is_empty() {
            return Err(Error::Config(
                "ORAKEL_NITTER_INSTANCES must list at least one instance".into(),
            ));
        }
        config.sources.nitter_instances = instances;
    }
    if let Some(raw) = lookup("ORAKEL_MAX_CONCURRENCY") {
        config.evaluation.max_concurrent_evaluations =
            parse_positive_u64(&raw, "ORAKEL_MAX_CONCURRENCY")? as usize;
    }
    if let Some(raw) = lookup("ORAKEL_MARKET_CACHE_TTL_SECS") {
        config.cache.market_list_ttl_secs = parse_positive_u64(&raw, "ORAKEL_MARKET_CACHE_TTL_SECS")?;
    }

    Ok(())
}

/// Load engine configuration from environment and optional config file.
pub fn load_config(path: &Path) -> Result<EngineConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = EngineConfig::default();

    // 3. Try loading the config file if it exists.
    if path.exists() {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = EngineConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("POLYMARKET_API_URL", " https://gamma.internal "),
                ("POLYMARKET_API_KEY", "secret"),
                ("ORAKEL_ATTEMPT_TIMEOUT_SECS", "3"),
                ("ORAKEL_NITTER_INSTANCES", "https://a.example, ,https://b.example"),
                ("ORAKEL_MAX_CONCURRENCY", "4"),
                ("ORAKEL_MARKET_CACHE_TTL_SECS", "120"),
            ]),
        )
        .unwrap();

        assert_eq!(config.polymarket.base_url, "https://gamma.internal");
        assert_eq!(config.polymarket.api_key, "secret");
        assert_eq!(config.sources.attempt_timeout_secs, 3);
        assert_eq!(
            config.sources.nitter_instances,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.evaluation.max_concurrent_evaluations, 4);
        assert_eq!(config.cache.market_list_ttl_secs, 120);
    }

    #[test]
    fn test_bad_env_values_rejected() {
        let mut config = EngineConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("ORAKEL_ATTEMPT_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("ORAKEL_ATTEMPT_TIMEOUT_SECS"));

        assert!(apply_env_overrides(&mut config, env(&[("ORAKEL_MAX_CONCURRENCY", "many")])).is_err());
        assert!(apply_env_overrides(&mut config, env(&[("ORAKEL_NITTER_INSTANCES", " , ")])).is_err());
    }

    #[test]
    fn test_validation_collects_all_issues() {
        let mut config = EngineConfig::default();
        config.sources.attempt_timeout_secs = 0;
        config.sources.news_base_url = "not a url".into();
        config.polymarket.base_url = "ftp://gamma.example".into();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.starts_with("Config error: Invalid config:"));
        assert!(message.contains("sources.attempt_timeout_secs must be > 0"));
        assert!(message.contains("sources.news_base_url is not a valid URL"));
        assert!(message.contains("polymarket.base_url must be http(s)"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [sources]
            attempt_timeout_secs = 8

            [evaluation]
            max_concurrent_evaluations = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.sources.attempt_timeout_secs, 8);
        assert_eq!(config.sources.nitter_instances.len(), 4);
        assert_eq!(config.evaluation.max_concurrent_evaluations, 2);
        assert_eq!(config.cache.market_list_ttl_secs, 60);
        assert!(validate_config(&config).is_ok());
    }
}
