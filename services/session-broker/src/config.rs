//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The OIDC client secret is loaded from the OIDC_CLIENT_SECRET env var or
//! `provider.client_secret_file`, never stored in the TOML directly to
//! avoid leaking secrets.

use common::Secret;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub store: StoreConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Identity provider realm and client registration
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Provider base URL, e.g. "https://id.example.com"
    pub base_url: String,
    pub realm: String,
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret>,
    /// Path to a file containing the client secret (alternative to the
    /// OIDC_CLIENT_SECRET env var)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    /// Callback URL registered with the provider
    pub redirect_uri: String,
    /// Upper bound on any single provider call; a slow provider surfaces
    /// as "unreachable" rather than hanging a login
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

/// Session store settings
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Redis connection URL, e.g. "redis://127.0.0.1:6379"
    pub redis_url: String,
}

fn default_provider_timeout() -> u64 {
    10
}

fn default_max_connections() -> usize {
    1000
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment
    /// variables.
    ///
    /// Client secret resolution order:
    /// 1. OIDC_CLIENT_SECRET env var
    /// 2. client_secret_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if !config.provider.base_url.starts_with("http://")
            && !config.provider.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "provider.base_url must start with http:// or https://, got: {}",
                config.provider.base_url
            )));
        }

        if config.provider.timeout_secs == 0 {
            return Err(common::Error::Config(
                "provider.timeout_secs must be greater than 0".into(),
            ));
        }

        if config.server.max_connections == 0 {
            return Err(common::Error::Config(
                "server.max_connections must be greater than 0".into(),
            ));
        }

        if !config.store.redis_url.starts_with("redis://")
            && !config.store.redis_url.starts_with("rediss://")
        {
            return Err(common::Error::Config(format!(
                "store.redis_url must start with redis:// or rediss://, got: {}",
                config.store.redis_url
            )));
        }

        config.provider.client_secret = Secret::from_env_or_file(
            "OIDC_CLIENT_SECRET",
            config.provider.client_secret_file.as_deref(),
        )?;
        if config.provider.client_secret.is_none() {
            return Err(common::Error::Config(
                "provider client secret missing: set OIDC_CLIENT_SECRET or provider.client_secret_file"
                    .into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("session-broker.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables,
    /// preventing data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn valid_toml() -> &'static str {
        r#"
[server]
listen_addr = "127.0.0.1:8080"

[provider]
base_url = "https://id.example.com"
realm = "demo"
client_id = "web-app"
redirect_uri = "http://localhost:8080/auth/callback"

[store]
redis_url = "redis://127.0.0.1:6379"
"#
    }

    fn write_config(dir_name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_valid_config_with_env_secret() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let path = write_config("session-broker-test-valid", valid_toml());

        unsafe { set_env("OIDC_CLIENT_SECRET", "kc-secret") };
        let config = Config::load(&path).unwrap();
        unsafe { remove_env("OIDC_CLIENT_SECRET") };

        assert_eq!(config.provider.realm, "demo");
        assert_eq!(config.provider.client_id, "web-app");
        assert_eq!(config.provider.timeout_secs, 10);
        assert_eq!(config.server.max_connections, 1000);
        assert_eq!(
            config.provider.client_secret.unwrap().expose(),
            "kc-secret"
        );
    }

    #[test]
    fn load_fails_without_any_secret() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let path = write_config("session-broker-test-nosecret", valid_toml());

        unsafe { remove_env("OIDC_CLIENT_SECRET") };
        let err = Config::load(&path).unwrap_err();
        assert!(
            err.to_string().contains("client secret missing"),
            "got: {err}"
        );
    }

    #[test]
    fn secret_file_is_a_fallback() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = std::env::temp_dir().join("session-broker-test-secretfile");
        std::fs::create_dir_all(&dir).unwrap();
        let secret_path = dir.join("client_secret");
        std::fs::write(&secret_path, "from-file\n").unwrap();

        let toml_contents = format!(
            r#"
[server]
listen_addr = "127.0.0.1:8080"

[provider]
base_url = "https://id.example.com"
realm = "demo"
client_id = "web-app"
client_secret_file = "{}"
redirect_uri = "http://localhost:8080/auth/callback"

[store]
redis_url = "redis://127.0.0.1:6379"
"#,
            secret_path.display()
        );
        let path = dir.join("config.toml");
        std::fs::write(&path, toml_contents).unwrap();

        unsafe { remove_env("OIDC_CLIENT_SECRET") };
        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.provider.client_secret.unwrap().expose(),
            "from-file"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_fails() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_invalid_toml_fails() {
        let path = write_config("session-broker-test-badtoml", "not valid {{{{ toml");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn rejects_non_http_provider_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let contents = valid_toml().replace("https://id.example.com", "ldap://id.example.com");
        let path = write_config("session-broker-test-badurl", &contents);

        unsafe { set_env("OIDC_CLIENT_SECRET", "kc-secret") };
        let err = Config::load(&path).unwrap_err();
        unsafe { remove_env("OIDC_CLIENT_SECRET") };

        assert!(err.to_string().contains("base_url"), "got: {err}");
    }

    #[test]
    fn rejects_non_redis_store_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let contents = valid_toml().replace("redis://127.0.0.1:6379", "http://127.0.0.1:6379");
        let path = write_config("session-broker-test-badstore", &contents);

        unsafe { set_env("OIDC_CLIENT_SECRET", "kc-secret") };
        let err = Config::load(&path).unwrap_err();
        unsafe { remove_env("OIDC_CLIENT_SECRET") };

        assert!(err.to_string().contains("redis_url"), "got: {err}");
    }

    #[test]
    fn rejects_zero_timeout() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let contents = valid_toml().replace(
            "redirect_uri",
            "timeout_secs = 0\nredirect_uri",
        );
        let path = write_config("session-broker-test-zerotimeout", &contents);

        unsafe { set_env("OIDC_CLIENT_SECRET", "kc-secret") };
        let err = Config::load(&path).unwrap_err();
        unsafe { remove_env("OIDC_CLIENT_SECRET") };

        assert!(err.to_string().contains("timeout_secs"), "got: {err}");
    }

    #[test]
    fn resolve_path_prefers_cli_arg() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/from/env.toml") };
        assert_eq!(
            Config::resolve_path(Some("/from/cli.toml")),
            PathBuf::from("/from/cli.toml")
        );
        assert_eq!(Config::resolve_path(None), PathBuf::from("/from/env.toml"));
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(
            Config::resolve_path(None),
            PathBuf::from("session-broker.toml")
        );
    }
}
