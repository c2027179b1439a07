//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the principal and inventory directory
//! - Bind the listener once everything else is ready

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{ConfigError, GateConfig};
use crate::store::{Directory, Fixtures};

/// Directory from `fixtures_path`, or the built-in demo data when unset.
pub fn load_directory(config: &GateConfig) -> Result<Arc<Directory>, ConfigError> {
    let directory = match &config.fixtures_path {
        Some(path) => {
            let directory = Directory::load_from_file(Path::new(path))?;
            tracing::info!(path = %path, "Fixtures loaded");
            directory
        }
        None => {
            tracing::info!("No fixtures configured, using demo data");
            Directory::from_fixtures(Fixtures::demo())?
        }
    };
    Ok(Arc::new(directory))
}

/// Bind the configured listener address.
pub async fn bind_listener(config: &GateConfig) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_data_when_no_fixtures_configured() {
        let config = GateConfig::default();
        let directory = load_directory(&config).unwrap();
        assert!(directory.user(42).is_some());
    }

    #[test]
    fn missing_fixtures_file_is_an_error() {
        let mut config = GateConfig::default();
        config.fixtures_path = Some("/nonexistent/fixtures.json".into());
        assert!(matches!(load_directory(&config), Err(ConfigError::Io(_))));
    }

    #[test]
    fn out_of_range_fixture_id_is_an_error() {
        let path = std::env::temp_dir().join(format!("header-gate-fixtures-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"items":[{"id":18446744073709551615,"name":"x","quantity":1,"department":"d"}]}"#,
        )
        .unwrap();

        let mut config = GateConfig::default();
        config.fixtures_path = Some(path.to_string_lossy().into_owned());
        let result = load_directory(&config);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::InvalidFixture(_))));
    }

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let mut config = GateConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        let listener = bind_listener(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
