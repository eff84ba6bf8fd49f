//! Config loading and effective SMTP resolution.

use crate::error::ConfigError;
use crate::models::config::Config;
use crate::models::smtp::{SmtpSettings, SmtpSource, StoredSmtpSettings};
use std::fs;
use std::path::Path;

/// Load and validate the config file at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Like [`load`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file absent, using defaults");
        return Ok(Config::default());
    }
    load(path)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.app.store_path.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "app.store_path",
            reason: "must not be empty".into(),
        });
    }
    if let Some(smtp) = &config.smtp {
        if smtp.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "smtp.host",
                reason: "must not be empty".into(),
            });
        }
        if smtp.port == 0 {
            return Err(ConfigError::Invalid {
                field: "smtp.port",
                reason: "must be between 1 and 65535".into(),
            });
        }
        if smtp.from_email.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "smtp.from_email",
                reason: "must not be empty".into(),
            });
        }
    }
    Ok(())
}

/// Pick the SMTP settings a run should use: complete store-held settings win,
/// otherwise the static config section.
pub fn resolve_smtp(
    static_smtp: Option<&SmtpSettings>,
    stored: Option<&StoredSmtpSettings>,
) -> Result<(SmtpSettings, SmtpSource), ConfigError> {
    if let Some(settings) = stored.and_then(StoredSmtpSettings::complete) {
        return Ok((settings, SmtpSource::Store));
    }
    static_smtp
        .cloned()
        .map(|settings| (settings, SmtpSource::Config))
        .ok_or(ConfigError::MissingSmtp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;
    use tempfile::TempDir;

    fn static_smtp() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.static.example".into(),
            port: 587,
            username: "static".into(),
            password: "static-pw".into(),
            use_tls: true,
            from_email: "static@example.com".into(),
        }
    }

    fn stored_full() -> StoredSmtpSettings {
        StoredSmtpSettings {
            host: Some("smtp.dynamic.example".into()),
            port: Some(465),
            username: Some("dynamic".into()),
            password: Some("dynamic-pw".into()),
            use_tls: Some(false),
            from_email: Some("dynamic@example.com".into()),
        }
    }

    #[test]
    fn test_complete_store_settings_win() {
        let stat = static_smtp();
        let stored = stored_full();
        let (settings, source) = resolve_smtp(Some(&stat), Some(&stored)).unwrap();
        assert_eq!(source, SmtpSource::Store);
        assert_eq!(settings.host, "smtp.dynamic.example");
        assert_eq!(settings.port, 465);
        assert!(!settings.use_tls);
    }

    #[test]
    fn test_partial_store_settings_fall_back() {
        let stat = static_smtp();
        let mut stored = stored_full();
        stored.from_email = None;
        let (settings, source) = resolve_smtp(Some(&stat), Some(&stored)).unwrap();
        assert_eq!(source, SmtpSource::Config);
        assert_eq!(settings, stat);
    }

    #[test]
    fn test_store_only() {
        let stored = stored_full();
        let (_, source) = resolve_smtp(None, Some(&stored)).unwrap();
        assert_eq!(source, SmtpSource::Store);
    }

    #[test]
    fn test_nothing_configured() {
        let err = resolve_smtp(None, Some(&StoredSmtpSettings::default())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSmtp));
        assert!(matches!(resolve_smtp(None, None), Err(ConfigError::MissingSmtp)));
    }

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("certmon.toml");
        fs::write(
            &path,
            r#"
[app]
store_path = "/var/lib/certmon/store.toml"
reminder_window_days = 14

[smtp]
host = "smtp.example.com"
port = 465
username = "u"
password = "p"
use_tls = false
from_email = "certmon@example.com"
"#,
        )
        .unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.app.reminder_window_days, 14);
        assert_eq!(config.app.store_path, "/var/lib/certmon/store.toml");
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.port, 465);
        assert!(!smtp.use_tls);
    }

    #[test]
    fn test_defaults_apply() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("certmon.toml");
        fs::write(
            &path,
            r#"
[smtp]
host = "smtp.example.com"
username = "u"
password = "p"
from_email = "certmon@example.com"
"#,
        )
        .unwrap();
        let config = load(&path).unwrap();
        assert_eq!(
            config.app.reminder_window_days,
            constants::DEFAULT_REMINDER_WINDOW_DAYS
        );
        assert_eq!(config.app.store_path, constants::DEFAULT_STORE_PATH);
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.port, constants::DEFAULT_SMTP_PORT);
        assert!(smtp.use_tls);
    }

    #[test]
    fn test_missing_file_is_default_for_lenient_load() {
        let dir = TempDir::new().unwrap();
        let config = load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert!(config.smtp.is_none());
        assert!(matches!(
            load(&dir.path().join("absent.toml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_incomplete_smtp_section_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("certmon.toml");
        fs::write(&path, "[smtp]\nhost = \"smtp.example.com\"\n").unwrap();
        assert!(matches!(load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_rejects_zero_port() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("certmon.toml");
        fs::write(
            &path,
            "[smtp]\nhost = \"h\"\nport = 0\nusername = \"u\"\npassword = \"p\"\nfrom_email = \"f@x\"\n",
        )
        .unwrap();
        assert!(matches!(
            load(&path),
            Err(ConfigError::Invalid { field: "smtp.port", .. })
        ));
    }
}
