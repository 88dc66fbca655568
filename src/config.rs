use crate::error::GaugesError;
use log::debug;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://secure.gaug.es";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Browser session secrets attached to every upstream request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    cookie: String,
    csrf_token: String,
}

impl Credentials {
    /// Fails when both values are empty; one of them is enough to try.
    pub fn new(
        cookie: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Result<Self, GaugesError> {
        let cookie = cookie.into();
        let csrf_token = csrf_token.into();
        if cookie.is_empty() && csrf_token.is_empty() {
            return Err(GaugesError::MissingCredentials);
        }
        Ok(Self { cookie, csrf_token })
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .finish()
    }
}

/// Values read from a plain-text config file.
///
/// One setting per line, either `name value` or `name = value`. Blank
/// lines and lines starting with `#` are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub cookie: Option<String>,
    pub csrf_token: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, GaugesError> {
        let contents = fs::read_to_string(path).map_err(|source| GaugesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config file {}", path.display());
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, GaugesError> {
        let mut config = ConfigFile::default();
        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = idx + 1;
            let (name, value) = split_setting(line).ok_or_else(|| GaugesError::InvalidConfig {
                line: line_no,
                message: format!("missing value for {line:?}"),
            })?;
            match name {
                "cookie" => config.cookie = Some(value.to_string()),
                "csrf_token" | "csrf-token" => config.csrf_token = Some(value.to_string()),
                "output_dir" | "output-dir" => config.output_dir = Some(PathBuf::from(value)),
                "base_url" | "base-url" => config.base_url = Some(value.to_string()),
                other => {
                    return Err(GaugesError::InvalidConfig {
                        line: line_no,
                        message: format!("unknown setting {other:?}"),
                    });
                }
            }
        }
        Ok(config)
    }
}

fn split_setting(line: &str) -> Option<(&str, &str)> {
    let end = line.find(|c: char| c.is_whitespace() || c == '=')?;
    let (name, rest) = line.split_at(end);
    let value = rest.trim_start().strip_prefix('=').unwrap_or(rest).trim();
    if value.is_empty() {
        return None;
    }
    Some((name, value))
}

/// Settings given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cookie: Option<String>,
    pub csrf_token: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub output_dir: PathBuf,
    pub base_url: String,
}

impl Settings {
    /// Merge overrides over the config file over defaults.
    pub fn resolve(overrides: Overrides, file: Option<ConfigFile>) -> Result<Self, GaugesError> {
        let file = file.unwrap_or_default();
        let cookie = overrides.cookie.or(file.cookie).unwrap_or_default();
        let csrf_token = overrides.csrf_token.or(file.csrf_token).unwrap_or_default();
        let credentials = Credentials::new(cookie, csrf_token)?;

        let output_dir = overrides
            .output_dir
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let base_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            credentials,
            output_dir,
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_config() {
        let config = ConfigFile::parse(
            "# exported from the browser\n\
             cookie _gauges_session=abc123\n\
             \n\
             csrf_token = tok==\n\
             output-dir /tmp/gauges\n",
        )
        .expect("config should parse");
        assert_eq!(config.cookie.as_deref(), Some("_gauges_session=abc123"));
        assert_eq!(config.csrf_token.as_deref(), Some("tok=="));
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/gauges")));
        assert_eq!(config.base_url, None);
    }

    #[test]
    fn rejects_unknown_setting() {
        let err = ConfigFile::parse("cookie abc\ntoken xyz\n").unwrap_err();
        match err {
            GaugesError::InvalidConfig { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_setting_without_value() {
        let err = ConfigFile::parse("cookie\n").unwrap_err();
        assert!(matches!(err, GaugesError::InvalidConfig { line: 1, .. }));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ConfigFile::load(&dir.path().join("absent.conf")).unwrap_err();
        assert!(matches!(err, GaugesError::Io { .. }));
    }

    #[test]
    fn overrides_win_over_config_file() {
        let overrides = Overrides {
            cookie: Some("from-flag".into()),
            ..Default::default()
        };
        let file = ConfigFile {
            cookie: Some("from-file".into()),
            csrf_token: Some("file-token".into()),
            ..Default::default()
        };
        let settings = Settings::resolve(overrides, Some(file)).expect("settings should resolve");
        assert_eq!(settings.credentials.cookie(), "from-flag");
        assert_eq!(settings.credentials.csrf_token(), "file-token");
        assert_eq!(settings.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn missing_both_credentials_fails() {
        let err = Settings::resolve(Overrides::default(), None).unwrap_err();
        assert!(matches!(err, GaugesError::MissingCredentials));

        let empty = Overrides {
            cookie: Some(String::new()),
            csrf_token: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            Settings::resolve(empty, None),
            Err(GaugesError::MissingCredentials)
        ));
    }

    #[test]
    fn one_credential_is_enough() {
        let creds = Credentials::new("", "token").expect("csrf token alone is accepted");
        assert_eq!(creds.cookie(), "");
        assert_eq!(creds.csrf_token(), "token");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = Credentials::new("secret-cookie", "secret-token").unwrap();
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("secret"));
    }
}
