//! INI configuration for appenders.
//!
//! Reuses the `rust-ini` parser and decodes files with `encoding_rs`, so a
//! deployment can describe an appender without code:
//!
//! ```ini
//! [appender]
//! remote_host = logs.internal
//! port = 28777
//! node = billing-7
//! stream = payments
//! reconnection_delay_ms = 10000
//! ```
//!
//! Loading yields a [`LogioAppenderBuilder`]; collaborators such as a layout
//! or error sink can still be attached before building.

use std::{fs, io, path::Path, str::FromStr};

use encoding_rs::{Encoding, UTF_8};
use ini::{Ini, ParseOption};
use thiserror::Error;

use crate::handlers::LogioAppenderBuilder;

/// Errors raised while loading an appender configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} doesn't exist")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("unknown encoding {0}")]
    UnknownEncoding(String),
    #[error("{path} is not valid {encoding}")]
    Decode { path: String, encoding: &'static str },
    #[error("configuration is invalid: {0}")]
    Parse(String),
    #[error("section [{0}] not found")]
    MissingSection(String),
    #[error("unknown key {key} in section [{section}]")]
    UnknownKey { section: String, key: String },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Read `path`, decoded with `file_encoding` (UTF-8 when `None`), and return
/// a builder for the appender described by `section`.
pub fn load_appender_config(
    path: impl AsRef<Path>,
    section: &str,
    file_encoding: Option<&str>,
) -> Result<LogioAppenderBuilder, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(display.clone()),
        _ => ConfigError::Io {
            path: display.clone(),
            source,
        },
    })?;
    let text = decode_with_encoding(&display, &bytes, file_encoding)?;
    parse_appender_config(&text, section)
}

fn decode_with_encoding(
    path: &str,
    bytes: &[u8],
    label: Option<&str>,
) -> Result<String, ConfigError> {
    let encoding = match label {
        Some(label) => Encoding::for_label(label.trim().to_ascii_lowercase().as_bytes())
            .ok_or_else(|| ConfigError::UnknownEncoding(label.to_owned()))?,
        None => UTF_8,
    };
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ConfigError::Decode {
            path: path.to_owned(),
            encoding: encoding.name(),
        });
    }
    Ok(decoded.into_owned())
}

/// Parse INI `text` and return a builder for the appender in `section`.
pub fn parse_appender_config(
    text: &str,
    section: &str,
) -> Result<LogioAppenderBuilder, ConfigError> {
    // Quotes and backslashes are kept verbatim; `indent` handles its own quoting.
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(text, options)
        .map_err(|err| ConfigError::Parse(err.to_string()))?;
    let props = ini
        .section(Some(section))
        .ok_or_else(|| ConfigError::MissingSection(section.to_owned()))?;
    props
        .iter()
        .try_fold(LogioAppenderBuilder::new(), |builder, (key, value)| {
            apply_key(builder, section, key, value.trim())
        })
}

fn apply_key(
    builder: LogioAppenderBuilder,
    section: &str,
    key: &str,
    value: &str,
) -> Result<LogioAppenderBuilder, ConfigError> {
    Ok(match key {
        "name" => builder.with_name(value.to_owned()),
        "remote_host" => builder.with_remote_host(value),
        "port" => builder.with_port(parse_value(key, value)?),
        "node" => builder.with_node(value.to_owned()),
        "stream" => builder.with_stream(value.to_owned()),
        "encoding" => builder.with_encoding(value.to_owned()),
        "reconnection_delay_ms" => builder.with_reconnection_delay_ms(parse_value(key, value)?),
        "location_info" => builder.with_location_info(parse_bool(key, value)?),
        "application" => builder.with_application(value.to_owned()),
        "indent" => builder.with_indent(unquote(value).to_owned()),
        "advertise" => builder.with_advertise(parse_bool(key, value)?),
        "connect_timeout_ms" => builder.with_connect_timeout_ms(parse_value(key, value)?),
        "write_timeout_ms" => builder.with_write_timeout_ms(parse_value(key, value)?),
        _ => {
            return Err(ConfigError::UnknownKey {
                section: section.to_owned(),
                key: key.to_owned(),
            });
        }
    })
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

/// Strip one pair of surrounding double quotes so whitespace survives.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use encoding_rs::WINDOWS_1252;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    const FULL: &str = r#"
[appender]
name = audit
remote_host = logs.internal
port = 9999
node = billing-7
stream = payments
encoding = windows-1252
reconnection_delay_ms = 0
location_info = yes
application = billing
indent = "  "
connect_timeout_ms = 250
write_timeout_ms = 750
"#;

    #[rstest]
    fn parses_every_key() {
        let config = parse_appender_config(FULL, "appender")
            .expect("parse")
            .build_config()
            .expect("valid");
        assert_eq!(config.name, "audit");
        assert_eq!(config.endpoint.remote_host.as_deref(), Some("logs.internal"));
        assert_eq!(config.endpoint.port, 9999);
        assert_eq!(config.node, "billing-7");
        assert_eq!(config.stream, "payments");
        assert_eq!(config.encoding, WINDOWS_1252);
        assert!(!config.retries());
        assert!(config.location_info);
        assert_eq!(config.application.as_deref(), Some("billing"));
        assert_eq!(config.indent, "  ");
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.write_timeout, Duration::from_millis(750));
    }

    #[rstest]
    fn missing_section_is_reported() {
        let err = parse_appender_config(FULL, "other").expect_err("section missing");
        assert!(matches!(err, ConfigError::MissingSection(name) if name == "other"));
    }

    #[rstest]
    fn unknown_keys_are_rejected() {
        let err = parse_appender_config("[appender]\nnode = n\ncolour = blue\n", "appender")
            .expect_err("unknown key");
        assert!(matches!(err, ConfigError::UnknownKey { key, .. } if key == "colour"));
    }

    #[rstest]
    #[case("port = lots")]
    #[case("port = 70000")]
    #[case("location_info = maybe")]
    #[case("reconnection_delay_ms = -1")]
    fn invalid_values_are_rejected(#[case] line: &str) {
        let text = format!("[appender]\n{line}\n");
        let err = parse_appender_config(&text, "appender").expect_err("invalid value");
        assert!(matches!(err, ConfigError::InvalidValue { .. }), "{err}");
    }

    #[rstest]
    fn utf16_session_encoding_fails_to_build() {
        let text = "[appender]\nnode = n\nstream = s\nencoding = utf-16le\n";
        let builder = parse_appender_config(text, "appender").expect("parse");
        assert!(builder.build_config().is_err());
    }

    #[rstest]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(FULL.as_bytes()).expect("write config");
        let builder = load_appender_config(file.path(), "appender", None).expect("load");
        assert_eq!(builder.build_config().expect("valid").node, "billing-7");
    }

    #[rstest]
    fn decodes_legacy_encodings() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"[appender]\nnode = caf\xE9\nstream = s\n")
            .expect("write config");
        let builder =
            load_appender_config(file.path(), "appender", Some("latin1")).expect("load");
        assert_eq!(builder.build_config().expect("valid").node, "café");
    }

    #[rstest]
    fn invalid_utf8_is_reported() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"[appender]\nnode = caf\xE9\n").expect("write config");
        let err = load_appender_config(file.path(), "appender", None).expect_err("bad utf-8");
        assert!(matches!(err, ConfigError::Decode { encoding: "UTF-8", .. }));
    }

    #[rstest]
    fn missing_file_is_reported() {
        let err = load_appender_config("/nonexistent/logio.ini", "appender", None)
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[rstest]
    fn unknown_file_encoding_is_reported() {
        let file = NamedTempFile::new().expect("temp file");
        let err = load_appender_config(file.path(), "appender", Some("klingon"))
            .expect_err("unknown encoding");
        assert!(matches!(err, ConfigError::UnknownEncoding(label) if label == "klingon"));
    }
}
