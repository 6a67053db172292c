//! Unified logging for dashboard services
//!
//! Console output uses a `timestamp [LEVEL] message` layout; a daily rolling
//! file (plain or JSON) can be added through [`LogConfig`].

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter producing `2026-01-02T00:50:44.809000Z [INFO] message`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Keeps the non-blocking file writer alive for the process lifetime
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name, used as the file name prefix and default filter target
    pub service_name: String,
    /// Filter level or directive (e.g. "info", "info,dashsrv=debug")
    pub level: String,
    /// Directory for rolling log files
    pub log_dir: PathBuf,
    /// Emit JSON lines instead of the bracketed text format
    pub json: bool,
    /// Also write to a daily rolling file under `log_dir`
    pub file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            json: false,
            file: false,
        }
    }
}

impl LogConfig {
    /// Resolve the filter: `RUST_LOG` wins over the configured level
    fn env_filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error>> {
        if let Ok(env_str) = std::env::var("RUST_LOG") {
            return Ok(EnvFilter::try_new(env_str)?);
        }
        Ok(EnvFilter::try_new(&self.level)?)
    }
}

/// Initialize logging system with configuration
pub fn init_with_config(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = config.env_filter()?;

    let console_layer = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer()
            .with_ansi(true)
            .event_format(BracketedLevelFormat)
            .boxed()
    };

    let file_layer = if config.file {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = tracing_appender::rolling::daily(
            &config.log_dir,
            format!("{}.log", config.service_name),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        FILE_GUARD
            .set(guard)
            .map_err(|_| "file log writer is already initialized")?;

        let layer = if config.json {
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .boxed()
        };
        Some(layer)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        "Logging: {} (file: {}, dir: {:?})",
        config.service_name,
        config.file,
        config.log_dir
    );

    Ok(())
}

/// Replace values of sensitive keys (password, token, ...) in a JSON body
#[allow(clippy::disallowed_methods)] // json! macro internally uses unwrap (compile-time safe, never panics)
fn redact_sensitive_fields(json_str: &str) -> String {
    use serde_json::{json, Value};

    const SENSITIVE_KEYS: &[&str] = &["password", "token", "api_key", "secret", "authorization"];

    let Ok(mut value) = serde_json::from_str::<Value>(json_str) else {
        return json_str.to_string();
    };

    fn redact_recursive(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    if SENSITIVE_KEYS.iter().any(|&k| key_lower.contains(k)) {
                        *val = json!("***REDACTED***");
                    } else {
                        redact_recursive(val);
                    }
                }
            },
            Value::Array(arr) => {
                for item in arr.iter_mut() {
                    redact_recursive(item);
                }
            },
            _ => {},
        }
    }

    redact_recursive(&mut value);

    serde_json::to_string(&value).unwrap_or_else(|_| json_str.to_string())
}

/// Truncate body to at most `max_length` bytes on a char boundary
fn truncate_body(body: &str, max_length: usize) -> String {
    if body.len() <= max_length {
        return body.to_string();
    }
    let mut cut = max_length;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}[truncated {} bytes]", &body[..cut], body.len() - cut)
}

#[cfg(feature = "axum")]
fn is_mutating(method: &axum::http::Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
}

/// HTTP API request logger middleware
///
/// - **INFO**: POST/PUT/PATCH/DELETE requests, without body
/// - **DEBUG**: every request; JSON bodies of mutating requests are included,
///   truncated to 500 bytes with sensitive fields redacted
///
/// Events use the `api_access` target. Add the layer before `.with_state()`:
/// ```rust,ignore
/// let app = Router::new()
///     // ... routes ...
///     .layer(axum::middleware::from_fn(common::logging::http_request_logger))
///     .with_state(state);
/// ```
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::body::Body;
    use std::time::Instant;
    use tracing::{debug, info, level_enabled};

    const MAX_BODY_LENGTH: usize = 500;

    let method = req.method().clone();
    let uri = req.uri().clone();
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let start = Instant::now();

    let should_read_body = level_enabled!(Level::DEBUG)
        && is_mutating(&method)
        && content_type.contains("application/json");

    let (req, body_str) = if should_read_body {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to read request body: {}", e);
                let new_req = axum::extract::Request::from_parts(parts, Body::empty());
                return next.run(new_req).await;
            },
        };

        let body_str = match std::str::from_utf8(&bytes) {
            Ok(s) => truncate_body(&redact_sensitive_fields(s), MAX_BODY_LENGTH),
            Err(_) => "<binary data>".to_string(),
        };

        let new_req = axum::extract::Request::from_parts(parts, Body::from(bytes));
        (new_req, Some(body_str))
    } else {
        (req, None)
    };

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    if is_mutating(&method) {
        info!(
            target: "api_access",
            method = %method,
            path = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request"
        );
    }

    match body_str {
        Some(body) => debug!(
            target: "api_access",
            method = %method,
            path = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            request_body = %body,
            "HTTP request (detailed)"
        ),
        None if !is_mutating(&method) => debug!(
            target: "api_access",
            method = %method,
            path = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request"
        ),
        None => {},
    }

    response
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_format_level() {
        assert_eq!(format_level(&Level::INFO), "[INFO]");
        assert_eq!(format_level(&Level::ERROR), "[ERROR]");
    }

    #[test]
    fn test_redact_nested_fields() {
        let body = r#"{"name":"Acme Corp","password":"password","auth":{"token":"abc"},"list":[{"secret":1}]}"#;
        let redacted = redact_sensitive_fields(body);
        let value: serde_json::Value = serde_json::from_str(&redacted).unwrap();
        assert_eq!(value["name"], "Acme Corp");
        assert_eq!(value["password"], "***REDACTED***");
        assert_eq!(value["auth"]["token"], "***REDACTED***");
        assert_eq!(value["list"][0]["secret"], "***REDACTED***");
    }

    #[test]
    fn test_redact_non_json_passthrough() {
        assert_eq!(redact_sensitive_fields("not json"), "not json");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short", 500), "short");

        let long = "a".repeat(600);
        let truncated = truncate_body(&long, 500);
        assert!(truncated.starts_with(&"a".repeat(500)));
        assert!(truncated.ends_with("[truncated 100 bytes]"));
    }

    #[test]
    fn test_truncate_body_char_boundary() {
        // '°' is two bytes; cutting at 1 must step back to 0
        let truncated = truncate_body("°C", 1);
        assert_eq!(truncated, "[truncated 3 bytes]");
    }

    #[cfg(feature = "axum")]
    #[tokio::test]
    async fn test_request_logger_passes_body_through() {
        use axum::{body::Body, http::Request, routing::post, Router};
        use tower::ServiceExt;

        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(axum::middleware::from_fn(http_request_logger));

        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"password":"password"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        // redaction applies to the log line only, never the forwarded body
        assert_eq!(&bytes[..], br#"{"password":"password"}"#);
    }

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.file);
        assert!(!config.json);
    }

    #[test]
    fn test_second_file_init_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            service_name: "dashsrv-test".to_string(),
            log_dir: dir.path().to_path_buf(),
            file: true,
            ..Default::default()
        };

        // The first call may still fail on try_init if another test installed
        // a global subscriber, but it always claims the file writer slot.
        let _ = init_with_config(config.clone());
        assert!(FILE_GUARD.get().is_some());

        let err = init_with_config(config).unwrap_err();
        assert!(err.to_string().contains("already initialized"));
    }
}
