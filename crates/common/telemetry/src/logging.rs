// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    env,
    io::IsTerminal,
    sync::{Arc, Mutex, Once},
};

use bon::Builder;
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Deserializer, Serialize, de};
use smart_default::SmartDefault;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Layer, Registry, filter, layer::SubscriberExt, registry::LookupSpan};

/// Deserializes a string value, using `Default::default()` if the string is
/// empty.
///
/// # Errors
/// Returns an error if the non-empty string does not parse as `T`.
pub fn empty_string_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        Ok(T::default())
    } else {
        T::deserialize(de::value::StrDeserializer::new(&s)).map_err(|e: de::value::Error| {
            de::Error::custom(format!("invalid value, expect empty string, err: {e}"))
        })
    }
}

/// Directory used for log files when a host enables file logging without
/// picking one.
pub const DEFAULT_LOGGING_DIR: &str = "logs";

/// Handle for changing the level filter after initialization.
///
/// Only set once `init_global_logging` has run.
pub static RELOAD_HANDLE: OnceCell<tracing_subscriber::reload::Handle<filter::Targets, Registry>> =
    OnceCell::new();

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, SmartDefault, Builder)]
#[serde(default)]
pub struct LoggingOptions {
    /// Directory for hourly rotated log files. Empty disables file logging.
    #[default = ""]
    #[builder(default)]
    pub dir: String,

    /// Level filter such as `"info"` or `"info,storyplay_player=trace"`.
    /// Falls back to `RUST_LOG`, then `"info"`.
    pub level: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_default")]
    #[builder(default)]
    pub log_format: LogFormat,

    /// Rotated files kept per log stream.
    #[default = 720]
    #[builder(default = 720)]
    pub max_log_files: usize,

    /// Also write to stdout.
    #[default = true]
    #[builder(default = true)]
    pub append_stdout: bool,
}

/// Output format for log lines.
#[derive(
    Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize, Default, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    #[default]
    Text,
}

/// Stdout logging with default options.
///
/// Only the first call in a process installs a subscriber.
#[must_use]
pub fn init_tracing_subscriber(app_name: &str) -> Vec<WorkerGuard> {
    init_global_logging(app_name, &LoggingOptions::default())
}

/// Logging for tests, configured from `UNITTEST_LOG_DIR` and
/// `UNITTEST_LOG_LEVEL`. Safe to call from every test.
pub fn init_default_ut_logging() {
    static START: Once = Once::new();

    START.call_once(|| {
        let mut g = GLOBAL_UT_LOG_GUARD
            .as_ref()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let dir =
            env::var("UNITTEST_LOG_DIR").unwrap_or_else(|_| "/tmp/__unittest_logs".to_string());
        let level = env::var("UNITTEST_LOG_LEVEL")
            .unwrap_or_else(|_| "debug,storyplay_player=trace".to_string());
        let opts = LoggingOptions {
            dir: dir.clone(),
            level: Some(level),
            ..Default::default()
        };
        *g = Some(init_global_logging("unittest", &opts));

        tracing::info!("logs dir = {}", dir);
    });
}

static GLOBAL_UT_LOG_GUARD: Lazy<Arc<Mutex<Option<Vec<WorkerGuard>>>>> =
    Lazy::new(|| Arc::new(Mutex::new(None)));

const DEFAULT_LOG_TARGETS: &str = "info";

fn fmt_layer<S, W>(writer: W, format: LogFormat, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::Layer::new()
            .json()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::Layer::new()
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed(),
    }
}

fn rolling_appender(dir: &str, prefix: &str, max_files: usize) -> RollingFileAppender {
    RollingFileAppender::builder()
        .rotation(Rotation::HOURLY)
        .filename_prefix(prefix)
        .max_log_files(max_files)
        .build(dir)
        .unwrap_or_else(|e| panic!("initializing rolling file appender at {dir} failed: {e}"))
}

/// Installs the global subscriber.
///
/// Layers:
/// - stdout, when `append_stdout` is set
/// - `<app_name>.*` hourly files, when `dir` is set
/// - `<app_name>-err.*` hourly files holding only errors, when `dir` is set
///
/// Only the first call in a process has an effect. The returned guards flush
/// the non-blocking writers when dropped and must be kept alive.
///
/// # Panics
/// Panics if the log directory cannot be used or the level string does not
/// parse.
pub fn init_global_logging(app_name: &str, opts: &LoggingOptions) -> Vec<WorkerGuard> {
    static START: Once = Once::new();
    let mut guards = vec![];

    START.call_once(|| {
        LogTracer::init().expect("log tracer must be valid");

        let stdout_logging_layer = if opts.append_stdout {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
            guards.push(guard);
            Some(fmt_layer(
                writer,
                opts.log_format,
                std::io::stdout().is_terminal(),
            ))
        } else {
            None
        };

        let (file_logging_layer, err_file_logging_layer) = if opts.dir.is_empty() {
            (None, None)
        } else {
            let (writer, guard) = tracing_appender::non_blocking(rolling_appender(
                &opts.dir,
                app_name,
                opts.max_log_files,
            ));
            guards.push(guard);
            let file = fmt_layer(writer, opts.log_format, false);

            let (writer, guard) = tracing_appender::non_blocking(rolling_appender(
                &opts.dir,
                &format!("{app_name}-err"),
                opts.max_log_files,
            ));
            guards.push(guard);
            let err = fmt_layer(writer, opts.log_format, false)
                .with_filter(filter::LevelFilter::ERROR)
                .boxed();
            (Some(file), Some(err))
        };

        let filter = opts
            .level
            .as_deref()
            .or(env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
            .unwrap_or(DEFAULT_LOG_TARGETS)
            .parse::<filter::Targets>()
            .expect("error parsing log level string");

        let (dyn_filter, reload_handle) = tracing_subscriber::reload::Layer::new(filter);

        RELOAD_HANDLE
            .set(reload_handle)
            .expect("reload handle already set, maybe init_global_logging get called twice?");

        let subscriber = Registry::default()
            .with(dyn_filter)
            .with(stdout_logging_layer)
            .with(file_logging_layer)
            .with(err_file_logging_layer);

        tracing::subscriber::set_global_default(subscriber)
            .expect("error setting global tracing subscriber");
    });

    guards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_format_falls_back_to_text() {
        let opts: LoggingOptions =
            serde_json::from_str(r#"{"dir": "/tmp/storyplay", "log_format": ""}"#).unwrap();
        assert_eq!(opts.log_format, LogFormat::Text);
        assert_eq!(opts.max_log_files, 720);
        assert!(opts.append_stdout);
    }

    #[test]
    fn builder_matches_default() {
        assert_eq!(LoggingOptions::builder().build(), LoggingOptions::default());
        let json = LoggingOptions::builder().log_format(LogFormat::Json).build();
        assert_eq!(json.log_format.to_string(), "Json");
    }
}
