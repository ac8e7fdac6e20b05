use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::{filter::FilterFn, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

// -------- level helpers --------
fn parse_tracing_level(s: &str) -> Option<tracing::Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

// -------- filtering --------

type CrateFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Everything not claimed by an explicit subsystem section, up to `max_level`.
fn create_default_filter_for_crates(
    crate_names: &[String],
    max_level: tracing::Level,
) -> CrateFilter {
    let crates = crate_names.to_vec();
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        let t = meta.target();
        if crates.iter().any(|c| matches_crate_prefix(t, c)) {
            return false;
        }
        meta.level() <= &max_level
    }))
}

/// `target == crate_name` or `target` starts with `crate_name::`.
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target == crate_name
        || (target.starts_with(crate_name) && target[crate_name.len()..].starts_with("::"))
}

// -------- rotating writer --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

#[derive(Clone)]
struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl RotWriter {
    fn handle(&self) -> RotWriterHandle {
        RotWriterHandle(self.0.clone())
    }
}

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .flush()
    }
}

// A writer that may be absent; writes are then dropped.
#[derive(Clone)]
struct RoutedWriterHandle(Option<RotWriterHandle>);

impl Write for RoutedWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }
    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to per-subsystem files by target prefix, falling back to
/// the default file.
#[derive(Clone, Default)]
struct MultiFileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl MultiFileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriterHandle> {
        self.by_prefix
            .iter()
            .find(|(name, _)| matches_crate_prefix(target, name))
            .map(|(_, wr)| wr.handle())
            .or_else(|| self.default.as_ref().map(RotWriter::handle))
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for MultiFileRouter {
    type Writer = RoutedWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriterHandle(self.default.as_ref().map(RotWriter::handle))
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriterHandle(self.resolve_for(meta.target()))
    }
}

// -------- config extraction --------

struct ConfigData<'a> {
    default_section: Option<&'a Section>,
    crate_sections: Vec<(String, &'a Section)>,
    crate_names: Vec<String>,
}

fn extract_config_data(cfg: &LoggingConfig) -> ConfigData<'_> {
    let mut crate_sections = cfg
        .iter()
        .filter(|(k, _)| k.as_str() != "default")
        .map(|(k, v)| (k.clone(), v))
        .collect::<Vec<_>>();
    crate_sections.sort_by(|a, b| a.0.cmp(&b.0));

    let crate_names = crate_sections.iter().map(|(n, _)| n.clone()).collect();

    ConfigData {
        default_section: cfg.get("default"),
        crate_sections,
        crate_names,
    }
}

// -------- paths --------

/// Absolute paths are kept; relative ones are joined onto `base_dir` (home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Rotating writer at `log_path`; creates the parent directory.
fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_backups: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(max_backups)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn create_file_writer(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let max_backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize, max_backups) {
        Ok(writer) => Some(writer),
        Err(e) => {
            // no subscriber yet, so stderr is the only channel
            eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

// -------- public init --------

/// Install the global subscriber.
///
/// - `cfg`: subsystem sections; an empty map falls back to a plain console logger
/// - `base_dir`: directory relative log file paths are resolved against (home_dir)
///
/// Console output is human-readable; file output is JSON. Calling this twice
/// is harmless, the second call does nothing.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // bridge `log` records (sqlx, sea-orm) before the subscriber goes in
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let config_data = extract_config_data(cfg);
    let console_targets = build_console_targets(&config_data);
    let file_router = build_file_router(&config_data, base_dir);
    let file_targets = build_file_targets(&config_data);

    build_logging_layers(config_data, console_targets, file_targets, file_router);
}

fn init_default_logging() {
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

fn build_console_targets(config: &ConfigData) -> tracing_subscriber::filter::Targets {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::filter::Targets;

    let mut targets = Targets::new().with_default(LevelFilter::OFF);
    for (crate_name, section) in &config.crate_sections {
        if let Some(level) =
            parse_tracing_level(&section.console_level).map(LevelFilter::from_level)
        {
            targets = targets.with_target(crate_name.clone(), level);
        }
    }
    targets
}

fn build_file_router(config: &ConfigData, base_dir: &Path) -> MultiFileRouter {
    let mut router = MultiFileRouter::default();

    if let Some(section) = config.default_section {
        router.default = create_file_writer("default", section, base_dir);
    }
    for (crate_name, section) in &config.crate_sections {
        if let Some(writer) = create_file_writer(crate_name, section, base_dir) {
            router.by_prefix.insert(crate_name.clone(), writer);
        }
    }
    router
}

fn build_file_targets(config: &ConfigData) -> tracing_subscriber::filter::Targets {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::filter::Targets;

    let mut targets = Targets::new().with_default(LevelFilter::OFF);
    for (crate_name, section) in &config.crate_sections {
        if section.file.trim().is_empty() {
            continue;
        }
        if let Some(level) = parse_tracing_level(&section.file_level).map(LevelFilter::from_level) {
            targets = targets.with_target(crate_name.clone(), level);
        }
    }
    targets
}

fn build_logging_layers(
    config: ConfigData,
    console_targets: tracing_subscriber::filter::Targets,
    file_targets: tracing_subscriber::filter::Targets,
    file_router: MultiFileRouter,
) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Layer, Registry};

    // console goes to stderr; stdout carries command output
    let ansi = std::io::stderr().is_terminal();

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets);

    let explicit_file_layer = (!file_router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(file_router.clone())
            .with_filter(file_targets)
    });

    let default_section = config.default_section;

    let console_default = default_section
        .and_then(|s| parse_tracing_level(&s.console_level))
        .map(|level| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(create_default_filter_for_crates(&config.crate_names, level))
        });

    let file_default = default_section
        .filter(|_| file_router.default.is_some())
        .and_then(|s| parse_tracing_level(&s.file_level))
        .map(|level| {
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(file_router)
                .with_filter(create_default_filter_for_crates(&config.crate_names, level))
        });

    // Option<Layer> is itself a layer; None is a no-op
    let _ = Registry::default()
        .with(console_layer)
        .with(explicit_file_layer)
        .with(console_default)
        .with(file_default)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_logging_config, AppConfig};
    use std::fs;
    use tempfile::tempdir;

    fn section(file: &str) -> Section {
        Section {
            console_level: "info".into(),
            file: file.into(),
            file_level: "debug".into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_logging_level_parsing() {
        assert_eq!(parse_tracing_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level("Info"), Some(Level::INFO));
        assert_eq!(parse_tracing_level("warn"), Some(Level::WARN));
        assert_eq!(parse_tracing_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("none"), None);
        assert_eq!(parse_tracing_level("invalid"), Some(Level::INFO));
    }

    #[test]
    fn test_crate_prefix_matching() {
        assert!(matches_crate_prefix("resto_db", "resto_db"));
        assert!(matches_crate_prefix("resto_db::query::filter", "resto_db"));
        assert!(!matches_crate_prefix("resto_dbx::query", "resto_db"));
        assert!(!matches_crate_prefix("sqlx::query", "resto_db"));
    }

    #[test]
    fn test_extract_config_data_splits_default() {
        let mut cfg = default_logging_config();
        cfg.insert("sqlx".into(), section(""));
        cfg.insert("resto_db".into(), section("logs/db.log"));

        let data = extract_config_data(&cfg);
        assert!(data.default_section.is_some());
        assert_eq!(data.crate_names, vec!["resto_db".to_string(), "sqlx".to_string()]);
    }

    #[test]
    fn test_router_prefers_subsystem_file() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("logs/all.log"));
        cfg.insert("resto_db".into(), section("logs/db.log"));
        cfg.insert("catalog".into(), section(""));

        let data = extract_config_data(&cfg);
        let router = build_file_router(&data, tmp.path());
        assert!(router.default.is_some());
        assert_eq!(router.by_prefix.len(), 1);

        let db = router.resolve_for("resto_db::repository").unwrap();
        assert!(Arc::ptr_eq(&db.0, &router.by_prefix["resto_db"].0));
        let other = router.resolve_for("catalog::domain").unwrap();
        assert!(Arc::ptr_eq(&other.0, &router.default.as_ref().unwrap().0));
        assert!(tmp.path().join("logs").is_dir());
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = tmp.path().join("elsewhere.log");
        assert_eq!(resolve_log_path(&abs.to_string_lossy(), Path::new("/ignored")), abs);
    }

    #[test]
    fn test_rotating_writer_creates_parent_and_writes() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let writer = create_rotating_writer_at_path(&p, 128 * 1024, 2).unwrap();
        let mut h = RoutedWriterHandle(Some(writer.handle()));
        h.write_all(b"{\"msg\":\"hello\"}\n").unwrap();
        h.flush().unwrap();
        assert!(fs::read_to_string(&p).unwrap().contains("hello"));

        let mut sink = RoutedWriterHandle(None);
        assert_eq!(sink.write(b"dropped").unwrap(), 7);
    }

    #[test]
    fn test_config_logging_paths_under_home_dir() {
        let tmp = tempdir().unwrap();
        let home = tmp.path().join("home").to_string_lossy().replace('\\', "/");
        let config_path = tmp.path().join("cfg.yaml");
        fs::write(
            &config_path,
            format!(
                r#"
home_dir: "{home}"
logging:
  default:
    console_level: info
    file: ""
    file_level: debug
  resto_db:
    console_level: debug
    file: "logs/db.log"
    file_level: warn
    max_size_mb: 5
    max_backups: 2
"#
            ),
        )
        .unwrap();

        let config = AppConfig::load_layered(&config_path).unwrap();
        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["resto_db"].file_level, "warn");

        let abs = resolve_log_path(&logging["resto_db"].file, Path::new(&config.home_dir));
        assert!(abs.starts_with(&config.home_dir));
        assert!(abs.ends_with("logs/db.log"));
    }
}
