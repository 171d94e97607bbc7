use accelade::logger::LoggerSettings;
use accelade::{Runtime, RuntimeConfig};
use tempfile::tempdir;

#[test]
fn init_logging_uses_logging_section() {
    let dir = tempdir().expect("tempdir");
    let config = RuntimeConfig {
        logging: LoggerSettings {
            console: false,
            path: Some(dir.path().join("logs")),
            ..LoggerSettings::default()
        },
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::new(config);

    let logger = runtime.init_logging().expect("logger should initialize");
    assert!(logger.guard().is_some());
    assert!(dir.path().join("logs").is_dir());
}
