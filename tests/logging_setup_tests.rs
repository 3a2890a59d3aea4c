#![cfg(feature = "logging")]

use link_preview_card::{setup_logging, LogConfig};
use tracing::warn;

// Single test in this binary: it installs the global subscriber.
#[test]
fn test_setup_logging_writes_file_and_rejects_second_install() {
    let tmp = tempfile::tempdir().unwrap();
    let log_dir = tmp.path().join("nested").join("logs");

    setup_logging(LogConfig {
        log_dir: log_dir.clone(),
        log_level: "info".into(),
        console_output: false,
        file_output: true,
    })
    .expect("first install succeeds");
    assert!(log_dir.is_dir());

    warn!("preview logging online");

    let log_files: Vec<_> = std::fs::read_dir(&log_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("link-preview-card.log"))
        })
        .collect();
    assert_eq!(log_files.len(), 1);
    let contents = std::fs::read_to_string(&log_files[0]).unwrap();
    assert!(contents.contains("preview logging online"));

    let second = setup_logging(LogConfig {
        log_dir,
        console_output: false,
        file_output: true,
        ..Default::default()
    });
    assert!(second.is_err());
}
