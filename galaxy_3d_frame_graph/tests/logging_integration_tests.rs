//! Integration tests for the log entries emitted by render pass descriptions
//!
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use galaxy_3d_frame_graph::galaxy3d::Engine;
use galaxy_3d_frame_graph::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use galaxy_3d_frame_graph::galaxy3d::render_pass::{
    presets, AttachmentDesc, AttachmentReference, ImageLayout, RenderPassBuilder, SampleCount,
    SubpassConfig, TextureFormat,
};
use std::sync::{Arc, Mutex};
use serial_test::serial;

const RENDER_PASS_SOURCE: &str = "galaxy3d::render_pass";

/// Captures entries coming from one source
struct SourceLogger {
    source: &'static str,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

fn capture(source: &'static str) -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(SourceLogger { source, entries: entries.clone() });
    entries
}

impl Logger for SourceLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == self.source {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

fn with_severity(entries: &Arc<Mutex<Vec<LogEntry>>>, severity: LogSeverity) -> Vec<LogEntry> {
    entries.lock().unwrap().iter().filter(|e| e.severity == severity).cloned().collect()
}

fn color_subpass() -> SubpassConfig {
    SubpassConfig {
        color_attachments: vec![AttachmentReference::new(0, ImageLayout::ColorAttachment)],
        ..Default::default()
    }
}

// ============================================================================
// ADVISORY WARNINGS
// ============================================================================

#[test]
#[serial]
fn test_integration_second_subpass_warns_but_builds() {
    let entries = capture(RENDER_PASS_SOURCE);

    let mut builder = RenderPassBuilder::new();
    builder.add_color_attachment(AttachmentDesc::new(TextureFormat::R8G8B8A8_UNORM)).unwrap();
    builder.add_subpass(color_subpass()).unwrap();
    builder.add_subpass(color_subpass()).unwrap();
    let config = builder.build();

    Engine::reset_logger();
    assert_eq!(config.unwrap().subpasses.len(), 2);
    assert!(!with_severity(&entries, LogSeverity::Warn).is_empty());
    assert!(with_severity(&entries, LogSeverity::Error).is_empty());
}

#[test]
#[serial]
fn test_integration_presets_build_without_warnings() {
    let entries = capture(RENDER_PASS_SOURCE);

    presets::forward().unwrap();
    presets::deferred_geometry().unwrap();
    presets::depth_pre_pass(SampleCount::S4).unwrap();
    presets::transparency(SampleCount::S4).unwrap();
    presets::final_composite().unwrap();

    Engine::reset_logger();
    assert!(with_severity(&entries, LogSeverity::Warn).is_empty());
    assert!(with_severity(&entries, LogSeverity::Error).is_empty());
}

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

#[test]
#[serial]
fn test_integration_validation_error_is_logged_with_location() {
    let entries = capture(RENDER_PASS_SOURCE);

    let mut builder = RenderPassBuilder::new();
    let result = builder.add_depth_attachment(AttachmentDesc::new(TextureFormat::R8G8B8A8_UNORM));

    Engine::reset_logger();
    assert!(result.is_err());
    assert_eq!(builder.attachment_count(), 0);

    let errors = with_severity(&entries, LogSeverity::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].file.is_some());
    assert!(errors[0].line.is_some());
}

#[test]
#[serial]
fn test_integration_reset_logger_stops_capture() {
    let entries = capture(RENDER_PASS_SOURCE);
    assert!(RenderPassBuilder::new().build().is_err());
    Engine::reset_logger();

    let captured = entries.lock().unwrap().len();
    assert!(captured >= 1);

    // Goes to the default logger now
    assert!(RenderPassBuilder::new().build().is_err());
    assert_eq!(entries.lock().unwrap().len(), captured);
}
