/// Vulkan validation messenger - routes validation layer messages into the engine log
///
/// Compiled in only with the `vulkan-validation` feature. Without it, requesting
/// validation logs a warning and the device is created without layers.

use ash::vk;
use galaxy_3d_frame_graph::galaxy3d::Result;

#[cfg(feature = "vulkan-validation")]
pub(crate) use enabled::*;
#[cfg(not(feature = "vulkan-validation"))]
pub(crate) use disabled::*;

/// Layers and instance extensions to enable when validation is active
pub(crate) fn validation_layers() -> Vec<*const std::os::raw::c_char> {
    vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
}

pub(crate) fn validation_extensions() -> Vec<*const std::os::raw::c_char> {
    vec![ash::ext::debug_utils::NAME.as_ptr()]
}

/// Create the messenger when validation is both requested and compiled in
pub(crate) fn create_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
    requested: bool,
) -> Result<Option<DebugMessenger>> {
    if !requested || !VALIDATION_COMPILED {
        return Ok(None);
    }
    DebugMessenger::new(entry, instance).map(Some)
}

/// Whether instance creation should enable the validation layer
pub(crate) fn validation_active(requested: bool) -> bool {
    if requested && !VALIDATION_COMPILED {
        galaxy_3d_frame_graph::engine_warn!("galaxy3d::vulkan",
            "Validation requested but the vulkan-validation feature is disabled");
    }
    requested && VALIDATION_COMPILED
}

#[allow(dead_code)]
fn severity_label(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> &'static str {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        "ERROR"
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        "WARNING"
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        "INFO"
    } else {
        "VERBOSE"
    }
}

#[cfg(feature = "vulkan-validation")]
pub(crate) mod enabled {
    use ash::vk;
    use colored::*;
    use rustc_hash::FxHashMap;
    use std::ffi::CStr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use galaxy_3d_frame_graph::galaxy3d::{Error, Result};
    use galaxy_3d_frame_graph::{engine_debug, engine_error, engine_trace, engine_warn};

    pub(crate) const VALIDATION_COMPILED: bool = true;

    const SOURCE: &str = "galaxy3d::vulkan::validation";

    /// Global validation statistics (thread-safe atomic counters)
    static VALIDATION_STATS: StatsTracker = StatsTracker::new();

    /// Occurrences of each message id, for duplicate reporting
    static MESSAGE_TRACKER: Mutex<Option<FxHashMap<String, u32>>> = Mutex::new(None);

    /// Validation message counts since the last messenger creation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ValidationStats {
        pub errors: u32,
        pub warnings: u32,
        pub info: u32,
        pub verbose: u32,
    }

    impl ValidationStats {
        pub fn total(&self) -> u32 {
            self.errors + self.warnings + self.info + self.verbose
        }
    }

    struct StatsTracker {
        errors: AtomicU32,
        warnings: AtomicU32,
        info: AtomicU32,
        verbose: AtomicU32,
    }

    impl StatsTracker {
        const fn new() -> Self {
            Self {
                errors: AtomicU32::new(0),
                warnings: AtomicU32::new(0),
                info: AtomicU32::new(0),
                verbose: AtomicU32::new(0),
            }
        }

        fn record(&self, severity: vk::DebugUtilsMessageSeverityFlagsEXT) {
            let counter = if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
                &self.errors
            } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
                &self.warnings
            } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
                &self.info
            } else {
                &self.verbose
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }

        fn snapshot(&self) -> ValidationStats {
            ValidationStats {
                errors: self.errors.load(Ordering::Relaxed),
                warnings: self.warnings.load(Ordering::Relaxed),
                info: self.info.load(Ordering::Relaxed),
                verbose: self.verbose.load(Ordering::Relaxed),
            }
        }

        fn reset(&self) {
            self.errors.store(0, Ordering::Relaxed);
            self.warnings.store(0, Ordering::Relaxed);
            self.info.store(0, Ordering::Relaxed);
            self.verbose.store(0, Ordering::Relaxed);
        }
    }

    /// Get current validation statistics
    pub fn validation_stats() -> ValidationStats {
        VALIDATION_STATS.snapshot()
    }

    /// Print validation statistics report
    pub fn print_validation_stats_report() {
        let stats = validation_stats();

        if stats.total() == 0 {
            println!("\n{}", "No validation messages".green().bold());
            return;
        }

        println!("\n{}", "=== Validation Statistics Report ===".bright_blue().bold());

        if stats.errors > 0 {
            println!("  {} {}", "Errors:".red().bold(), stats.errors);
        }
        if stats.warnings > 0 {
            println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
        }
        if stats.info > 0 {
            println!("  {} {}", "Info:".cyan(), stats.info);
        }
        if stats.verbose > 0 {
            println!("  {} {}", "Verbose:".bright_black(), stats.verbose);
        }
        println!("  {} {}", "Total:".white().bold(), stats.total());

        if let Ok(tracker) = MESSAGE_TRACKER.lock() {
            let repeated = tracker
                .as_ref()
                .map_or(0, |messages| messages.values().filter(|&&count| count > 1).count());
            if repeated > 0 {
                println!("\n  {} message(s) appeared multiple times", repeated);
            }
        }

        println!("{}\n", "====================================".bright_blue().bold());
    }

    /// Installed debug utils messenger
    pub(crate) struct DebugMessenger {
        loader: ash::ext::debug_utils::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
    }

    impl DebugMessenger {
        pub(crate) fn new(entry: &ash::Entry, instance: &ash::Instance) -> Result<Self> {
            VALIDATION_STATS.reset();
            if let Ok(mut tracker) = MESSAGE_TRACKER.lock() {
                *tracker = Some(FxHashMap::default());
            }

            let loader = ash::ext::debug_utils::Instance::new(entry, instance);
            let info = vk::DebugUtilsMessengerCreateInfoEXT::default()
                .message_severity(
                    vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                        | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
                )
                .message_type(
                    vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                )
                .pfn_user_callback(Some(vulkan_debug_callback));

            let messenger = unsafe { loader.create_debug_utils_messenger(&info, None) }
                .map_err(|e| {
                    engine_error!("galaxy3d::vulkan", "Failed to create debug messenger: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
                })?;

            engine_debug!("galaxy3d::vulkan", "Validation messenger installed");
            Ok(Self { loader, messenger })
        }

        /// Must run before the instance is destroyed
        pub(crate) unsafe fn destroy(self) {
            self.loader.destroy_debug_utils_messenger(self.messenger, None);
        }
    }

    unsafe extern "system" fn vulkan_debug_callback(
        message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        message_type: vk::DebugUtilsMessageTypeFlagsEXT,
        p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
        _user_data: *mut std::os::raw::c_void,
    ) -> vk::Bool32 {
        if p_callback_data.is_null() {
            return vk::FALSE;
        }
        let callback_data = &*p_callback_data;
        let message_id = if callback_data.p_message_id_name.is_null() {
            "Unknown".into()
        } else {
            CStr::from_ptr(callback_data.p_message_id_name).to_string_lossy()
        };
        let message = if callback_data.p_message.is_null() {
            "No message".into()
        } else {
            CStr::from_ptr(callback_data.p_message).to_string_lossy()
        };

        VALIDATION_STATS.record(message_severity);
        if let Ok(mut tracker) = MESSAGE_TRACKER.lock() {
            if let Some(messages) = tracker.as_mut() {
                *messages.entry(message_id.to_string()).or_insert(0) += 1;
            }
        }

        let kind = if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
            "Validation"
        } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
            "Performance"
        } else {
            "General"
        };

        let label = super::severity_label(message_severity);
        match label {
            "ERROR" => engine_error!(SOURCE, "[{}] {}: {}", kind, message_id, message),
            "WARNING" => engine_warn!(SOURCE, "[{}] {}: {}", kind, message_id, message),
            "INFO" => engine_debug!(SOURCE, "[{}] {}: {}", kind, message_id, message),
            _ => engine_trace!(SOURCE, "[{}] {}: {}", kind, message_id, message),
        }

        // Never abort the Vulkan call
        vk::FALSE
    }
}

#[cfg(not(feature = "vulkan-validation"))]
mod disabled {
    use galaxy_3d_frame_graph::galaxy3d::{Error, Result};

    pub(crate) const VALIDATION_COMPILED: bool = false;

    /// Placeholder: no messenger exists without the feature
    pub(crate) struct DebugMessenger;

    impl DebugMessenger {
        pub(crate) fn new(_entry: &ash::Entry, _instance: &ash::Instance) -> Result<Self> {
            Err(Error::InitializationFailed(
                "Validation support is not compiled in".to_string(),
            ))
        }

        pub(crate) unsafe fn destroy(self) {}
    }
}

#[cfg(test)]
#[path = "vulkan_debug_tests.rs"]
mod tests;
