pub mod format;
pub mod pipeline;
pub mod task;

pub use format::{needs_gunzip, ArchiveMode};
pub use pipeline::{extract_archive, UnpackStats};
pub use task::{filter_sources, ConfigSnapshot, TaskReport, UnitOutcome, UnitStatus};
