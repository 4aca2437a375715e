mod apply;
mod camera;
mod config;
mod exiftool;
mod metadata;
mod naming;
mod planner;
mod sequence;
mod timestamp;

pub use apply::{apply_plan, AppliedCandidate, ApplyOutcome, ApplyResult};
pub use camera::{CameraPolicy, CameraTable, SequenceFallback, UNKNOWN_MODEL};
pub use config::{app_paths, load_config, save_config, AppConfig, AppPaths};
pub use exiftool::{read_metadata_batch, DEFAULT_EXIFTOOL};
pub use metadata::{MediaRecord, TagMap};
pub use planner::{
    collect_input_files, generate_plan, plan_from_metadata, PlanOptions, RenameCandidate,
    RenamePlan, RenameStats, SkipReason, SkippedFile,
};
pub use timestamp::Skew;
