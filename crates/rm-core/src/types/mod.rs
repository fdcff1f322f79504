//! Domain types shared across the workspace.

pub mod analysis;
pub mod project;
pub mod status;
pub mod tree;

pub use analysis::{ClassInfo, FileAnalysis, FunctionInfo};
pub use project::TrackedProject;
pub use status::ProjectStatus;
pub use tree::FileNode;
