//! Error types for pipeline execution

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An external read/write/delete failed underneath a leaf task.
    #[error("{operation} failed for '{}'", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directory traversal failed while discovering files.
    #[error("traversal failed under '{}'", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A file pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A content transform failed on a specific record.
    #[error("transform '{task}' failed on record '{record}': {reason}")]
    Transform {
        task: String,
        record: String,
        reason: String,
    },

    /// A task reported a failure of its own.
    #[error("task '{task}' failed: {reason}")]
    Task { task: String, reason: String },

    /// A step inside a series failed; the remaining steps were not run.
    #[error("step {step} ({task}) failed")]
    Step {
        step: usize,
        task: String,
        #[source]
        source: Box<PipelineError>,
    },

    /// A detached branch failed; surfaced at the barrier that joined it.
    #[error("branch '{branch}' failed")]
    Branch {
        branch: String,
        #[source]
        source: Box<PipelineError>,
    },

    /// A detached branch panicked or was aborted before completing.
    #[error("branch '{branch}' stopped before producing a result")]
    BranchPanic { branch: String },

    /// A detached branch could not be admitted to the runtime.
    #[error("branch '{branch}' could not be scheduled")]
    Schedule { branch: String },

    /// The pipeline ended while detached branches were still unjoined.
    #[error("pipeline ended with {} unjoined branch(es): {}", .branches.len(), .branches.join(", "))]
    UndrainedBranches { branches: Vec<String> },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to pipeline configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid max concurrent branches: {value} (must be > 0)")]
    InvalidMaxConcurrentBranches { value: usize },
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl PipelineError {
    /// Create an I/O error carrying the failing operation and path.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Create a transform error for a specific record.
    pub fn transform(
        task: impl Into<String>,
        record: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PipelineError::Transform {
            task: task.into(),
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Create a task failure.
    pub fn task(task: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::Task {
            task: task.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a step failure with its 1-based position in the series.
    pub fn step(step: usize, task: impl Into<String>, source: PipelineError) -> Self {
        PipelineError::Step {
            step,
            task: task.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a branch failure with the branch's label.
    pub fn branch(branch: impl Into<String>, source: PipelineError) -> Self {
        PipelineError::Branch {
            branch: branch.into(),
            source: Box::new(source),
        }
    }

    /// Check if this error reports unjoined branches at pipeline end.
    pub fn is_undrained(&self) -> bool {
        matches!(self, PipelineError::UndrainedBranches { .. })
    }

    /// Check if this error originated in a detached branch.
    pub fn is_branch_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::Branch { .. } | PipelineError::BranchPanic { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_identifies_position_and_task() {
        let inner = PipelineError::task("explode", "boom");
        let err = PipelineError::step(2, "explode", inner);
        let rendered = err.to_string();
        assert!(rendered.contains("step 2"));
        assert!(rendered.contains("explode"));
    }

    #[test]
    fn undrained_error_lists_branches() {
        let err = PipelineError::UndrainedBranches {
            branches: vec!["clean".to_string(), "warm-cache".to_string()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("2 unjoined"));
        assert!(rendered.contains("clean"));
        assert!(rendered.contains("warm-cache"));
        assert!(err.is_undrained());
    }

    #[test]
    fn branch_error_helpers() {
        let inner = PipelineError::task("rm", "denied");
        let err = PipelineError::branch("clean", inner);
        assert!(err.is_branch_failure());
        assert!(!err.is_undrained());
        assert!(err.to_string().contains("clean"));
    }

    #[test]
    fn config_error_converts() {
        let err: PipelineError = ConfigError::InvalidMaxConcurrentBranches { value: 0 }.into();
        assert!(matches!(err, PipelineError::Config(_)));
        assert!(err.to_string().contains("configuration error"));
    }
}
