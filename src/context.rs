//! Execution-time capability handed to leaf tasks

use std::sync::Arc;

use crate::descriptor::TaskDescriptor;
use crate::error::PipelineResult;
use crate::executor;
use crate::types::PipelineConfig;
use crate::vfs::FileSet;

/// Capability object passed to every leaf task invocation.
///
/// Its one power is evaluating a nested descriptor, which is how splice
/// tasks ([`replace`](crate::transform::replace),
/// [`as_replacement_for`](crate::transform::as_replacement_for)) render
/// their source pipelines without the executor knowing their internals.
#[derive(Clone)]
pub struct TaskContext {
    config: Arc<PipelineConfig>,
}

impl TaskContext {
    pub(crate) fn new(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }

    /// Evaluate a descriptor in a fresh run scope: its own branch registry
    /// and an empty initial file set. A source pipeline that detaches
    /// branches must join them itself; they do not leak into the enclosing
    /// run.
    pub async fn evaluate(&self, descriptor: &TaskDescriptor) -> PipelineResult<FileSet> {
        executor::run_scoped(descriptor.clone(), FileSet::new(), Arc::clone(&self.config)).await
    }
}
