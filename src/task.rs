//! The leaf-task contract and the arbitrary-code escape hatch

use std::fmt;
use std::sync::Arc;

use crate::context::TaskContext;
use crate::descriptor::TaskDescriptor;
use crate::error::PipelineResult;
use crate::vfs::FileSet;
use crate::BoxFuture;

/// Contract every leaf task satisfies.
///
/// A task receives the current file set by value and produces a new one; it
/// must preserve the relative order of records it does not touch. Side
/// effects (reads, writes, deletes) happen against external collaborators;
/// the set itself is never shared mutable state.
#[async_trait::async_trait]
pub trait Task: Send + Sync {
    /// Execute the task against the current file set.
    async fn run(&self, input: FileSet, ctx: &TaskContext) -> PipelineResult<FileSet>;

    /// Human-readable label used in errors and logs.
    fn name(&self) -> String;
}

/// Read-only view handed to [`execute`] actions.
///
/// Exposes a snapshot of the file set at the point the action runs and
/// nothing else; the engine never inspects what the action does with it.
pub struct Env {
    files: FileSet,
}

impl Env {
    pub(crate) fn new(files: FileSet) -> Self {
        Self { files }
    }

    /// The file set as it stood when the action started.
    pub fn files(&self) -> &FileSet {
        &self.files
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("records", &self.files.len())
            .finish()
    }
}

type ActionFn = dyn Fn(Env) -> BoxFuture<()> + Send + Sync;

/// Leaf task wrapping an opaque side-effecting action.
struct Execute {
    action: Arc<ActionFn>,
}

#[async_trait::async_trait]
impl Task for Execute {
    async fn run(&self, input: FileSet, _ctx: &TaskContext) -> PipelineResult<FileSet> {
        (self.action)(Env::new(input.clone())).await;
        Ok(input)
    }

    fn name(&self) -> String {
        "execute".to_string()
    }
}

/// Run an arbitrary side-effecting action, passing the file set through
/// unchanged.
///
/// The escape hatch for steps the pipeline vocabulary cannot express:
/// delays, logging, external triggers.
///
/// ```
/// use taskpipe::execute;
///
/// let step = execute(|env| {
///     let count = env.files().len();
///     Box::pin(async move {
///         println!("checkpoint: {count} records");
///     })
/// });
/// # let _ = step;
/// ```
pub fn execute<F>(action: F) -> TaskDescriptor
where
    F: Fn(Env) -> BoxFuture<()> + Send + Sync + 'static,
{
    TaskDescriptor::leaf(Execute {
        action: Arc::new(action),
    })
}
