//! The closed descriptor tree the executor interprets

use std::fmt;
use std::sync::Arc;

use crate::task::Task;

/// A composable, stateless specification of one pipeline step.
///
/// Descriptors form a closed union the executor matches exhaustively:
/// leaves wrap external effects or pure transforms; `Series` composes
/// descriptors sequentially; `Branch` detaches a sub-descriptor onto the
/// runtime; `Barrier` joins every branch detached since the last barrier.
/// Descriptors are cheap to clone and carry no run state.
#[derive(Clone)]
pub enum TaskDescriptor {
    /// A task with no sub-descriptors.
    Leaf(Arc<dyn Task>),
    /// Ordered sequential composition; nests arbitrarily.
    Series(Vec<TaskDescriptor>),
    /// Detach the wrapped descriptor to run concurrently with the main
    /// sequence, passing the current file set through unchanged.
    Branch(Box<TaskDescriptor>),
    /// Suspend the enclosing sequence until all outstanding branches
    /// complete, merging their results.
    Barrier,
}

impl TaskDescriptor {
    /// Wrap a leaf task.
    pub fn leaf(task: impl Task + 'static) -> Self {
        TaskDescriptor::Leaf(Arc::new(task))
    }

    /// Label used in errors and logs.
    pub fn describe(&self) -> String {
        match self {
            TaskDescriptor::Leaf(task) => task.name(),
            TaskDescriptor::Series(steps) => format!("series[{} steps]", steps.len()),
            TaskDescriptor::Branch(inner) => format!("branch({})", inner.describe()),
            TaskDescriptor::Barrier => "barrier".to_string(),
        }
    }
}

impl fmt::Debug for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Display for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Compose descriptors sequentially: each step receives the file set
/// produced by the previous one. An empty series passes its input through
/// unchanged.
pub fn series<I>(steps: I) -> TaskDescriptor
where
    I: IntoIterator<Item = TaskDescriptor>,
{
    TaskDescriptor::Series(steps.into_iter().collect())
}

/// Detach a descriptor to run concurrently with the enclosing sequence.
///
/// The branch captures the file set current at detach time; the sequence
/// continues immediately with that same set unchanged. The branch's output
/// is merged back by the next [`barrier`].
pub fn branch(inner: TaskDescriptor) -> TaskDescriptor {
    TaskDescriptor::Branch(Box::new(inner))
}

/// Join every branch detached since the last barrier (or pipeline start),
/// merging their outputs into the current file set in detach order. With no
/// outstanding branches this is a pass-through no-op.
pub fn barrier() -> TaskDescriptor {
    TaskDescriptor::Barrier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TaskContext;
    use crate::error::PipelineResult;
    use crate::vfs::FileSet;

    struct Noop;

    #[async_trait::async_trait]
    impl Task for Noop {
        async fn run(&self, input: FileSet, _ctx: &TaskContext) -> PipelineResult<FileSet> {
            Ok(input)
        }

        fn name(&self) -> String {
            "noop".to_string()
        }
    }

    #[test]
    fn constructors_build_expected_variants() {
        assert!(matches!(TaskDescriptor::leaf(Noop), TaskDescriptor::Leaf(_)));
        assert!(matches!(
            series([barrier(), barrier()]),
            TaskDescriptor::Series(ref steps) if steps.len() == 2
        ));
        assert!(matches!(
            branch(TaskDescriptor::leaf(Noop)),
            TaskDescriptor::Branch(_)
        ));
        assert!(matches!(barrier(), TaskDescriptor::Barrier));
    }

    #[test]
    fn describe_labels_nodes() {
        assert_eq!(TaskDescriptor::leaf(Noop).describe(), "noop");
        assert_eq!(series([]).describe(), "series[0 steps]");
        assert_eq!(branch(TaskDescriptor::leaf(Noop)).describe(), "branch(noop)");
        assert_eq!(barrier().describe(), "barrier");
        assert_eq!(format!("{}", barrier()), "barrier");
    }
}
