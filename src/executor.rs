//! Pipeline executor: drives a descriptor tree to completion

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::context::TaskContext;
use crate::descriptor::TaskDescriptor;
use crate::error::{PipelineError, PipelineResult};
use crate::types::PipelineConfig;
use crate::vfs::FileSet;
use crate::BoxFuture;

/// Work detached by a branch step, pending until the next barrier.
struct PendingBranch {
    id: Uuid,
    name: String,
    handle: JoinHandle<PipelineResult<FileSet>>,
}

/// Run-scoped registry of detached branches.
///
/// Registration happens from the main sequence, completion on worker
/// threads; one lock around register/drain is the only synchronization.
struct BranchRegistry {
    branches: Mutex<Vec<PendingBranch>>,
    admission: Arc<Semaphore>,
}

impl BranchRegistry {
    fn new(width: usize) -> Self {
        Self {
            branches: Mutex::new(Vec::new()),
            admission: Arc::new(Semaphore::new(width)),
        }
    }

    async fn register(&self, pending: PendingBranch) {
        debug!(branch = %pending.name, id = %pending.id, "branch registered");
        self.branches.lock().await.push(pending);
    }

    async fn drain(&self) -> Vec<PendingBranch> {
        std::mem::take(&mut *self.branches.lock().await)
    }
}

/// State threaded through one root run: configuration plus the branch
/// registry scoped to that run. Passed explicitly, never a singleton.
#[derive(Clone)]
struct RunScope {
    config: Arc<PipelineConfig>,
    registry: Arc<BranchRegistry>,
}

/// Drive a descriptor to completion in its own scope, reporting branches
/// left unjoined at the end.
pub(crate) async fn run_scoped(
    root: TaskDescriptor,
    initial: FileSet,
    config: Arc<PipelineConfig>,
) -> PipelineResult<FileSet> {
    let scope = RunScope {
        registry: Arc::new(BranchRegistry::new(config.max_concurrent_branches)),
        config,
    };

    let result = run_descriptor(root, initial, scope.clone()).await;
    let leftover = scope.registry.drain().await;

    match result {
        Ok(set) if leftover.is_empty() => Ok(set),
        Ok(_) => {
            let branches: Vec<String> = leftover.into_iter().map(|b| b.name).collect();
            warn!(?branches, "pipeline ended with unjoined branches");
            Err(PipelineError::UndrainedBranches { branches })
        }
        Err(err) => {
            if !leftover.is_empty() {
                let branches: Vec<String> = leftover.iter().map(|b| b.name.clone()).collect();
                warn!(?branches, "pipeline failed with branches still outstanding");
            }
            Err(err)
        }
    }
}

/// Exhaustive walk over the descriptor union. Boxed for recursion.
fn run_descriptor(
    descriptor: TaskDescriptor,
    input: FileSet,
    scope: RunScope,
) -> BoxFuture<PipelineResult<FileSet>> {
    async move {
        match descriptor {
            TaskDescriptor::Leaf(task) => {
                let ctx = TaskContext::new(Arc::clone(&scope.config));
                task.run(input, &ctx).await
            }

            TaskDescriptor::Series(steps) => {
                let mut current = input;
                for (index, step) in steps.into_iter().enumerate() {
                    let label = step.describe();
                    debug!(step = index + 1, task = %label, "step starting");
                    current = run_descriptor(step, current, scope.clone())
                        .await
                        .map_err(|err| PipelineError::step(index + 1, label, err))?;
                }
                Ok(current)
            }

            TaskDescriptor::Branch(inner) => {
                let name = inner.describe();
                let captured = input.clone();
                let branch_scope = scope.clone();
                let admission = Arc::clone(&scope.registry.admission);
                let branch_name = name.clone();
                let handle = tokio::spawn(async move {
                    let _permit = admission.acquire_owned().await.map_err(|_| {
                        PipelineError::Schedule {
                            branch: branch_name.clone(),
                        }
                    })?;
                    debug!(branch = %branch_name, "branch running");
                    run_descriptor(*inner, captured, branch_scope).await
                });
                scope
                    .registry
                    .register(PendingBranch {
                        id: Uuid::new_v4(),
                        name,
                        handle,
                    })
                    .await;
                // The branch's output is not merged here; the sequence
                // continues with the prior set unchanged.
                Ok(input)
            }

            TaskDescriptor::Barrier => {
                let drained = scope.registry.drain().await;
                if drained.is_empty() {
                    debug!("barrier with no outstanding branches");
                    return Ok(input);
                }
                debug!(count = drained.len(), "barrier joining branches");

                // Settle every drained branch before raising anything, so no
                // result or error is dropped mid-drain. The first failure in
                // registration order wins.
                let mut outputs = Vec::with_capacity(drained.len());
                let mut failure: Option<PipelineError> = None;
                for pending in drained {
                    match pending.handle.await {
                        Ok(Ok(set)) => outputs.push(set),
                        Ok(Err(err)) => {
                            if failure.is_none() {
                                failure = Some(PipelineError::branch(pending.name, err));
                            }
                        }
                        Err(_) => {
                            if failure.is_none() {
                                failure = Some(PipelineError::BranchPanic {
                                    branch: pending.name,
                                });
                            }
                        }
                    }
                }
                if let Some(err) = failure {
                    return Err(err);
                }

                let mut current = input;
                for set in outputs {
                    current.merge(set);
                }
                Ok(current)
            }
        }
    }
    .boxed()
}

/// Drives a root [`TaskDescriptor`] to completion.
///
/// Each call to [`run`](Pipeline::run) owns its own branch registry; nothing
/// is shared between runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(PipelineConfig::default()),
        }
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run a descriptor starting from an empty file set.
    pub async fn run(&self, root: &TaskDescriptor) -> PipelineResult<FileSet> {
        self.run_with(root, FileSet::new()).await
    }

    /// Run a descriptor starting from a supplied file set.
    pub async fn run_with(
        &self,
        root: &TaskDescriptor,
        initial: FileSet,
    ) -> PipelineResult<FileSet> {
        run_scoped(root.clone(), initial, Arc::clone(&self.config)).await
    }
}
