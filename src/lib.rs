//! taskpipe - Composable build-task pipelines
//!
//! A small engine for declarative build pipelines in the static-site mold:
//! an ordered set of named content records flows through a tree of task
//! descriptors. Leaves read, write, transform, or run arbitrary actions;
//! combinators compose them sequentially ([`series`]), detach them to run
//! concurrently ([`branch`]), and rendezvous with everything outstanding
//! ([`barrier`]).
//!
//! # Overview
//!
//! - Descriptors are stateless values; one [`Pipeline`] run owns all of its
//!   run state, including the registry of detached branches.
//! - A branch passes the current file set through unchanged; its output is
//!   merged back at the next barrier, later-detached branches winning name
//!   collisions.
//! - Content transforms ([`replace`], [`as_replacement_for`], [`markdown`],
//!   [`minify`]) are ordinary leaves; the splice tasks evaluate their source
//!   descriptor through a [`TaskContext`] without the executor knowing
//!   their internals.
//!
//! # Example
//!
//! ```rust
//! use taskpipe::{async_trait, replace, series, Pipeline, PipelineResult, Task, TaskContext, TaskDescriptor};
//! use taskpipe::vfs::{FileRecord, FileSet};
//!
//! struct Banner;
//!
//! #[async_trait]
//! impl Task for Banner {
//!     async fn run(&self, mut input: FileSet, _ctx: &TaskContext) -> PipelineResult<FileSet> {
//!         input.insert(FileRecord::new("banner.txt", "hello"));
//!         Ok(input)
//!     }
//!
//!     fn name(&self) -> String {
//!         "banner".to_string()
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> PipelineResult<()> {
//!     let mut pages = FileSet::new();
//!     pages.insert(FileRecord::new("index.html", "<p>{banner}</p>"));
//!
//!     let build = series([replace("{banner}", TaskDescriptor::leaf(Banner))]);
//!     let out = Pipeline::new().run_with(&build, pages).await?;
//!
//!     assert_eq!(out.get("index.html").unwrap().contents(), "<p>hello</p>");
//!     Ok(())
//! }
//! ```
//!
//! A full site build reads sources, renders markdown, splices the pages
//! into a layout, and writes the result, clearing the output directory on a
//! detached branch joined just before the write:
//!
//! ```rust,no_run
//! use taskpipe::{barrier, branch, delete_dir, markdown, read_files, series, write_files, as_replacement_for, Pipeline};
//!
//! # async fn build() -> taskpipe::PipelineResult<()> {
//! let layout = series([
//!     read_files("src/_layout.html"),
//!     taskpipe::replace("{header}", read_files("src/_header.html")),
//! ]);
//!
//! let site = series([
//!     branch(delete_dir("build")),
//!     read_files("src/**/*.md"),
//!     markdown(),
//!     as_replacement_for("{body}", layout),
//!     barrier(),
//!     write_files("build"),
//! ]);
//!
//! Pipeline::new().run(&site).await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod fs;
pub mod task;
pub mod transform;
pub mod types;
pub mod vfs;

pub use context::TaskContext;
pub use descriptor::{barrier, branch, series, TaskDescriptor};
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use executor::Pipeline;
pub use fs::{delete_dir, read_files, write_files};
pub use task::{execute, Env, Task};
pub use transform::{as_replacement_for, markdown, minify, replace};
pub use types::PipelineConfig;

use std::future::Future;
use std::pin::Pin;

/// A boxed future that is Send and can be used across thread boundaries
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
