//! Filesystem leaf adapters: read, write, delete

use std::io;
use std::path::{Path, PathBuf};

use globset::Glob;
use tracing::debug;
use walkdir::WalkDir;

use crate::context::TaskContext;
use crate::descriptor::TaskDescriptor;
use crate::error::{PipelineError, PipelineResult};
use crate::task::Task;
use crate::vfs::{FileRecord, FileSet};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Longest glob-free prefix of a pattern, and whether any glob component
/// follows it. Record names are relative to this base.
fn glob_base(pattern: &str) -> (PathBuf, bool) {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(GLOB_META) {
            return (base, true);
        }
        base.push(component.as_os_str());
    }
    (base, false)
}

struct ReadFiles {
    pattern: String,
}

#[async_trait::async_trait]
impl Task for ReadFiles {
    async fn run(&self, mut input: FileSet, _ctx: &TaskContext) -> PipelineResult<FileSet> {
        let (base, globbed) = glob_base(&self.pattern);

        if !globbed {
            // Plain path: one file, named by its file name.
            let path = Path::new(&self.pattern);
            let contents = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PipelineError::io("read", path, e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.pattern.clone());
            let mut record = FileRecord::new(name, contents);
            if let Ok(meta) = tokio::fs::metadata(path).await {
                if let Ok(modified) = meta.modified() {
                    record = record.with_modified(modified);
                }
            }
            input.insert(record);
            return Ok(input);
        }

        let matcher = Glob::new(&self.pattern)
            .map_err(|e| PipelineError::Pattern {
                pattern: self.pattern.clone(),
                source: e,
            })?
            .compile_matcher();
        let root = if base.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            base
        };

        let mut matched = 0usize;
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| PipelineError::Walk {
                path: root.clone(),
                source: e,
            })?;
            if !entry.file_type().is_file() || !matcher.is_match(entry.path()) {
                continue;
            }
            let contents = tokio::fs::read_to_string(entry.path())
                .await
                .map_err(|e| PipelineError::io("read", entry.path(), e))?;
            let name = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();
            let mut record = FileRecord::new(name, contents);
            if let Ok(meta) = entry.metadata() {
                if let Ok(modified) = meta.modified() {
                    record = record.with_modified(modified);
                }
            }
            input.insert(record);
            matched += 1;
        }
        debug!(pattern = %self.pattern, matched, "files discovered");
        Ok(input)
    }

    fn name(&self) -> String {
        format!("read_files({})", self.pattern)
    }
}

/// Read files matching a glob pattern, adding them to the current file set.
///
/// Records are named relative to the pattern's longest glob-free prefix and
/// discovered in sorted traversal order. A glob-free pattern reads a single
/// file named by its file name.
pub fn read_files(pattern: impl Into<String>) -> TaskDescriptor {
    TaskDescriptor::leaf(ReadFiles {
        pattern: pattern.into(),
    })
}

struct WriteFiles {
    dir: PathBuf,
}

#[async_trait::async_trait]
impl Task for WriteFiles {
    async fn run(&self, input: FileSet, _ctx: &TaskContext) -> PipelineResult<FileSet> {
        for record in input.iter() {
            let target = self.dir.join(record.name());
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PipelineError::io("create directory", parent, e))?;
            }
            tokio::fs::write(&target, record.contents())
                .await
                .map_err(|e| PipelineError::io("write", target.clone(), e))?;
        }
        debug!(dir = %self.dir.display(), records = input.len(), "records written");
        Ok(input)
    }

    fn name(&self) -> String {
        format!("write_files({})", self.dir.display())
    }
}

/// Write every record to `dir/<name>`, creating parent directories, and
/// pass the file set through unchanged. Writing mid-pipeline does not
/// truncate later steps.
pub fn write_files(dir: impl Into<PathBuf>) -> TaskDescriptor {
    TaskDescriptor::leaf(WriteFiles { dir: dir.into() })
}

struct DeleteDir {
    path: PathBuf,
}

#[async_trait::async_trait]
impl Task for DeleteDir {
    async fn run(&self, input: FileSet, _ctx: &TaskContext) -> PipelineResult<FileSet> {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "directory removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(PipelineError::io("remove directory", self.path.clone(), e)),
        }
        Ok(input)
    }

    fn name(&self) -> String {
        format!("delete_dir({})", self.path.display())
    }
}

/// Remove a directory tree, passing the file set through unchanged. An
/// absent path is not an error.
pub fn delete_dir(path: impl Into<PathBuf>) -> TaskDescriptor {
    TaskDescriptor::leaf(DeleteDir { path: path.into() })
}
