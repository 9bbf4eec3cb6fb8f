//! Content transforms: placeholder splicing, markdown, minification

use minify_html::Cfg;
use pulldown_cmark::{html, Parser};
use tracing::debug;

use crate::context::TaskContext;
use crate::descriptor::TaskDescriptor;
use crate::error::{PipelineError, PipelineResult};
use crate::task::Task;
use crate::vfs::FileSet;

fn is_markdown(name: &str) -> bool {
    name.ends_with(".md") || name.ends_with(".markdown")
}

fn is_markup(name: &str) -> bool {
    name.ends_with(".html") || name.ends_with(".htm")
}

struct Replace {
    token: String,
    source: TaskDescriptor,
}

#[async_trait::async_trait]
impl Task for Replace {
    async fn run(&self, input: FileSet, ctx: &TaskContext) -> PipelineResult<FileSet> {
        // The source is evaluated once; only its rendered text is used, its
        // records are not merged in.
        let rendered = ctx.evaluate(&self.source).await?.concatenated();
        let mut out = FileSet::new();
        for record in input {
            let replaced = record.contents().replace(&self.token, &rendered);
            out.insert(record.with_contents(replaced));
        }
        Ok(out)
    }

    fn name(&self) -> String {
        format!("replace({})", self.token)
    }
}

/// Substitute the text produced by `source` into every literal occurrence
/// of `token` across the current file set.
pub fn replace(token: impl Into<String>, source: TaskDescriptor) -> TaskDescriptor {
    TaskDescriptor::leaf(Replace {
        token: token.into(),
        source,
    })
}

struct AsReplacementFor {
    token: String,
    source: TaskDescriptor,
}

#[async_trait::async_trait]
impl Task for AsReplacementFor {
    async fn run(&self, input: FileSet, ctx: &TaskContext) -> PipelineResult<FileSet> {
        let body = input.concatenated();
        let layout = ctx.evaluate(&self.source).await?;
        let mut out = FileSet::new();
        for record in layout {
            let replaced = record.contents().replace(&self.token, &body);
            out.insert(record.with_contents(replaced));
        }
        Ok(out)
    }

    fn name(&self) -> String {
        format!("as_replacement_for({})", self.token)
    }
}

/// The inverse splice: substitute the current file set's text into `token`
/// occurrences inside the set produced by `source`; the source's records
/// replace the current set for subsequent steps. Lets a pipeline build
/// content and layout independently and splice either into the other.
pub fn as_replacement_for(token: impl Into<String>, source: TaskDescriptor) -> TaskDescriptor {
    TaskDescriptor::leaf(AsReplacementFor {
        token: token.into(),
        source,
    })
}

struct Markdown;

#[async_trait::async_trait]
impl Task for Markdown {
    async fn run(&self, input: FileSet, _ctx: &TaskContext) -> PipelineResult<FileSet> {
        let mut out = FileSet::new();
        let mut converted = 0usize;
        for record in input {
            if !is_markdown(record.name()) {
                out.insert(record);
                continue;
            }
            let mut rendered = String::new();
            html::push_html(&mut rendered, Parser::new(record.contents()));
            out.insert(record.with_contents(rendered.trim_end()));
            converted += 1;
        }
        debug!(converted, "markdown records rendered");
        Ok(out)
    }

    fn name(&self) -> String {
        "markdown".to_string()
    }
}

/// Render every markdown record (`*.md`, `*.markdown`) to HTML, preserving
/// names and order; other records pass through untouched.
pub fn markdown() -> TaskDescriptor {
    TaskDescriptor::leaf(Markdown)
}

struct Minify;

#[async_trait::async_trait]
impl Task for Minify {
    async fn run(&self, input: FileSet, _ctx: &TaskContext) -> PipelineResult<FileSet> {
        let cfg = Cfg::new();
        let mut out = FileSet::new();
        for record in input {
            if !is_markup(record.name()) {
                out.insert(record);
                continue;
            }
            let minified = minify_html::minify(record.contents().as_bytes(), &cfg);
            let text = String::from_utf8(minified).map_err(|_| {
                PipelineError::transform(
                    "minify",
                    record.name(),
                    "minified output was not valid UTF-8",
                )
            })?;
            out.insert(record.with_contents(text));
        }
        Ok(out)
    }

    fn name(&self) -> String {
        "minify".to_string()
    }
}

/// Minify every markup record (`*.html`, `*.htm`); other records pass
/// through untouched.
pub fn minify() -> TaskDescriptor {
    TaskDescriptor::leaf(Minify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::series;
    use crate::executor::Pipeline;
    use crate::vfs::FileRecord;

    struct Static {
        name: &'static str,
        contents: &'static str,
    }

    #[async_trait::async_trait]
    impl Task for Static {
        async fn run(&self, mut input: FileSet, _ctx: &TaskContext) -> PipelineResult<FileSet> {
            input.insert(FileRecord::new(self.name, self.contents));
            Ok(input)
        }

        fn name(&self) -> String {
            format!("static({})", self.name)
        }
    }

    fn emit(name: &'static str, contents: &'static str) -> TaskDescriptor {
        TaskDescriptor::leaf(Static { name, contents })
    }

    #[tokio::test]
    async fn replace_splices_source_text_into_tokens() {
        let mut input = FileSet::new();
        input.insert(FileRecord::new("page.html", "<div>{header}</div>"));
        input.insert(FileRecord::new("other.html", "untouched"));

        let build = series([replace("{header}", emit("header.html", "HDR"))]);
        let out = Pipeline::new().run_with(&build, input).await.unwrap();

        assert_eq!(out.get("page.html").unwrap().contents(), "<div>HDR</div>");
        assert_eq!(out.get("other.html").unwrap().contents(), "untouched");
        // The source's own records are not merged in.
        assert!(!out.contains("header.html"));
    }

    #[tokio::test]
    async fn replace_concatenates_a_multi_record_source() {
        let mut input = FileSet::new();
        input.insert(FileRecord::new("page.html", "[{parts}]"));

        let build = series([replace(
            "{parts}",
            series([emit("one", "a"), emit("two", "b")]),
        )]);
        let out = Pipeline::new().run_with(&build, input).await.unwrap();

        assert_eq!(out.get("page.html").unwrap().contents(), "[ab]");
    }

    #[tokio::test]
    async fn as_replacement_for_splices_the_main_set_into_the_layout() {
        let mut input = FileSet::new();
        input.insert(FileRecord::new("body.html", "BODY"));

        let build = series([as_replacement_for(
            "{x}",
            emit("_layout.html", "[{x}]"),
        )]);
        let out = Pipeline::new().run_with(&build, input).await.unwrap();

        // The layout's set replaces the main one.
        assert_eq!(out.names(), vec!["_layout.html"]);
        assert_eq!(out.get("_layout.html").unwrap().contents(), "[BODY]");
    }

    #[tokio::test]
    async fn markdown_renders_only_markdown_records() {
        let mut input = FileSet::new();
        input.insert(FileRecord::new("note.md", "# Title"));
        input.insert(FileRecord::new("style.css", "body {}"));

        let out = Pipeline::new()
            .run_with(&series([markdown()]), input)
            .await
            .unwrap();

        assert_eq!(out.names(), vec!["note.md", "style.css"]);
        assert_eq!(out.get("note.md").unwrap().contents(), "<h1>Title</h1>");
        assert_eq!(out.get("style.css").unwrap().contents(), "body {}");
    }

    #[tokio::test]
    async fn minify_strips_comments_from_markup_records() {
        let mut input = FileSet::new();
        input.insert(FileRecord::new(
            "page.html",
            "<p>  hello  </p>  <!-- gone -->",
        ));
        input.insert(FileRecord::new("data.json", "{ \"keep\": true }"));

        let out = Pipeline::new()
            .run_with(&series([minify()]), input)
            .await
            .unwrap();

        let page = out.get("page.html").unwrap().contents();
        assert!(!page.contains("<!--"));
        assert!(page.len() < "<p>  hello  </p>  <!-- gone -->".len());
        assert!(page.contains("hello"));
        assert_eq!(out.get("data.json").unwrap().contents(), "{ \"keep\": true }");
    }
}
