use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::backends::{is_cpp_language, run_checked};
use crate::error::Result;
use crate::exec::CommandRequest;
use crate::generator::{CompdbBackend, Document, GenerateContext};

/// Chromium builds with gn, which can export the compilation database
/// itself while generating the build graph.
pub struct ChromiumBackend {
    src_root: PathBuf,
    out_dir: String,
}

impl ChromiumBackend {
    pub fn new(src_root: impl Into<PathBuf>, out_dir: impl Into<String>) -> Self {
        Self {
            src_root: src_root.into(),
            out_dir: out_dir.into(),
        }
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }
}

#[async_trait]
impl CompdbBackend for ChromiumBackend {
    fn name(&self) -> &'static str {
        "chromium"
    }

    fn applies_to(&self, document: &Document) -> bool {
        document.path.starts_with(&self.src_root)
    }

    fn is_trigger_file(&self, document: &Document) -> bool {
        document.language == "gn" || matches!(document.extension(), "gn" | "gni")
    }

    fn supports_language(&self, language: &str) -> bool {
        is_cpp_language(language)
    }

    fn artifact_path(&self, _document: &Document) -> PathBuf {
        self.src_root
            .join(&self.out_dir)
            .join("compile_commands.json")
    }

    async fn run(&self, _document: &Document, ctx: &GenerateContext<'_>) -> Result<()> {
        let request = CommandRequest::new("gn")
            .arg("gen")
            .arg(&self.out_dir)
            .arg("--export-compile-commands")
            .cwd(&self.src_root);
        run_checked(ctx, request).await
    }
}
