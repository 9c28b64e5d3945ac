use async_trait::async_trait;
use std::path::PathBuf;

use crate::backends::{is_cpp_language, run_checked};
use crate::error::Result;
use crate::exec::CommandRequest;
use crate::generator::{CompdbBackend, Document, GenerateContext};

/// The EC firmware tree drives everything through make; the
/// `ide-compile-cmds` helper target emits the compilation database for
/// one EC board.
pub struct EcBackend {
    ec_root: PathBuf,
    /// EC board name, a separate namespace from ChromeOS boards.
    board: String,
}

impl EcBackend {
    pub fn new(ec_root: impl Into<PathBuf>, board: impl Into<String>) -> Self {
        Self {
            ec_root: ec_root.into(),
            board: board.into(),
        }
    }
}

#[async_trait]
impl CompdbBackend for EcBackend {
    fn name(&self) -> &'static str {
        "ec"
    }

    fn applies_to(&self, document: &Document) -> bool {
        document.path.starts_with(&self.ec_root)
    }

    fn is_trigger_file(&self, document: &Document) -> bool {
        document.file_name() == "Makefile" || document.extension() == "mk"
    }

    fn supports_language(&self, language: &str) -> bool {
        is_cpp_language(language)
    }

    fn artifact_path(&self, _document: &Document) -> PathBuf {
        self.ec_root
            .join("build")
            .join(&self.board)
            .join("RW/compile_commands.json")
    }

    async fn run(&self, _document: &Document, ctx: &GenerateContext<'_>) -> Result<()> {
        let request = CommandRequest::new("make")
            .arg(format!("ide-compile-cmds-{}", self.board))
            .cwd(&self.ec_root);
        run_checked(ctx, request).await
    }
}
