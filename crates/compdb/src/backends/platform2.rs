use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crosscope_core::board::BoardOrHost;
use crosscope_core::resolver::chroot_exists;

use crate::backends::{is_cpp_language, run_checked};
use crate::error::{CompdbError, Result};
use crate::exec::CommandRequest;
use crate::generator::{CompdbBackend, Document, GenerateContext};

/// Platform2 packages build inside the SDK chroot. An emerge run with the
/// compilation-database USE flag writes `compile_commands_chroot.json`
/// next to the package sources, where clangd picks it up.
pub struct Platform2Backend {
    checkout: PathBuf,
    board: BoardOrHost,
}

impl Platform2Backend {
    pub fn new(checkout: impl Into<PathBuf>, board: BoardOrHost) -> Self {
        Self {
            checkout: checkout.into(),
            board,
        }
    }

    fn platform2_root(&self) -> PathBuf {
        self.checkout.join("src/platform2")
    }

    /// Directory of the platform2 package containing `path`: the first
    /// component under `src/platform2/`.
    fn package_dir(&self, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(self.platform2_root()).ok()?;
        let package = relative.components().next()?;
        Some(self.platform2_root().join(package))
    }
}

#[async_trait]
impl CompdbBackend for Platform2Backend {
    fn name(&self) -> &'static str {
        "platform2"
    }

    fn applies_to(&self, document: &Document) -> bool {
        document.path.starts_with(self.platform2_root())
    }

    fn is_trigger_file(&self, document: &Document) -> bool {
        document.language == "gn" || matches!(document.extension(), "gn" | "gni")
    }

    fn supports_language(&self, language: &str) -> bool {
        is_cpp_language(language)
    }

    fn artifact_path(&self, document: &Document) -> PathBuf {
        self.package_dir(&document.path)
            .unwrap_or_else(|| self.platform2_root())
            .join("compile_commands_chroot.json")
    }

    async fn run(&self, document: &Document, ctx: &GenerateContext<'_>) -> Result<()> {
        if !chroot_exists(&self.checkout) {
            return Err(CompdbError::NoChroot {
                checkout: self.checkout.clone(),
            });
        }
        let package = self
            .package_dir(&document.path)
            .and_then(|dir| dir.file_name().map(|name| name.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "platform2".to_string());

        let request = CommandRequest::new("cros_sdk")
            .arg("--")
            .arg("env")
            .arg("USE=compilation_database")
            .arg(self.board.suffixed_executable("emerge"))
            .arg("--nodeps")
            .arg(format!("chromeos-base/{package}"))
            .cwd(&self.checkout);
        run_checked(ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> Platform2Backend {
        Platform2Backend::new("/cros", BoardOrHost::parse("kevin"))
    }

    #[test]
    fn scoped_to_platform2() {
        let backend = backend();
        assert!(backend.applies_to(&Document::new("/cros/src/platform2/shill/manager.cc", "cpp")));
        assert!(!backend.applies_to(&Document::new("/cros/src/platform/ec/main.c", "c")));
    }

    #[test]
    fn artifact_lands_in_the_package_dir() {
        let backend = backend();
        let document = Document::new("/cros/src/platform2/shill/wifi/wifi.cc", "cpp");
        assert_eq!(
            backend.artifact_path(&document),
            PathBuf::from("/cros/src/platform2/shill/compile_commands_chroot.json")
        );
    }

    #[test]
    fn gn_edits_trigger() {
        let backend = backend();
        assert!(backend.is_trigger_file(&Document::new("/cros/src/platform2/shill/BUILD.gn", "gn")));
        assert!(!backend.is_trigger_file(&Document::new(
            "/cros/src/platform2/shill/manager.cc",
            "cpp"
        )));
    }
}
