//! The generation state machine and the registry composing independent
//! generators.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crosscope_core::config::Settings;

use crate::error::Result;
use crate::exec::CommandRunner;
use crate::state::{GenerationState, ShouldGenerate};

pub const ACTION_ADD_FOLDER: &str = "Add to workspace";
pub const ACTION_DONT_SHOW_AGAIN: &str = "Don't show again";

/// The document an editor event concerns: its filesystem path and an
/// LSP-style language id ("c", "cpp", "gn", "ebuild", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub language: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> &str {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
    }
}

/// Advisory prompt collaborator. Nothing in the state machine depends on
/// the user's answer beyond persisting a suppression preference.
#[async_trait]
pub trait UserPrompter: Send + Sync {
    /// Presents `actions` alongside `message`; resolves to the chosen
    /// action label, or `None` if dismissed.
    async fn choose(&self, message: &str, actions: &[&str]) -> Option<String>;

    /// Asks the editor side to add `path` to the active workspace.
    async fn add_workspace_folder(&self, path: &Path);
}

/// Collaborators threaded through one generation run.
pub struct GenerateContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub prompter: &'a dyn UserPrompter,
    pub cancel: &'a CancellationToken,
    pub workspace_folders: &'a [PathBuf],
    pub settings: &'a Mutex<Settings>,
}

/// One compilation-database producer. Backends hold the per-tree command
/// recipe and stay free of state: the wrapper owns the lifecycle.
#[async_trait]
pub trait CompdbBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether documents at this path belong to this backend's tree.
    fn applies_to(&self, document: &Document) -> bool;

    /// Build-graph definition files whose edits force regeneration even
    /// when their language is outside the supported set.
    fn is_trigger_file(&self, document: &Document) -> bool;

    fn supports_language(&self, language: &str) -> bool;

    /// Where the generated compilation database lands for `document`.
    fn artifact_path(&self, document: &Document) -> PathBuf;

    async fn run(&self, document: &Document, ctx: &GenerateContext<'_>) -> Result<()>;
}

struct Inner {
    state: GenerationState,
    /// Artifact recorded by the last successful run, checked for external
    /// deletion to self-heal out of `Generated`.
    artifact: Option<PathBuf>,
    /// The add-to-workspace offer fires at most once per instance.
    offered_folder: bool,
}

/// A backend plus its state machine. One instance per named generator;
/// recreate the instance to recover from `Failed`.
pub struct CompdbGenerator {
    backend: Arc<dyn CompdbBackend>,
    inner: Mutex<Inner>,
}

impl CompdbGenerator {
    pub fn new(backend: Arc<dyn CompdbBackend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                state: GenerationState::Initial,
                artifact: None,
                offered_folder: false,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn state(&self) -> GenerationState {
        self.inner.lock().unwrap().state
    }

    pub fn applies_to(&self, document: &Document) -> bool {
        self.backend.applies_to(document)
    }

    /// Non-binding preview of the decision `generate` would take now.
    pub fn should_generate(&self, document: &Document) -> ShouldGenerate {
        let inner = self.inner.lock().unwrap();
        self.decide(&inner, document)
    }

    fn decide(&self, inner: &Inner, document: &Document) -> ShouldGenerate {
        // In-flight and failed generators answer for themselves before the
        // document is even considered: Generating must not stack a second
        // run, and Failed is sticky until the instance is recreated.
        match inner.state {
            GenerationState::Generating => return ShouldGenerate::InProgress,
            GenerationState::Failed => return ShouldGenerate::HasFailed,
            GenerationState::Initial | GenerationState::Generated => {}
        }
        if self.backend.is_trigger_file(document) {
            return ShouldGenerate::Yes;
        }
        if !self.backend.supports_language(&document.language) {
            return ShouldGenerate::NotSupported;
        }
        if inner.state == GenerationState::Initial {
            return ShouldGenerate::Yes;
        }
        match &inner.artifact {
            // Artifact deleted externally: self-heal by regenerating.
            Some(artifact) if !artifact.exists() => ShouldGenerate::Yes,
            _ => ShouldGenerate::Unchanged,
        }
    }

    /// Runs the backend if the decision at the moment of the call is yes.
    /// The decision and the transition to `Generating` happen under one
    /// lock acquisition, which is what makes concurrent save events
    /// collapse into a single run.
    ///
    /// Returns the decision taken; `Ok(ShouldGenerate::Yes)` means a run
    /// completed successfully.
    pub async fn generate(
        &self,
        document: &Document,
        ctx: &GenerateContext<'_>,
    ) -> Result<ShouldGenerate> {
        let previous = {
            let mut inner = self.inner.lock().unwrap();
            let decision = self.decide(&inner, document);
            if !decision.is_yes() {
                return Ok(decision);
            }
            let previous = inner.state;
            inner.state = GenerationState::Generating;
            previous
        };

        tracing::info!(
            backend = self.backend.name(),
            document = %document.path.display(),
            "generating compilation database"
        );
        let result = self.backend.run(document, ctx).await;

        // Single settlement point for success, failure and cancellation,
        // so the snapshot restore cannot be skipped by an early return.
        {
            let mut inner = self.inner.lock().unwrap();
            match &result {
                Ok(()) => {
                    inner.state = GenerationState::Generated;
                    inner.artifact = Some(self.backend.artifact_path(document));
                }
                Err(err) if err.is_cancelled() => {
                    inner.state = previous;
                    tracing::debug!(
                        backend = self.backend.name(),
                        "generation cancelled, prior state restored"
                    );
                }
                Err(err) => {
                    inner.state = GenerationState::Failed;
                    tracing::error!(backend = self.backend.name(), %err, "generation failed");
                }
            }
        }

        if result.is_ok() {
            self.offer_workspace_folder(document, ctx).await;
        }
        result.map(|()| ShouldGenerate::Yes)
    }

    /// One-time offer to add the artifact's directory to the workspace
    /// when it landed outside every workspace folder.
    async fn offer_workspace_folder(&self, document: &Document, ctx: &GenerateContext<'_>) {
        let artifact = self.backend.artifact_path(document);
        let Some(dir) = artifact.parent() else {
            return;
        };
        if ctx
            .workspace_folders
            .iter()
            .any(|folder| dir.starts_with(folder))
        {
            return;
        }

        let key = format!("add-folder:{}", self.backend.name());
        if ctx.settings.lock().unwrap().is_prompt_suppressed(&key) {
            return;
        }
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.offered_folder {
                return;
            }
            inner.offered_folder = true;
        }

        let message = format!(
            "The compilation database was written to {}, which is outside the current workspace.",
            dir.display()
        );
        let choice = ctx
            .prompter
            .choose(&message, &[ACTION_ADD_FOLDER, ACTION_DONT_SHOW_AGAIN])
            .await;
        match choice.as_deref() {
            Some(ACTION_ADD_FOLDER) => ctx.prompter.add_workspace_folder(dir).await,
            Some(ACTION_DONT_SHOW_AGAIN) => {
                let mut settings = ctx.settings.lock().unwrap();
                settings.suppress_prompt(&key);
                if let Err(err) = settings.save() {
                    tracing::warn!(%err, "failed to persist prompt suppression");
                }
            }
            _ => {}
        }
    }
}

/// Generators in registration order. A document event runs at most one
/// generator: the first registered one that both applies to the document
/// and answers yes. Registration order is the priority order.
#[derive(Default)]
pub struct CompdbRegistry {
    generators: Vec<Arc<CompdbGenerator>>,
}

impl CompdbRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, backend: Arc<dyn CompdbBackend>) {
        tracing::debug!(backend = backend.name(), "registering compdb generator");
        self.generators.push(Arc::new(CompdbGenerator::new(backend)));
    }

    pub fn generators(&self) -> &[Arc<CompdbGenerator>] {
        &self.generators
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub async fn generate_for(
        &self,
        document: &Document,
        ctx: &GenerateContext<'_>,
    ) -> Option<(&'static str, Result<()>)> {
        for generator in &self.generators {
            if !generator.applies_to(document) {
                continue;
            }
            if generator.should_generate(document).is_yes() {
                let result = generator.generate(document, ctx).await.map(|_| ());
                return Some((generator.name(), result));
            }
        }
        None
    }

    /// Drops all generator state by recreating every instance. This is
    /// the manual recovery path out of a sticky `Failed`.
    pub fn reset(&mut self) {
        self.generators = self
            .generators
            .iter()
            .map(|generator| Arc::new(CompdbGenerator::new(generator.backend.clone())))
            .collect();
    }
}
