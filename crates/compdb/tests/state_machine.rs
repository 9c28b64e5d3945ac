//! Transition tests for the generation state machine and the registry,
//! driven by a scripted backend so no real build tools run.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crosscope_compdb::{
    CompdbBackend, CompdbError, CompdbGenerator, CompdbRegistry, Document, GenerateContext,
    GenerationState, LocalCommandRunner, Result, ShouldGenerate, UserPrompter,
};
use crosscope_core::config::Settings;

#[derive(Clone, Copy)]
enum Outcome {
    /// Writes the artifact file and succeeds.
    Succeed,
    Fail,
    /// Returns the cancellation signal immediately.
    Cancelled,
    /// Parks until the token fires, then reports cancellation.
    BlockUntilCancelled,
}

struct ScriptedBackend {
    name: &'static str,
    tree: PathBuf,
    artifact: PathBuf,
    languages: &'static [&'static str],
    outcomes: Mutex<VecDeque<Outcome>>,
    runs: AtomicUsize,
}

impl ScriptedBackend {
    fn new(name: &'static str, tree: &Path) -> Self {
        Self {
            name,
            tree: tree.to_path_buf(),
            artifact: tree.join("compile_commands.json"),
            languages: &["c", "cpp"],
            outcomes: Mutex::new(VecDeque::new()),
            runs: AtomicUsize::new(0),
        }
    }

    fn script(&self, outcome: Outcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompdbBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn applies_to(&self, document: &Document) -> bool {
        document.path.starts_with(&self.tree)
    }

    fn is_trigger_file(&self, document: &Document) -> bool {
        document.language == "gn"
    }

    fn supports_language(&self, language: &str) -> bool {
        self.languages.contains(&language)
    }

    fn artifact_path(&self, _document: &Document) -> PathBuf {
        self.artifact.clone()
    }

    async fn run(&self, _document: &Document, ctx: &GenerateContext<'_>) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Outcome::Succeed);
        match outcome {
            Outcome::Succeed => {
                std::fs::write(&self.artifact, "[]")?;
                Ok(())
            }
            Outcome::Fail => Err(CompdbError::CommandFailed {
                command: "scripted".to_string(),
                status: 1,
                stderr: "boom".to_string(),
            }),
            Outcome::Cancelled => Err(CompdbError::Cancelled),
            Outcome::BlockUntilCancelled => {
                ctx.cancel.cancelled().await;
                Err(CompdbError::Cancelled)
            }
        }
    }
}

#[derive(Default)]
struct RecordingPrompter {
    prompts: Mutex<Vec<String>>,
    answer: Mutex<Option<String>>,
}

#[async_trait]
impl UserPrompter for RecordingPrompter {
    async fn choose(&self, message: &str, _actions: &[&str]) -> Option<String> {
        self.prompts.lock().unwrap().push(message.to_string());
        self.answer.lock().unwrap().clone()
    }

    async fn add_workspace_folder(&self, _path: &Path) {}
}

struct Harness {
    runner: LocalCommandRunner,
    prompter: RecordingPrompter,
    cancel: CancellationToken,
    workspace_folders: Vec<PathBuf>,
    settings: Mutex<Settings>,
}

impl Harness {
    /// Workspace folders cover `tree` so the add-folder offer stays quiet
    /// unless a test asks otherwise.
    fn covering(tree: &Path) -> Self {
        Self {
            runner: LocalCommandRunner,
            prompter: RecordingPrompter::default(),
            cancel: CancellationToken::new(),
            workspace_folders: vec![tree.to_path_buf()],
            settings: Mutex::new(Settings::default()),
        }
    }

    fn ctx(&self) -> GenerateContext<'_> {
        GenerateContext {
            runner: &self.runner,
            prompter: &self.prompter,
            cancel: &self.cancel,
            workspace_folders: &self.workspace_folders,
            settings: &self.settings,
        }
    }
}

fn cpp_doc(tree: &Path) -> Document {
    Document::new(tree.join("widget.cc"), "cpp")
}

fn gn_doc(tree: &Path) -> Document {
    Document::new(tree.join("BUILD.gn"), "gn")
}

#[tokio::test]
async fn first_run_then_unchanged_then_self_heal() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new("scripted", dir.path()));
    let generator = CompdbGenerator::new(backend.clone());
    let harness = Harness::covering(dir.path());
    let document = cpp_doc(dir.path());

    assert_eq!(generator.should_generate(&document), ShouldGenerate::Yes);
    generator.generate(&document, &harness.ctx()).await.unwrap();
    assert_eq!(generator.state(), GenerationState::Generated);
    assert_eq!(
        generator.should_generate(&document),
        ShouldGenerate::Unchanged
    );

    // External deletion of the artifact re-arms the generator.
    std::fs::remove_file(dir.path().join("compile_commands.json")).unwrap();
    assert_eq!(generator.should_generate(&document), ShouldGenerate::Yes);

    generator.generate(&document, &harness.ctx()).await.unwrap();
    assert_eq!(
        generator.should_generate(&document),
        ShouldGenerate::Unchanged
    );
    assert_eq!(backend.runs(), 2);
}

#[tokio::test]
async fn unsupported_language_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new("scripted", dir.path()));
    let generator = CompdbGenerator::new(backend.clone());
    let harness = Harness::covering(dir.path());
    let document = Document::new(dir.path().join("README.md"), "markdown");

    assert_eq!(
        generator.should_generate(&document),
        ShouldGenerate::NotSupported
    );
    let decision = generator.generate(&document, &harness.ctx()).await.unwrap();
    assert_eq!(decision, ShouldGenerate::NotSupported);
    assert_eq!(backend.runs(), 0);
}

#[tokio::test]
async fn trigger_file_regenerates_even_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new("scripted", dir.path()));
    let generator = CompdbGenerator::new(backend.clone());
    let harness = Harness::covering(dir.path());

    generator
        .generate(&cpp_doc(dir.path()), &harness.ctx())
        .await
        .unwrap();
    assert_eq!(
        generator.should_generate(&cpp_doc(dir.path())),
        ShouldGenerate::Unchanged
    );
    // The artifact still exists, but a build-graph edit forces a rebuild.
    assert_eq!(
        generator.should_generate(&gn_doc(dir.path())),
        ShouldGenerate::Yes
    );
}

#[tokio::test]
async fn failure_is_sticky_until_recreation() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new("scripted", dir.path()));
    backend.script(Outcome::Fail);
    let generator = CompdbGenerator::new(backend.clone());
    let harness = Harness::covering(dir.path());
    let document = cpp_doc(dir.path());

    let err = generator
        .generate(&document, &harness.ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, CompdbError::CommandFailed { .. }));
    assert_eq!(generator.state(), GenerationState::Failed);

    // No document state un-sticks it, not even a trigger file.
    assert_eq!(
        generator.should_generate(&document),
        ShouldGenerate::HasFailed
    );
    assert_eq!(
        generator.should_generate(&gn_doc(dir.path())),
        ShouldGenerate::HasFailed
    );
    let decision = generator.generate(&document, &harness.ctx()).await.unwrap();
    assert_eq!(decision, ShouldGenerate::HasFailed);
    assert_eq!(backend.runs(), 1);

    // Recreating the instance is the recovery path.
    let fresh = CompdbGenerator::new(backend.clone());
    assert_eq!(fresh.should_generate(&document), ShouldGenerate::Yes);
}

#[tokio::test]
async fn cancellation_restores_initial() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new("scripted", dir.path()));
    backend.script(Outcome::Cancelled);
    let generator = CompdbGenerator::new(backend.clone());
    let harness = Harness::covering(dir.path());
    let document = cpp_doc(dir.path());

    let err = generator
        .generate(&document, &harness.ctx())
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    // Back to Initial, not Failed: a cancelled run counts as neither.
    assert_eq!(generator.state(), GenerationState::Initial);
    assert_eq!(generator.should_generate(&document), ShouldGenerate::Yes);
}

#[tokio::test]
async fn cancellation_restores_generated() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new("scripted", dir.path()));
    let generator = CompdbGenerator::new(backend.clone());
    let harness = Harness::covering(dir.path());

    generator
        .generate(&cpp_doc(dir.path()), &harness.ctx())
        .await
        .unwrap();
    assert_eq!(generator.state(), GenerationState::Generated);

    backend.script(Outcome::Cancelled);
    let err = generator
        .generate(&gn_doc(dir.path()), &harness.ctx())
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(generator.state(), GenerationState::Generated);
}

#[tokio::test]
async fn in_flight_run_blocks_a_second_one() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new("scripted", dir.path()));
    backend.script(Outcome::BlockUntilCancelled);
    let generator = Arc::new(CompdbGenerator::new(backend.clone()));
    let harness = Arc::new(Harness::covering(dir.path()));
    let document = cpp_doc(dir.path());

    let task = tokio::spawn({
        let generator = generator.clone();
        let harness = harness.clone();
        let document = document.clone();
        async move { generator.generate(&document, &harness.ctx()).await }
    });

    // Wait for the spawned run to take the Generating transition.
    while generator.state() != GenerationState::Generating {
        tokio::task::yield_now().await;
    }
    assert_eq!(
        generator.should_generate(&document),
        ShouldGenerate::InProgress
    );
    let decision = generator.generate(&document, &harness.ctx()).await.unwrap();
    assert_eq!(decision, ShouldGenerate::InProgress);
    assert_eq!(backend.runs(), 1);

    harness.cancel.cancel();
    let err = task.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(generator.state(), GenerationState::Initial);
}

#[tokio::test]
async fn registry_runs_only_the_first_eligible_generator() {
    let dir = tempfile::tempdir().unwrap();
    let first = Arc::new(ScriptedBackend::new("first", dir.path()));
    let second = Arc::new(ScriptedBackend::new("second", dir.path()));

    let mut registry = CompdbRegistry::new();
    registry.register(first.clone());
    registry.register(second.clone());

    let harness = Harness::covering(dir.path());
    let (name, result) = registry
        .generate_for(&cpp_doc(dir.path()), &harness.ctx())
        .await
        .unwrap();
    result.unwrap();
    assert_eq!(name, "first");
    assert_eq!(first.runs(), 1);
    assert_eq!(second.runs(), 0);
}

#[tokio::test]
async fn registry_skips_generators_that_answer_no() {
    let outside = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let elsewhere = Arc::new(ScriptedBackend::new("elsewhere", outside.path()));
    let local = Arc::new(ScriptedBackend::new("local", dir.path()));

    let mut registry = CompdbRegistry::new();
    registry.register(elsewhere.clone());
    registry.register(local.clone());

    let harness = Harness::covering(dir.path());
    let (name, result) = registry
        .generate_for(&cpp_doc(dir.path()), &harness.ctx())
        .await
        .unwrap();
    result.unwrap();
    assert_eq!(name, "local");
    assert_eq!(elsewhere.runs(), 0);
}

#[tokio::test]
async fn registry_reset_clears_sticky_failure() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new("scripted", dir.path()));
    backend.script(Outcome::Fail);

    let mut registry = CompdbRegistry::new();
    registry.register(backend.clone());

    let harness = Harness::covering(dir.path());
    let document = cpp_doc(dir.path());
    let (_, result) = registry.generate_for(&document, &harness.ctx()).await.unwrap();
    assert!(result.is_err());
    assert!(registry.generate_for(&document, &harness.ctx()).await.is_none());

    registry.reset();
    let (_, result) = registry.generate_for(&document, &harness.ctx()).await.unwrap();
    result.unwrap();
    assert_eq!(backend.runs(), 2);
}

#[tokio::test]
async fn artifact_outside_workspace_prompts_once() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new("scripted", dir.path()));
    let generator = CompdbGenerator::new(backend.clone());

    // Workspace folders do not cover the artifact directory.
    let harness = Harness::covering(Path::new("/somewhere/else"));
    let document = cpp_doc(dir.path());

    generator.generate(&document, &harness.ctx()).await.unwrap();
    assert_eq!(harness.prompter.prompts.lock().unwrap().len(), 1);

    // The offer fires at most once per generator instance.
    std::fs::remove_file(dir.path().join("compile_commands.json")).unwrap();
    generator.generate(&document, &harness.ctx()).await.unwrap();
    assert_eq!(harness.prompter.prompts.lock().unwrap().len(), 1);

    // A fresh instance respects the persisted "don't show again".
    harness
        .settings
        .lock()
        .unwrap()
        .suppress_prompt("add-folder:scripted");
    let fresh = CompdbGenerator::new(backend.clone());
    std::fs::remove_file(dir.path().join("compile_commands.json")).unwrap();
    fresh.generate(&document, &harness.ctx()).await.unwrap();
    assert_eq!(harness.prompter.prompts.lock().unwrap().len(), 1);
}
