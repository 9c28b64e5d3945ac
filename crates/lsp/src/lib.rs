pub mod capabilities;
pub mod hover;
pub mod links;
pub mod util;

use crate::util::Document;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crosscope_compdb::backends::{ChromiumBackend, EcBackend, Platform2Backend};
use crosscope_compdb::{
    CompdbRegistry, GenerateContext, LocalCommandRunner, UserPrompter,
};
use crosscope_core::board::BoardOrHost;
use crosscope_core::config::Settings;
use crosscope_core::resolver;

pub struct EbuildServer {
    client: Client,
    pub documents: DashMap<Url, Arc<Document>>,
    settings: Arc<Mutex<Settings>>,
    registry: Arc<RwLock<Option<Arc<CompdbRegistry>>>>,
    runner: Arc<LocalCommandRunner>,
    workspace_folders: Arc<Mutex<Vec<PathBuf>>>,
    cancel_token: CancellationToken,
}

impl EbuildServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            settings: Arc::new(Mutex::new(Settings::load())),
            registry: Arc::new(RwLock::new(None)),
            runner: Arc::new(LocalCommandRunner),
            workspace_folders: Arc::new(Mutex::new(Vec::new())),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Checkout root governing `path`: the configured override if set,
    /// otherwise the nearest repo-managed ancestor.
    pub fn checkout_for(&self, path: &Path) -> Option<PathBuf> {
        if let Some(root) = self.settings.lock().unwrap().checkout_root.clone() {
            return Some(root);
        }
        resolver::find_checkout_root(path)
    }

    /// One generator per recognized tree, in priority order: Chromium
    /// checkouts first, then the ChromeOS checkout's platform2 and EC
    /// trees.
    fn build_registry(&self, folders: &[PathBuf]) -> CompdbRegistry {
        let settings = self.settings.lock().unwrap().clone();
        let board = settings
            .default_board
            .as_deref()
            .map(BoardOrHost::parse)
            .unwrap_or(BoardOrHost::Host);

        let mut registry = CompdbRegistry::new();
        for folder in folders {
            if folder.join(".gn").is_file() {
                registry.register(Arc::new(ChromiumBackend::new(folder.clone(), "out/Default")));
            }
        }
        let checkout = settings.checkout_root.clone().or_else(|| {
            folders
                .iter()
                .find_map(|folder| resolver::find_checkout_root(folder))
        });
        if let Some(checkout) = checkout {
            registry.register(Arc::new(Platform2Backend::new(checkout.clone(), board)));
            if let Some(ec_board) = settings.default_board {
                registry.register(Arc::new(EcBackend::new(
                    checkout.join("src/platform/ec"),
                    ec_board,
                )));
            }
        }
        registry
    }

    fn language_for(&self, path: &Path, client_language: &str) -> String {
        util::language_for_path(path)
            .map(str::to_string)
            .unwrap_or_else(|| client_language.to_string())
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for EbuildServer {
    #[allow(deprecated)] // root_uri is the fallback for older clients
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let mut folders: Vec<PathBuf> = params
            .workspace_folders
            .unwrap_or_default()
            .into_iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();
        if folders.is_empty() {
            if let Some(root) = params.root_uri.and_then(|uri| uri.to_file_path().ok()) {
                folders.push(root);
            }
        }

        let registry = self.build_registry(&folders);
        tracing::info!(
            folders = folders.len(),
            generators = registry.generators().len(),
            "initialized"
        );
        *self.workspace_folders.lock().unwrap() = folders;
        *self.registry.write().await = Some(Arc::new(registry));

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "crosscope".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: capabilities::server_capabilities(),
        })
    }

    async fn shutdown(&self) -> Result<()> {
        self.cancel_token.cancel();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let language = uri
            .to_file_path()
            .map(|path| self.language_for(&path, &params.text_document.language_id))
            .unwrap_or_else(|_| params.text_document.language_id.clone());
        self.documents.insert(
            uri,
            Arc::new(Document::new(
                params.text_document.text,
                language,
                params.text_document.version,
            )),
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        if let Some(mut entry) = self.documents.get_mut(&uri) {
            // Full sync: the last change carries the whole document.
            if let Some(change) = params.content_changes.into_iter().last() {
                let language = entry.language.clone();
                *entry.value_mut() = Arc::new(Document::new(change.text, language, version));
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri);
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let Ok(path) = uri.to_file_path() else {
            return;
        };
        let language = self
            .documents
            .get(&uri)
            .map(|document| document.language.clone())
            .unwrap_or_else(|| self.language_for(&path, ""));
        let Some(registry) = self.registry.read().await.clone() else {
            return;
        };

        let document = crosscope_compdb::Document::new(path, language);
        let client = self.client.clone();
        let runner = self.runner.clone();
        let settings = self.settings.clone();
        let folders = self.workspace_folders.lock().unwrap().clone();
        let cancel = self.cancel_token.child_token();

        // Generation shells out to build tools and can take minutes; keep
        // the notification handler free.
        tokio::spawn(async move {
            let prompter = ClientPrompter {
                client: client.clone(),
            };
            let ctx = GenerateContext {
                runner: runner.as_ref(),
                prompter: &prompter,
                cancel: &cancel,
                workspace_folders: &folders,
                settings: settings.as_ref(),
            };
            match registry.generate_for(&document, &ctx).await {
                Some((name, Ok(()))) => {
                    client
                        .log_message(
                            MessageType::INFO,
                            format!("{name}: compilation database updated"),
                        )
                        .await;
                }
                Some((name, Err(err))) if err.is_cancelled() => {
                    tracing::debug!(backend = name, "generation cancelled");
                }
                Some((name, Err(err))) => {
                    let actions: Vec<MessageActionItem> = err
                        .remediation()
                        .iter()
                        .map(|title| MessageActionItem {
                            title: title.to_string(),
                            properties: Default::default(),
                        })
                        .collect();
                    let _ = client
                        .show_message_request(
                            MessageType::ERROR,
                            format!("{name}: {err}"),
                            Some(actions),
                        )
                        .await;
                }
                None => {}
            }
        });
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        tracing::debug!(%uri, line = position.line, character = position.character, "hover");
        hover::hover(self, params).await
    }

    async fn document_link(
        &self,
        params: DocumentLinkParams,
    ) -> Result<Option<Vec<DocumentLink>>> {
        let uri = params.text_document.uri;
        tracing::debug!(%uri, "documentLink");
        let Some(document) = self.documents.get(&uri) else {
            return Ok(None);
        };
        if document.language != "ebuild" {
            return Ok(None);
        }
        let content = document.content.clone();
        drop(document);

        let Ok(path) = uri.to_file_path() else {
            return Ok(None);
        };
        let Some(checkout) = self.checkout_for(&path) else {
            return Ok(None);
        };
        Ok(Some(links::document_links(&content, &path, &checkout)))
    }
}

/// Prompt collaborator backed by the LSP client.
struct ClientPrompter {
    client: Client,
}

#[async_trait]
impl UserPrompter for ClientPrompter {
    async fn choose(&self, message: &str, actions: &[&str]) -> Option<String> {
        let items: Vec<MessageActionItem> = actions
            .iter()
            .map(|title| MessageActionItem {
                title: title.to_string(),
                properties: Default::default(),
            })
            .collect();
        self.client
            .show_message_request(MessageType::INFO, message.to_string(), Some(items))
            .await
            .ok()
            .flatten()
            .map(|item| item.title)
    }

    async fn add_workspace_folder(&self, path: &Path) {
        // Workspace membership belongs to the client; the best a server
        // can do is ask it to show the folder.
        let Ok(uri) = Url::from_file_path(path) else {
            return;
        };
        let _ = self
            .client
            .show_document(ShowDocumentParams {
                uri,
                external: Some(false),
                take_focus: Some(true),
                selection: None,
            })
            .await;
    }
}

pub async fn run_server() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = tower_lsp::LspService::new(EbuildServer::new);
    tower_lsp::Server::new(stdin, stdout, socket)
        .serve(service)
        .await;

    Ok(())
}
