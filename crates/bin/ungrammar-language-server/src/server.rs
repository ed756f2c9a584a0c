use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use ungrammar_lang::UngramDocument;
use ungrammar_lang::text_document::{ContentChange, TextDocument};

use crate::capabilities::{
    code_action, code_lens, completion, definition, diagnostics, document_symbols, folding,
    formatting, highlight, hover, references, rename, selection, semantic_tokens,
};
use crate::convert::from_lsp_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnableSetting {
    pub enable: bool,
}

impl Default for EnableSetting {
    fn default() -> Self {
        Self { enable: true }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UngrammarSettings {
    pub validate: EnableSetting,
    pub format: EnableSetting,
}

/// Client settings under the `ungrammar` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub ungrammar: UngrammarSettings,
}

impl ServerSettings {
    /// Take over the flags present in `value`, keeping the others
    pub fn update(&mut self, value: &Value) {
        if let Some(enable) = value
            .pointer("/ungrammar/validate/enable")
            .and_then(Value::as_bool)
        {
            self.ungrammar.validate.enable = enable;
        }
        if let Some(enable) = value
            .pointer("/ungrammar/format/enable")
            .and_then(Value::as_bool)
        {
            self.ungrammar.format.enable = enable;
        }
    }
}

/// An open buffer and its analysis
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub document: TextDocument,
    pub ungram: UngramDocument,
}

impl DocumentState {
    pub fn new(uri: &Url, version: i32, text: String) -> Self {
        let ungram = UngramDocument::parse(&text);
        Self {
            document: TextDocument::new(uri.as_str(), version, text),
            ungram,
        }
    }

    /// Apply editor changes and re-analyse the new text
    pub fn update(&mut self, changes: Vec<TextDocumentContentChangeEvent>, version: i32) {
        let changes = changes
            .into_iter()
            .map(|change| ContentChange {
                range: change.range.map(from_lsp_range),
                text: change.text,
            })
            .collect::<Vec<_>>();
        self.document.update(&changes, version);
        self.ungram.reparse(self.document.text());
    }
}

/// The ungrammar language server implementation.
pub struct Backend {
    client: Client,
    documents: DashMap<Url, DocumentState>,
    settings: RwLock<ServerSettings>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            settings: RwLock::new(ServerSettings::default()),
        }
    }

    fn with_document<R>(&self, uri: &Url, f: impl FnOnce(&DocumentState) -> R) -> Option<R> {
        match self.documents.get(uri) {
            Some(state) => Some(f(&state)),
            None => {
                log::warn!("request for unknown document {uri}");
                None
            }
        }
    }

    async fn publish_diagnostics(&self, uri: Url) {
        let enabled = self.settings.read().await.ungrammar.validate.enable;
        let found = self.with_document(&uri, |state| {
            let diagnostics = if enabled {
                diagnostics::diagnostics(&state.document, &state.ungram)
            } else {
                Vec::new()
            };
            (diagnostics, state.document.version)
        });
        if let Some((diagnostics, version)) = found {
            self.client
                .publish_diagnostics(uri, diagnostics, Some(version))
                .await;
        }
    }

    async fn format_enabled(&self) -> bool {
        self.settings.read().await.ungrammar.format.enable
    }
}

fn capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Kind(
            TextDocumentSyncKind::INCREMENTAL,
        )),
        completion_provider: Some(CompletionOptions {
            resolve_provider: Some(false),
            ..Default::default()
        }),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        definition_provider: Some(OneOf::Left(true)),
        references_provider: Some(OneOf::Left(true)),
        rename_provider: Some(OneOf::Right(RenameOptions {
            prepare_provider: Some(true),
            work_done_progress_options: Default::default(),
        })),
        code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
        folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
        selection_range_provider: Some(SelectionRangeProviderCapability::Simple(true)),
        code_lens_provider: Some(CodeLensOptions {
            resolve_provider: Some(false),
        }),
        document_highlight_provider: Some(OneOf::Left(true)),
        document_formatting_provider: Some(OneOf::Left(true)),
        document_range_formatting_provider: Some(OneOf::Left(true)),
        document_symbol_provider: Some(OneOf::Left(true)),
        semantic_tokens_provider: Some(
            SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
                legend: semantic_tokens::semantic_token_legend(),
                range: Some(true),
                full: Some(SemanticTokensFullOptions::Bool(true)),
                ..Default::default()
            }),
        ),
        ..ServerCapabilities::default()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = &params.initialization_options {
            self.settings.write().await.update(options);
        }
        Ok(InitializeResult {
            capabilities: capabilities(),
            server_info: Some(ServerInfo {
                name: "ungrammar-language-server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "ungrammar language server initialized!")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let item = params.text_document;
        log::debug!("opened {}", item.uri);
        self.documents.insert(
            item.uri.clone(),
            DocumentState::new(&item.uri, item.version, item.text),
        );
        self.publish_diagnostics(item.uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        match self.documents.get_mut(&uri) {
            Some(mut state) => state.update(params.content_changes, params.text_document.version),
            None => {
                log::warn!("change for unknown document {uri}");
                return;
            }
        }
        self.publish_diagnostics(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.settings.write().await.update(&params.settings);
        let uris = self
            .documents
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        for uri in uris {
            self.publish_diagnostics(uri).await;
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        Ok(self
            .with_document(&position.text_document.uri, |s| {
                hover::hover(&s.document, &s.ungram, position.position)
            })
            .flatten())
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        Ok(self.with_document(&position.text_document.uri, |s| {
            CompletionResponse::List(completion::completion(
                &s.document,
                &s.ungram,
                position.position,
            ))
        }))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        Ok(self
            .with_document(&position.text_document.uri, |s| {
                definition::definition(&s.document, &s.ungram, position.position)
            })
            .flatten())
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let position = params.text_document_position;
        let include_declaration = params.context.include_declaration;
        Ok(self
            .with_document(&position.text_document.uri, |s| {
                references::references(
                    &s.document,
                    &s.ungram,
                    position.position,
                    include_declaration,
                )
            })
            .flatten())
    }

    async fn document_highlight(
        &self,
        params: DocumentHighlightParams,
    ) -> Result<Option<Vec<DocumentHighlight>>> {
        let position = params.text_document_position_params;
        Ok(self
            .with_document(&position.text_document.uri, |s| {
                highlight::document_highlight(&s.document, &s.ungram, position.position)
            })
            .flatten())
    }

    async fn prepare_rename(
        &self,
        params: TextDocumentPositionParams,
    ) -> Result<Option<PrepareRenameResponse>> {
        Ok(self
            .with_document(&params.text_document.uri, |s| {
                rename::prepare_rename(&s.document, &s.ungram, params.position)
            })
            .flatten())
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let position = params.text_document_position;
        Ok(self
            .with_document(&position.text_document.uri, |s| {
                rename::rename(&s.document, &s.ungram, position.position, &params.new_name)
            })
            .flatten())
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        Ok(self
            .with_document(&params.text_document.uri, |s| {
                code_action::code_action(&s.document, &s.ungram, params.range)
            })
            .flatten())
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        Ok(self.with_document(&params.text_document.uri, |s| {
            code_lens::code_lens(&s.document, &s.ungram)
        }))
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        Ok(self.with_document(&params.text_document.uri, |s| {
            folding::folding_ranges(&s.document, &s.ungram)
        }))
    }

    async fn selection_range(
        &self,
        params: SelectionRangeParams,
    ) -> Result<Option<Vec<SelectionRange>>> {
        Ok(self.with_document(&params.text_document.uri, |s| {
            selection::selection_ranges(&s.document, &s.ungram)
        }))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        Ok(self.with_document(&params.text_document.uri, |s| {
            DocumentSymbolResponse::Nested(document_symbols::document_symbols(
                &s.document,
                &s.ungram,
            ))
        }))
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        Ok(self.with_document(&params.text_document.uri, |s| {
            SemanticTokensResult::Tokens(semantic_tokens::semantic_tokens_full(
                &s.document,
                &s.ungram,
            ))
        }))
    }

    async fn semantic_tokens_range(
        &self,
        params: SemanticTokensRangeParams,
    ) -> Result<Option<SemanticTokensRangeResult>> {
        Ok(self.with_document(&params.text_document.uri, |s| {
            SemanticTokensRangeResult::Tokens(semantic_tokens::semantic_tokens_range(
                &s.document,
                &s.ungram,
                params.range,
            ))
        }))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        if !self.format_enabled().await {
            return Ok(None);
        }
        Ok(self.with_document(&params.text_document.uri, |s| {
            formatting::formatting(&s.document, &s.ungram, None)
        }))
    }

    async fn range_formatting(
        &self,
        params: DocumentRangeFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        if !self.format_enabled().await {
            return Ok(None);
        }
        Ok(self.with_document(&params.text_document.uri, |s| {
            formatting::formatting(&s.document, &s.ungram, Some(params.range))
        }))
    }
}
