//! LSP (Language Server Protocol) backend implementation for serpent

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use serpent_core::PythonVersion;
use serpent_syntax::syntax_errors;

use crate::format::{BlockFormatter, FormatOptions, IndentOptions, LineFormatter};
use crate::lsp::diagnostics::{edit_to_lsp, position_from_lsp, syntax_error_to_diagnostic};

/// Document state stored by the LSP
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub source: String,
    pub version: i32,
}

/// Serpent Language Server
pub struct SerpentLanguageServer {
    client: Client,
    documents: Arc<RwLock<HashMap<Url, DocumentState>>>,
    options: Arc<RwLock<FormatOptions>>,
}

impl SerpentLanguageServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
            options: Arc::new(RwLock::new(FormatOptions::default())),
        }
    }

    /// Store a document and publish its syntax diagnostics
    async fn analyze_document(&self, uri: &Url, source: String, version: i32) {
        let python = self.options.read().await.version;
        let diagnostics = syntax_errors(&source, python)
            .iter()
            .map(|error| syntax_error_to_diagnostic(error, &source))
            .collect();

        self.documents
            .write()
            .await
            .insert(uri.clone(), DocumentState { source, version });

        // Publish diagnostics (even if empty, to clear old ones)
        self.client
            .publish_diagnostics(uri.clone(), diagnostics, Some(version))
            .await;
    }

    async fn source_of(&self, uri: &Url) -> Option<String> {
        self.documents.read().await.get(uri).map(|doc| doc.source.clone())
    }
}

/// Read `pythonVersion` and `commentPadding` from the client's initialization options.
pub fn options_from_init(init: Option<&serde_json::Value>) -> FormatOptions {
    let mut options = FormatOptions::default();
    let Some(init) = init else {
        return options;
    };
    if let Some(version) = init.get("pythonVersion").and_then(|v| v.as_str()) {
        match version.parse::<PythonVersion>() {
            Ok(version) => options = options.with_version(version),
            Err(error) => tracing::warn!(%error, "ignoring pythonVersion"),
        }
    }
    if let Some(padding) = init.get("commentPadding").and_then(|v| v.as_u64()) {
        options = options.with_comment_padding(padding as usize);
    }
    options
}

/// Edits for one on-type trigger.
///
/// `position` is the cursor after the trigger character was inserted.
pub fn on_type_edits(
    source: &str,
    position: Position,
    ch: &str,
    format_options: &FormatOptions,
    indent: &IndentOptions,
) -> Vec<crate::format::TextEdit> {
    match ch {
        // The cursor is on the new line; the finished line is the previous one (one-indexed: `line`).
        "\n" if position.line > 0 => {
            LineFormatter::new(source, format_options.clone()).format_line(position.line as usize)
        }
        ";" => LineFormatter::new(source, format_options.clone()).format_line(position.line as usize + 1),
        ":" => BlockFormatter::provide_edits(source, position_from_lsp(position), indent),
        _ => Vec::new(),
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for SerpentLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        *self.options.write().await = options_from_init(params.initialization_options.as_ref());

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Diagnostics and formatting work on the full text
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                document_formatting_provider: Some(OneOf::Left(true)),
                document_on_type_formatting_provider: Some(DocumentOnTypeFormattingOptions {
                    first_trigger_character: "\n".to_string(),
                    more_trigger_character: Some(vec![":".to_string(), ";".to_string()]),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "serpent-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let version = self.options.read().await.version;
        tracing::info!(%version, "initialized");
        self.client
            .log_message(MessageType::INFO, format!("serpent LSP initialized (Python {version})"))
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.analyze_document(&doc.uri, doc.text, doc.version).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // We use FULL sync, so there's only one change with the full content
        if let Some(change) = params.content_changes.into_iter().next() {
            self.analyze_document(&uri, change.text, version).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.write().await.remove(&uri);
        // Clear diagnostics
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let Some(source) = self.source_of(&params.text_document.uri).await else {
            return Ok(None);
        };
        let options = self.options.read().await.clone();
        let edits = LineFormatter::new(&source, options).format_document();
        tracing::debug!(edits = edits.len(), "document formatted");
        Ok(Some(edits.into_iter().map(edit_to_lsp).collect()))
    }

    async fn on_type_formatting(&self, params: DocumentOnTypeFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let position = params.text_document_position.position;
        let Some(source) = self.source_of(&params.text_document_position.text_document.uri).await else {
            return Ok(None);
        };
        let format_options = self.options.read().await.clone();
        let indent = IndentOptions::new()
            .with_tab_size(params.options.tab_size as usize)
            .with_insert_spaces(params.options.insert_spaces);

        let edits = on_type_edits(&source, position, &params.ch, &format_options, &indent);
        Ok(Some(edits.into_iter().map(edit_to_lsp).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::apply_edits;

    fn type_char(source: &str, line: u32, character: u32, ch: &str) -> String {
        let edits = on_type_edits(
            source,
            Position::new(line, character),
            ch,
            &FormatOptions::default(),
            &IndentOptions::default(),
        );
        apply_edits(source, &edits)
    }

    #[test]
    fn test_newline_formats_previous_line() {
        assert_eq!(type_char("x=1+2\n", 1, 0, "\n"), "x = 1 + 2\n");
        assert_eq!(type_char("x=1\n", 0, 0, "\n"), "x=1\n");
    }

    #[test]
    fn test_semicolon_formats_current_line() {
        assert_eq!(type_char("a=1;", 0, 4, ";"), "a = 1;");
    }

    #[test]
    fn test_colon_reindents_block() {
        assert_eq!(type_char("if x:\n    pass\n    else:", 2, 9, ":"), "if x:\n    pass\nelse:");
    }

    #[test]
    fn test_other_trigger_is_ignored() {
        assert_eq!(type_char("x=1", 0, 3, "a"), "x=1");
    }

    #[test]
    fn test_options_from_init() {
        let init = serde_json::json!({ "pythonVersion": "2.7", "commentPadding": 1 });
        let options = options_from_init(Some(&init));
        assert_eq!(options.version, PythonVersion::V27);
        assert_eq!(options.comment_padding, 1);

        let bad = serde_json::json!({ "pythonVersion": "9.9" });
        assert_eq!(options_from_init(Some(&bad)), FormatOptions::default());
        assert_eq!(options_from_init(None), FormatOptions::default());
    }
}
