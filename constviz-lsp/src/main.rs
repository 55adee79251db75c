//! constviz LSP server - constant values as inlay hints.
//!
//! Provides IDE integration with:
//! - A full constant index built when the workspace opens
//! - Per-document re-indexing on open, change and save
//! - Inlay hints showing the value next to each constant reference
//!
//! Never panics on bad input: extraction failures are logged and the
//! document keeps its last good constants.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use constviz_core::{
    gather_source_files, init_structured_logging, layout_right_to_left, load_config, load_unit,
    load_units, ConstantIndex, ConstvizConfig, LineAnnotator, RebuildStep, SourceUnit,
    DEFAULT_OVERLAY_PADDING,
};

/// Everything the server knows, guarded by one lock.
#[derive(Debug, Default)]
struct ServerState {
    root: Option<PathBuf>,
    config: ConstvizConfig,
    index: ConstantIndex,
    /// Text of open documents, newer than what is on disk
    documents: HashMap<Url, String>,
}

impl ServerState {
    /// Re-indexes one document from `text`. Failures are already logged by
    /// the index and leave the previous records in place.
    fn update_document(&mut self, path: &Path, text: &str) {
        if let Some(unit) = SourceUnit::from_path(path, text) {
            if let Err(e) = self.index.update_unit_text(&unit, &self.config) {
                tracing::debug!(source = %unit.id, error = %e, "document kept its last good constants");
            }
        }
    }
}

/// constviz Language Server.
struct ConstvizLsp {
    client: Client,
    state: Arc<RwLock<ServerState>>,
}

impl ConstvizLsp {
    fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(ServerState::default())),
        }
    }

    /// Rebuilds the whole index from disk, then re-applies open documents.
    ///
    /// The lock is released between units so hint requests are served
    /// while a large workspace is still being indexed.
    async fn rebuild(&self) {
        let (root, config) = {
            let state = self.state.read().await;
            (state.root.clone(), state.config.clone())
        };
        let Some(root) = root else {
            self.log_info("No workspace root, constant index stays empty").await;
            return;
        };

        let excludes = config.scan.exclude.clone();
        let loaded = tokio::task::spawn_blocking(move || -> Result<Vec<SourceUnit>> {
            let excludes: Vec<&str> = excludes.iter().map(String::as_str).collect();
            let files = gather_source_files(&root, &excludes)?;
            Ok(load_units(&files))
        })
        .await;

        let units = match loaded {
            Ok(Ok(units)) => units,
            Ok(Err(e)) => {
                self.log_error(&format!("Scan failed: {:#}", e)).await;
                return;
            }
            Err(e) => {
                self.log_error(&format!("Scan task failed: {}", e)).await;
                return;
            }
        };

        let started = {
            let mut state = self.state.write().await;
            state.index.begin_rebuild(units, &config)
        };
        let mut job = match started {
            Ok(job) => job,
            Err(e) => {
                self.log_info(&format!("Rebuild skipped: {}", e)).await;
                return;
            }
        };

        let summary = loop {
            let step = {
                let mut state = self.state.write().await;
                job.step(&mut state.index)
            };
            match step {
                RebuildStep::Processed { .. } => tokio::task::yield_now().await,
                RebuildStep::Finished(summary) => break summary,
                RebuildStep::Cancelled => {
                    self.log_info("Rebuild cancelled").await;
                    return;
                }
            }
        };

        {
            let mut state = self.state.write().await;
            let open: Vec<(Url, String)> = state
                .documents
                .iter()
                .map(|(uri, text)| (uri.clone(), text.clone()))
                .collect();
            for (uri, text) in open {
                if let Ok(path) = uri.to_file_path() {
                    state.update_document(&path, &text);
                }
            }
        }

        self.log_info(&format!(
            "Indexed {} constants from {} units ({} failed)",
            summary.records,
            summary.indexed_units,
            summary.failed_units.len()
        ))
        .await;
        self.refresh_hints().await;
    }

    /// Stores the editor text of `uri` and re-indexes it.
    async fn document_changed(&self, uri: Url, text: String) {
        let Ok(path) = uri.to_file_path() else {
            return;
        };
        let mut state = self.state.write().await;
        state.update_document(&path, &text);
        state.documents.insert(uri, text);
    }

    /// Re-indexes `uri` from disk, unless an open document shadows it.
    async fn reload_from_disk(&self, uri: &Url) {
        let Ok(path) = uri.to_file_path() else {
            return;
        };
        let mut state = self.state.write().await;
        if state.documents.contains_key(uri) {
            return;
        }
        match load_unit(&path) {
            Ok(Some(unit)) => {
                let config = state.config.clone();
                if let Err(e) = state.index.update_unit_text(&unit, &config) {
                    tracing::debug!(source = %unit.id, error = %e, "reload kept the last good constants");
                }
            }
            Ok(None) => {}
            Err(_) => {
                state.index.remove_unit(&path.to_string_lossy());
            }
        }
    }

    async fn refresh_hints(&self) {
        // Clients without refresh support reject the request; nothing to do then.
        let _ = self.client.inlay_hint_refresh().await;
    }

    async fn log_info(&self, message: &str) {
        self.client.log_message(MessageType::INFO, message).await;
    }

    async fn log_error(&self, message: &str) {
        self.client.log_message(MessageType::ERROR, message).await;
    }
}

/// Length of `s` in UTF-16 code units, the LSP column unit.
fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

/// Shortens `label` to at most `max_width` columns, marking the cut.
fn fit_label(label: &str, max_width: Option<f64>) -> String {
    let Some(max_width) = max_width else {
        return label.to_string();
    };
    let max = max_width.floor() as usize;
    if label.chars().count() <= max {
        return label.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut fitted: String = label.chars().take(max - 1).collect();
    fitted.push('…');
    fitted
}

/// Inlay hints for the lines of `text` inside `range`.
fn hints_for_text(
    index: &ConstantIndex,
    text: &str,
    source_id: &str,
    range: Range,
) -> Vec<InlayHint> {
    let annotator = LineAnnotator::new(index);
    let first = range.start.line as usize;
    let count = range.end.line.saturating_sub(range.start.line) as usize + 1;
    let mut hints = Vec::new();

    for (line_no, line) in text.lines().enumerate().skip(first).take(count) {
        let annotations = annotator.annotate(line, source_id);
        if annotations.is_empty() {
            continue;
        }

        let columns: Vec<u32> = annotations
            .iter()
            .map(|a| utf16_len(&line[..a.offset + a.identifier.len()]))
            .collect();
        let lefts: Vec<f64> = columns.iter().map(|&c| f64::from(c)).collect();
        let widths = layout_right_to_left(&lefts, DEFAULT_OVERLAY_PADDING);

        for ((annotation, character), width) in annotations.iter().zip(columns).zip(widths) {
            let label = fit_label(&format!("= {}", annotation.display), width);
            if label.is_empty() {
                continue;
            }
            hints.push(InlayHint {
                position: Position {
                    line: line_no as u32,
                    character,
                },
                label: InlayHintLabel::String(label),
                kind: None,
                text_edits: None,
                tooltip: Some(InlayHintTooltip::String(format!(
                    "{} = {}",
                    annotation.identifier, annotation.display
                ))),
                padding_left: Some(true),
                padding_right: None,
                data: None,
            });
        }
    }

    hints
}

#[tower_lsp::async_trait]
impl LanguageServer for ConstvizLsp {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        #[allow(deprecated)]
        let root = params
            .root_uri
            .and_then(|uri| uri.to_file_path().ok())
            .or_else(|| {
                params
                    .workspace_folders
                    .and_then(|folders| folders.into_iter().next())
                    .and_then(|folder| folder.uri.to_file_path().ok())
            });

        let config = match root.as_deref().map(load_config) {
            Some(Ok(Some(config))) => config,
            Some(Err(e)) => {
                self.log_error(&format!("Ignoring invalid configuration: {:#}", e)).await;
                ConstvizConfig::default()
            }
            _ => ConstvizConfig::default(),
        };
        init_structured_logging(config.logging.advanced);

        {
            let mut state = self.state.write().await;
            state.root = root;
            state.config = config;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(false),
                        })),
                        ..Default::default()
                    },
                )),
                inlay_hint_provider: Some(OneOf::Left(true)),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "constviz-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.log_info("constviz LSP server initialized").await;
        self.rebuild().await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        let mut state = self.state.write().await;
        state.index.reset();
        state.documents.clear();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.document_changed(params.text_document.uri, params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.document_changed(params.text_document.uri, change.text)
                .await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let open = self.state.read().await.documents.get(&uri).cloned();
        match open {
            Some(text) => self.document_changed(uri, text).await,
            None => self.reload_from_disk(&uri).await,
        }
        self.refresh_hints().await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.state.write().await.documents.remove(&uri);
        // Unsaved edits are gone; the file on disk is authoritative again.
        self.reload_from_disk(&uri).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        for change in params.changes {
            if change.typ == FileChangeType::DELETED {
                if let Ok(path) = change.uri.to_file_path() {
                    let mut state = self.state.write().await;
                    state.documents.remove(&change.uri);
                    state.index.remove_unit(&path.to_string_lossy());
                }
            } else {
                self.reload_from_disk(&change.uri).await;
            }
        }
        self.refresh_hints().await;
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> LspResult<Option<Vec<InlayHint>>> {
        let uri = params.text_document.uri;
        let Ok(path) = uri.to_file_path() else {
            return Ok(None);
        };
        let state = self.state.read().await;
        let Some(text) = state.documents.get(&uri) else {
            return Ok(None);
        };
        let hints = hints_for_text(&state.index, text, &path.to_string_lossy(), params.range);
        Ok(Some(hints))
    }
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] constviz-lsp internal error: {}", info);
    }));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(ConstvizLsp::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use constviz_core::DeclarationSource;

    fn sample_index() -> ConstantIndex {
        let mut index = ConstantIndex::new();
        index
            .rebuild_all(
                vec![SourceUnit::new(
                    "Limits.cs",
                    DeclarationSource::CSharp,
                    "class Limits { const int MAX = 10; const string Title = \"a long title\"; }",
                )],
                &ConstvizConfig::default(),
            )
            .unwrap();
        index
    }

    fn full_range(lines: u32) -> Range {
        Range {
            start: Position::new(0, 0),
            end: Position::new(lines, 0),
        }
    }

    fn label(hint: &InlayHint) -> &str {
        match &hint.label {
            InlayHintLabel::String(s) => s,
            InlayHintLabel::LabelParts(_) => panic!("expected string label"),
        }
    }

    #[test]
    fn test_broken_edit_keeps_document_constants() {
        let mut state = ServerState::default();
        state
            .index
            .rebuild_all(Vec::new(), &ConstvizConfig::default())
            .unwrap();
        let path = Path::new("/workspace/Limits.cs");

        state.update_document(path, "class Limits { const int MAX = 10; }");
        state.update_document(path, "class Limits { const int MAX = \"10; }");
        assert_eq!(state.index.resolve("MAX", "Limits", "Other.cs"), Some("10"));

        state.update_document(path, "class Limits { const int MAX = 20; }");
        assert_eq!(state.index.resolve("MAX", "Limits", "Other.cs"), Some("20"));
    }

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("é"), 1);
        assert_eq!(utf16_len("😀"), 2);
    }

    #[test]
    fn test_fit_label() {
        assert_eq!(fit_label("= 10", None), "= 10");
        assert_eq!(fit_label("= 10", Some(10.0)), "= 10");
        assert_eq!(fit_label("= 123456", Some(4.0)), "= 1…");
        assert_eq!(fit_label("= 1", Some(0.4)), "");
    }

    #[test]
    fn test_hints_positioned_after_identifier() {
        let index = sample_index();
        let text = "class P {\n  int x = MAX;\n}\n";
        let hints = hints_for_text(&index, text, "P.cs", full_range(3));
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].position, Position::new(1, 13));
        assert_eq!(label(&hints[0]), "= 10");
    }

    #[test]
    fn test_hint_columns_count_utf16() {
        let index = sample_index();
        let hints = hints_for_text(&index, "s = \"😀\" + MAX;", "P.cs", full_range(0));
        assert_eq!(hints.len(), 1);
        // 😀 is one char but two UTF-16 units.
        assert_eq!(hints[0].position.character, 14);
    }

    #[test]
    fn test_crowded_hints_are_shortened() {
        let index = sample_index();
        let hints = hints_for_text(&index, "f(Title, MAX);", "P.cs", full_range(0));
        // Title ends at column 7, MAX at 12: 12 - 7 - 5 leaves no room.
        assert_eq!(hints.len(), 1);
        assert_eq!(label(&hints[0]), "= 10");

        let roomy = hints_for_text(&index, "f(Title,           MAX);", "P.cs", full_range(0));
        assert_eq!(roomy.len(), 2);
        assert_eq!(label(&roomy[0]), "= \"a long…");
    }

    #[test]
    fn test_range_limits_lines() {
        let index = sample_index();
        let text = "a = MAX;\nb = MAX;\nc = MAX;\n";
        let range = Range {
            start: Position::new(1, 0),
            end: Position::new(1, 8),
        };
        let hints = hints_for_text(&index, text, "P.cs", range);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].position.line, 1);
    }
}
