//! Serpent Language Server binary entry point
//!
//! Run with: serpent-lsp
//!
//! The LSP communicates via stdin/stdout using the Language Server Protocol; logs go to stderr.

use serpent::lsp::SerpentLanguageServer;
use tower_lsp::{LspService, Server};

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();

    // Create LSP service
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(SerpentLanguageServer::new);

    // Run server
    Server::new(stdin, stdout, socket).serve(service).await;
}
