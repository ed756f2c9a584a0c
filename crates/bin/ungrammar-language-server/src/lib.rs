//! Language server for ungrammar files.
//!
//! Every capability is a pure function of a [`TextDocument`] and its analysed
//! [`UngramDocument`], living under [`capabilities`]. The [`server`] module
//! keeps the open documents and wires the capabilities to tower-lsp.
//!
//! [`TextDocument`]: ungrammar_lang::text_document::TextDocument
//! [`UngramDocument`]: ungrammar_lang::UngramDocument

pub mod capabilities;
pub mod convert;
pub mod server;

use server::Backend;
use tower_lsp::{LspService, Server};

/// Start the LSP server on stdio.
pub async fn start_server() -> anyhow::Result<()> {
    env_logger::init();

    let (service, socket) = LspService::new(Backend::new);

    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;

    Ok(())
}
