#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ungrammar_language_server::start_server().await
}
