//! storyreplies command-line entry point.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storyreplies::cli::run().await
}
