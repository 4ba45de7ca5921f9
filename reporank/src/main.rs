#[tokio::main]
async fn main() -> anyhow::Result<()> {
    reporank::run_cli().await
}
