#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ledger_notary::node::run_cli().await
}
