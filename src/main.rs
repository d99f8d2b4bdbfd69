#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    event_board_lib::run().await
}
