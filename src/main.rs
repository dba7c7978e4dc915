/// The entry point of the application.
/// Initializes logging and runs the panel server until Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chatpanel_lib::run().await?;
    Ok(())
}
