use schedule_notifier::startup;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let home = startup::enter_home_dir()?;
    info!("Starting schedule-notifier in {}", home.display());

    // Load configuration
    let config = startup::load_config()?;

    startup::run(config).await?;
    Ok(())
}
