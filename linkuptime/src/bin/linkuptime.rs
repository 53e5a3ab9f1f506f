use clap::Parser;
use linkuptime::cli::Opts;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
pub async fn main() -> Result<(), anyhow::Error> {
    let opts = Opts::parse();
    let config = opts.load_config()?;

    linkuptime::build_subscriber(config.log.clone())?.init();

    let reason = linkuptime::run(&opts.host, config).await?;
    tracing::debug!(?reason, "exiting");

    Ok(())
}
