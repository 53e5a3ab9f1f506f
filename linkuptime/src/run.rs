use crate::config::Config;
use crate::lifecycle::{LifecycleOptions, LinkUptime, ShutdownReason};
use crate::render::GraphRenderer;

use linkuptime_client::{ConnectionError, Session};
use tokio::sync::oneshot;

/// Connect to `host`, take one snapshot of the network and write it to
/// standard output.
///
/// Failing to connect is the only error; everything after that ends in a
/// [`ShutdownReason`].
pub async fn run(host: &str, config: Config) -> Result<ShutdownReason, ConnectionError> {
    let (mut session, mut events) = Session::connect(
        &config.session_name,
        &config.connect_params(host),
        &config.registration(),
    )
    .await?;

    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_send.send(());
        }
    });

    let renderer = GraphRenderer::new(&config.session_name, config.render);
    let options = LifecycleOptions {
        wait_oper: config.wait_oper,
        oper: config.oper,
    };
    let mut snapshot = LinkUptime::new(renderer, options, std::io::stdout());

    let reason = snapshot
        .run(&mut session, &mut events, shutdown_recv)
        .await;
    match session.network_name() {
        Some(network) => tracing::info!(?reason, "{} finished on {}", session.name(), network),
        None => tracing::info!(?reason, "{} finished", session.name()),
    }
    if reason == ShutdownReason::Disconnected && !session.is_registered() {
        tracing::warn!("{} was disconnected before registering", session.name());
    }

    drop(events);
    session.close().await;

    Ok(reason)
}
