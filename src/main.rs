use std::time::Duration;

use tracing::info;

use notimux::config::load_config;
use notimux::hub::HubConnectionBuilder;
use notimux::mux::Multiplexer;
use notimux::utils::logging;

#[tokio::main]
async fn main() {
    let settings = load_config().expect("Failed to load configuration");
    logging::init(&settings.log.level);

    let hub = HubConnectionBuilder::new(settings.hub.url.clone())
        .with_keepalive_interval(Duration::from_secs(settings.hub.keepalive_secs))
        .with_server_timeout(Duration::from_secs(settings.hub.server_timeout_secs))
        .with_automatic_reconnect(settings.hub.automatic_reconnect)
        .build();

    let mux = Multiplexer::new(hub).expect("Failed to wire hub listeners");
    mux.connect().await.expect("Failed to connect to hub");

    let topic = settings.client.topic;

    // Two independent listeners sharing one network-level subscription.
    let first = mux
        .subscribe(&topic, |n| {
            info!("[listener 1] {}: {} ({})", n.title, n.body, n.timestamp);
        })
        .expect("subscribe refused: hub not connected");
    let second = mux
        .subscribe(&topic, |n| {
            info!("[listener 2] {}: {} ({})", n.title, n.body, n.timestamp);
        })
        .expect("subscribe refused: hub not connected");

    info!("listening on topic '{topic}', press ctrl-c to exit");
    tokio::signal::ctrl_c().await.expect("Failed to wait for ctrl-c");

    first.unsubscribe();
    second.unsubscribe();
}
