use std::error::Error;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::forwarder::MockForwarder;
use crate::mote::Mote;
use crate::settings::Settings;
use crate::swarm::spawn_mote;

pub mod forwarder;
pub mod mote;
pub mod settings;
mod simulate;
pub mod swarm;

pub async fn run(settings: &Arc<Settings>) -> Result<(), Box<dyn Error>> {
    let (air, _) = broadcast::channel(256);

    for &node_id in &settings.swarm.motes {
        let mote = Mote::new(node_id, settings.swarm.boot_version, settings.swarm.boot_interval)
            .with_dropout(settings.swarm.dropout)
            .with_day_length(settings.swarm.day_length);

        spawn_mote(mote, air.clone());
    }

    let ip_addr = settings.forwarder.host.parse::<IpAddr>()?;
    let address = SocketAddr::from((ip_addr, settings.forwarder.port));
    let listener = TcpListener::bind(&address).await?;

    tracing::info!(
        "serial forwarder with {} motes listening on {:?}",
        settings.swarm.motes.len(),
        address
    );

    MockForwarder::new(listener, air, settings.forwarder.group)
        .serve()
        .await;

    Ok(())
}
