use std::time::Duration;

use motescope_api::message::MoteMessage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::mote::Mote;

/// Runs a mote on the shared radio: it transmits a sample every interval
/// and overhears everything else on air.
pub fn spawn_mote(mut mote: Mote, air: broadcast::Sender<MoteMessage>) -> JoinHandle<()> {
    let mut radio = air.subscribe();
    let mut rng = StdRng::seed_from_u64(u64::from(mote.node_id));

    tokio::spawn(async move {
        let mut next = Instant::now() + period(&mote);

        loop {
            tokio::select! {
                _ = sleep_until(next) => {
                    let sample = mote.next_sample(&mut rng);
                    tracing::debug!("mote {} sends sample {}", mote.node_id, sample.time);

                    // Nobody listening is fine, the radio is lossy anyway
                    let _ = air.send(MoteMessage::Sample(sample));
                    next += period(&mote);
                }
                heard = radio.recv() => match heard {
                    Ok(message) => {
                        if mote.overhear(&message) {
                            tracing::info!(
                                "mote {} now samples every {} ms (version {})",
                                mote.node_id,
                                mote.interval,
                                mote.version
                            );
                            next = Instant::now() + period(&mote);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("mote {} missed {} messages", mote.node_id, skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    })
}

fn period(mote: &Mote) -> Duration {
    Duration::from_millis(u64::from(mote.interval.max(1)))
}
