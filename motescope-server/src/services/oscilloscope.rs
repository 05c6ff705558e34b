use std::ops::Range;
use std::sync::Arc;

use motescope_api::message::{ControlMsg, MoteId, MoteMessage, SampleMsg};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{Announcer, DisplayEvent, DisplayObserver, ResultLog};
use crate::errors::SessionError;
use crate::models::{Channel, NodeStore, Reconcile, Sample, Session, SessionSnapshot, Upsert};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoteSummary {
    pub id: MoteId,
    pub max_index: usize,
}

struct ScopeData {
    store: NodeStore,
    session: Session,
}

/// Base station state shared by the mote link and the operator surface.
///
/// Every operation holds one lock over the node store and the session for
/// its whole duration, so inbound messages, operator changes and display
/// queries never interleave.
pub struct Oscilloscope {
    data: Mutex<ScopeData>,
    observer: Arc<dyn DisplayObserver>,
    announcer: Arc<dyn Announcer>,
    result_log: ResultLog,
}

impl Oscilloscope {
    pub fn new(
        default_interval: u16,
        observer: Arc<dyn DisplayObserver>,
        announcer: Arc<dyn Announcer>,
        result_log: ResultLog,
    ) -> Self {
        Self {
            data: Mutex::new(ScopeData {
                store: NodeStore::new(),
                session: Session::new(default_interval),
            }),
            observer,
            announcer,
            result_log,
        }
    }

    /// Handles one decoded message from the mote link. `source` is the
    /// link-level address of the sender.
    pub async fn message_received(&self, source: u16, message: MoteMessage) {
        let mut data = self.data.lock().await;

        let (version, interval) = message.announcement();
        self.reconcile(&mut data.session, version, interval);

        match message {
            MoteMessage::Sample(msg) => self.store_sample(&mut data.store, msg),
            MoteMessage::Control(msg) => {
                tracing::debug!(
                    "interval announcement from {}: version {} interval {}",
                    source,
                    msg.version,
                    msg.frequency
                );
            }
        }
    }

    /// Operator change of the sampling interval. The new interval is kept
    /// even if it cannot be broadcast.
    pub async fn set_interval(&self, interval: i64) -> Result<SessionSnapshot, SessionError> {
        let mut data = self.data.lock().await;

        let announcement = data.session.set_interval(interval)?;
        let snapshot = data.session.snapshot();

        tracing::info!(
            "operator set interval to {} (version {})",
            snapshot.interval,
            announcement.version
        );

        self.observer.notify(DisplayEvent::IntervalChanged {
            version: announcement.version,
            interval: announcement.frequency,
        });
        self.announce(announcement);

        Ok(snapshot)
    }

    /// Forgets every mote. The session is left untouched.
    pub async fn clear(&self) {
        let mut data = self.data.lock().await;
        data.store.reset();

        tracing::info!("cleared all motes");
        self.observer.notify(DisplayEvent::Cleared);
    }

    pub async fn sample(&self, mote_id: MoteId, index: usize, channel: Channel) -> Option<u16> {
        self.data.lock().await.store.get(mote_id, index, channel)
    }

    pub async fn max_index(&self, mote_id: MoteId) -> usize {
        self.data.lock().await.store.max_index(mote_id)
    }

    pub async fn motes(&self) -> Vec<MoteId> {
        self.data.lock().await.store.motes()
    }

    pub async fn summaries(&self) -> Vec<MoteSummary> {
        let data = self.data.lock().await;

        data.store
            .motes()
            .into_iter()
            .map(|id| MoteSummary {
                id,
                max_index: data.store.max_index(id),
            })
            .collect()
    }

    /// Readings over `range` taken under a single lock
    pub async fn series(&self, mote_id: MoteId, channel: Channel, range: Range<usize>) -> Vec<Option<u16>> {
        self.data.lock().await.store.series(mote_id, channel, range)
    }

    pub async fn session(&self) -> SessionSnapshot {
        self.data.lock().await.session.snapshot()
    }

    /// Surfaces a non-fatal problem to the display layer
    pub fn report_warning(&self, message: impl Into<String>) {
        self.observer.notify(DisplayEvent::Warning {
            message: message.into(),
        });
    }

    fn reconcile(&self, session: &mut Session, version: u16, interval: u16) {
        match session.reconcile(version, interval) {
            Reconcile::Adopted => {
                let interval = session.interval();
                tracing::info!("adopted interval {} at version {}", interval, version);
                self.observer.notify(DisplayEvent::IntervalChanged { version, interval });
            }
            Reconcile::Correct(announcement) => {
                tracing::debug!(
                    "stale version {} seen, re-announcing version {}",
                    version,
                    announcement.version
                );
                self.announce(announcement);
            }
            Reconcile::Unchanged => {}
        }
    }

    fn store_sample(&self, store: &mut NodeStore, msg: SampleMsg) {
        let sample = Sample::from(msg);

        match store.upsert(sample) {
            Upsert::Placed { index, new_mote } => {
                if new_mote {
                    tracing::info!("new mote {}", sample.mote_id);
                    self.observer.notify(DisplayEvent::NewMote { mote_id: sample.mote_id });
                }
                self.observer.notify(DisplayEvent::NewData {
                    mote_id: sample.mote_id,
                    index,
                });
            }
            Upsert::TooOld => {
                tracing::trace!(
                    "dropped sample {} of mote {}, older than its first",
                    sample.logical_time,
                    sample.mote_id
                );
            }
        }

        self.result_log.record(&sample);
    }

    fn announce(&self, announcement: ControlMsg) {
        if let Err(e) = self.announcer.announce(announcement) {
            tracing::warn!("failed to announce interval: {}", e);
            self.report_warning(format!("Interval not broadcast: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use motescope_api::message::BASE_STATION_ID;

    use super::*;
    use crate::errors::AnnounceError;

    #[derive(Default)]
    struct RecordingObserver {
        events: StdMutex<Vec<DisplayEvent>>,
    }

    impl RecordingObserver {
        fn take(&self) -> Vec<DisplayEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl DisplayObserver for RecordingObserver {
        fn notify(&self, event: DisplayEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[derive(Default)]
    struct RecordingAnnouncer {
        sent: StdMutex<Vec<ControlMsg>>,
        offline: bool,
    }

    impl Announcer for RecordingAnnouncer {
        fn announce(&self, msg: ControlMsg) -> Result<(), AnnounceError> {
            if self.offline {
                return Err(AnnounceError::NotConnected);
            }
            self.sent.lock().unwrap().push(msg);
            Ok(())
        }
    }

    fn scope_with(announcer: RecordingAnnouncer) -> (Oscilloscope, Arc<RecordingObserver>, Arc<RecordingAnnouncer>) {
        let observer = Arc::new(RecordingObserver::default());
        let announcer = Arc::new(announcer);
        let scope = Oscilloscope::new(100, observer.clone(), announcer.clone(), ResultLog::disabled());

        (scope, observer, announcer)
    }

    fn scope() -> (Oscilloscope, Arc<RecordingObserver>, Arc<RecordingAnnouncer>) {
        scope_with(RecordingAnnouncer::default())
    }

    fn sample(node_id: u8, version: u16, interval: u16, time: u16, light: u16) -> MoteMessage {
        MoteMessage::Sample(SampleMsg {
            node_id,
            version,
            interval,
            time,
            temperature: None,
            humidity: None,
            light: Some(light),
        })
    }

    #[tokio::test]
    async fn test_first_sample_creates_mote() {
        let (scope, observer, _) = scope();

        scope.message_received(1, sample(1, 0, 100, 0, 100)).await;

        assert_eq!(
            observer.take(),
            vec![
                DisplayEvent::IntervalChanged { version: 0, interval: 100 },
                DisplayEvent::NewMote { mote_id: 1 },
                DisplayEvent::NewData { mote_id: 1, index: 0 },
            ]
        );
        assert_eq!(scope.motes().await, vec![1]);
    }

    #[tokio::test]
    async fn test_gap_scenario() {
        let (scope, _, _) = scope();

        for (time, light) in [(0, 100), (1, 101), (3, 103)] {
            scope.message_received(1, sample(1, 0, 100, time, light)).await;
        }

        assert_eq!(scope.max_index(1).await, 4);
        assert_eq!(scope.sample(1, 2, Channel::Light).await, None);
        assert_eq!(scope.sample(1, 3, Channel::Light).await, Some(103));
        assert_eq!(scope.sample(1, 99, Channel::Light).await, None);
    }

    #[tokio::test]
    async fn test_newer_mote_version_is_adopted() {
        let (scope, observer, announcer) = scope();
        scope.message_received(1, sample(1, 5, 10, 0, 1)).await;
        observer.take();

        scope.message_received(2, sample(2, 7, 20, 0, 1)).await;

        assert_eq!(scope.session().await, SessionSnapshot { version: Some(7), interval: 20 });
        assert_eq!(
            observer.take()[0],
            DisplayEvent::IntervalChanged { version: 7, interval: 20 }
        );
        assert!(announcer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_mote_is_corrected() {
        let (scope, _, announcer) = scope();
        scope.message_received(1, sample(1, 5, 10, 0, 1)).await;

        scope.message_received(2, sample(2, 3, 99, 0, 1)).await;

        assert_eq!(scope.session().await, SessionSnapshot { version: Some(5), interval: 10 });
        assert_eq!(
            *announcer.sent.lock().unwrap(),
            vec![ControlMsg {
                root_id: BASE_STATION_ID,
                frequency: 10,
                version: 5,
            }]
        );
    }

    #[tokio::test]
    async fn test_control_message_is_announcement_only() {
        let (scope, _, _) = scope();

        let control = ControlMsg {
            root_id: 4,
            frequency: 300,
            version: 2,
        };
        scope.message_received(4, MoteMessage::Control(control)).await;

        assert_eq!(scope.session().await, SessionSnapshot { version: Some(2), interval: 300 });
        assert!(scope.motes().await.is_empty());
    }

    #[tokio::test]
    async fn test_operator_change_is_broadcast() {
        let (scope, observer, announcer) = scope();

        let snapshot = scope.set_interval(250).await.unwrap();

        assert_eq!(snapshot, SessionSnapshot { version: Some(1), interval: 250 });
        assert_eq!(
            observer.take(),
            vec![DisplayEvent::IntervalChanged { version: 1, interval: 250 }]
        );
        assert_eq!(announcer.sent.lock().unwrap()[0].frequency, 250);
    }

    #[tokio::test]
    async fn test_invalid_interval_changes_nothing() {
        let (scope, observer, announcer) = scope();

        assert_eq!(scope.set_interval(0).await, Err(SessionError::InvalidInterval(0)));
        assert_eq!(
            scope.set_interval(65536).await,
            Err(SessionError::InvalidInterval(65536))
        );

        assert_eq!(scope.session().await, SessionSnapshot { version: None, interval: 100 });
        assert!(observer.take().is_empty());
        assert!(announcer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_top_version_mote_cannot_undo_operator() {
        let (scope, observer, announcer) = scope();
        scope.message_received(1, sample(1, u16::MAX, 100, 0, 1)).await;
        observer.take();

        assert_eq!(
            scope.set_interval(500).await,
            Err(SessionError::VersionExhausted(u16::MAX))
        );
        scope.message_received(1, sample(1, u16::MAX, 100, 1, 1)).await;

        assert_eq!(
            scope.session().await,
            SessionSnapshot { version: Some(u16::MAX), interval: 100 }
        );
        assert!(!observer
            .take()
            .iter()
            .any(|event| matches!(event, DisplayEvent::IntervalChanged { .. })));
        assert!(announcer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_announce_failure_keeps_change() {
        let (scope, observer, _) = scope_with(RecordingAnnouncer {
            offline: true,
            ..Default::default()
        });

        let snapshot = scope.set_interval(500).await.unwrap();

        assert_eq!(snapshot.interval, 500);
        assert_eq!(scope.session().await.interval, 500);
        assert!(matches!(
            observer.take().last(),
            Some(DisplayEvent::Warning { .. })
        ));
    }

    #[tokio::test]
    async fn test_too_old_sample_leaves_store_unchanged() {
        let (scope, observer, _) = scope();
        scope.message_received(1, sample(1, 0, 100, 10, 1)).await;
        observer.take();

        scope.message_received(1, sample(1, 0, 100, 4, 2)).await;

        assert_eq!(scope.max_index(1).await, 1);
        assert_eq!(scope.sample(1, 0, Channel::Light).await, Some(1));
        assert!(observer.take().is_empty());
    }

    #[tokio::test]
    async fn test_clear_forgets_motes_but_keeps_session() {
        let (scope, observer, _) = scope();
        scope.message_received(1, sample(1, 3, 40, 0, 1)).await;
        scope.message_received(2, sample(2, 3, 40, 8, 1)).await;

        scope.clear().await;

        assert!(scope.motes().await.is_empty());
        assert!(scope.summaries().await.is_empty());
        assert_eq!(scope.max_index(1).await, 0);
        assert_eq!(scope.sample(2, 0, Channel::Light).await, None);
        assert_eq!(scope.session().await, SessionSnapshot { version: Some(3), interval: 40 });
        assert_eq!(observer.take().last(), Some(&DisplayEvent::Cleared));
    }

    #[tokio::test]
    async fn test_summaries_and_series() {
        let (scope, _, _) = scope();
        scope.message_received(1, sample(1, 0, 100, 0, 10)).await;
        scope.message_received(1, sample(1, 0, 100, 2, 12)).await;
        scope.message_received(7, sample(7, 0, 100, 40, 1)).await;

        assert_eq!(
            scope.summaries().await,
            vec![
                MoteSummary { id: 1, max_index: 3 },
                MoteSummary { id: 7, max_index: 1 },
            ]
        );
        assert_eq!(
            scope.series(1, Channel::Light, 0..10).await,
            vec![Some(10), None, Some(12)]
        );
    }
}
