use std::cmp::Ordering;

use motescope_api::message::{BASE_STATION_ID, ControlMsg};
use serde::{Deserialize, Serialize};

use crate::errors::SessionError;

pub const MIN_INTERVAL: i64 = 1;
pub const MAX_INTERVAL: i64 = u16::MAX as i64;

/// Outcome of comparing a mote's announced version with ours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// Remote was newer; its interval is now ours
    Adopted,
    /// Remote was stale; the announcement to broadcast back
    Correct(ControlMsg),
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: Option<u16>,
    pub interval: u16,
}

/// Sampling interval shared by the base station and the motes.
///
/// The party with the higher version owns the interval. The operator bumps
/// the version on every change; a mote echoing an older version gets
/// corrected, a mote carrying a newer one is followed.
#[derive(Debug, Clone)]
pub struct Session {
    interval: u16,
    /// `None` until the first announcement or operator change
    version: Option<u16>,
}

impl Session {
    pub fn new(default_interval: u16) -> Self {
        Self {
            interval: default_interval,
            version: None,
        }
    }

    pub fn interval(&self) -> u16 {
        self.interval
    }

    pub fn version(&self) -> Option<u16> {
        self.version
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: self.version,
            interval: self.interval,
        }
    }

    pub fn reconcile(&mut self, remote_version: u16, remote_interval: u16) -> Reconcile {
        // An unset local version orders below every announced one
        match Some(remote_version).cmp(&self.version) {
            Ordering::Greater => {
                self.version = Some(remote_version);
                // A mote may announce 0; keep the local interval within bounds
                self.interval = remote_interval.max(MIN_INTERVAL as u16);
                Reconcile::Adopted
            }
            Ordering::Less => Reconcile::Correct(self.announcement()),
            Ordering::Equal => Reconcile::Unchanged,
        }
    }

    /// Applies an operator change and returns the announcement to broadcast.
    pub fn set_interval(&mut self, new_interval: i64) -> Result<ControlMsg, SessionError> {
        if !(MIN_INTERVAL..=MAX_INTERVAL).contains(&new_interval) {
            return Err(SessionError::InvalidInterval(new_interval));
        }

        // Motes boot at version 0, so the first operator change must land above it
        let next_version = match self.version {
            None => 1,
            Some(version) => version
                .checked_add(1)
                .ok_or(SessionError::VersionExhausted(version))?,
        };

        self.interval = new_interval as u16;
        self.version = Some(next_version);

        Ok(self.announcement())
    }

    pub fn announcement(&self) -> ControlMsg {
        ControlMsg {
            root_id: BASE_STATION_ID,
            frequency: self.interval,
            version: self.version.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(version: u16, interval: u16) -> Session {
        let mut session = Session::new(100);
        session.reconcile(version, interval);
        session
    }

    #[test]
    fn test_initial_state() {
        let session = Session::new(100);

        assert_eq!(session.interval(), 100);
        assert_eq!(session.version(), None);
    }

    #[test]
    fn test_newer_remote_is_adopted() {
        let mut session = session_at(5, 10);

        assert_eq!(session.reconcile(7, 20), Reconcile::Adopted);
        assert_eq!(session.snapshot(), SessionSnapshot { version: Some(7), interval: 20 });
    }

    #[test]
    fn test_stale_remote_is_corrected() {
        let mut session = session_at(5, 10);

        assert_eq!(
            session.reconcile(3, 99),
            Reconcile::Correct(ControlMsg {
                root_id: BASE_STATION_ID,
                frequency: 10,
                version: 5,
            })
        );
        assert_eq!(session.snapshot(), SessionSnapshot { version: Some(5), interval: 10 });
    }

    #[test]
    fn test_equal_version_is_ignored() {
        let mut session = session_at(5, 10);

        assert_eq!(session.reconcile(5, 99), Reconcile::Unchanged);
        assert_eq!(session.interval(), 10);
    }

    #[test]
    fn test_unset_version_follows_first_announcement() {
        let mut session = Session::new(100);

        assert_eq!(session.reconcile(0, 250), Reconcile::Adopted);
        assert_eq!(session.snapshot(), SessionSnapshot { version: Some(0), interval: 250 });
    }

    #[test]
    fn test_out_of_range_interval_is_rejected() {
        let mut session = session_at(5, 10);

        assert_eq!(session.set_interval(0), Err(SessionError::InvalidInterval(0)));
        assert_eq!(
            session.set_interval(65536),
            Err(SessionError::InvalidInterval(65536))
        );
        assert_eq!(session.set_interval(-1), Err(SessionError::InvalidInterval(-1)));
        assert_eq!(session.snapshot(), SessionSnapshot { version: Some(5), interval: 10 });
    }

    #[test]
    fn test_bounds_are_accepted_and_bump_version() {
        let mut session = session_at(5, 10);

        let announcement = session.set_interval(1).unwrap();
        assert_eq!(announcement.frequency, 1);
        assert_eq!(announcement.version, 6);

        let announcement = session.set_interval(65535).unwrap();
        assert_eq!(announcement.frequency, 65535);
        assert_eq!(announcement.version, 7);
        assert_eq!(session.snapshot(), SessionSnapshot { version: Some(7), interval: 65535 });
    }

    #[test]
    fn test_exhausted_version_rejects_change() {
        let mut session = session_at(u16::MAX, 100);

        assert_eq!(
            session.set_interval(500),
            Err(SessionError::VersionExhausted(u16::MAX))
        );
        assert_eq!(
            session.snapshot(),
            SessionSnapshot { version: Some(u16::MAX), interval: 100 }
        );

        // Next echo at the top version leaves the session as it was
        assert_eq!(session.reconcile(u16::MAX, 100), Reconcile::Unchanged);
        assert_eq!(session.interval(), 100);
    }

    #[test]
    fn test_version_below_top_still_advances() {
        let mut session = session_at(u16::MAX - 1, 100);

        assert_eq!(session.set_interval(500).unwrap().version, u16::MAX);
        assert_eq!(session.reconcile(u16::MAX - 1, 100), Reconcile::Correct(session.announcement()));
        assert_eq!(session.interval(), 500);
    }

    #[test]
    fn test_adopted_zero_interval_is_raised_to_minimum() {
        let mut session = Session::new(100);

        assert_eq!(session.reconcile(3, 0), Reconcile::Adopted);
        assert_eq!(session.snapshot(), SessionSnapshot { version: Some(3), interval: 1 });
    }

    #[test]
    fn test_first_operator_change_outranks_boot_version() {
        let mut session = Session::new(100);

        let announcement = session.set_interval(500).unwrap();
        assert_eq!(announcement.version, 1);
        assert_eq!(session.version(), Some(1));
        assert_eq!(session.reconcile(0, 100), Reconcile::Correct(announcement));
    }
}
