//! Per-player mutual exclusion for group commands.
//!
//! A notification claims every member of its group from capture until
//! restore, so a joiner that leaves its group for the announcement stays
//! claimed. Other commands claim their coordinator and the addressed player
//! while their RPCs run. Claims never wait: a command reaching a claimed
//! player is rejected with `GroupBusy`.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{UniversalError, UniversalResult};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Claims held by one command. Dropping it frees the players.
pub struct GroupGuard {
    locks: Arc<LockMap>,
    held: Vec<(String, OwnedMutexGuard<()>)>,
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        for (uuid, guard) in self.held.drain(..) {
            drop(guard);
            // Only the map still references an unclaimed lock.
            self.locks
                .remove_if(&uuid, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}

/// Locks keyed by player UUID.
#[derive(Default)]
pub struct GroupLocks {
    locks: Arc<LockMap>,
}

impl GroupLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, uuid: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(uuid.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Claims every player in `uuids`, or none of them.
    ///
    /// Players are claimed in UUID order. The first one already claimed is
    /// named in the `GroupBusy` error.
    pub fn try_acquire<'a>(
        &self,
        uuids: impl IntoIterator<Item = &'a str>,
    ) -> UniversalResult<GroupGuard> {
        let mut uuids: Vec<&str> = uuids.into_iter().collect();
        uuids.sort_unstable();
        uuids.dedup();

        let mut guard = GroupGuard {
            locks: Arc::clone(&self.locks),
            held: Vec::with_capacity(uuids.len()),
        };
        for uuid in uuids {
            let held = self
                .lock_for(uuid)
                .try_lock_owned()
                .map_err(|_| UniversalError::GroupBusy(uuid.to_string()))?;
            guard.held.push((uuid.to_string(), held));
        }
        Ok(guard)
    }

    /// True while some command holds a claim on the player.
    pub fn is_busy(&self, uuid: &str) -> bool {
        self.locks
            .get(uuid)
            .is_some_and(|lock| lock.try_lock().is_err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_rejected_until_release() {
        let locks = GroupLocks::new();
        let guard = locks.try_acquire(["RINCON_1"]).unwrap();

        assert!(matches!(
            locks.try_acquire(["RINCON_1"]),
            Err(UniversalError::GroupBusy(ref g)) if g == "RINCON_1"
        ));
        assert!(locks.is_busy("RINCON_1"));
        assert!(!locks.is_busy("RINCON_2"));

        drop(guard);
        assert!(!locks.is_busy("RINCON_1"));
        assert!(locks.try_acquire(["RINCON_1"]).is_ok());
    }

    #[test]
    fn running_command_blocks_a_notification_claim() {
        let locks = GroupLocks::new();
        let command = locks.try_acquire(["RINCON_C"]).unwrap();

        let err = locks
            .try_acquire(["RINCON_A", "RINCON_B", "RINCON_C"])
            .err()
            .unwrap();
        assert!(matches!(err, UniversalError::GroupBusy(ref g) if g == "RINCON_C"));
        assert!(!locks.is_busy("RINCON_A"));
        assert!(!locks.is_busy("RINCON_B"));

        drop(command);
        assert!(locks
            .try_acquire(["RINCON_A", "RINCON_B", "RINCON_C"])
            .is_ok());
    }

    #[test]
    fn duplicate_uuids_are_claimed_once() {
        let locks = GroupLocks::new();
        assert!(locks.try_acquire(["RINCON_1", "RINCON_1"]).is_ok());
    }

    #[test]
    fn released_players_are_forgotten() {
        let locks = GroupLocks::new();
        let guard = locks.try_acquire(["RINCON_1", "RINCON_2"]).unwrap();
        assert_eq!(locks.locks.len(), 2);

        drop(guard);
        assert!(locks.locks.is_empty());
    }

    #[test]
    fn unknown_players_are_idle() {
        let locks = GroupLocks::new();
        assert!(!locks.is_busy("RINCON_X"));
        assert!(locks.locks.is_empty());
    }
}
