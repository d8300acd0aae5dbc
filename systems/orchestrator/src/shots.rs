use std::collections::{BTreeMap, BTreeSet};

use bubble_shooter_core::{BubbleId, ShotId};
use bubble_shooter_system_sequencing::CancellationToken;

#[derive(Debug)]
struct ShotRecord {
    pending: BTreeSet<BubbleId>,
    dropped: bool,
    scope: CancellationToken,
}

/// Projectiles still in flight for every open shot.
#[derive(Debug, Default)]
pub(crate) struct ShotTable {
    records: BTreeMap<ShotId, ShotRecord>,
    owners: BTreeMap<BubbleId, ShotId>,
}

impl ShotTable {
    /// Opens `shot` for `bubble`; deferred work for the shot is scoped to the returned token.
    pub(crate) fn open(&mut self, shot: ShotId, bubble: BubbleId) -> CancellationToken {
        let scope = CancellationToken::new();
        let _ = self.records.insert(
            shot,
            ShotRecord {
                pending: BTreeSet::from([bubble]),
                dropped: false,
                scope: scope.clone(),
            },
        );
        let _ = self.owners.insert(bubble, shot);
        scope
    }

    pub(crate) fn join(&mut self, shot: ShotId, bubble: BubbleId) {
        if let Some(record) = self.records.get_mut(&shot) {
            let _ = record.pending.insert(bubble);
            let _ = self.owners.insert(bubble, shot);
        }
    }

    /// Marks `bubble` as resolved.
    ///
    /// Returns whether any part of the shot dropped a cluster once the last
    /// projectile of the shot resolved, `None` while others are still flying.
    pub(crate) fn resolve(&mut self, bubble: BubbleId, dropped: bool) -> Option<bool> {
        let shot = self.owners.remove(&bubble)?;
        let record = self.records.get_mut(&shot)?;
        let _ = record.pending.remove(&bubble);
        record.dropped |= dropped;
        if !record.pending.is_empty() {
            return None;
        }
        let record = self.records.remove(&shot)?;
        record.scope.cancel();
        Some(record.dropped)
    }

    /// Cancels the deferred work of every open shot and forgets them.
    pub(crate) fn cancel_all(&mut self) {
        for record in self.records.values() {
            record.scope.cancel();
        }
        self.records.clear();
        self.owners.clear();
    }

    pub(crate) fn open_shots(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::ShotTable;
    use bubble_shooter_core::{BubbleId, ShotId};

    #[test]
    fn split_shots_resolve_after_every_half() {
        let mut table = ShotTable::default();
        let scope = table.open(ShotId::new(0), BubbleId::new(1));
        table.join(ShotId::new(0), BubbleId::new(2));

        assert_eq!(table.resolve(BubbleId::new(2), true), None);
        assert!(!scope.is_cancelled());
        assert_eq!(table.resolve(BubbleId::new(1), false), Some(true));
        assert!(scope.is_cancelled());
        assert_eq!(table.open_shots(), 0);
    }

    #[test]
    fn unknown_bubbles_are_ignored() {
        let mut table = ShotTable::default();
        let scope = table.open(ShotId::new(3), BubbleId::new(1));
        assert_eq!(table.resolve(BubbleId::new(9), false), None);
        table.cancel_all();
        assert!(scope.is_cancelled());
        assert_eq!(table.resolve(BubbleId::new(1), false), None);
    }
}
