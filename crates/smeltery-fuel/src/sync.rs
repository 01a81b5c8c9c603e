//! Delta sync of an engine's data slots to remote observers.
//!
//! The owner keeps a [`DataSlotTracker`] per observer and sends whatever
//! [`DataSlotTracker::collect`] returns; the observer applies it to its own
//! [`SimpleDataSlots`](crate::state::SimpleDataSlots) mirror with
//! [`apply_sync`].

use serde::{Deserialize, Serialize};

use crate::state::DataSlots;

/// Bumped when the packet layout changes.
pub const SYNC_VERSION: u16 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("unsupported sync version: expected {SYNC_VERSION}, got {0}")]
    UnsupportedVersion(u16),
}

/// Changed data slots, as `(index, value)` pairs in index order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncPacket {
    pub version: u16,
    pub changes: Vec<(u16, i32)>,
}

impl SyncPacket {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn encode(&self) -> Result<Vec<u8>, SyncError> {
        bitcode::serialize(self).map_err(|e| SyncError::Encode(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> Result<Self, SyncError> {
        let packet: SyncPacket =
            bitcode::deserialize(data).map_err(|e| SyncError::Decode(e.to_string()))?;
        if packet.version != SYNC_VERSION {
            return Err(SyncError::UnsupportedVersion(packet.version));
        }
        Ok(packet)
    }

    /// Write every change into `target`.
    pub fn apply(&self, target: &mut dyn DataSlots) {
        for &(index, value) in &self.changes {
            target.set(usize::from(index), value);
        }
    }
}

/// Remembers what an observer was last sent.
#[derive(Debug, Clone, Default)]
pub struct DataSlotTracker {
    last: Vec<Option<i32>>,
}

impl DataSlotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots whose value differs from what was last collected.
    ///
    /// The first call reports every slot.
    pub fn collect(&mut self, slots: &dyn DataSlots) -> SyncPacket {
        let count = slots.count();
        self.last.resize(count, None);
        let mut changes = Vec::new();
        for (index, last) in self.last.iter_mut().enumerate() {
            let value = slots.get(index);
            if *last != Some(value) {
                *last = Some(value);
                if let Ok(index) = u16::try_from(index) {
                    changes.push((index, value));
                }
            }
        }
        SyncPacket {
            version: SYNC_VERSION,
            changes,
        }
    }

    /// Forget what was sent so the next collect reports everything.
    pub fn reset(&mut self) {
        self.last.clear();
    }
}

/// Decode `data` and apply it to `target`.
pub fn apply_sync(target: &mut dyn DataSlots, data: &[u8]) -> Result<(), SyncError> {
    SyncPacket::decode(data)?.apply(target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FuelState, SimpleDataSlots, TEMPERATURE};

    #[test]
    fn first_collect_sends_everything() {
        let state = FuelState { fuel: 10, fuel_quality: 4, temperature: 1000, rate: 2 };
        let mut tracker = DataSlotTracker::new();
        let packet = tracker.collect(&state);
        assert_eq!(packet.changes, vec![(0, 10), (1, 4), (2, 1000), (3, 2)]);
        assert!(tracker.collect(&state).is_empty());
    }

    #[test]
    fn only_changes_are_sent() {
        let mut state = FuelState { fuel: 10, fuel_quality: 4, temperature: 1000, rate: 2 };
        let mut tracker = DataSlotTracker::new();
        tracker.collect(&state);
        state.decrease_fuel(3);
        let packet = tracker.collect(&state);
        assert_eq!(packet.changes, vec![(0, 7)]);
    }

    #[test]
    fn mirror_follows_encoded_packets() {
        let mut state = FuelState::default();
        let mut mirror = SimpleDataSlots::new(4);
        let mut tracker = DataSlotTracker::new();

        state.refuel(40, 1200, 3);
        apply_sync(&mut mirror, &tracker.collect(&state).encode().unwrap()).unwrap();
        assert_eq!(mirror.to_vec(), state.to_vec());

        state.extinguish();
        apply_sync(&mut mirror, &tracker.collect(&state).encode().unwrap()).unwrap();
        assert_eq!(mirror.get(TEMPERATURE), 0);
        assert_eq!(mirror.to_vec(), state.to_vec());
    }

    #[test]
    fn reset_resends_everything() {
        let state = FuelState::default();
        let mut tracker = DataSlotTracker::new();
        tracker.collect(&state);
        tracker.reset();
        assert_eq!(tracker.collect(&state).changes.len(), 4);
    }

    #[test]
    fn bad_packets_are_rejected() {
        assert!(matches!(SyncPacket::decode(&[0xFF]), Err(SyncError::Decode(_))));

        let future = SyncPacket { version: SYNC_VERSION + 1, changes: vec![] };
        let bytes = future.encode().unwrap();
        assert!(matches!(
            SyncPacket::decode(&bytes),
            Err(SyncError::UnsupportedVersion(v)) if v == SYNC_VERSION + 1
        ));
    }
}
