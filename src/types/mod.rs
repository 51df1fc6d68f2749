mod event;

pub use event::*;

use alloy::primitives::TxHash;

use crate::error::MarketError;

/// Instant in chain history the state/event is up to date with.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct StateInstant {
    block_number: u64,
    block_timestamp: u64,
}

impl StateInstant {
    pub fn new(block_number: u64, block_timestamp: u64) -> Self {
        Self {
            block_number,
            block_timestamp,
        }
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn block_timestamp(&self) -> u64 {
        self.block_timestamp
    }
}

/// Block cursor enforcing the in-order processing contract shared by the
/// indexing pipelines: replayed blocks are skipped, gaps are an error.
#[derive(Debug, Default)]
pub(crate) struct BlockCursor {
    instant: Option<StateInstant>,
}

impl BlockCursor {
    pub(crate) fn instant(&self) -> Option<StateInstant> {
        self.instant
    }

    /// Whether a block at `next` should be applied. `Ok(false)` marks an
    /// already-applied block (safe replay); a gap past the cursor is
    /// [`MarketError::BlockOutOfOrder`].
    pub(crate) fn admits(&self, next: StateInstant) -> Result<bool, MarketError> {
        match self.instant {
            Some(cursor) if cursor >= next => Ok(false),
            Some(cursor) if cursor.block_number() + 1 < next.block_number() => Err(
                MarketError::BlockOutOfOrder(cursor.block_number() + 1, next.block_number()),
            ),
            _ => Ok(true),
        }
    }

    /// Commits a fully applied block.
    pub(crate) fn advance(&mut self, next: StateInstant) {
        self.instant = Some(next);
    }
}

/// Composite entity id of a single log: `<0x-prefixed tx hash>-<log index>`.
///
/// Injective over (hash, log index), so several events within one
/// transaction map to distinct ids, ordered by log index.
pub fn entity_id(tx_hash: TxHash, log_index: u64) -> String {
    format!("{tx_hash}-{log_index}")
}

#[cfg(test)]
mod tests {
    use alloy::primitives::b256;

    use super::*;

    #[test]
    fn test_entity_id_is_injective_over_log_index() {
        let hash = b256!("0x47de82c4aa40baa30cabac4a74568488a8c74ded85a4e905f1ceaad4f29945e3");
        let ids = (0..4).map(|i| entity_id(hash, i)).collect::<Vec<_>>();
        assert_eq!(
            ids[0],
            "0x47de82c4aa40baa30cabac4a74568488a8c74ded85a4e905f1ceaad4f29945e3-0"
        );
        for (i, id) in ids.iter().enumerate() {
            for other in &ids[i + 1..] {
                assert_ne!(id, other);
            }
        }
    }

    #[test]
    fn test_block_cursor_admits_in_order_blocks_only() {
        let mut cursor = BlockCursor::default();
        let first = StateInstant::new(5, 500);
        // First block is accepted at any height (resume mid-stream)
        assert!(cursor.admits(first).unwrap());
        cursor.advance(first);
        // Replays are skipped, not errors
        assert!(!cursor.admits(first).unwrap());
        assert!(!cursor.admits(StateInstant::new(4, 490)).unwrap());
        assert!(cursor.admits(StateInstant::new(6, 512)).unwrap());
        assert!(matches!(
            cursor.admits(StateInstant::new(8, 530)),
            Err(MarketError::BlockOutOfOrder(6, 8))
        ));
    }

    #[test]
    fn test_state_instant_ordering() {
        let a = StateInstant::new(10, 1000);
        let b = StateInstant::new(11, 1000);
        let c = StateInstant::new(11, 1003);
        assert!(a < b && b < c);
    }
}
