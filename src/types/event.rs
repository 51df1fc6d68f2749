use alloy::primitives::TxHash;

/// Events from a specific block.
#[derive(Debug)]
pub struct BlockEvents<T> {
    instant: super::StateInstant,
    events: Vec<T>,
}

/// Event along with transaction context.
#[derive(Debug)]
pub struct EventContext<T> {
    pub(crate) tx_hash: TxHash,
    pub(crate) log_index: u64,
    pub(crate) event: T,
}

impl<T> BlockEvents<T> {
    pub(crate) fn new(instant: super::StateInstant, events: Vec<T>) -> Self {
        Self { instant, events }
    }

    /// Instant the events produced at.
    pub fn instant(&self) -> super::StateInstant {
        self.instant
    }

    /// Decoded marketplace events, in ascending log-index order.
    pub fn events(&self) -> &[T] {
        &self.events
    }
}

impl<T> EventContext<T> {
    pub(crate) fn new(tx_hash: TxHash, log_index: u64, event: T) -> Self {
        Self {
            tx_hash,
            log_index,
            event,
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn log_index(&self) -> u64 {
        self.log_index
    }

    pub fn event(&self) -> &T {
        &self.event
    }

    /// Composite entity id of this log, see [`super::entity_id`].
    pub fn entity_id(&self) -> String {
        super::entity_id(self.tx_hash, self.log_index)
    }
}
