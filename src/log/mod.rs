//! Raw event log of the marketplace event stream.
//!
//! The alternative indexing strategy: one immutable record per observed
//! event, parameters plus provenance copied verbatim, with no aggregation
//! and no mutable state beyond the block cursor. A deployment runs either
//! this recorder or the [`crate::state`] projection, never both.

pub mod v1;
pub mod v2;

macro_rules! log_entity {
    ($(#[$doc:meta])* $name:ident, $kind:literal { $($field:ident: $ty:ty),* $(,)? }) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            pub id: String,
            $(pub $field: $ty,)*
            pub block_number: u64,
            pub block_timestamp: u64,
            pub transaction_hash: alloy::primitives::TxHash,
        }

        impl crate::store::Entity for $name {
            const KIND: &'static str = $kind;

            fn id(&self) -> String {
                self.id.clone()
            }
        }
    };
}

pub(crate) use log_entity;
