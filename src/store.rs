//! Entity persistence for the indexing pipelines.
//!
//! Records are addressed by `(kind, id)` and stored opaquely; callers always
//! load the whole record, mutate it, and save it back. [`MemoryStore`] is the
//! in-process backend; alternative backends implement [`EntityStore`].

use std::collections::HashMap;

use serde::{Serialize, de::DeserializeOwned};

/// A persistable record of one entity collection.
pub trait Entity: Serialize + DeserializeOwned {
    /// Collection name, shared by all records of this type.
    const KIND: &'static str;

    /// Id unique within the collection.
    fn id(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to encode {kind} \"{id}\": {source}")]
    Encode {
        kind: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {kind} \"{id}\": {source}")]
    Decode {
        kind: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load/save access to entity collections.
///
/// `save` is an upsert: a record sharing the kind and id of an existing one
/// overwrites it whole. There are no partial updates and no cross-save
/// transactions; the single-threaded processing model makes a handler's
/// sequence of saves appear atomic to outside readers.
pub trait EntityStore {
    fn load<E: Entity>(&self, id: &str) -> Result<Option<E>, StoreError>;

    fn save<E: Entity>(&mut self, entity: &E) -> Result<(), StoreError>;
}

/// In-memory [`EntityStore`] backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<(&'static str, String), serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection.
    pub fn count(&self, kind: &str) -> usize {
        self.records.keys().filter(|(k, _)| *k == kind).count()
    }

    /// All records of a collection, ordered by id.
    pub fn all<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        let mut keyed = self
            .records
            .iter()
            .filter(|((kind, _), _)| *kind == E::KIND)
            .collect::<Vec<_>>();
        keyed.sort_by(|((_, a), _), ((_, b), _)| a.cmp(b));
        keyed
            .into_iter()
            .map(|((_, id), value)| {
                serde_json::from_value(value.clone()).map_err(|source| StoreError::Decode {
                    kind: E::KIND,
                    id: id.clone(),
                    source,
                })
            })
            .collect()
    }
}

impl EntityStore for MemoryStore {
    fn load<E: Entity>(&self, id: &str) -> Result<Option<E>, StoreError> {
        self.records
            .get(&(E::KIND, id.to_string()))
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|source| StoreError::Decode {
                    kind: E::KIND,
                    id: id.to_string(),
                    source,
                })
            })
            .transpose()
    }

    fn save<E: Entity>(&mut self, entity: &E) -> Result<(), StoreError> {
        let id = entity.id();
        let value = serde_json::to_value(entity).map_err(|source| StoreError::Encode {
            kind: E::KIND,
            id: id.clone(),
            source,
        })?;
        self.records.insert((E::KIND, id), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Marker {
        id: String,
        value: u64,
    }

    impl Entity for Marker {
        const KIND: &'static str = "Marker";

        fn id(&self) -> String {
            self.id.clone()
        }
    }

    #[test]
    fn test_load_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.load::<Marker>("nope").unwrap(), None);
        assert_eq!(store.count(Marker::KIND), 0);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let mut store = MemoryStore::new();
        let marker = Marker {
            id: "a".to_string(),
            value: 7,
        };
        store.save(&marker).unwrap();
        assert_eq!(store.load::<Marker>("a").unwrap(), Some(marker));
        assert_eq!(store.count(Marker::KIND), 1);
    }

    #[test]
    fn test_save_is_upsert() {
        let mut store = MemoryStore::new();
        store
            .save(&Marker {
                id: "a".to_string(),
                value: 1,
            })
            .unwrap();
        store
            .save(&Marker {
                id: "a".to_string(),
                value: 2,
            })
            .unwrap();
        assert_eq!(store.count(Marker::KIND), 1);
        assert_eq!(store.load::<Marker>("a").unwrap().unwrap().value, 2);
    }

    #[test]
    fn test_all_is_ordered_by_id() {
        let mut store = MemoryStore::new();
        for id in ["b", "a", "c"] {
            store
                .save(&Marker {
                    id: id.to_string(),
                    value: 0,
                })
                .unwrap();
        }
        let ids = store
            .all::<Marker>()
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
