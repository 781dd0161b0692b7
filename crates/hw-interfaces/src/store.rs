use crate::{HwError, ObjectId, ObjectRecord, Result, ValueKey, ValueRecord};
use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Host-owned object store: identifier to object record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObjectStore {
    objects: BTreeMap<ObjectId, ObjectRecord>,
}

/// Store handle shared between the host and the API.
pub type SharedObjectStore = Arc<Mutex<ObjectStore>>;

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedObjectStore {
        Arc::new(Mutex::new(self))
    }

    pub fn get(&self, id: &ObjectId) -> Option<&ObjectRecord> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut ObjectRecord> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn insert(&mut self, id: ObjectId, record: ObjectRecord) -> Option<ObjectRecord> {
        self.objects.insert(id, record)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &ObjectRecord)> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ObjectId, &mut ObjectRecord)> {
        self.objects.iter_mut()
    }

    /// First object whose record carries `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&ObjectId> {
        self.objects
            .iter()
            .find(|(_, rec)| rec.name == name)
            .map(|(id, _)| id)
    }

    /// Convenience read of a single value record.
    pub fn value(&self, key: &ValueKey) -> Option<&ValueRecord> {
        self.objects
            .get(key.object_id())
            .and_then(|rec| rec.object_values.get(key))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Lock a shared store, mapping poisoning to [`HwError::StorePoisoned`].
pub fn lock_store(store: &SharedObjectStore) -> Result<MutexGuard<'_, ObjectStore>> {
    store.lock().map_err(|_| HwError::StorePoisoned)
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredObject {
    name: String,
    developer: bool,
    object_values: BTreeMap<String, ValueRecord>,
}

impl<'de> Deserialize<'de> for ObjectStore {
    fn deserialize<D: Deserializer<'de>>(d: D) -> core::result::Result<Self, D::Error> {
        let raw = BTreeMap::<ObjectId, StoredObject>::deserialize(d)?;
        let mut objects = BTreeMap::new();
        for (id, stored) in raw {
            let mut values = BTreeMap::new();
            for (raw_key, rec) in stored.object_values {
                // Keys are derived data; rebuild them from the record name.
                let key = ValueKey::new(rec.name.clone(), &id);
                if key.to_string() != raw_key {
                    tracing::warn!(object = %id, key = %raw_key, rebuilt = %key, "value key does not match record name");
                }
                values.insert(key, rec);
            }
            objects.insert(
                id,
                ObjectRecord {
                    name: stored.name,
                    developer: stored.developer,
                    object_values: values,
                },
            );
        }
        Ok(Self { objects })
    }
}

pub fn load_store_file(path: impl AsRef<Path>) -> anyhow::Result<ObjectStore> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading store: {}", path.display()))?;
    let store: ObjectStore =
        serde_json::from_str(&raw).with_context(|| format!("parsing store: {}", path.display()))?;
    Ok(store)
}

pub fn save_store_file(path: impl AsRef<Path>, store: &ObjectStore) -> anyhow::Result<()> {
    let path = path.as_ref();
    let raw = serde_json::to_string_pretty(store)?;
    fs::write(path, raw).with_context(|| format!("writing store: {}", path.display()))?;
    Ok(())
}
