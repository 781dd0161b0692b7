use crate::store::lock_store;
use crate::{IdentityResolver, ObjectId, ObjectLookup, ObjectRecord, SharedObjectStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File inside an object's folder holding its identifier.
pub const IDENTITY_FILE: &str = ".identity";

/// Identifier for a newly provisioned object: its name plus a 32-char hex
/// uuid, long enough to parse whatever the name.
pub fn mint_object_id(object_name: &str) -> String {
    format!("{object_name}{}", uuid::Uuid::new_v4().simple())
}

/// Object folders under a base directory, one identity file each.
#[derive(Debug, Clone)]
pub struct FolderIdentity {
    base_dir: PathBuf,
}

impl FolderIdentity {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn folder(base_dir: &Path, object_name: &str) -> Option<PathBuf> {
        if object_name.is_empty()
            || object_name == "."
            || object_name == ".."
            || object_name.contains(['/', '\\'])
        {
            return None;
        }
        Some(base_dir.join(object_name))
    }

    fn read_id(base_dir: &Path, object_name: &str) -> Option<String> {
        let dir = Self::folder(base_dir, object_name)?;
        let raw = fs::read_to_string(dir.join(IDENTITY_FILE)).ok()?;
        let id = raw.trim();
        (!id.is_empty()).then(|| id.to_string())
    }
}

impl IdentityResolver for FolderIdentity {
    fn ensure(&mut self, object_name: &str, base_dir: &Path, debug: bool) {
        let Some(dir) = Self::folder(base_dir, object_name) else {
            warn!(object = object_name, "refusing to provision object with unusable name");
            return;
        };
        let id_path = dir.join(IDENTITY_FILE);
        if id_path.exists() {
            return;
        }
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(object = object_name, error = %e, "could not create object folder");
            return;
        }
        let id = mint_object_id(object_name);
        if let Err(e) = fs::write(&id_path, &id) {
            warn!(object = object_name, error = %e, "could not write identity file");
            return;
        }
        if debug {
            debug!(object = object_name, id = %id, dir = %dir.display(), "created object folder");
        }
    }

    fn resolve(&self, object_name: &str, base_dir: &Path) -> Option<String> {
        Self::read_id(base_dir, object_name)
    }
}

impl ObjectLookup for FolderIdentity {
    fn lookup(&self, object_name: &str) -> Option<String> {
        Self::read_id(&self.base_dir, object_name)
    }
}

/// Host-side provisioning: after the inner resolver has an identity for a
/// name, insert an empty [`ObjectRecord`] for it into the host's store.
///
/// `add_io` calls `ensure` before it takes the store lock, so locking here
/// is safe.
#[derive(Debug, Clone)]
pub struct ProvisioningResolver<R> {
    inner: R,
    store: SharedObjectStore,
}

impl<R: IdentityResolver> ProvisioningResolver<R> {
    pub fn new(inner: R, store: SharedObjectStore) -> Self {
        Self { inner, store }
    }
}

impl<R: IdentityResolver> IdentityResolver for ProvisioningResolver<R> {
    fn ensure(&mut self, object_name: &str, base_dir: &Path, debug: bool) {
        self.inner.ensure(object_name, base_dir, debug);
        let Some(raw) = self.inner.resolve(object_name, base_dir) else {
            return;
        };
        let Ok(id) = ObjectId::parse(raw) else {
            return;
        };
        let mut store = match lock_store(&self.store) {
            Ok(store) => store,
            Err(e) => {
                warn!(object = object_name, error = %e, "could not provision object record");
                return;
            }
        };
        if !store.contains(&id) {
            if debug {
                debug!(object = object_name, id = %id, "provisioned object record");
            }
            store.insert(id, ObjectRecord::new(object_name));
        }
    }

    fn resolve(&self, object_name: &str, base_dir: &Path) -> Option<String> {
        self.inner.resolve(object_name, base_dir)
    }
}
