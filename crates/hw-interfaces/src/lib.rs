//! hw-interfaces: registration and value propagation for hardware interfaces
//!
//! Hardware-interface modules declare named IO points on named objects and
//! push runtime values for them into an object store owned by the host. The
//! host injects the store, identity resolution, configuration and a change
//! notifier once through [`Setup`]; the crate keeps the registry of declared
//! points and reconciles the store against it.

mod error;
pub use error::{HwError, IdentityError, Result};

mod types;
pub use types::*;

pub mod store;
pub use store::{load_store_file, save_store_file, ObjectStore, SharedObjectStore};

mod traits;
pub use traits::{IdentityResolver, Notifier, ObjectLookup, ValuePlugin};

mod plugins;
pub use plugins::{PassThrough, PluginModules};

pub mod registry;
pub use registry::{HardwareInterface, Registry, TrackedObject, TrackedPoint};

mod config;
pub use config::{load_config_file, GlobalConfig};

pub mod identity;
pub use identity::{FolderIdentity, ProvisioningResolver, IDENTITY_FILE};

mod metrics;
pub use metrics::{IoMetrics, MetricsHub};

mod api;
pub use api::{
    AddOutcome, ClearReport, HardwareInterfaces, RegistrationPass, Setup, ValueFactory,
    WriteOutcome,
};

mod loader;
pub use loader::{
    load_declaration_file, load_declarations, load_declarations_dir, InterfaceDeclaration,
    ObjectDeclaration, PointDeclaration,
};

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::{MemoryIdentity, RecordingNotifier};
