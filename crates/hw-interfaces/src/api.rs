//! The registration API handed to hardware interfaces.
//!
//! A host builds one [`HardwareInterfaces`] from a [`Setup`] and passes it to
//! every interface module. Interfaces declare their IO points with
//! [`HardwareInterfaces::add_io`] (or a [`RegistrationPass`]), drop stale ones
//! with [`HardwareInterfaces::clear_io`], and push runtime values with
//! [`HardwareInterfaces::write_io_to_server`].
//!
//! Unresolvable objects and unregistered points never raise errors; they are
//! reported through the returned outcome so callers can log or ignore them.

use crate::store::lock_store;
use crate::{
    GlobalConfig, IdentityResolver, MetricsHub, Notifier, ObjectId, ObjectLookup, ObjectStore,
    PluginModules, Registry, Result, SharedObjectStore, ValueKey, ValueRecord,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Constructor for fresh value records.
pub type ValueFactory = fn() -> ValueRecord;

/// Everything the host injects before interfaces may register.
pub struct Setup {
    store: SharedObjectStore,
    resolver: Box<dyn IdentityResolver + Send>,
    lookup: Box<dyn ObjectLookup + Send>,
    config: GlobalConfig,
    base_dir: PathBuf,
    plugins: PluginModules,
    notifier: Box<dyn Notifier + Send>,
    value_factory: ValueFactory,
    rng_seed: Option<u64>,
}

impl Setup {
    pub fn new(
        store: SharedObjectStore,
        resolver: impl IdentityResolver + Send + 'static,
        lookup: impl ObjectLookup + Send + 'static,
        notifier: impl Notifier + Send + 'static,
    ) -> Self {
        Self {
            store,
            resolver: Box::new(resolver),
            lookup: Box::new(lookup),
            config: GlobalConfig::default(),
            base_dir: PathBuf::from("."),
            plugins: PluginModules::new(),
            notifier: Box::new(notifier),
            value_factory: ValueRecord::default,
            rng_seed: None,
        }
    }

    pub fn config(mut self, config: GlobalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn plugins(mut self, plugins: PluginModules) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn value_factory(mut self, factory: ValueFactory) -> Self {
        self.value_factory = factory;
        self
    }

    /// Seed the layout RNG; entropy-seeded otherwise.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new value record was created at this key.
    Created(ValueKey),
    /// The existing record was refreshed in place.
    Updated(ValueKey),
    /// The object has no usable identifier; nothing changed.
    Unresolved,
    /// The identifier resolved but the host holds no record for it; nothing changed.
    NoObject,
}

impl AddOutcome {
    pub fn key(&self) -> Option<&ValueKey> {
        match self {
            AddOutcome::Created(k) | AddOutcome::Updated(k) => Some(k),
            AddOutcome::Unresolved | AddOutcome::NoObject => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(ValueKey),
    Unresolved,
    /// No value record exists at the key; register the point first.
    Unregistered,
}

/// Value records removed by one `clear_io` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub removed: Vec<ValueKey>,
}

pub struct HardwareInterfaces {
    store: SharedObjectStore,
    resolver: Box<dyn IdentityResolver + Send>,
    lookup: Box<dyn ObjectLookup + Send>,
    config: GlobalConfig,
    base_dir: PathBuf,
    plugins: PluginModules,
    notifier: Box<dyn Notifier + Send>,
    value_factory: ValueFactory,
    rng: StdRng,
    registry: Registry,
    metrics: MetricsHub,
}

impl HardwareInterfaces {
    pub fn setup(setup: Setup) -> Result<Self> {
        let rng = match setup.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            store: setup.store,
            resolver: setup.resolver,
            lookup: setup.lookup,
            config: setup.config,
            base_dir: setup.base_dir,
            plugins: setup.plugins,
            notifier: setup.notifier,
            value_factory: setup.value_factory,
            rng,
            registry: Registry::new(),
            metrics: MetricsHub::new()?,
        })
    }

    fn resolve_object(&self, object_name: &str) -> Option<ObjectId> {
        let raw = self.resolver.resolve(object_name, &self.base_dir)?;
        match ObjectId::parse(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(object = object_name, error = %e, "object identifier rejected");
                None
            }
        }
    }

    /// Declare `io_name` on `object_name` for the `interface` hardware interface.
    pub fn add_io(
        &mut self,
        object_name: &str,
        io_name: &str,
        plugin: &str,
        interface: &str,
    ) -> Result<AddOutcome> {
        self.resolver
            .ensure(object_name, &self.base_dir, self.config.debug);

        let Some(object_id) = self.resolve_object(object_name) else {
            debug!(object = object_name, interface, "add_io: object unresolved");
            return Ok(AddOutcome::Unresolved);
        };
        debug!(object = object_name, id = %object_id, io = io_name, interface, "add_io");

        let key = ValueKey::new(io_name, &object_id);
        let created = {
            let mut store = lock_store(&self.store)?;
            let Some(object) = store.get_mut(&object_id) else {
                debug!(object = object_name, id = %object_id, "add_io: no object record in store");
                return Ok(AddOutcome::NoObject);
            };
            object.developer = self.config.developer;
            object.name = object_name.to_string();

            let created = !object.object_values.contains_key(&key);
            let record = object.object_values.entry(key.clone()).or_insert_with(|| {
                let mut rec = (self.value_factory)();
                rec.place(&mut self.rng);
                rec
            });
            record.name = io_name.to_string();
            record.plugin = plugin.to_string();
            record.r#type = interface.to_string();
            created
        };

        self.registry.declare(interface, object_name, io_name);
        self.metrics.io.points_registered.inc();
        self.metrics
            .io
            .objects_tracked
            .set(self.registry.tracked_objects() as i64);

        Ok(if created {
            AddOutcome::Created(key)
        } else {
            AddOutcome::Updated(key)
        })
    }

    /// On every object `interface` has registered, remove each value record
    /// whose point `interface` did not declare since its previous `clear_io`,
    /// then start a new registration cycle.
    pub fn clear_io(&mut self, interface: &str) -> Result<ClearReport> {
        let Some(hw) = self.registry.interface(interface) else {
            debug!(interface, "clear_io: interface never registered");
            return Ok(ClearReport::default());
        };

        let mut removed = Vec::new();
        {
            let mut store = lock_store(&self.store)?;
            for object_name in hw.objects.keys() {
                let Some(object_id) = self.resolve_object(object_name) else {
                    continue;
                };
                let Some(object) = store.get_mut(&object_id) else {
                    continue;
                };
                let declared: BTreeSet<&str> = hw.declared_points(object_name).collect();
                object.object_values.retain(|key, rec| {
                    let keep = declared.contains(rec.name.as_str());
                    if !keep {
                        removed.push(key.clone());
                    }
                    keep
                });
            }
        }

        self.registry.close_cycle(interface);
        self.metrics.io.points_cleared.inc_by(removed.len() as u64);
        info!(interface, removed = removed.len(), "cleared stale io points");
        Ok(ClearReport { removed })
    }

    /// Store a new value for a registered point and notify the host. The
    /// notifier runs before the store lock is released.
    pub fn write_io_to_server(
        &mut self,
        object_name: &str,
        io_name: &str,
        value: impl Into<serde_json::Value>,
        mode: &str,
    ) -> Result<WriteOutcome> {
        let Some(object_id) = self
            .lookup
            .lookup(object_name)
            .and_then(|raw| ObjectId::parse(raw).ok())
        else {
            self.metrics.io.writes_dropped.inc();
            return Ok(WriteOutcome::Unresolved);
        };
        let key = ValueKey::new(io_name, &object_id);

        let mut store = lock_store(&self.store)?;
        let Some(record) = store
            .get_mut(&object_id)
            .and_then(|o| o.object_values.get_mut(&key))
        else {
            self.metrics.io.writes_dropped.inc();
            return Ok(WriteOutcome::Unregistered);
        };
        record.value = value.into();
        record.mode = mode.to_string();

        self.notifier
            .notify(&object_id, &key, &store, &self.plugins);
        self.metrics.io.values_written.inc();
        Ok(WriteOutcome::Written(key))
    }

    /// Turn developer mode on for the process and every stored object.
    pub fn developer_on(&mut self) -> Result<()> {
        self.config.developer = true;
        let mut store = lock_store(&self.store)?;
        for (_, object) in store.iter_mut() {
            object.developer = true;
        }
        Ok(())
    }

    pub fn debug(&self) -> bool {
        self.config.debug
    }

    /// Open a registration pass for one interface. Finishing the pass clears
    /// every point of that interface the pass did not declare.
    pub fn begin_registration(&mut self, interface: &str) -> RegistrationPass<'_> {
        RegistrationPass {
            api: self,
            interface: interface.to_string(),
            declared: 0,
            finished: false,
        }
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn store(&self) -> &SharedObjectStore {
        &self.store
    }

    /// Copy of the current store contents.
    pub fn snapshot(&self) -> Result<ObjectStore> {
        Ok(lock_store(&self.store)?.clone())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn plugins(&self) -> &PluginModules {
        &self.plugins
    }

    pub fn metrics(&self) -> &MetricsHub {
        &self.metrics
    }
}

/// Exclusive registration batch for one interface.
pub struct RegistrationPass<'a> {
    api: &'a mut HardwareInterfaces,
    interface: String,
    declared: usize,
    finished: bool,
}

impl RegistrationPass<'_> {
    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn add_io(&mut self, object_name: &str, io_name: &str, plugin: &str) -> Result<AddOutcome> {
        let outcome = self
            .api
            .add_io(object_name, io_name, plugin, &self.interface)?;
        if outcome.key().is_some() {
            self.declared += 1;
        }
        Ok(outcome)
    }

    /// Close the pass and drop whatever it did not re-declare.
    pub fn finish(mut self) -> Result<ClearReport> {
        self.finished = true;
        info!(interface = %self.interface, declared = self.declared, "registration pass finished");
        self.api.clear_io(&self.interface)
    }
}

impl Drop for RegistrationPass<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(interface = %self.interface, "registration pass dropped without finish; nothing cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MemoryIdentity, RecordingNotifier};
    use crate::{ObjectRecord, ProvisioningResolver};
    use serde_json::json;

    const LAMP_ID: &str = "ABCDEFGHIJKLMN";

    struct Harness {
        api: HardwareInterfaces,
        ids: MemoryIdentity,
        notes: RecordingNotifier,
    }

    /// Store the host has already provisioned with a record for `lamp`.
    fn lamp_store() -> SharedObjectStore {
        let mut store = ObjectStore::new();
        store.insert(lamp(), ObjectRecord::new("lamp"));
        store.into_shared()
    }

    fn harness() -> Harness {
        let ids = MemoryIdentity::new();
        ids.pin("lamp", LAMP_ID);
        let notes = RecordingNotifier::new();
        let setup = Setup::new(
            lamp_store(),
            ids.clone(),
            ids.clone(),
            notes.clone(),
        )
        .rng_seed(42);
        Harness {
            api: HardwareInterfaces::setup(setup).unwrap(),
            ids,
            notes,
        }
    }

    fn lamp() -> ObjectId {
        ObjectId::parse(LAMP_ID).unwrap()
    }

    fn value(api: &HardwareInterfaces, io: &str) -> Option<ValueRecord> {
        let store = api.snapshot().unwrap();
        store.value(&ValueKey::new(io, &lamp())).cloned()
    }

    #[test]
    fn test_add_io_creates_record_and_registry_entry() {
        let mut h = harness();
        let out = h.api.add_io("lamp", "brightness", "default", "philips").unwrap();
        let key = ValueKey::new("brightness", &lamp());
        assert_eq!(out, AddOutcome::Created(key.clone()));
        assert_eq!(key.to_string(), "brightnessABCDEFGHIJKLMN");

        let rec = value(&h.api, "brightness").unwrap();
        assert_eq!(rec.name, "brightness");
        assert_eq!(rec.plugin, "default");
        assert_eq!(rec.r#type, "philips");
        assert!((-100..=100).contains(&rec.x));
        assert!((-100..=100).contains(&rec.y));
        assert_eq!((rec.frame_size_x, rec.frame_size_y), (47, 47));

        assert!(h.api.registry().contains("philips", "lamp", "brightness"));
        let store = h.api.snapshot().unwrap();
        assert_eq!(store.get(&lamp()).map(|o| o.name.as_str()), Some("lamp"));
    }

    #[test]
    fn test_add_io_twice_keeps_position() {
        let mut h = harness();
        h.api.add_io("lamp", "brightness", "default", "philips").unwrap();
        let first = value(&h.api, "brightness").unwrap();

        let out = h.api.add_io("lamp", "brightness", "default", "philips").unwrap();
        assert!(matches!(out, AddOutcome::Updated(_)));
        assert_eq!(value(&h.api, "brightness").unwrap(), first);
    }

    #[test]
    fn test_add_io_overwrites_plugin_and_type_only() {
        let mut h = harness();
        h.api.add_io("lamp", "brightness", "default", "philips").unwrap();
        let first = value(&h.api, "brightness").unwrap();
        h.api.add_io("lamp", "brightness", "percent", "hue").unwrap();
        let second = value(&h.api, "brightness").unwrap();
        assert_eq!(second.plugin, "percent");
        assert_eq!(second.r#type, "hue");
        assert_eq!((second.x, second.y), (first.x, first.y));
    }

    #[test]
    fn test_add_io_unresolved_is_silent_noop() {
        let mut h = harness();
        h.ids.pin("fan", "fan123");
        let out = h.api.add_io("fan", "speed", "default", "arduino").unwrap();
        assert_eq!(out, AddOutcome::Unresolved);
        assert_eq!(h.api.snapshot().unwrap().len(), 1);
        assert!(h.api.registry().interface("arduino").is_none());
    }

    #[test]
    fn test_add_io_without_object_record_is_noop() {
        let mut h = harness();
        h.ids.pin("fan", "FAN00000000000");
        let before = h.api.snapshot().unwrap();

        let out = h.api.add_io("fan", "speed", "default", "arduino").unwrap();
        assert_eq!(out, AddOutcome::NoObject);
        assert_eq!(out.key(), None);
        assert_eq!(h.api.snapshot().unwrap(), before);
        assert!(!h.api.registry().contains("arduino", "fan", "speed"));
        assert!(h.api.registry().interface("arduino").is_none());
        assert_eq!(h.api.metrics().io.points_registered.get(), 0);
    }

    #[test]
    fn test_provisioning_host_registers_unknown_objects() {
        let store = ObjectStore::new().into_shared();
        let ids = MemoryIdentity::new();
        let mut api = HardwareInterfaces::setup(Setup::new(
            store.clone(),
            ProvisioningResolver::new(ids.clone(), store.clone()),
            ids,
            RecordingNotifier::new(),
        ))
        .unwrap();

        let out = api.add_io("a", "speed", "default", "arduino").unwrap();
        assert!(matches!(out, AddOutcome::Created(_)));
        let key = out.key().cloned().unwrap();
        assert!(key.object_id().as_str().starts_with('a'));
        let store = store.lock().unwrap();
        assert_eq!(store.get(key.object_id()).unwrap().name, "a");
        assert!(store.value(&key).is_some());
        assert!(api.registry().contains("arduino", "a", "speed"));
    }

    #[test]
    fn test_add_io_stamps_developer_flag() {
        let ids = MemoryIdentity::new();
        ids.pin("lamp", LAMP_ID);
        let setup = Setup::new(
            lamp_store(),
            ids.clone(),
            ids,
            RecordingNotifier::new(),
        )
        .config(GlobalConfig {
            debug: true,
            developer: true,
        });
        let mut api = HardwareInterfaces::setup(setup).unwrap();
        assert!(api.debug());
        api.add_io("lamp", "brightness", "default", "philips").unwrap();
        assert!(api.snapshot().unwrap().get(&lamp()).unwrap().developer);
    }

    #[test]
    fn test_clear_io_drops_points_not_redeclared() {
        let mut h = harness();
        h.api.add_io("lamp", "a", "default", "philips").unwrap();
        h.api.add_io("lamp", "b", "default", "philips").unwrap();
        assert!(h.api.clear_io("philips").unwrap().removed.is_empty());

        h.api.add_io("lamp", "a", "default", "philips").unwrap();
        let report = h.api.clear_io("philips").unwrap();
        assert_eq!(report.removed, vec![ValueKey::new("b", &lamp())]);
        assert!(value(&h.api, "a").is_some());
        assert!(value(&h.api, "b").is_none());
    }

    #[test]
    fn test_clear_io_without_redeclaring_drops_everything() {
        let mut h = harness();
        h.api.add_io("lamp", "p1", "default", "t").unwrap();
        h.api.add_io("lamp", "p2", "default", "t").unwrap();
        h.api.clear_io("t").unwrap();

        let report = h.api.clear_io("t").unwrap();
        assert_eq!(report.removed.len(), 2);
        assert!(h.api.snapshot().unwrap().get(&lamp()).unwrap().object_values.is_empty());
    }

    #[test]
    fn test_clear_io_removes_stale_records_loaded_from_store() {
        let store = ObjectStore::new().into_shared();
        {
            let mut s = store.lock().unwrap();
            let mut obj = ObjectRecord::new("lamp");
            for io in ["brightness", "legacy"] {
                obj.object_values.insert(
                    ValueKey::new(io, &lamp()),
                    ValueRecord {
                        name: io.into(),
                        r#type: "philips".into(),
                        ..Default::default()
                    },
                );
            }
            s.insert(lamp(), obj);
        }
        let ids = MemoryIdentity::new();
        ids.pin("lamp", LAMP_ID);
        let mut api = HardwareInterfaces::setup(Setup::new(
            store.clone(),
            ids.clone(),
            ids,
            RecordingNotifier::new(),
        ))
        .unwrap();

        api.add_io("lamp", "brightness", "default", "philips").unwrap();
        let report = api.clear_io("philips").unwrap();
        assert_eq!(report.removed, vec![ValueKey::new("legacy", &lamp())]);
        assert_eq!(store.lock().unwrap().get(&lamp()).unwrap().object_values.len(), 1);
    }

    #[test]
    fn test_clear_io_drops_undeclared_records_of_any_type() {
        let mut h = harness();
        {
            let mut store = h.api.store().lock().unwrap();
            let lamp_rec = store.get_mut(&lamp()).unwrap();
            for (io, kind) in [("legacy", ""), ("motion", "arduino")] {
                lamp_rec.object_values.insert(
                    ValueKey::new(io, &lamp()),
                    ValueRecord {
                        name: io.into(),
                        r#type: kind.into(),
                        ..Default::default()
                    },
                );
            }
        }
        h.api.add_io("lamp", "brightness", "default", "philips").unwrap();

        let mut report = h.api.clear_io("philips").unwrap();
        report.removed.sort();
        assert_eq!(
            report.removed,
            vec![ValueKey::new("legacy", &lamp()), ValueKey::new("motion", &lamp())]
        );
        assert!(value(&h.api, "brightness").is_some());
        assert!(value(&h.api, "legacy").is_none());
        assert!(value(&h.api, "motion").is_none());
    }

    #[test]
    fn test_clear_io_unknown_interface_is_noop() {
        let mut h = harness();
        h.api.add_io("lamp", "brightness", "default", "philips").unwrap();
        let before = h.api.snapshot().unwrap();
        assert_eq!(h.api.clear_io("nobody").unwrap(), ClearReport::default());
        assert_eq!(h.api.snapshot().unwrap(), before);
    }

    #[test]
    fn test_clear_io_skips_objects_that_stopped_resolving() {
        let mut h = harness();
        h.api.add_io("lamp", "brightness", "default", "philips").unwrap();
        h.api.clear_io("philips").unwrap();
        h.ids.pin("lamp", "tooshort");
        assert!(h.api.clear_io("philips").unwrap().removed.is_empty());
        h.ids.pin("lamp", LAMP_ID);
        assert!(value(&h.api, "brightness").is_some());
    }

    #[test]
    fn test_write_updates_value_and_notifies_once() {
        let mut h = harness();
        h.api.add_io("lamp", "brightness", "default", "philips").unwrap();
        let out = h.api.write_io_to_server("lamp", "brightness", 75, "f").unwrap();
        let key = ValueKey::new("brightness", &lamp());
        assert_eq!(out, WriteOutcome::Written(key.clone()));

        let rec = value(&h.api, "brightness").unwrap();
        assert_eq!(rec.value, json!(75));
        assert_eq!(rec.mode, "f");

        let calls = h.notes.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].object_id, lamp());
        assert_eq!(calls[0].value_key, key);
    }

    #[test]
    fn test_write_to_unregistered_point_is_dropped() {
        let mut h = harness();
        h.api.add_io("lamp", "brightness", "default", "philips").unwrap();
        let out = h.api.write_io_to_server("lamp", "color", "red", "s").unwrap();
        assert_eq!(out, WriteOutcome::Unregistered);
        assert!(value(&h.api, "color").is_none());

        let out = h.api.write_io_to_server("ghost", "x", 1, "f").unwrap();
        assert_eq!(out, WriteOutcome::Unresolved);
        assert!(h.notes.is_empty());
        assert_eq!(h.api.metrics().io.writes_dropped.get(), 2);
    }

    #[test]
    fn test_notifier_sees_updated_store() {
        let ids = MemoryIdentity::new();
        ids.pin("lamp", LAMP_ID);
        let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
        let sink = seen.clone();
        let notifier = move |_: &ObjectId, key: &ValueKey, store: &ObjectStore, plugins: &PluginModules| {
            let rendered = store.value(key).map(|rec| plugins.render(rec));
            *sink.lock().unwrap() = rendered;
        };
        let mut api = HardwareInterfaces::setup(Setup::new(
            lamp_store(),
            ids.clone(),
            ids,
            notifier,
        ))
        .unwrap();
        api.add_io("lamp", "brightness", "default", "philips").unwrap();
        api.write_io_to_server("lamp", "brightness", 0.5, "f").unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(json!(0.5)));
    }

    #[test]
    fn test_developer_on_marks_all_objects() {
        let mut h = harness();
        h.ids.pin("fan", "FAN00000000000");
        h.api.store().lock().unwrap().insert(
            ObjectId::parse("FAN00000000000").unwrap(),
            ObjectRecord::new("fan"),
        );
        h.api.add_io("lamp", "brightness", "default", "philips").unwrap();
        h.api.add_io("fan", "speed", "default", "arduino").unwrap();
        h.api.developer_on().unwrap();
        h.api.developer_on().unwrap();
        assert!(h.api.config().developer);
        let store = h.api.snapshot().unwrap();
        assert!(store.iter().all(|(_, o)| o.developer));
    }

    #[test]
    fn test_registration_pass_clears_on_finish() {
        let mut h = harness();
        {
            let mut pass = h.api.begin_registration("philips");
            pass.add_io("lamp", "a", "default").unwrap();
            pass.add_io("lamp", "b", "default").unwrap();
            assert!(pass.finish().unwrap().removed.is_empty());
        }
        let mut pass = h.api.begin_registration("philips");
        pass.add_io("lamp", "b", "default").unwrap();
        let report = pass.finish().unwrap();
        assert_eq!(report.removed, vec![ValueKey::new("a", &lamp())]);
    }

    #[test]
    fn test_dropped_pass_clears_nothing() {
        let mut h = harness();
        h.api.add_io("lamp", "a", "default", "philips").unwrap();
        h.api.clear_io("philips").unwrap();
        {
            let pass = h.api.begin_registration("philips");
            assert_eq!(pass.interface(), "philips");
        }
        assert!(value(&h.api, "a").is_some());
    }

    #[test]
    fn test_custom_value_factory() {
        fn factory() -> ValueRecord {
            ValueRecord {
                mode: "f".into(),
                value: json!(0),
                ..Default::default()
            }
        }
        let ids = MemoryIdentity::new();
        ids.pin("lamp", LAMP_ID);
        let mut api = HardwareInterfaces::setup(
            Setup::new(
                lamp_store(),
                ids.clone(),
                ids,
                RecordingNotifier::new(),
            )
            .value_factory(factory),
        )
        .unwrap();
        api.add_io("lamp", "brightness", "default", "philips").unwrap();
        let rec = value(&api, "brightness").unwrap();
        assert_eq!(rec.mode, "f");
        assert_eq!(rec.value, json!(0));
        assert_eq!(rec.frame_size_x, 47);
    }
}
