//! In-memory index of which IO points each hardware interface declared.
//!
//! Entries are created lazily and never removed. Each interface counts its
//! registration cycles: declaring a point stamps it with the open cycle, and
//! closing the cycle (done by `clear_io`) makes every point undeclared until
//! it is declared again.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPoint {
    pub name: String,
    declared_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedObject {
    pub name: String,
    pub points: BTreeMap<String, TrackedPoint>,
}

impl TrackedObject {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            points: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardwareInterface {
    pub objects: BTreeMap<String, TrackedObject>,
    cycle: u64,
}

impl HardwareInterface {
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Whether `io_name` on `object_name` was declared in the open cycle.
    pub fn is_declared(&self, object_name: &str, io_name: &str) -> bool {
        self.objects
            .get(object_name)
            .and_then(|o| o.points.get(io_name))
            .is_some_and(|p| p.declared_in == self.cycle)
    }

    /// Names of points declared on `object_name` in the open cycle.
    pub fn declared_points<'a>(&'a self, object_name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let cycle = self.cycle;
        self.objects
            .get(object_name)
            .into_iter()
            .flat_map(|o| o.points.values())
            .filter(move |p| p.declared_in == cycle)
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    interfaces: BTreeMap<String, HardwareInterface>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `interface -> object -> io` in the open cycle, creating parents.
    pub fn declare(&mut self, interface: &str, object_name: &str, io_name: &str) {
        let hw = self.interfaces.entry(interface.to_string()).or_default();
        let cycle = hw.cycle;
        let obj = hw
            .objects
            .entry(object_name.to_string())
            .or_insert_with(|| TrackedObject::new(object_name));
        obj.points
            .entry(io_name.to_string())
            .and_modify(|p| p.declared_in = cycle)
            .or_insert_with(|| TrackedPoint {
                name: io_name.to_string(),
                declared_in: cycle,
            });
    }

    /// Start a fresh cycle for `interface`. No-op for unknown interfaces.
    pub fn close_cycle(&mut self, interface: &str) {
        if let Some(hw) = self.interfaces.get_mut(interface) {
            hw.cycle += 1;
        }
    }

    pub fn interface(&self, interface: &str) -> Option<&HardwareInterface> {
        self.interfaces.get(interface)
    }

    pub fn contains(&self, interface: &str, object_name: &str, io_name: &str) -> bool {
        self.interface(interface)
            .is_some_and(|hw| hw.is_declared(object_name, io_name))
    }

    pub fn interface_types(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(String::as_str)
    }

    /// Number of distinct (interface, object) pairs ever declared.
    pub fn tracked_objects(&self) -> usize {
        self.interfaces.values().map(|hw| hw.objects.len()).sum()
    }
}
