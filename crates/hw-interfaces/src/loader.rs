use crate::{ClearReport, HardwareInterfaces, Result, DEFAULT_PLUGIN};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// IO points one hardware interface manages, as read from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceDeclaration {
    pub interface: String,
    #[serde(default)]
    pub objects: Vec<ObjectDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDeclaration {
    pub name: String,
    #[serde(default)]
    pub points: Vec<PointDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointDeclaration {
    pub name: String,
    #[serde(default = "default_plugin")]
    pub plugin: String,
}

fn default_plugin() -> String {
    DEFAULT_PLUGIN.to_string()
}

impl InterfaceDeclaration {
    /// Run one full registration pass: declare every point, then clear the rest.
    pub fn apply(&self, api: &mut HardwareInterfaces) -> Result<ClearReport> {
        let mut pass = api.begin_registration(&self.interface);
        for obj in &self.objects {
            for point in &obj.points {
                pass.add_io(&obj.name, &point.name, &point.plugin)?;
            }
        }
        pass.finish()
    }

    pub fn point_count(&self) -> usize {
        self.objects.iter().map(|o| o.points.len()).sum()
    }
}

pub fn load_declaration_file(path: impl AsRef<Path>) -> anyhow::Result<InterfaceDeclaration> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading declaration: {}", path.display()))?;
    let val: Value =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing yaml: {}", path.display()))?;
    let decl: InterfaceDeclaration = serde_yaml::from_value(val)
        .with_context(|| format!("decoding declaration: {}", path.display()))?;
    Ok(decl)
}

pub fn load_declarations_dir(dir: impl AsRef<Path>) -> anyhow::Result<Vec<InterfaceDeclaration>> {
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "yml" || ext == "yaml" {
                entries.push(path);
            }
        }
    }
    entries.sort();
    let mut out = Vec::with_capacity(entries.len());
    for p in entries {
        out.push(load_declaration_file(&p)?);
    }
    Ok(out)
}

/// Load a single file, or every declaration in a directory.
pub fn load_declarations(path: impl AsRef<Path>) -> anyhow::Result<Vec<InterfaceDeclaration>> {
    let path = path.as_ref();
    if path.is_dir() {
        load_declarations_dir(path)
    } else {
        Ok(vec![load_declaration_file(path)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MemoryIdentity, RecordingNotifier};
    use crate::{ObjectStore, ProvisioningResolver, Setup};

    const PHILIPS: &str = "\
interface: philips
objects:
  - name: lamp
    points:
      - name: brightness
      - name: color
        plugin: rgb
";

    #[test]
    fn test_plugin_defaults() {
        let decl: InterfaceDeclaration = serde_yaml::from_str(PHILIPS).unwrap();
        assert_eq!(decl.interface, "philips");
        assert_eq!(decl.point_count(), 2);
        assert_eq!(decl.objects[0].points[0].plugin, "default");
        assert_eq!(decl.objects[0].points[1].plugin, "rgb");
    }

    #[test]
    fn test_load_dir_sorted_yaml_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.yaml"), PHILIPS).unwrap();
        fs::write(dir.path().join("a.yml"), "interface: arduino\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let decls = load_declarations(dir.path()).unwrap();
        let names: Vec<_> = decls.iter().map(|d| d.interface.as_str()).collect();
        assert_eq!(names, vec!["arduino", "philips"]);
    }

    #[test]
    fn test_bad_yaml_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "objects: [").unwrap();
        let err = load_declaration_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.yaml"));
    }

    #[test]
    fn test_apply_runs_full_pass() {
        let ids = MemoryIdentity::new();
        let store = ObjectStore::new().into_shared();
        let mut api = HardwareInterfaces::setup(Setup::new(
            store.clone(),
            ProvisioningResolver::new(ids.clone(), store.clone()),
            ids,
            RecordingNotifier::new(),
        ))
        .unwrap();

        let mut decl: InterfaceDeclaration = serde_yaml::from_str(PHILIPS).unwrap();
        assert!(decl.apply(&mut api).unwrap().removed.is_empty());

        decl.objects[0].points.pop();
        let report = decl.apply(&mut api).unwrap();
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].io_name(), "color");

        let store = store.lock().unwrap();
        let (_, lamp) = store.iter().next().unwrap();
        assert_eq!(lamp.object_values.len(), 1);
    }
}
