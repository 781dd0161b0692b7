use crate::IdentityError;
use core::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Identifiers of this length or shorter are treated as unresolved.
pub const MIN_OBJECT_ID_LEN: usize = 14;

/// Editor frame edge length assigned to freshly created value records.
pub const FRAME_SIZE: i32 = 47;

/// New records are placed uniformly in `[-LAYOUT_SPAN, LAYOUT_SPAN]` on both axes.
pub const LAYOUT_SPAN: i32 = 100;

/// Plugin name meaning "pass the value through unchanged".
pub const DEFAULT_PLUGIN: &str = "default";

/// Globally unique identifier of an object in the store.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Validate a raw identifier coming from a resolver or lookup.
    pub fn parse(raw: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdentityError::Empty);
        }
        if raw.chars().count() < MIN_OBJECT_ID_LEN {
            return Err(IdentityError::TooShort(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        ObjectId::parse(raw).map_err(serde::de::Error::custom)
    }
}

/// Key of a value record inside an object: the IO point name followed by the
/// owning object's identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueKey {
    io_name: String,
    object_id: ObjectId,
}

impl ValueKey {
    pub fn new(io_name: impl Into<String>, object_id: &ObjectId) -> Self {
        Self {
            io_name: io_name.into(),
            object_id: object_id.clone(),
        }
    }

    pub fn io_name(&self) -> &str {
        &self.io_name
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.io_name, self.object_id)
    }
}

impl Serialize for ValueKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// One IO point's runtime value as held by the object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValueRecord {
    pub name: String,
    pub value: serde_json::Value,
    pub mode: String,
    pub plugin: String,
    pub r#type: String,
    pub x: i32,
    pub y: i32,
    pub frame_size_x: i32,
    pub frame_size_y: i32,
}

impl Default for ValueRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            value: serde_json::Value::Null,
            mode: String::new(),
            plugin: DEFAULT_PLUGIN.to_string(),
            r#type: String::new(),
            x: 0,
            y: 0,
            frame_size_x: 0,
            frame_size_y: 0,
        }
    }
}

impl ValueRecord {
    /// Assign a random editor position and the standard frame size.
    pub fn place<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.x = rng.gen_range(-LAYOUT_SPAN..=LAYOUT_SPAN);
        self.y = rng.gen_range(-LAYOUT_SPAN..=LAYOUT_SPAN);
        self.frame_size_x = FRAME_SIZE;
        self.frame_size_y = FRAME_SIZE;
    }
}

/// A logical object and the values its IO points currently hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    pub name: String,
    pub developer: bool,
    pub object_values: BTreeMap<ValueKey, ValueRecord>,
}

impl ObjectRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
