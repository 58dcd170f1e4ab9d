//! Annotation classes and the class registry.

use crate::error::ConfigError;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class id that hit-tests and renders by outline only.
pub const DEFAULT_BOUNDARY_CLASS: &str = "honeycomb";

/// Class used for display when an annotation refers to an unknown id.
pub const FALLBACK_CLASS: &str = "other";

/// Identifier of an annotation class (e.g. `"larvae"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClassId {
    fn default() -> Self {
        Self::new(FALLBACK_CLASS)
    }
}

impl From<&str> for ClassId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializable color representation (RGBA8), written as `#rrggbb[aa]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(color.to_string());
        let hex = color.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => Ok(Self::rgb(
                byte(&hex[0..1])? * 17,
                byte(&hex[1..2])? * 17,
                byte(&hex[2..3])? * 17,
            )),
            6 => Ok(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Ok(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Same color with the alpha channel replaced by `alpha` in `[0, 1]`.
    pub fn with_alpha(self, alpha: f64) -> Color {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::from_rgba8(self.r, self.g, self.b, a)
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Display properties of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "border")]
    pub border_color: SerializableColor,
    #[serde(rename = "color")]
    pub fill_color: SerializableColor,
    #[serde(default)]
    pub description: String,
}

/// A registry entry: id plus display info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub id: ClassId,
    #[serde(flatten)]
    pub info: ClassInfo,
}

/// Ordered mapping from class id to display info, with one designated
/// boundary-only class.
///
/// Always holds at least one class and the boundary-only class is always
/// registered; deserialization goes through the same checks as [`new`](Self::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegistryFile")]
pub struct ClassRegistry {
    classes: Vec<ClassEntry>,
    boundary_only: ClassId,
}

/// Unchecked wire form of [`ClassRegistry`].
#[derive(Deserialize)]
struct RegistryFile {
    classes: Vec<ClassEntry>,
    #[serde(default = "default_boundary_class")]
    boundary_only: ClassId,
}

impl TryFrom<RegistryFile> for ClassRegistry {
    type Error = ConfigError;

    fn try_from(file: RegistryFile) -> Result<Self, Self::Error> {
        Self::new(file.classes, file.boundary_only)
    }
}

fn default_boundary_class() -> ClassId {
    ClassId::new(DEFAULT_BOUNDARY_CLASS)
}

impl Default for ClassRegistry {
    /// The bee-frame classes.
    fn default() -> Self {
        let entry = |id: &str, name: &str, fill: &str, border: &str, description: &str| ClassEntry {
            id: ClassId::new(id),
            info: ClassInfo {
                display_name: name.to_string(),
                border_color: SerializableColor::from_hex(border).unwrap_or(SerializableColor::rgb(0x88, 0x88, 0x88)),
                fill_color: SerializableColor::from_hex(fill).unwrap_or(SerializableColor::rgb(0xF0, 0xF0, 0xF0)),
                description: description.to_string(),
            },
        };
        Self {
            classes: vec![
                entry("eggs", "Eggs", "#FFE6E6", "#FF4444", "Cells containing eggs"),
                entry("larvae", "Larvae", "#E6F3FF", "#4488FF", "Open cells with larvae"),
                entry("capped_brood", "Capped brood", "#FFF4E6", "#FFB344", "Brood cells sealed with wax"),
                entry("pollen", "Pollen", "#F0E6FF", "#AA44FF", "Cells filled with pollen"),
                entry("nectar", "Nectar", "#E6FFE6", "#44FF44", "Uncapped cells with nectar"),
                entry("honey", "Honey", "#FFFFE6", "#FFFF44", "Capped honey cells"),
                entry("other", "Other", "#F0F0F0", "#888888", "Anything else"),
                entry("honeycomb", "Honeycomb", "#F4E4BC", "#8B4513", "Comb structure outline"),
            ],
            boundary_only: default_boundary_class(),
        }
    }
}

impl ClassRegistry {
    /// Build a registry from entries. Fails if `boundary_only` is not among them
    /// or an id is repeated.
    pub fn new(classes: Vec<ClassEntry>, boundary_only: ClassId) -> Result<Self, ConfigError> {
        let registry = Self {
            classes,
            boundary_only,
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Load a registry from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.classes.is_empty() {
            return Err(ConfigError::Invalid("class registry is empty".to_string()));
        }
        for (i, entry) in self.classes.iter().enumerate() {
            if self.classes[..i].iter().any(|e| e.id == entry.id) {
                return Err(ConfigError::Invalid(format!("duplicate class id '{}'", entry.id)));
            }
        }
        if !self.contains(&self.boundary_only) {
            return Err(ConfigError::Invalid(format!(
                "boundary-only class '{}' is not registered",
                self.boundary_only
            )));
        }
        Ok(())
    }

    pub fn get(&self, id: &ClassId) -> Option<&ClassInfo> {
        self.classes.iter().find(|e| &e.id == id).map(|e| &e.info)
    }

    /// Display info for `id`, falling back to `other`, then the first class.
    /// `None` only for a registry that failed validation.
    pub fn display_info(&self, id: &ClassId) -> Option<&ClassInfo> {
        self.get(id)
            .or_else(|| self.get(&ClassId::default()))
            .or_else(|| self.classes.first().map(|e| &e.info))
    }

    /// Class new annotations start with: `other` when registered, else the
    /// first class.
    pub fn default_class(&self) -> ClassId {
        let fallback = ClassId::default();
        if self.contains(&fallback) {
            return fallback;
        }
        self.classes.first().map(|e| e.id.clone()).unwrap_or(fallback)
    }

    pub fn contains(&self, id: &ClassId) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` hit-tests and renders by outline only.
    pub fn is_boundary_only(&self, id: &ClassId) -> bool {
        &self.boundary_only == id
    }

    pub fn boundary_only(&self) -> &ClassId {
        &self.boundary_only
    }

    /// Entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ClassId> {
        self.classes.iter().map(|e| &e.id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = ClassRegistry::default();
        assert_eq!(registry.len(), 8);
        assert!(registry.is_boundary_only(&ClassId::new("honeycomb")));
        assert!(!registry.is_boundary_only(&ClassId::new("honey")));
        let other = registry.get(&ClassId::new("other")).unwrap();
        assert_eq!(other.border_color, SerializableColor::rgb(0x88, 0x88, 0x88));
    }

    #[test]
    fn test_unknown_class_falls_back_to_other() {
        let registry = ClassRegistry::default();
        let info = registry.display_info(&ClassId::new("wasps")).unwrap();
        assert_eq!(info.display_name, "Other");
    }

    #[test]
    fn test_empty_registry_rejected_when_nested() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            #[allow(dead_code)]
            classes: ClassRegistry,
        }
        let result: Result<Wrapper, _> =
            serde_json::from_str(r#"{"classes": {"classes": [], "boundary_only": "x"}}"#);
        assert!(result.unwrap_err().to_string().contains("class registry is empty"));
        assert!(ClassRegistry::from_json(r#"{"classes": []}"#).is_err());
    }

    #[test]
    fn test_default_class_without_other() {
        let registry = ClassRegistry::from_json(
            r##"{"classes": [{"id": "cell", "name": "Cell", "border": "#000000", "color": "#FFFFFF"}], "boundary_only": "cell"}"##,
        )
        .unwrap();
        assert_eq!(registry.default_class(), ClassId::new("cell"));
        assert_eq!(registry.display_info(&ClassId::new("other")).unwrap().display_name, "Cell");
        assert_eq!(ClassRegistry::default().default_class(), ClassId::new("other"));
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(SerializableColor::from_hex("#fff").unwrap(), SerializableColor::rgb(255, 255, 255));
        assert_eq!(SerializableColor::from_hex("#8B4513").unwrap(), SerializableColor::rgb(0x8B, 0x45, 0x13));
        assert_eq!(
            SerializableColor::from_hex("#11223344").unwrap(),
            SerializableColor::new(0x11, 0x22, 0x33, 0x44)
        );
        assert!(SerializableColor::from_hex("red").is_err());
        assert!(SerializableColor::from_hex("#12345").is_err());
        assert!(SerializableColor::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn test_registry_from_json() {
        let json = r##"{
            "classes": [
                {"id": "cell", "name": "Cell", "border": "#FF0000", "color": "#FFEEEE"},
                {"id": "frame", "name": "Frame", "border": "#000000", "color": "#FFFFFF", "description": "Outline"}
            ],
            "boundary_only": "frame"
        }"##;
        let registry = ClassRegistry::from_json(json).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.is_boundary_only(&ClassId::new("frame")));
        assert_eq!(registry.get(&ClassId::new("cell")).unwrap().description, "");
    }

    #[test]
    fn test_registry_rejects_missing_boundary_class() {
        let json = r##"{
            "classes": [{"id": "cell", "name": "Cell", "border": "#FF0000", "color": "#FFEEEE"}]
        }"##;
        assert!(matches!(ClassRegistry::from_json(json), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_color_serde_roundtrip_as_hex() {
        let json = serde_json::to_string(&SerializableColor::rgb(0x44, 0x88, 0xFF)).unwrap();
        assert_eq!(json, "\"#4488FF\"");
    }
}
