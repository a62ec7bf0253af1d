// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host conventions consulted by the session.
//!
//! The defaults reproduce the host application. Rules can be stored as RON
//! next to a test suite and loaded with [`HostRules::load`].

use crate::naming;
use dagmock_schema::AttrType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One degree in radians
const DEGREE: f64 = 0.017453292519943295;

/// Errors raised while loading or saving host rules
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON text could not be parsed
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Rules could not be serialized
    #[error("Config serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// A scalar conversion inserted when connecting two port kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRule {
    /// Kind of the source port
    pub source: AttrType,
    /// Kind of the destination port
    pub destination: AttrType,
    /// Factor applied by the conversion node; the reverse pair uses the reciprocal
    pub factor: f64,
}

/// Naming, parenting and connection conventions of the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostRules {
    /// Names reserved on top of the host keywords
    pub reserved_names: Vec<String>,
    /// Node types that always live under a transform
    pub shape_types: Vec<String>,
    /// Classification prefixes that mark a schema type as a shape
    pub shape_classifications: Vec<String>,
    /// Name prefix of the transform generated for a shape type
    pub shape_prefixes: IndexMap<String, String>,
    /// Type of the container node generated for shapes
    pub transform_type: String,
    /// Port kind pairs connected through a conversion node
    pub conversions: Vec<ConversionRule>,
    /// Port kind pairs that can never be connected
    pub impossible_connections: Vec<(AttrType, AttrType)>,
    /// Type of the synthesized conversion node
    pub conversion_node_type: String,
}

impl Default for HostRules {
    fn default() -> Self {
        let strings = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| (*s).to_string()).collect()
        };
        Self {
            reserved_names: Vec::new(),
            shape_types: strings(&[
                "mesh",
                "nurbsSurface",
                "nurbsCurve",
                "locator",
                "volume",
                "ambientLight",
                "areaLight",
                "directionalLight",
                "pointLight",
                "spotLight",
                "volumeLight",
            ]),
            shape_classifications: strings(&["drawdb/light"]),
            shape_prefixes: [
                ("mesh", "polySurface"),
                ("nurbsSurface", "surface"),
                ("nurbsCurve", "curve"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            transform_type: "transform".to_string(),
            conversions: vec![
                ConversionRule {
                    source: AttrType::Double,
                    destination: AttrType::DoubleAngle,
                    factor: DEGREE,
                },
                ConversionRule {
                    source: AttrType::Bool,
                    destination: AttrType::DoubleAngle,
                    factor: DEGREE,
                },
            ],
            impossible_connections: vec![(AttrType::Char, AttrType::String)],
            conversion_node_type: "unitConversion".to_string(),
        }
    }
}

impl HostRules {
    /// Whether the name is a host keyword or one of the extra reserved names
    pub fn is_reserved(&self, name: &str) -> bool {
        naming::is_reserved(name) || self.reserved_names.iter().any(|reserved| reserved == name)
    }

    /// A node name is usable if it is non-empty and not reserved
    pub fn is_valid_name(&self, name: &str) -> bool {
        !name.is_empty() && !self.is_reserved(name)
    }

    /// Whether nodes of this type require a transform parent
    pub fn is_shape_type(&self, node_type: &str) -> bool {
        self.shape_types.iter().any(|shape| shape == node_type)
    }

    /// Whether a host classification string (`:`-separated) denotes a shape
    pub fn is_shape_classification(&self, classification: &str) -> bool {
        classification.split(':').any(|segment| {
            self.shape_classifications
                .iter()
                .any(|prefix| segment.starts_with(prefix.as_str()))
        })
    }

    /// Prefix used to name the transform of a shape, or to name the shape itself
    pub fn shape_prefix<'a>(&'a self, node_type: &'a str) -> &'a str {
        self.shape_prefixes
            .get(node_type)
            .map_or(node_type, String::as_str)
    }

    /// Conversion factor for a connection between two port kinds
    pub fn conversion_factor(&self, source: AttrType, destination: AttrType) -> Option<f64> {
        self.conversions.iter().find_map(|rule| {
            if rule.source == source && rule.destination == destination {
                Some(rule.factor)
            } else if rule.source == destination && rule.destination == source {
                Some(1.0 / rule.factor)
            } else {
                None
            }
        })
    }

    /// Whether two port kinds can never be connected
    pub fn is_impossible(&self, source: AttrType, destination: AttrType) -> bool {
        self.impossible_connections
            .iter()
            .any(|pair| *pair == (source, destination))
    }

    /// Parse rules from RON text. Missing fields keep their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Serialize rules to pretty RON text
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load rules from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let rules = Self::from_ron(&content)?;
        tracing::info!("Loaded host rules from {:?}", path);
        Ok(rules)
    }

    /// Save rules to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved host rules to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = HostRules::default();
        assert!(rules.is_reserved("proc"));
        assert!(!rules.is_valid_name(""));
        assert!(!rules.is_valid_name("yes"));
        assert!(rules.is_valid_name("yes1"));
        assert!(rules.is_shape_type("mesh"));
        assert!(!rules.is_shape_type("transform"));
        assert_eq!(rules.shape_prefix("mesh"), "polySurface");
        assert_eq!(rules.shape_prefix("locator"), "locator");
    }

    #[test]
    fn test_shape_classification() {
        let rules = HostRules::default();
        assert!(rules.is_shape_classification("light:drawdb/light/pointLight:swatch/lightSwatch"));
        assert!(!rules.is_shape_classification("drawdb/geometry/transform"));
        assert!(!rules.is_shape_classification(""));
    }

    #[test]
    fn test_conversion_factor_is_symmetric() {
        let rules = HostRules::default();
        let forward = rules
            .conversion_factor(AttrType::Double, AttrType::DoubleAngle)
            .unwrap();
        let reverse = rules
            .conversion_factor(AttrType::DoubleAngle, AttrType::Double)
            .unwrap();
        assert!((forward - DEGREE).abs() < f64::EPSILON);
        assert!((forward * reverse - 1.0).abs() < 1e-12);
        assert!(rules.conversion_factor(AttrType::Double, AttrType::Double).is_none());
    }

    #[test]
    fn test_impossible_is_directed() {
        let rules = HostRules::default();
        assert!(rules.is_impossible(AttrType::Char, AttrType::String));
        assert!(!rules.is_impossible(AttrType::String, AttrType::Char));
    }

    #[test]
    fn test_ron_round_trip() {
        let rules = HostRules::default();
        let text = rules.to_ron().unwrap();
        let loaded = HostRules::from_ron(&text).unwrap();
        assert_eq!(loaded, rules);
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let rules = HostRules::from_ron(r#"(conversion_node_type: "myConversion")"#).unwrap();
        assert_eq!(rules.conversion_node_type, "myConversion");
        assert_eq!(rules.transform_type, "transform");
        assert!(rules.is_reserved("int"));
    }

    #[test]
    fn test_extra_reserved_names() {
        let rules = HostRules::from_ron(r#"(reserved_names: ["persp"])"#).unwrap();
        assert!(rules.is_reserved("persp"));
        assert!(rules.is_reserved("while"));
        assert!(!rules.is_valid_name("persp"));
        assert!(rules.is_valid_name("persp1"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.ron");
        let mut rules = HostRules::default();
        rules.shape_types.push("customShape".to_string());
        rules.save(&path).unwrap();
        assert_eq!(HostRules::load(&path).unwrap(), rules);
    }
}
