// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute kinds a port can be declared with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of a port, spelled exactly as the host spells it.
///
/// The last six variants are reported by host introspection for some
/// built-in attributes; they carry no meaning for the mock beyond being
/// accepted on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AttrType {
    /// Boolean
    Bool,
    /// 32-bit integer
    #[default]
    Long,
    /// 16-bit integer
    Short,
    /// 8-bit integer
    Byte,
    /// Single character
    Char,
    /// Enumeration
    Enum,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// Angle stored as a double
    DoubleAngle,
    /// Distance stored as a double
    DoubleLinear,
    /// String
    String,
    /// Array of strings
    StringArray,
    /// Parent of child attributes
    Compound,
    /// Connection-only attribute carrying no data
    Message,
    /// Time value
    Time,
    /// 4x4 double matrix
    Matrix,
    /// 4x4 float matrix
    FltMatrix,
    /// RGB reflectance
    ReflectanceRgb,
    /// Scalar reflectance
    Reflectance,
    /// RGB spectrum
    SpectrumRgb,
    /// Scalar spectrum
    Spectrum,
    /// Two floats
    Float2,
    /// Three floats
    Float3,
    /// Two doubles
    Double2,
    /// Three doubles
    Double3,
    /// Four doubles
    Double4,
    /// Two longs
    Long2,
    /// Three longs
    Long3,
    /// Two shorts
    Short2,
    /// Three shorts
    Short3,
    /// Array of doubles
    DoubleArray,
    /// Array of 32-bit integers
    Int32Array,
    /// Array of vectors
    VectorArray,
    /// Curve geometry
    NurbsCurve,
    /// Surface geometry
    NurbsSurface,
    /// Polygonal geometry
    Mesh,
    /// Lattice geometry
    Lattice,
    /// Array of points
    PointArray,
    /// Untyped data attribute
    Typed,
    /// Generic data attribute
    Generic,
    /// Light data
    LightData,
    /// Address
    Addr,
    /// Distance stored as a float
    FloatLinear,
    /// Polygon faces
    PolyFaces,
}

impl AttrType {
    /// Every known attribute kind.
    pub const ALL: [AttrType; 44] = [
        Self::Bool,
        Self::Long,
        Self::Short,
        Self::Byte,
        Self::Char,
        Self::Enum,
        Self::Float,
        Self::Double,
        Self::DoubleAngle,
        Self::DoubleLinear,
        Self::String,
        Self::StringArray,
        Self::Compound,
        Self::Message,
        Self::Time,
        Self::Matrix,
        Self::FltMatrix,
        Self::ReflectanceRgb,
        Self::Reflectance,
        Self::SpectrumRgb,
        Self::Spectrum,
        Self::Float2,
        Self::Float3,
        Self::Double2,
        Self::Double3,
        Self::Double4,
        Self::Long2,
        Self::Long3,
        Self::Short2,
        Self::Short3,
        Self::DoubleArray,
        Self::Int32Array,
        Self::VectorArray,
        Self::NurbsCurve,
        Self::NurbsSurface,
        Self::Mesh,
        Self::Lattice,
        Self::PointArray,
        Self::Typed,
        Self::Generic,
        Self::LightData,
        Self::Addr,
        Self::FloatLinear,
        Self::PolyFaces,
    ];

    /// Host spelling of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Long => "long",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Enum => "enum",
            Self::Float => "float",
            Self::Double => "double",
            Self::DoubleAngle => "doubleAngle",
            Self::DoubleLinear => "doubleLinear",
            Self::String => "string",
            Self::StringArray => "stringArray",
            Self::Compound => "compound",
            Self::Message => "message",
            Self::Time => "time",
            Self::Matrix => "matrix",
            Self::FltMatrix => "fltMatrix",
            Self::ReflectanceRgb => "reflectanceRGB",
            Self::Reflectance => "reflectance",
            Self::SpectrumRgb => "spectrumRGB",
            Self::Spectrum => "spectrum",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Double2 => "double2",
            Self::Double3 => "double3",
            Self::Double4 => "double4",
            Self::Long2 => "long2",
            Self::Long3 => "long3",
            Self::Short2 => "short2",
            Self::Short3 => "short3",
            Self::DoubleArray => "doubleArray",
            Self::Int32Array => "Int32Array",
            Self::VectorArray => "vectorArray",
            Self::NurbsCurve => "nurbsCurve",
            Self::NurbsSurface => "nurbsSurface",
            Self::Mesh => "mesh",
            Self::Lattice => "lattice",
            Self::PointArray => "pointArray",
            Self::Typed => "typed",
            Self::Generic => "generic",
            Self::LightData => "lightData",
            Self::Addr => "addr",
            Self::FloatLinear => "floatLinear",
            Self::PolyFaces => "polyFaces",
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown attribute kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown attribute type: {0:?}")]
pub struct UnknownAttrType(pub String);

impl FromStr for AttrType {
    type Err = UnknownAttrType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownAttrType(s.to_string()))
    }
}

impl From<AttrType> for String {
    fn from(kind: AttrType) -> Self {
        kind.as_str().to_string()
    }
}

impl TryFrom<String> for AttrType {
    type Error = UnknownAttrType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_spelling() {
        assert_eq!("doubleAngle".parse::<AttrType>().unwrap(), AttrType::DoubleAngle);
        assert_eq!("reflectanceRGB".parse::<AttrType>().unwrap(), AttrType::ReflectanceRgb);
        assert_eq!("Int32Array".parse::<AttrType>().unwrap(), AttrType::Int32Array);
        assert!("int32Array".parse::<AttrType>().is_err());
        assert!("vector".parse::<AttrType>().is_err());
    }

    #[test]
    fn test_every_kind_parses_back() {
        for kind in AttrType::ALL {
            assert_eq!(kind.as_str().parse::<AttrType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_json_uses_host_spelling() {
        let json = serde_json::to_string(&AttrType::SpectrumRgb).unwrap();
        assert_eq!(json, "\"spectrumRGB\"");
        let kind: AttrType = serde_json::from_str("\"fltMatrix\"").unwrap();
        assert_eq!(kind, AttrType::FltMatrix);
        assert!(serde_json::from_str::<AttrType>("\"nope\"").is_err());
    }

    #[test]
    fn test_default_is_long() {
        assert_eq!(AttrType::default(), AttrType::Long);
    }
}
