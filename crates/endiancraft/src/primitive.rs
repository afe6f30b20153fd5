//! Fixed table of C primitive types and the byte orders an image can be synthesized in.

use std::fmt;

/// Byte order of a synthesized memory image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// Both orders, big first. This is the order vectors are produced in.
    pub const BOTH: [ByteOrder; 2] = [ByteOrder::Big, ByteOrder::Little];

    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::Big => "big_endian",
            ByteOrder::Little => "little_endian",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive field type with a fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveType {
    U8,
    I8,
    Char,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

/// C spellings accepted for each primitive, in lookup order.
const NAMES: &[(&str, PrimitiveType)] = &[
    ("uint8_t", PrimitiveType::U8),
    ("int8_t", PrimitiveType::I8),
    ("char", PrimitiveType::Char),
    ("unsigned char", PrimitiveType::U8),
    ("signed char", PrimitiveType::I8),
    ("int16_t", PrimitiveType::I16),
    ("uint16_t", PrimitiveType::U16),
    ("short", PrimitiveType::I16),
    ("unsigned short", PrimitiveType::U16),
    ("int", PrimitiveType::I32),
    ("unsigned int", PrimitiveType::U32),
    ("uint32_t", PrimitiveType::U32),
    ("int32_t", PrimitiveType::I32),
    ("uint64_t", PrimitiveType::U64),
    ("int64_t", PrimitiveType::I64),
    ("float", PrimitiveType::F32),
    ("double", PrimitiveType::F64),
];

impl PrimitiveType {
    /// Looks up a C type name. Runs of whitespace inside multi-word names are
    /// treated as a single space, so `unsigned   int` matches `unsigned int`.
    pub fn from_name(name: &str) -> Option<PrimitiveType> {
        let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");
        NAMES
            .iter()
            .find(|(candidate, _)| *candidate == normalized)
            .map(|(_, primitive)| *primitive)
    }

    /// Width in bytes.
    pub fn width(self) -> usize {
        match self {
            PrimitiveType::U8 | PrimitiveType::I8 | PrimitiveType::Char => 1,
            PrimitiveType::U16 | PrimitiveType::I16 => 2,
            PrimitiveType::U32 | PrimitiveType::I32 | PrimitiveType::F32 => 4,
            PrimitiveType::U64 | PrimitiveType::I64 | PrimitiveType::F64 => 8,
        }
    }

    /// Canonical C name.
    pub fn c_name(self) -> &'static str {
        match self {
            PrimitiveType::U8 => "uint8_t",
            PrimitiveType::I8 => "int8_t",
            PrimitiveType::Char => "char",
            PrimitiveType::U16 => "uint16_t",
            PrimitiveType::I16 => "int16_t",
            PrimitiveType::U32 => "uint32_t",
            PrimitiveType::I32 => "int32_t",
            PrimitiveType::U64 => "uint64_t",
            PrimitiveType::I64 => "int64_t",
            PrimitiveType::F32 => "float",
            PrimitiveType::F64 => "double",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}
