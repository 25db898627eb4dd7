//! C scalar types that are resolvable without any declaration.
//!
//! These names form the default externally-known set: the pruner never
//! looks for a declaration of them and the sorter treats them as resolved
//! from the start.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A fixed-width C scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Void,
    Bool,
    Char,
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    LongDouble,
    SizeT,
    PtrDiffT,
}

/// Spelling → primitive.
const PRIMITIVE_NAMES: &[(&str, Primitive)] = &[
    ("void", Primitive::Void),
    ("_Bool", Primitive::Bool),
    ("bool", Primitive::Bool),
    ("char", Primitive::Char),
    ("byte", Primitive::Byte),
    ("signed char", Primitive::Byte),
    ("unsigned byte", Primitive::UnsignedByte),
    ("unsigned char", Primitive::UnsignedByte),
    ("short", Primitive::Short),
    ("short int", Primitive::Short),
    ("unsigned short", Primitive::UnsignedShort),
    ("unsigned short int", Primitive::UnsignedShort),
    ("int", Primitive::Int),
    ("signed", Primitive::Int),
    ("signed int", Primitive::Int),
    ("unsigned", Primitive::UnsignedInt),
    ("unsigned int", Primitive::UnsignedInt),
    ("long", Primitive::Long),
    ("long int", Primitive::Long),
    ("unsigned long", Primitive::UnsignedLong),
    ("unsigned long int", Primitive::UnsignedLong),
    ("long long", Primitive::LongLong),
    ("long long int", Primitive::LongLong),
    ("unsigned long long", Primitive::UnsignedLongLong),
    ("unsigned long long int", Primitive::UnsignedLongLong),
    ("int8", Primitive::Int8),
    ("int16", Primitive::Int16),
    ("int32", Primitive::Int32),
    ("int64", Primitive::Int64),
    ("unsigned int8", Primitive::UInt8),
    ("unsigned int16", Primitive::UInt16),
    ("unsigned int32", Primitive::UInt32),
    ("unsigned int64", Primitive::UInt64),
    ("int8_t", Primitive::Int8),
    ("int16_t", Primitive::Int16),
    ("int32_t", Primitive::Int32),
    ("int64_t", Primitive::Int64),
    ("uint8_t", Primitive::UInt8),
    ("uint16_t", Primitive::UInt16),
    ("uint32_t", Primitive::UInt32),
    ("uint64_t", Primitive::UInt64),
    ("float", Primitive::Float),
    ("double", Primitive::Double),
    ("long double", Primitive::LongDouble),
    ("size_t", Primitive::SizeT),
    ("ptrdiff_t", Primitive::PtrDiffT),
];

impl Primitive {
    /// Look up a C spelling.
    pub fn from_c_name(name: &str) -> Option<Self> {
        PRIMITIVE_NAMES
            .iter()
            .find(|(spelling, _)| *spelling == name)
            .map(|(_, prim)| *prim)
    }

    /// Every spelling this table recognises.
    pub fn names() -> impl Iterator<Item = &'static str> {
        PRIMITIVE_NAMES.iter().map(|(spelling, _)| *spelling)
    }

    /// Whether this is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, Primitive::Void)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spelling = match self {
            Primitive::Void => "void",
            Primitive::Bool => "_Bool",
            Primitive::Char => "char",
            Primitive::Byte => "signed char",
            Primitive::UnsignedByte => "unsigned char",
            Primitive::Short => "short",
            Primitive::UnsignedShort => "unsigned short",
            Primitive::Int => "int",
            Primitive::UnsignedInt => "unsigned int",
            Primitive::Long => "long",
            Primitive::UnsignedLong => "unsigned long",
            Primitive::LongLong => "long long",
            Primitive::UnsignedLongLong => "unsigned long long",
            Primitive::Int8 => "int8_t",
            Primitive::Int16 => "int16_t",
            Primitive::Int32 => "int32_t",
            Primitive::Int64 => "int64_t",
            Primitive::UInt8 => "uint8_t",
            Primitive::UInt16 => "uint16_t",
            Primitive::UInt32 => "uint32_t",
            Primitive::UInt64 => "uint64_t",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::LongDouble => "long double",
            Primitive::SizeT => "size_t",
            Primitive::PtrDiffT => "ptrdiff_t",
        };
        write!(f, "{spelling}")
    }
}

/// The default set of externally-known type names.
pub fn known_names() -> BTreeSet<String> {
    Primitive::names().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_standard_widths() {
        assert_eq!(Primitive::from_c_name("int"), Some(Primitive::Int));
        assert_eq!(
            Primitive::from_c_name("unsigned long long"),
            Some(Primitive::UnsignedLongLong)
        );
        assert_eq!(Primitive::from_c_name("size_t"), Some(Primitive::SizeT));
        assert_eq!(Primitive::from_c_name("ptrdiff_t"), Some(Primitive::PtrDiffT));
        assert_eq!(Primitive::from_c_name("uint8_t"), Some(Primitive::UInt8));
        assert!(Primitive::from_c_name("void").unwrap().is_void());
    }

    #[test]
    fn unknown_names_are_not_primitive() {
        assert_eq!(Primitive::from_c_name("real_T"), None);
        assert_eq!(Primitive::from_c_name("struct point"), None);
    }

    #[test]
    fn known_names_match_table() {
        let names = known_names();
        assert!(names.contains("double"));
        assert!(names.contains("long double"));
        assert_eq!(names.len(), PRIMITIVE_NAMES.len());
    }
}
