use std::fmt;

use crate::constant_pool::ConstantPool;

// Name hashes of the recognized attributes, precomputed with
// [`crate::hash::fnv1a`] and compared by value during dispatch.
pub(crate) const CONSTANT_VALUE: u64 = 0x8ce01783d6d2d4ea;
pub(crate) const SIGNATURE: u64 = 0x52187fb1720fffd9;
pub(crate) const SOURCE_FILE: u64 = 0x1cfa1ccfcf7cb4ec;
pub(crate) const SYNTHETIC: u64 = 0x2ac0323473e625bc;
pub(crate) const DEPRECATED: u64 = 0xc5789b54d85e5daa;

/// Which declaration an attribute list hangs off. `ConstantValue` is only
/// recognized on fields and `SourceFile` only on the class itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOwner {
    Class,
    Field,
    Method,
}

pub struct Attribute<'a> {
    pub name_index: u16,
    pub length: u32,
    pub info: AttributeInfo<'a>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AttributeInfo<'a> {
    ConstantValue { constant_index: u16 },
    Signature { signature_index: u16 },
    SourceFile { sourcefile_index: u16 },
    Synthetic,
    Deprecated,
    /// Unrecognized payload, skipped without interpretation.
    Unknown(&'a [u8]),
}

impl fmt::Debug for Attribute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = match &self.info {
            AttributeInfo::Unknown(bytes) => format!("Unknown ({} bytes)", bytes.len()),
            info => format!("{:?}", info),
        };
        f.debug_struct("Attribute")
            .field("name_index", &self.name_index)
            .field("info", &info)
            .finish()
    }
}

#[derive(Debug)]
pub struct Attributes<'a>(pub Vec<Attribute<'a>>);

impl<'a> Attributes<'a> {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute<'a>> {
        for a in &self.0 {
            let Ok(s) = constant_pool.utf8(a.name_index) else {
                continue;
            };

            if s == name {
                return Some(a);
            }
        }

        None
    }

    pub fn is_synthetic(&self) -> bool {
        self.0
            .iter()
            .any(|a| matches!(a.info, AttributeInfo::Synthetic))
    }

    pub fn is_deprecated(&self) -> bool {
        self.0
            .iter()
            .any(|a| matches!(a.info, AttributeInfo::Deprecated))
    }

    /// Pool index carried by a `Signature` attribute, if one is present.
    pub fn signature_index(&self) -> Option<u16> {
        self.0.iter().find_map(|a| match a.info {
            AttributeInfo::Signature { signature_index } => Some(signature_index),
            _ => None,
        })
    }
}

#[cfg(test)]
mod dispatch_table_tests {
    use super::*;
    use crate::hash::fnv1a;

    #[test]
    fn it_should_match_the_hash_function_for_every_recognized_name() {
        assert_eq!(fnv1a(b"ConstantValue"), CONSTANT_VALUE);
        assert_eq!(fnv1a(b"Signature"), SIGNATURE);
        assert_eq!(fnv1a(b"SourceFile"), SOURCE_FILE);
        assert_eq!(fnv1a(b"Synthetic"), SYNTHETIC);
        assert_eq!(fnv1a(b"Deprecated"), DEPRECATED);
    }
}
