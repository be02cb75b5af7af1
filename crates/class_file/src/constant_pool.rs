use std::{collections::HashMap, fmt};

use byteorder::{BigEndian, ByteOrder};

use crate::{cursor::ByteCursor, hash, mutf8, ClassFileError, Result};

/// Discriminator byte of a constant pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolTag {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    FieldRef,
    MethodRef,
    InterfaceMethodRef,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
}

impl PoolTag {
    fn from_u8(tag: u8, index: u16) -> Result<PoolTag> {
        Ok(match tag {
            1 => PoolTag::Utf8,
            3 => PoolTag::Integer,
            4 => PoolTag::Float,
            5 => PoolTag::Long,
            6 => PoolTag::Double,
            7 => PoolTag::Class,
            8 => PoolTag::String,
            9 => PoolTag::FieldRef,
            10 => PoolTag::MethodRef,
            11 => PoolTag::InterfaceMethodRef,
            12 => PoolTag::NameAndType,
            15 => PoolTag::MethodHandle,
            16 => PoolTag::MethodType,
            17 => PoolTag::Dynamic,
            18 => PoolTag::InvokeDynamic,
            _ => return Err(ClassFileError::InvalidCpInfoTag { tag, index }),
        })
    }
}

/// Decoded `Utf8` pool entries, keyed by pool index.
///
/// Entries hold standard UTF-8, never the modified UTF-8 bytes of the
/// input, together with the hash of the decoded bytes.
#[derive(Debug, Default)]
pub struct StringTable {
    entries: HashMap<u16, StringEntry>,
}

#[derive(Debug)]
struct StringEntry {
    string: String,
    hash: u64,
}

impl StringTable {
    fn insert(&mut self, index: u16, string: String) {
        let hash = hash::fnv1a(string.as_bytes());
        self.entries.insert(index, StringEntry { string, hash });
    }

    pub fn get(&self, index: u16) -> Option<&str> {
        self.entries.get(&index).map(|e| e.string.as_str())
    }

    pub fn hash(&self, index: u16) -> Option<u64> {
        self.entries.get(&index).map(|e| e.hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Raw scalar payload of a numeric pool entry. Float and Double bit
/// patterns are kept as-is, never reinterpreted as floating values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawConstant {
    Word(u32),
    Wide(u64),
}

/// Numeric pool entries, keyed by pool index.
#[derive(Debug, Default)]
pub struct ConstantTable {
    entries: HashMap<u16, RawConstant>,
}

impl ConstantTable {
    fn insert(&mut self, index: u16, value: RawConstant) {
        self.entries.insert(index, value);
    }

    pub fn get(&self, index: u16) -> Option<RawConstant> {
        self.entries.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tag and inclusive byte extent of one parsed pool entry.
#[derive(Debug, Clone, Copy)]
struct PoolSlot {
    tag: PoolTag,
    start: usize,
    end: usize,
}

/// The parsed constant pool: a tag/extent map over the input plus the two
/// side tables. Cross-referenced u16 fields are re-read from the borrowed
/// input through the recorded extents; the input itself is never copied
/// or mutated.
pub struct ConstantPool<'a> {
    data: &'a [u8],
    count: u16,
    // slots[0] and the follower slot of a Long/Double stay None
    slots: Vec<Option<PoolSlot>>,
    strings: StringTable,
    constants: ConstantTable,
}

impl<'a> ConstantPool<'a> {
    /// First pass: tags every slot in `[1, count - 1]`, records extents and
    /// fills the side tables. Cross-reference indices are range-checked
    /// here and tag-checked by [`ConstantPool::validate`] once the whole
    /// pool is known.
    pub(crate) fn parse(cursor: &mut ByteCursor<'a>) -> Result<ConstantPool<'a>> {
        let count = cursor.read_u16()?;
        let mut pool = ConstantPool {
            data: cursor.data(),
            count,
            slots: vec![None; count as usize],
            strings: StringTable::default(),
            constants: ConstantTable::default(),
        };

        let mut index: u16 = 1;
        while index < count {
            let start = cursor.position();
            let tag_byte = cursor.read_u8()?;
            let tag = PoolTag::from_u8(tag_byte, index)?;
            let mut wide = false;
            match tag {
                PoolTag::Utf8 => {
                    let length = cursor.read_u16()?;
                    let raw = cursor.read_bytes(length as usize)?;
                    let string = mutf8::decode(raw)
                        .map_err(|source| ClassFileError::InvalidUtf8 { index, source })?;
                    pool.strings.insert(index, string);
                }
                PoolTag::Integer | PoolTag::Float => {
                    let bits = cursor.read_u32()?;
                    pool.constants.insert(index, RawConstant::Word(bits));
                }
                PoolTag::Long | PoolTag::Double => {
                    let high = cursor.read_u32()?;
                    let low = cursor.read_u32()?;
                    let bits = ((high as u64) << 32) | low as u64;
                    pool.constants.insert(index, RawConstant::Wide(bits));
                    wide = true;
                }
                PoolTag::Class | PoolTag::String | PoolTag::MethodType => {
                    let referenced = cursor.read_u16()?;
                    pool.check_index(referenced)?;
                }
                PoolTag::FieldRef
                | PoolTag::MethodRef
                | PoolTag::InterfaceMethodRef
                | PoolTag::NameAndType => {
                    let first = cursor.read_u16()?;
                    let second = cursor.read_u16()?;
                    pool.check_index(first)?;
                    pool.check_index(second)?;
                }
                PoolTag::MethodHandle => {
                    let kind = cursor.read_u8()?;
                    if !(1..=9).contains(&kind) {
                        return Err(ClassFileError::InvalidMethodHandleKind(kind));
                    }
                    let referenced = cursor.read_u16()?;
                    pool.check_index(referenced)?;
                }
                PoolTag::Dynamic | PoolTag::InvokeDynamic => {
                    // the first index points into the BootstrapMethods
                    // attribute table, not the pool
                    let _bootstrap = cursor.read_u16()?;
                    let name_and_type = cursor.read_u16()?;
                    pool.check_index(name_and_type)?;
                }
            }
            pool.slots[index as usize] = Some(PoolSlot {
                tag,
                start,
                end: cursor.position() - 1,
            });
            // a Long or Double occupies this slot and the next one;
            // saturating keeps a wide entry in the last slot from
            // wrapping the counter
            index = index.saturating_add(if wide { 2 } else { 1 });
        }

        Ok(pool)
    }

    /// Second pass: checks that every stored cross-reference points at an
    /// entry of the expected tag kind. Forward references are legal, so
    /// this only runs once the first pass has tagged every slot.
    pub(crate) fn validate(&self) -> Result<()> {
        for index in 1..self.count {
            let Some(slot) = self.slots[index as usize] else {
                continue;
            };
            let payload = slot.start + 1;
            match slot.tag {
                PoolTag::Utf8
                | PoolTag::Integer
                | PoolTag::Float
                | PoolTag::Long
                | PoolTag::Double => {}
                PoolTag::Class | PoolTag::String | PoolTag::MethodType => {
                    self.expect_tag(self.u16_field(payload)?, PoolTag::Utf8)?;
                }
                PoolTag::FieldRef | PoolTag::MethodRef | PoolTag::InterfaceMethodRef => {
                    self.expect_tag(self.u16_field(payload)?, PoolTag::Class)?;
                    self.expect_tag(self.u16_field(payload + 2)?, PoolTag::NameAndType)?;
                }
                PoolTag::NameAndType => {
                    self.expect_tag(self.u16_field(payload)?, PoolTag::Utf8)?;
                    self.expect_tag(self.u16_field(payload + 2)?, PoolTag::Utf8)?;
                }
                PoolTag::MethodHandle => {
                    let kind = self.u8_field(payload)?;
                    let referenced = self.u16_field(payload + 1)?;
                    // kinds 1-4 read or write a field, 5-8 invoke a
                    // method, 9 invokes an interface method
                    let expected = if (1..=4).contains(&kind) {
                        PoolTag::FieldRef
                    } else if (5..=8).contains(&kind) {
                        PoolTag::MethodRef
                    } else {
                        PoolTag::InterfaceMethodRef
                    };
                    self.expect_tag(referenced, expected)?;
                }
                PoolTag::Dynamic | PoolTag::InvokeDynamic => {
                    self.expect_tag(self.u16_field(payload + 2)?, PoolTag::NameAndType)?;
                }
            }
        }
        Ok(())
    }

    /// The raw `constant_pool_count` field; valid indices are
    /// `1..count`.
    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    /// Total byte span covered by the pool entries, tag bytes included.
    pub fn byte_len(&self) -> usize {
        let mut extent = None;
        for slot in self.slots.iter().flatten() {
            let (start, _) = *extent.get_or_insert((slot.start, slot.end));
            extent = Some((start, slot.end));
        }
        match extent {
            Some((start, end)) => end - start + 1,
            None => 0,
        }
    }

    /// Rejects index 0 and anything at or beyond the pool count.
    pub fn check_index(&self, index: u16) -> Result<()> {
        if index == 0 || index >= self.count {
            return Err(ClassFileError::InvalidPoolIndex {
                index,
                count: self.count,
            });
        }
        Ok(())
    }

    fn slot(&self, index: u16) -> Result<PoolSlot> {
        self.check_index(index)?;
        // None here means the unusable follower of a Long/Double
        self.slots[index as usize].ok_or(ClassFileError::InvalidPoolIndex {
            index,
            count: self.count,
        })
    }

    pub fn tag(&self, index: u16) -> Result<PoolTag> {
        Ok(self.slot(index)?.tag)
    }

    pub fn expect_tag(&self, index: u16, expected: PoolTag) -> Result<()> {
        let actual = self.slot(index)?.tag;
        if actual != expected {
            return Err(ClassFileError::UnexpectedPoolEntry {
                index,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// The decoded string of a `Utf8` entry.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        self.expect_tag(index, PoolTag::Utf8)?;
        self.strings.get(index).ok_or(ClassFileError::InvalidPoolIndex {
            index,
            count: self.count,
        })
    }

    /// The name hash of a `Utf8` entry, as used for attribute dispatch.
    pub fn utf8_hash(&self, index: u16) -> Result<u64> {
        self.expect_tag(index, PoolTag::Utf8)?;
        self.strings.hash(index).ok_or(ClassFileError::InvalidPoolIndex {
            index,
            count: self.count,
        })
    }

    /// Resolves a `Class` entry to its name string.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        let slot = self.slot(index)?;
        if slot.tag != PoolTag::Class {
            return Err(ClassFileError::UnexpectedPoolEntry {
                index,
                expected: PoolTag::Class,
                actual: slot.tag,
            });
        }
        let name_index = self.u16_field(slot.start + 1)?;
        self.utf8(name_index)
    }

    fn u8_field(&self, offset: usize) -> Result<u8> {
        self.data
            .get(offset)
            .copied()
            .ok_or(ClassFileError::UnexpectedEof {
                offset,
                needed: 1,
                length: self.data.len(),
            })
    }

    fn u16_field(&self, offset: usize) -> Result<u16> {
        match self.data.get(offset..offset + 2) {
            Some(bytes) => Ok(BigEndian::read_u16(bytes)),
            None => Err(ClassFileError::UnexpectedEof {
                offset,
                needed: 2,
                length: self.data.len(),
            }),
        }
    }
}

impl fmt::Debug for ConstantPool<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantPool")
            .field("count", &self.count)
            .field("strings", &self.strings.len())
            .field("constants", &self.constants.len())
            .finish()
    }
}

#[cfg(test)]
mod pool_tests {
    use super::*;

    fn parse_pool(bytes: &[u8]) -> Result<ConstantPool<'_>> {
        let mut cursor = ByteCursor::new(bytes);
        ConstantPool::parse(&mut cursor)
    }

    #[test]
    fn it_should_account_for_every_byte_of_the_pool() {
        // count 3: Utf8 "Hi" and an Integer
        let bytes = [
            0x00, 0x03, //
            1, 0x00, 0x02, b'H', b'i', //
            3, 0x00, 0x00, 0x00, 0x2a,
        ];
        let mut cursor = ByteCursor::new(&bytes);
        let pool = ConstantPool::parse(&mut cursor).unwrap();
        // entries start right after the 2-byte count field
        assert_eq!(pool.byte_len(), cursor.position() - 2);
        assert_eq!(pool.utf8(1).unwrap(), "Hi");
        assert_eq!(pool.constants().get(2), Some(RawConstant::Word(42)));
    }

    #[test]
    fn it_should_mark_the_slot_after_a_long_unusable() {
        // count 4: Long at 1 (slots 1+2), Utf8 at 3
        let bytes = [
            0x00, 0x04, //
            5, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, //
            1, 0x00, 0x01, b'x',
        ];
        let pool = parse_pool(&bytes).unwrap();
        assert_eq!(
            pool.constants().get(1),
            Some(RawConstant::Wide(0x0000_0001_0000_0002))
        );
        assert!(matches!(
            pool.tag(2),
            Err(ClassFileError::InvalidPoolIndex { index: 2, .. })
        ));
        assert_eq!(pool.tag(3).unwrap(), PoolTag::Utf8);
    }

    #[test]
    fn it_should_allow_forward_references() {
        // count 3: Class at 1 referencing Utf8 at 2
        let bytes = [
            0x00, 0x03, //
            7, 0x00, 0x02, //
            1, 0x00, 0x01, b'A',
        ];
        let pool = parse_pool(&bytes).unwrap();
        pool.validate().unwrap();
        assert_eq!(pool.class_name(1).unwrap(), "A");
    }

    #[test]
    fn it_should_reject_a_class_entry_referencing_a_non_utf8_entry() {
        // count 3: Class at 1 referencing Integer at 2
        let bytes = [
            0x00, 0x03, //
            7, 0x00, 0x02, //
            3, 0x00, 0x00, 0x00, 0x00,
        ];
        let pool = parse_pool(&bytes).unwrap();
        assert!(matches!(
            pool.validate(),
            Err(ClassFileError::UnexpectedPoolEntry {
                index: 2,
                expected: PoolTag::Utf8,
                actual: PoolTag::Integer,
            })
        ));
    }

    #[test]
    fn it_should_reject_index_zero_during_the_first_pass() {
        let bytes = [
            0x00, 0x02, //
            7, 0x00, 0x00,
        ];
        assert!(matches!(
            parse_pool(&bytes),
            Err(ClassFileError::InvalidPoolIndex { index: 0, .. })
        ));
    }

    #[test]
    fn it_should_reject_an_unknown_tag() {
        let bytes = [
            0x00, 0x02, //
            2, 0x00, 0x01,
        ];
        assert!(matches!(
            parse_pool(&bytes),
            Err(ClassFileError::InvalidCpInfoTag { tag: 2, index: 1 })
        ));
    }

    #[test]
    fn it_should_check_the_method_handle_referenced_slot_against_its_kind() {
        // count 4: MethodHandle kind 5 at 1 referencing the FieldRef at 2,
        // a method kind pointing at a field reference. Slot 1 is validated
        // first, so the mismatch fires before the rest of the pool.
        let bytes = [
            0x00, 0x04, //
            15, 5, 0x00, 0x02, //
            9, 0x00, 0x03, 0x00, 0x03, //
            7, 0x00, 0x03,
        ];
        let pool = parse_pool(&bytes).unwrap();
        assert!(matches!(
            pool.validate(),
            Err(ClassFileError::UnexpectedPoolEntry {
                index: 2,
                expected: PoolTag::MethodRef,
                actual: PoolTag::FieldRef,
            })
        ));
    }

    #[test]
    fn it_should_reject_a_method_handle_kind_outside_one_to_nine() {
        let bytes = [
            0x00, 0x02, //
            15, 10, 0x00, 0x01,
        ];
        assert!(matches!(
            parse_pool(&bytes),
            Err(ClassFileError::InvalidMethodHandleKind(10))
        ));
    }
}
