use thiserror::Error;

use crate::{constant_pool::PoolTag, mutf8};

/// Coarse classification of a parse failure, one value per reportable
/// error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TruncatedFile,
    ClassFileFormat,
    ClassFileVersion,
    Utf8Encoding,
}

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error("Unexpected end of file: need {needed} bytes at offset {offset}, file is {length} bytes")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        length: usize,
    },
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Unsupported class file version {major}.{minor}, supported up to {supported}")]
    UnsupportedVersion {
        major: u16,
        minor: u16,
        supported: u16,
    },
    #[error("Invalid cp info tag {tag} at constant pool index {index}")]
    InvalidCpInfoTag { tag: u8, index: u16 },
    #[error("Invalid constant pool index {index}, pool count is {count}")]
    InvalidPoolIndex { index: u16, count: u16 },
    #[error("Expected {expected:?} at constant pool index {index}, found {actual:?}")]
    UnexpectedPoolEntry {
        index: u16,
        expected: PoolTag,
        actual: PoolTag,
    },
    #[error("Invalid method handle reference kind {0}")]
    InvalidMethodHandleKind(u8),
    #[error("Attribute length {length} exceeds the {remaining} remaining bytes")]
    AttributeOutOfBounds { length: u32, remaining: usize },
    #[error("Invalid length {length} for attribute named at index {name_index}")]
    InvalidAttributeLength { name_index: u16, length: u32 },
    #[error("Invalid modified UTF-8 in constant pool entry {index}: {source}")]
    InvalidUtf8 {
        index: u16,
        source: mutf8::DecodeError,
    },
}

impl ClassFileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassFileError::UnexpectedEof { .. } => ErrorKind::TruncatedFile,
            ClassFileError::UnsupportedVersion { .. } => ErrorKind::ClassFileVersion,
            ClassFileError::InvalidUtf8 { .. } => ErrorKind::Utf8Encoding,
            ClassFileError::InvalidMagicIdentifier(_)
            | ClassFileError::InvalidCpInfoTag { .. }
            | ClassFileError::InvalidPoolIndex { .. }
            | ClassFileError::UnexpectedPoolEntry { .. }
            | ClassFileError::InvalidMethodHandleKind(_)
            | ClassFileError::AttributeOutOfBounds { .. }
            | ClassFileError::InvalidAttributeLength { .. } => ErrorKind::ClassFileFormat,
        }
    }
}
