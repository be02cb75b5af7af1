// https://docs.oracle.com/javase/specs/jvms/se7/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
mod constant_pool;
mod cursor;
mod error;
pub mod hash;
pub mod mutf8;
mod parser;

pub use access_flags::AccessFlags;
pub use class_file::{ClassFile, FieldInfo, MethodInfo};
pub use constant_pool::{ConstantPool, ConstantTable, PoolTag, RawConstant, StringTable};
pub use cursor::ByteCursor;
pub use error::{ClassFileError, ErrorKind};
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

pub const JAVA_MAGIC: u32 = 0xCAFEBABE;

/// Highest class file major version this parser understands (JDK 1.7).
pub const MAX_MAJOR_VERSION: u16 = 51;

/// JDK releases usable as a parse ceiling. 1.0 and 1.1 share major
/// version 45 (1.1 is really 45.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JdkVersion {
    Jdk1_0,
    Jdk1_1,
    Jdk1_2,
    Jdk1_3,
    Jdk1_4,
    Jdk1_5,
    Jdk1_6,
    Jdk1_7,
}

impl JdkVersion {
    pub fn major(self) -> u16 {
        match self {
            JdkVersion::Jdk1_0 | JdkVersion::Jdk1_1 => 45,
            JdkVersion::Jdk1_2 => 46,
            JdkVersion::Jdk1_3 => 47,
            JdkVersion::Jdk1_4 => 48,
            JdkVersion::Jdk1_5 => 49,
            JdkVersion::Jdk1_6 => 50,
            JdkVersion::Jdk1_7 => 51,
        }
    }
}
