use crate::{
    attributes::{AttributeInfo, Attributes},
    parser::Parser,
    AccessFlags, ConstantPool, JdkVersion, Result,
};

/// A fully parsed and validated class file. Borrows the input image; the
/// constant pool, its side tables and every member record live and die
/// with this value.
#[derive(Debug)]
pub struct ClassFile<'a> {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool<'a>,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo<'a>>,
    pub methods: Vec<MethodInfo<'a>>,
    pub attributes: Attributes<'a>,
}

impl<'a> ClassFile<'a> {
    /// Parses `data`, rejecting files above the `version` ceiling.
    pub fn parse(data: &'a [u8], version: JdkVersion) -> Result<ClassFile<'a>> {
        Parser::new(data).parse(version)
    }

    pub fn class_name(&self) -> Result<&str> {
        self.constant_pool.class_name(self.this_class)
    }

    pub fn super_class_name(&self) -> Result<&str> {
        self.constant_pool.class_name(self.super_class)
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.utf8(method.descriptor_index)
    }

    /// The file name recorded by a `SourceFile` attribute, if present.
    pub fn source_file(&self) -> Result<Option<&str>> {
        for a in &self.attributes.0 {
            if let AttributeInfo::SourceFile { sourcefile_index } = a.info {
                return self.constant_pool.utf8(sourcefile_index).map(Some);
            }
        }
        Ok(None)
    }
}

#[derive(Debug)]
pub struct FieldInfo<'a> {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes<'a>,
}

impl FieldInfo<'_> {
    /// Pool index carried by the field's `ConstantValue` attribute, if any.
    pub fn constant_value_index(&self) -> Option<u16> {
        self.attributes.0.iter().find_map(|a| match a.info {
            AttributeInfo::ConstantValue { constant_index } => Some(constant_index),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct MethodInfo<'a> {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes<'a>,
}
