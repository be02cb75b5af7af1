use crate::{
    attributes::{self, Attribute, AttributeInfo, AttributeOwner, Attributes},
    class_file::{FieldInfo, MethodInfo},
    constant_pool::PoolTag,
    cursor::ByteCursor,
    AccessFlags, ClassFile, ClassFileError, ConstantPool, JdkVersion, Result, JAVA_MAGIC,
    MAX_MAJOR_VERSION,
};

/// Drives the whole decode/validate pipeline over one input image:
/// header, constant pool passes, then interfaces, fields, methods and
/// class attributes, in file order. Any violation aborts the parse.
pub struct Parser<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(data),
        }
    }

    pub fn parse(mut self, version: JdkVersion) -> Result<ClassFile<'a>> {
        self.parse_magic_identifier()?;
        let (major, minor) = self.parse_version(version)?;

        let constant_pool = ConstantPool::parse(&mut self.cursor)?;
        constant_pool.validate()?;

        let access_flags = AccessFlags::from_bits_truncate(self.cursor.read_u16()?);
        let this_class = self.cursor.read_u16()?;
        constant_pool.check_index(this_class)?;
        let super_class = self.cursor.read_u16()?;
        constant_pool.check_index(super_class)?;

        let interfaces = self.parse_interfaces(&constant_pool)?;

        let fields_count = self.cursor.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.cursor.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.cursor.read_u16()?;
        let attributes =
            self.parse_attributes(attributes_count, &constant_pool, AttributeOwner::Class)?;

        Ok(ClassFile {
            minor_version: minor,
            major_version: major,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.cursor.read_u32()? {
            JAVA_MAGIC => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    // the ceiling is enforced before anything past the version words is
    // consumed
    fn parse_version(&mut self, version: JdkVersion) -> Result<(u16, u16)> {
        let minor = self.cursor.read_u16()?;
        let major = self.cursor.read_u16()?;
        let supported = MAX_MAJOR_VERSION.min(version.major());
        if major > supported {
            return Err(ClassFileError::UnsupportedVersion {
                major,
                minor,
                supported,
            });
        }
        Ok((major, minor))
    }

    fn parse_interfaces(&mut self, constant_pool: &ConstantPool<'a>) -> Result<Vec<u16>> {
        let interfaces_count = self.cursor.read_u16()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            let index = self.cursor.read_u16()?;
            constant_pool.expect_tag(index, PoolTag::Class)?;
            interfaces.push(index);
        }
        Ok(interfaces)
    }

    fn parse_field_info(&mut self, constant_pool: &ConstantPool<'a>) -> Result<FieldInfo<'a>> {
        let access_flags = AccessFlags::from_bits_truncate(self.cursor.read_u16()?);
        let name_index = self.cursor.read_u16()?;
        constant_pool.expect_tag(name_index, PoolTag::Utf8)?;
        let descriptor_index = self.cursor.read_u16()?;
        constant_pool.expect_tag(descriptor_index, PoolTag::Utf8)?;
        let attributes_count = self.cursor.read_u16()?;
        let attributes =
            self.parse_attributes(attributes_count, constant_pool, AttributeOwner::Field)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self, constant_pool: &ConstantPool<'a>) -> Result<MethodInfo<'a>> {
        let access_flags = AccessFlags::from_bits_truncate(self.cursor.read_u16()?);
        let name_index = self.cursor.read_u16()?;
        constant_pool.expect_tag(name_index, PoolTag::Utf8)?;
        let descriptor_index = self.cursor.read_u16()?;
        constant_pool.expect_tag(descriptor_index, PoolTag::Utf8)?;
        let attributes_count = self.cursor.read_u16()?;
        let attributes =
            self.parse_attributes(attributes_count, constant_pool, AttributeOwner::Method)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_attributes(
        &mut self,
        attributes_count: u16,
        constant_pool: &ConstantPool<'a>,
        owner: AttributeOwner,
    ) -> Result<Attributes<'a>> {
        (0..attributes_count)
            .map(|_| self.parse_attribute(constant_pool, owner))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    fn parse_attribute(
        &mut self,
        constant_pool: &ConstantPool<'a>,
        owner: AttributeOwner,
    ) -> Result<Attribute<'a>> {
        let name_index = self.cursor.read_u16()?;
        // checks the index and the Utf8 tag along the way
        let name_hash = constant_pool.utf8_hash(name_index)?;

        let length = self.cursor.read_u32()?;
        if length as usize > self.cursor.remaining() {
            return Err(ClassFileError::AttributeOutOfBounds {
                length,
                remaining: self.cursor.remaining(),
            });
        }

        let info = match (name_hash, owner) {
            (attributes::SYNTHETIC, _) => {
                check_attribute_length(name_index, length, 0)?;
                AttributeInfo::Synthetic
            }
            (attributes::DEPRECATED, _) => {
                check_attribute_length(name_index, length, 0)?;
                AttributeInfo::Deprecated
            }
            (attributes::CONSTANT_VALUE, AttributeOwner::Field) => {
                check_attribute_length(name_index, length, 2)?;
                let constant_index = self.cursor.read_u16()?;
                constant_pool.check_index(constant_index)?;
                AttributeInfo::ConstantValue { constant_index }
            }
            (attributes::SIGNATURE, _) => {
                check_attribute_length(name_index, length, 2)?;
                let signature_index = self.cursor.read_u16()?;
                constant_pool.check_index(signature_index)?;
                AttributeInfo::Signature { signature_index }
            }
            (attributes::SOURCE_FILE, AttributeOwner::Class) => {
                check_attribute_length(name_index, length, 2)?;
                let sourcefile_index = self.cursor.read_u16()?;
                constant_pool.expect_tag(sourcefile_index, PoolTag::Utf8)?;
                AttributeInfo::SourceFile { sourcefile_index }
            }
            // unrecognized names, and recognized names on the wrong owner
            // kind, are skipped as opaque spans of the declared length
            _ => AttributeInfo::Unknown(self.cursor.read_bytes(length as usize)?),
        };

        Ok(Attribute {
            name_index,
            length,
            info,
        })
    }
}

fn check_attribute_length(name_index: u16, length: u32, expected: u32) -> Result<()> {
    if length != expected {
        return Err(ClassFileError::InvalidAttributeLength { name_index, length });
    }
    Ok(())
}
