use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Sequential big-endian reader over an in-memory class file image.
///
/// Every read checks the remaining length first and fails with
/// [`ClassFileError::UnexpectedEof`]; a short buffer can never yield a value.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// The whole underlying image, independent of the current offset.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(ClassFileError::UnexpectedEof {
                offset: self.pos,
                needed,
                length: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let value = Endian::read_u16(&self.data[self.pos..]);
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let value = Endian::read_u32(&self.data[self.pos..]);
        self.pos += 4;
        Ok(value)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        let value = Endian::read_u64(&self.data[self.pos..]);
        self.pos += 8;
        Ok(value)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.ensure(len)?;
        self.pos += len;
        Ok(())
    }
}

#[cfg(test)]
mod read_tests {
    use super::*;

    #[test]
    fn it_should_read_big_endian_integers_in_sequence() {
        let mut cursor = ByteCursor::new(&[
            0xca, 0xfe, 0xba, 0xbe, 0x00, 0x33, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
        ]);
        assert_eq!(cursor.read_u32().unwrap(), 0xCAFEBABE);
        assert_eq!(cursor.read_u16().unwrap(), 0x33);
        assert_eq!(cursor.read_u64().unwrap(), 0x0102030405060708);
        assert_eq!(cursor.position(), 14);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn it_should_fail_without_consuming_on_a_short_read() {
        let mut cursor = ByteCursor::new(&[0x00, 0x01, 0x02]);
        assert!(matches!(
            cursor.read_u32(),
            Err(ClassFileError::UnexpectedEof {
                offset: 0,
                needed: 4,
                length: 3,
            })
        ));
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_u16().unwrap(), 0x0001);
    }

    #[test]
    fn it_should_fail_when_skipping_past_the_end() {
        let mut cursor = ByteCursor::new(&[0x00; 4]);
        assert!(cursor.skip(5).is_err());
        assert!(cursor.skip(4).is_ok());
    }
}
