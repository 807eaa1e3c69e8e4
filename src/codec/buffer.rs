//! Bounds-checked little-endian reads over a byte slice

use crate::error::CodecError;

/// Cursor over borrowed account, event or instruction bytes
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, index: 0 }
    }

    /// Bytes consumed so far
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.index..self.index + len];
        self.index += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    /// Fail unless `count` items of at least `min_item` bytes each can
    /// still fit in the buffer
    pub fn ensure(&self, count: usize, min_item: usize) -> Result<(), CodecError> {
        let needed = count.saturating_mul(min_item);
        if needed > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// u32 length prefix, rejected early when the rest of the buffer cannot
    /// hold `len` items of at least `min_item` bytes each
    pub fn read_len(&mut self, min_item: usize) -> Result<usize, CodecError> {
        let len = self.read_u32()? as usize;
        self.ensure(len, min_item)?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance() {
        let mut reader = ByteReader::new(&[1, 0x2a, 0, 0, 0, 9]);
        assert_eq!(reader.read_bool(), Ok(true));
        assert_eq!(reader.read_u32(), Ok(42));
        assert_eq!(reader.index(), 5);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.read_u8(), Ok(9));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_eof() {
        let mut reader = ByteReader::new(&[1, 2]);
        assert_eq!(
            reader.read_u32(),
            Err(CodecError::UnexpectedEof {
                needed: 4,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_invalid_bool() {
        let mut reader = ByteReader::new(&[2]);
        assert_eq!(reader.read_bool(), Err(CodecError::InvalidBool(2)));
    }

    #[test]
    fn test_length_prefix_bounded_by_remaining() {
        let mut reader = ByteReader::new(&[0xff, 0xff, 0xff, 0xff, 0]);
        assert!(matches!(
            reader.read_len(1),
            Err(CodecError::UnexpectedEof { .. })
        ));

        let mut reader = ByteReader::new(&[2, 0, 0, 0, 7, 8]);
        assert_eq!(reader.read_len(1), Ok(2));
    }
}
