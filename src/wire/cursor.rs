use crate::wire::WireError;

/// A bounds-checked reader over a received datagram. Every read either succeeds or returns
/// [`WireError::Truncated`]; the position only advances on success.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < len {
            return Err(WireError::Truncated {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let mut r = Reader::new(&[0x12, 0x34, 0xde, 0xad, 0xbe, 0xef, 0x07]);
        assert_eq!(r.read_u16(), Ok(0x1234));
        assert_eq!(r.read_u32(), Ok(0xdead_beef));
        assert_eq!(r.read_u8(), Ok(7));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn short_read_does_not_advance() {
        let mut r = Reader::at(&[0, 1, 2], 2);
        assert_eq!(
            r.read_u16(),
            Err(WireError::Truncated {
                offset: 2,
                needed: 2,
                available: 1
            })
        );
        assert_eq!(r.position(), 2);
        assert_eq!(r.read_u8(), Ok(2));
    }
}
