use std::io::Read;

/// Little-endian field readers for decoding the shared layout from a byte stream.
pub trait ReadLeExt: Read {
    fn read_u32_le(&mut self) -> std::io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64_le(&mut self) -> std::io::Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_f32_le(&mut self) -> std::io::Result<f32> {
        Ok(f32::from_bits(self.read_u32_le()?))
    }

    fn skip_bytes(&mut self, len: usize) -> std::io::Result<()> {
        let mut buf = [0u8; 32];
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(buf.len());
            self.read_exact(&mut buf[..n])?;
            remaining -= n;
        }
        Ok(())
    }
}

impl<T: Read + ?Sized> ReadLeExt for T {}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_little_endian_fields_in_sequence() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x1122_3344u32.to_le_bytes());
        bytes.extend_from_slice(&[0xAA; 5]);
        bytes.extend_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());

        let mut r = Cursor::new(bytes);
        assert_eq!(r.read_u32_le().unwrap(), 0x1122_3344);
        r.skip_bytes(5).unwrap();
        assert_eq!(r.read_u64_le().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(r.read_f32_le().unwrap(), 1.5);
        assert!(r.read_u32_le().is_err());
    }
}
