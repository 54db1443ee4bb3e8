//! Forward-only MessagePack writer.

use bitflags::bitflags;
use typepack_buffers::Writer;

use super::constants as marker;
use crate::error::PackError;

bitflags! {
    /// Compatibility flags for peers that predate parts of the format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PackerCompat: u8 {
        /// Byte payloads are written with raw (string-family) headers
        /// because the peer has no bin family.
        const BINARY_AS_RAW = 0b01;
        /// The str8 header is unavailable on the peer.
        const RAW_COMPATIBLE = 0b10;
        /// The pre-bin dialect: both restrictions at once.
        const CLASSIC = 0b11;
    }
}

/// A forward-only writer over the MessagePack byte grammar.
///
/// The packer assembles one or more values into an in-memory frame;
/// callers drain the frame with [`bytes`](Packer::bytes) or
/// [`into_bytes`](Packer::into_bytes). Integer packing always chooses
/// the narrowest wire form that represents the value.
pub struct Packer {
    writer: Writer,
    compat: PackerCompat,
}

impl Default for Packer {
    fn default() -> Self {
        Self::new()
    }
}

impl Packer {
    pub fn new() -> Self {
        Self::with_compat(PackerCompat::empty())
    }

    pub fn with_compat(compat: PackerCompat) -> Self {
        Self {
            writer: Writer::new(),
            compat,
        }
    }

    pub fn compat(&self) -> PackerCompat {
        self.compat
    }

    /// Borrows the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        self.writer.as_slice()
    }

    /// Drains the written frame, leaving the packer reusable.
    pub fn bytes(&mut self) -> Vec<u8> {
        self.writer.flush()
    }

    /// Consumes the packer and returns the written frame.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.writer.flush()
    }

    pub fn pack_nil(&mut self) {
        self.writer.u8(marker::NIL);
    }

    pub fn pack_bool(&mut self, value: bool) {
        self.writer
            .u8(if value { marker::TRUE } else { marker::FALSE });
    }

    /// Packs a signed integer into the narrowest form that fits.
    pub fn pack_int(&mut self, value: i64) {
        if value >= 0 {
            self.pack_uint(value as u64);
        } else if value >= -0x20 {
            self.writer.u8(value as u8);
        } else if value >= i8::MIN as i64 {
            self.writer.u8(marker::INT8);
            self.writer.i8(value as i8);
        } else if value >= i16::MIN as i64 {
            self.writer.u8(marker::INT16);
            self.writer.i16(value as i16);
        } else if value >= i32::MIN as i64 {
            self.writer.u8(marker::INT32);
            self.writer.i32(value as i32);
        } else {
            self.writer.u8(marker::INT64);
            self.writer.i64(value);
        }
    }

    /// Packs an unsigned integer into the narrowest form that fits.
    pub fn pack_uint(&mut self, value: u64) {
        if value <= 0x7f {
            self.writer.u8(value as u8);
        } else if value <= u8::MAX as u64 {
            self.writer.u8(marker::UINT8);
            self.writer.u8(value as u8);
        } else if value <= u16::MAX as u64 {
            self.writer.u8u16(marker::UINT16, value as u16);
        } else if value <= u32::MAX as u64 {
            self.writer.u8u32(marker::UINT32, value as u32);
        } else {
            self.writer.u8u64(marker::UINT64, value);
        }
    }

    pub fn pack_f32(&mut self, value: f32) {
        self.writer.u8(marker::FLOAT32);
        self.writer.f32(value);
    }

    pub fn pack_f64(&mut self, value: f64) {
        self.writer.u8(marker::FLOAT64);
        self.writer.f64(value);
    }

    /// Packs UTF-8 text with a string-family header.
    pub fn pack_str(&mut self, value: &str) -> Result<(), PackError> {
        self.pack_str_bytes(value.as_bytes())
    }

    /// Packs raw bytes with a string-family header.
    ///
    /// The str8 form is skipped under [`PackerCompat::RAW_COMPATIBLE`].
    pub fn pack_str_bytes(&mut self, bytes: &[u8]) -> Result<(), PackError> {
        let len = bytes.len();
        if len <= marker::MAX_FIXSTR_LEN {
            self.writer.u8(marker::MIN_FIXSTR | len as u8);
        } else if len <= u8::MAX as usize && !self.compat.contains(PackerCompat::RAW_COMPATIBLE) {
            self.writer.u8(marker::STR8);
            self.writer.u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.writer.u8u16(marker::STR16, len as u16);
        } else if len <= u32::MAX as usize {
            self.writer.u8u32(marker::STR32, len as u32);
        } else {
            return Err(PackError::TooLargeCollection(len));
        }
        self.writer.buf(bytes);
        Ok(())
    }

    /// Packs a byte payload.
    ///
    /// Uses bin8/16/32 headers, or falls back to the raw (string) family
    /// under [`PackerCompat::BINARY_AS_RAW`].
    pub fn pack_bin(&mut self, bytes: &[u8]) -> Result<(), PackError> {
        if self.compat.contains(PackerCompat::BINARY_AS_RAW) {
            return self.pack_str_bytes(bytes);
        }
        let len = bytes.len();
        if len <= u8::MAX as usize {
            self.writer.u8(marker::BIN8);
            self.writer.u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.writer.u8u16(marker::BIN16, len as u16);
        } else if len <= u32::MAX as usize {
            self.writer.u8u32(marker::BIN32, len as u32);
        } else {
            return Err(PackError::TooLargeCollection(len));
        }
        self.writer.buf(bytes);
        Ok(())
    }

    /// Writes an array length prefix. The caller must emit exactly
    /// `len` values afterwards.
    pub fn pack_array_header(&mut self, len: usize) -> Result<(), PackError> {
        if len <= marker::MAX_FIX_CONTAINER_LEN {
            self.writer.u8(marker::MIN_FIXARRAY | len as u8);
        } else if len <= u16::MAX as usize {
            self.writer.u8u16(marker::ARRAY16, len as u16);
        } else if len <= u32::MAX as usize {
            self.writer.u8u32(marker::ARRAY32, len as u32);
        } else {
            return Err(PackError::TooLargeCollection(len));
        }
        Ok(())
    }

    /// Writes a map length prefix. The caller must emit exactly
    /// `2 * len` values afterwards.
    pub fn pack_map_header(&mut self, len: usize) -> Result<(), PackError> {
        if len <= marker::MAX_FIX_CONTAINER_LEN {
            self.writer.u8(marker::MIN_FIXMAP | len as u8);
        } else if len <= u16::MAX as usize {
            self.writer.u8u16(marker::MAP16, len as u16);
        } else if len <= u32::MAX as usize {
            self.writer.u8u32(marker::MAP32, len as u32);
        } else {
            return Err(PackError::TooLargeCollection(len));
        }
        Ok(())
    }

    /// Packs an extension value.
    pub fn pack_ext(&mut self, type_byte: i8, data: &[u8]) -> Result<(), PackError> {
        match data.len() {
            1 => self.writer.u8(marker::FIXEXT1),
            2 => self.writer.u8(marker::FIXEXT2),
            4 => self.writer.u8(marker::FIXEXT4),
            8 => self.writer.u8(marker::FIXEXT8),
            16 => self.writer.u8(marker::FIXEXT16),
            len if len <= u8::MAX as usize => {
                self.writer.u8(marker::EXT8);
                self.writer.u8(len as u8);
            }
            len if len <= u16::MAX as usize => {
                self.writer.u8u16(marker::EXT16, len as u16);
            }
            len if len <= u32::MAX as usize => {
                self.writer.u8u32(marker::EXT32, len as u32);
            }
            len => return Err(PackError::TooLargeCollection(len)),
        }
        self.writer.i8(type_byte);
        self.writer.buf(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowest_integer_forms() {
        let cases: &[(i64, Vec<u8>)] = &[
            (0, vec![0x00]),
            (127, vec![0x7f]),
            (128, vec![0xcc, 0x80]),
            (255, vec![0xcc, 0xff]),
            (256, vec![0xcd, 0x01, 0x00]),
            (65535, vec![0xcd, 0xff, 0xff]),
            (65536, vec![0xce, 0x00, 0x01, 0x00, 0x00]),
            (-1, vec![0xff]),
            (-32, vec![0xe0]),
            (-33, vec![0xd0, 0xdf]),
            (-128, vec![0xd0, 0x80]),
            (-129, vec![0xd1, 0xff, 0x7f]),
            (-32768, vec![0xd1, 0x80, 0x00]),
            (-32769, vec![0xd2, 0xff, 0xff, 0x7f, 0xff]),
        ];
        for (value, expected) in cases {
            let mut packer = Packer::new();
            packer.pack_int(*value);
            assert_eq!(&packer.bytes(), expected, "for {value}");
        }
    }

    #[test]
    fn uint64_beyond_i64() {
        let mut packer = Packer::new();
        packer.pack_uint(u64::MAX);
        let out = packer.bytes();
        assert_eq!(out[0], 0xcf);
        assert_eq!(out.len(), 9);
    }

    #[test]
    fn str_headers_by_length() {
        let mut packer = Packer::new();
        packer.pack_str("foo").unwrap();
        assert_eq!(packer.bytes(), vec![0xa3, b'f', b'o', b'o']);

        packer.pack_str(&"a".repeat(32)).unwrap();
        let out = packer.bytes();
        assert_eq!(&out[..2], &[0xd9, 32]);

        packer.pack_str(&"a".repeat(256)).unwrap();
        let out = packer.bytes();
        assert_eq!(&out[..3], &[0xda, 0x01, 0x00]);
    }

    #[test]
    fn raw_compatible_suppresses_str8() {
        let mut packer = Packer::with_compat(PackerCompat::RAW_COMPATIBLE);
        packer.pack_str(&"a".repeat(32)).unwrap();
        let out = packer.bytes();
        assert_eq!(&out[..3], &[0xda, 0x00, 0x20]);
    }

    #[test]
    fn classic_bin_uses_raw_headers() {
        let mut packer = Packer::with_compat(PackerCompat::CLASSIC);
        packer.pack_bin(&[0x41]).unwrap();
        assert_eq!(packer.bytes(), vec![0xa1, 0x41]);

        let mut packer = Packer::new();
        packer.pack_bin(&[0x41]).unwrap();
        assert_eq!(packer.bytes(), vec![0xc4, 0x01, 0x41]);
    }

    #[test]
    fn container_headers() {
        let mut packer = Packer::new();
        packer.pack_array_header(1).unwrap();
        packer.pack_map_header(1).unwrap();
        packer.pack_array_header(16).unwrap();
        packer.pack_map_header(0x1_0000).unwrap();
        let out = packer.bytes();
        assert_eq!(out[0], 0x91);
        assert_eq!(out[1], 0x81);
        assert_eq!(&out[2..5], &[0xdc, 0x00, 0x10]);
        assert_eq!(&out[5..10], &[0xdf, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn ext_headers() {
        let mut packer = Packer::new();
        packer.pack_ext(5, &[1, 2, 3, 4]).unwrap();
        assert_eq!(packer.bytes(), vec![0xd6, 0x05, 1, 2, 3, 4]);

        packer.pack_ext(-1, &[0; 3]).unwrap();
        assert_eq!(packer.bytes(), vec![0xc7, 3, 0xff, 0, 0, 0]);
    }
}
