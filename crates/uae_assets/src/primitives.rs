//! Encoding of the primitive values used throughout asset files
//!
//! Fixed width integers go straight through [`Stream::read_value`] and [`Stream::write_value`].
//! This module adds the three value kinds with extra rules attached: booleans, null-terminated
//! strings and length-prefixed char arrays.

use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};

use crate::error::{Result, Warning};
use crate::stream::Stream;

/// Longest null-terminated string that will be read, in bytes
pub const MAX_STRING_LENGTH: usize = 32767;

/// Char arrays start on a multiple of this when written
pub const CHAR_ARRAY_ALIGNMENT: u64 = 16;

/// A one byte boolean.
///
/// The raw byte is kept so that files holding values other than 0 or 1 are written back unchanged.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Boolean(pub u8);

impl Boolean {
    pub fn get(self) -> bool {
        self.0 != 0
    }

    /// Whether the stored byte is 0 or 1
    pub fn is_canonical(self) -> bool {
        self.0 <= 1
    }
}

impl From<bool> for Boolean {
    fn from(value: bool) -> Self {
        Boolean(value as u8)
    }
}

/// Encoded size of a null-terminated string
pub fn string_len(value: &str) -> u32 {
    value.len() as u32 + 1
}

/// Encoded size of a char array, excluding any alignment before it
pub fn char_array_len(value: &str) -> u32 {
    4 + value.len() as u32
}

impl<T: Read + Seek> Stream<T> {
    /// Read a boolean, warning when the byte is neither 0 nor 1
    pub fn read_bool(&mut self) -> Result<Boolean> {
        let position = self.position()?;
        let value = Boolean(self.read_value()?);
        if !value.is_canonical() {
            self.warn(Warning::NonCanonicalBoolean {
                value: value.0,
                position,
            })?;
        }
        Ok(value)
    }

    /// Read a null-terminated utf-8 string
    ///
    /// Reading stops at the terminator or after [`MAX_STRING_LENGTH`] bytes, whichever comes
    /// first. Invalid utf-8 is an error.
    pub fn read_string(&mut self) -> Result<String> {
        let mut raw = Vec::new();
        while raw.len() < MAX_STRING_LENGTH {
            let byte = self.inner.read_u8()?;
            if byte == b'\0' {
                break;
            }
            raw.push(byte);
        }
        Ok(String::from_utf8(raw)?)
    }

    /// Read a u32 length followed by that many utf-8 bytes
    ///
    /// Invalid utf-8 is replaced by an empty string and raises [`Warning::BadCharArray`].
    pub fn read_char_array(&mut self) -> Result<String> {
        let position = self.position()?;
        let length: u32 = self.read_value()?;
        let raw = self.read_bytes(length as usize)?;
        match String::from_utf8(raw) {
            Ok(value) => Ok(value),
            Err(_) => {
                self.warn(Warning::BadCharArray { position })?;
                Ok(String::new())
            }
        }
    }
}

impl<T: Write + Seek> Stream<T> {
    pub fn write_bool(&mut self, value: Boolean) -> Result<()> {
        self.write_value(&value.0)
    }

    /// Write a string followed by a single null byte
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())?;
        self.inner.write_u8(0)?;
        Ok(())
    }

    /// Pad to [`CHAR_ARRAY_ALIGNMENT`] then write a u32 length and the raw bytes
    pub fn write_char_array(&mut self, value: &str) -> Result<()> {
        self.pad_align(CHAR_ARRAY_ALIGNMENT)?;
        self.write_value(&(value.len() as u32))?;
        self.write_bytes(value.as_bytes())
    }
}
