//! Object table entries and the payloads they point at
//!

use binrw::Endian;
use std::fmt::{self, Debug};
use std::io::{Cursor, Read, Seek, Write};
use tracing::trace;

use crate::error::Result;
use crate::primitives::char_array_len;
use crate::stream::{Payload, Stream};

/// Object table entries start on a multiple of this
pub const TABLE_ALIGNMENT: u64 = 4;

/// An object stored in the asset file.
///
/// The payload is copied out of the source when the entry is read, so the object never goes
/// back to the original file. Until the name or content is replaced the payload is written back
/// byte for byte.
pub struct AssetObject {
    /// Identifier of the object, assumed to be unique within a file
    pub path_id: i64,

    /// Index into the file's type table
    pub type_id: i32,

    payload: Payload,
    start_byte: u32,
    byte_length: u32,
    file_name: String,
    declared_content_length: u32,
    file_content: Vec<u8>,
    alignment: u32,
    modified: bool,
}

impl Debug for AssetObject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AssetObject")
            .field("path_id", &self.path_id)
            .field("type_id", &self.type_id)
            .field("start_byte", &self.start_byte)
            .field("byte_length", &self.byte_length)
            .field("file_name", &self.file_name)
            .field("content_length", &self.file_content.len())
            .field("modified", &self.modified)
            .finish()
    }
}

impl AssetObject {
    /// Create an object that did not come from a file.
    ///
    /// It counts as modified, so its payload is encoded from the name and content on write.
    pub fn new(
        path_id: i64,
        type_id: i32,
        file_name: impl Into<String>,
        file_content: impl Into<Vec<u8>>,
    ) -> AssetObject {
        AssetObject {
            path_id,
            type_id,
            payload: Stream::new(Cursor::new(Vec::new())),
            start_byte: 0,
            byte_length: 0,
            file_name: file_name.into(),
            declared_content_length: 0,
            file_content: file_content.into(),
            alignment: 0,
            modified: true,
        }
    }

    /// Read a table entry and slice its payload from `data_offset + start_byte`
    pub fn read<R: Read + Seek>(stream: &mut Stream<R>, data_offset: u32) -> Result<AssetObject> {
        stream.skip_align(TABLE_ALIGNMENT)?;
        let path_id = stream.read_value()?;
        let start_byte: u32 = stream.read_value()?;
        let byte_length: u32 = stream.read_value()?;

        let mut payload = stream.slice(
            data_offset as u64 + start_byte as u64,
            byte_length as usize,
        )?;
        let file_name = payload.read_char_array()?;
        let declared_content_length = payload.read_value()?;
        let mut file_content = payload.read_to_end()?;
        let trailing = file_content.iter().rev().take_while(|b| **b == 0).count();
        file_content.truncate(file_content.len() - trailing);
        stream.absorb(payload.take_warnings());

        let type_id = stream.read_value()?;

        trace!(path_id, type_id, start_byte, byte_length, name = %file_name, "read object");

        Ok(AssetObject {
            path_id,
            type_id,
            payload,
            start_byte,
            byte_length,
            file_name,
            declared_content_length,
            file_content,
            alignment: 0,
            modified: false,
        })
    }

    /// Encoded size of the table entry, not counting the alignment before it
    pub fn encoded_len(&self) -> u32 {
        8 + 4 + 4 + 4
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Replace the embedded name
    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
        self.modified = true;
    }

    /// The embedded content, without trailing null padding
    pub fn file_content(&self) -> &[u8] {
        &self.file_content
    }

    /// Replace the embedded content
    pub fn set_file_content(&mut self, file_content: impl Into<Vec<u8>>) {
        self.file_content = file_content.into();
        self.modified = true;
    }

    /// Whether the name or content has been replaced
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Offset of the payload from the start of the object data.
    ///
    /// Recomputed every time the file is written.
    pub fn start_byte(&self) -> u32 {
        self.start_byte
    }

    /// Length of the payload as it was read
    pub fn byte_length(&self) -> u32 {
        self.byte_length
    }

    /// Content length stored inside the payload as it was read
    pub fn declared_content_length(&self) -> u32 {
        self.declared_content_length
    }

    /// Zero bytes written after the payload. Recomputed every time the file is written.
    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// The payload bytes as they were read
    pub fn raw_payload(&self) -> &[u8] {
        self.payload.get_ref().get_ref()
    }

    /// Length of the payload that will be written
    pub fn current_payload_length(&self) -> u32 {
        if self.modified {
            char_array_len(&self.file_name) + 4 + self.file_content.len() as u32
        } else {
            self.byte_length
        }
    }

    pub(crate) fn place(&mut self, start_byte: u32, alignment: u32) {
        self.start_byte = start_byte;
        self.alignment = alignment;
    }

    /// Write the table entry
    pub fn write<W: Write + Seek>(&self, stream: &mut Stream<W>) -> Result<()> {
        stream.pad_align(TABLE_ALIGNMENT)?;
        stream.write_value(&self.path_id)?;
        stream.write_value(&self.start_byte)?;
        stream.write_value(&self.current_payload_length())?;
        stream.write_value(&self.type_id)
    }

    /// Write the payload followed by its alignment padding
    pub fn write_payload<W: Write + Seek>(&mut self, stream: &mut Stream<W>) -> Result<()> {
        if self.modified {
            let encoded = self.encode_payload(stream.endian())?;
            stream.write_bytes(&encoded)?;
        } else {
            self.payload.rewind()?;
            let raw = self.payload.read_to_end()?;
            stream.write_bytes(&raw)?;
        }
        stream.fill(self.alignment as u64)
    }

    /// Encode name and content into a fresh stream so the char array alignment is relative to the
    /// payload itself.
    fn encode_payload(&self, endian: Endian) -> Result<Vec<u8>> {
        let mut payload = Stream::with_endian(Cursor::new(Vec::new()), endian);
        payload.write_char_array(&self.file_name)?;
        payload.write_value(&(self.file_content.len() as u32))?;
        payload.write_bytes(&self.file_content)?;
        Ok(payload.into_inner().into_inner())
    }
}
