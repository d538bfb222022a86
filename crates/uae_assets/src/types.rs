//! Header and metadata table records of an asset file.

use binrw::{BinRead, BinWrite, Endian};
use std::io::{Read, Seek, Write};

use crate::error::{Result, Warning};
use crate::primitives::{string_len, Boolean};
use crate::stream::Stream;

/// The only format version this library was written against
pub const SUPPORTED_FORMAT_VERSION: u32 = 21;

/// Class id of `MonoBehaviour`, the one type that carries a script id
pub const SCRIPT_CLASS_ID: i32 = 114;

/// Size of the unidentified block at the start of every external reference
pub const EXTERNAL_PREFIX_LENGTH: usize = 21;

/// The start of the header.
///
/// These fields are always stored big endian. `big_endian` selects the encoding of everything
/// that follows it.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(big)]
pub struct FixedHeader {
    /// Size of the metadata that precedes the object data
    pub metadata_size: u32,

    /// Size of the file, minus 4
    pub file_size: u32,

    /// Version of the asset file format
    pub format_version: u32,

    /// Absolute offset of the object data
    pub data_offset: u32,

    /// Non zero when the rest of the file is big endian
    pub big_endian: u8,

    /// Always zero in files seen so far
    pub reserved: [u8; 3],
}

/// Encoded size of [`FixedHeader`]
const FIXED_HEADER_LENGTH: u32 = 20;

/// Asset file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub metadata_size: u32,
    pub file_size: u32,
    pub format_version: u32,
    pub data_offset: u32,
    pub big_endian: Boolean,
    pub reserved: [u8; 3],

    /// Version of the engine that wrote the file, e.g. `2019.4.0f1`
    pub unity_version: String,

    /// Identifier of the build target
    pub target_platform: i32,

    /// Whether type trees follow each type. Type trees are not supported.
    pub enable_type_tree: Boolean,
}

impl Header {
    /// A header for a new file. The size and offset fields are filled in when written.
    pub fn new(unity_version: impl Into<String>, target_platform: i32, big_endian: bool) -> Self {
        Header {
            metadata_size: 0,
            file_size: 0,
            format_version: SUPPORTED_FORMAT_VERSION,
            data_offset: 0,
            big_endian: big_endian.into(),
            reserved: [0; 3],
            unity_version: unity_version.into(),
            target_platform,
            enable_type_tree: false.into(),
        }
    }

    /// Endianness of everything after the fixed header
    pub fn endian(&self) -> Endian {
        if self.big_endian.get() {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// Read the header, switching the stream to the endianness it declares
    pub fn read<R: Read + Seek>(
        stream: &mut Stream<R>,
        expected_version: u32,
    ) -> Result<Header> {
        stream.set_endian(Endian::Big);
        let flag_position = stream.position()? + 16;
        let fixed: FixedHeader = stream.read_value()?;

        if fixed.format_version != expected_version {
            stream.warn(Warning::UnsupportedVersion {
                found: fixed.format_version,
                expected: expected_version,
            })?;
        }

        let big_endian = Boolean(fixed.big_endian);
        if !big_endian.is_canonical() {
            stream.warn(Warning::NonCanonicalBoolean {
                value: big_endian.0,
                position: flag_position,
            })?;
        }

        let mut header = Header {
            metadata_size: fixed.metadata_size,
            file_size: fixed.file_size,
            format_version: fixed.format_version,
            data_offset: fixed.data_offset,
            big_endian,
            reserved: fixed.reserved,
            unity_version: String::new(),
            target_platform: 0,
            enable_type_tree: Boolean::default(),
        };
        stream.set_endian(header.endian());

        header.unity_version = stream.read_string()?;
        header.target_platform = stream.read_value()?;
        header.enable_type_tree = stream.read_bool()?;

        if header.enable_type_tree.get() {
            stream.warn(Warning::TypeTreeEnabled)?;
        }

        Ok(header)
    }

    /// Encoded size of the header
    pub fn encoded_len(&self) -> u32 {
        FIXED_HEADER_LENGTH + string_len(&self.unity_version) + 4 + 1
    }

    /// Write the header, leaving the stream in the endianness it declares
    pub fn write<W: Write + Seek>(&self, stream: &mut Stream<W>) -> Result<()> {
        stream.set_endian(Endian::Big);
        stream.write_value(&self.fixed())?;

        stream.set_endian(self.endian());
        stream.write_string(&self.unity_version)?;
        stream.write_value(&self.target_platform)?;
        stream.write_bool(self.enable_type_tree)
    }

    fn fixed(&self) -> FixedHeader {
        FixedHeader {
            metadata_size: self.metadata_size,
            file_size: self.file_size,
            format_version: self.format_version,
            data_offset: self.data_offset,
            big_endian: self.big_endian.0,
            reserved: self.reserved,
        }
    }
}

/// A serialized type used by objects in the file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetType {
    pub class_id: i32,
    pub is_stripped: Boolean,
    pub script_type_index: i16,

    /// Only stored when `class_id` is [`SCRIPT_CLASS_ID`]
    pub script_id: Option<[u8; 16]>,

    pub type_hash: [u8; 16],
}

impl AssetType {
    /// Whether the encoded record carries a script id.
    ///
    /// Reading, writing and [`AssetType::encoded_len`] all go through this.
    pub fn has_script_id(&self) -> bool {
        self.class_id == SCRIPT_CLASS_ID
    }

    pub fn read<R: Read + Seek>(stream: &mut Stream<R>) -> Result<AssetType> {
        let mut asset_type = AssetType {
            class_id: stream.read_value()?,
            is_stripped: stream.read_bool()?,
            script_type_index: stream.read_value()?,
            ..Default::default()
        };
        if asset_type.has_script_id() {
            asset_type.script_id = Some(stream.read_value()?);
        }
        asset_type.type_hash = stream.read_value()?;
        Ok(asset_type)
    }

    pub fn encoded_len(&self) -> u32 {
        let script_id = if self.has_script_id() { 16 } else { 0 };
        4 + 1 + 2 + script_id + 16
    }

    pub fn write<W: Write + Seek>(&self, stream: &mut Stream<W>) -> Result<()> {
        stream.write_value(&self.class_id)?;
        stream.write_bool(self.is_stripped)?;
        stream.write_value(&self.script_type_index)?;
        if self.has_script_id() {
            stream.write_value(&self.script_id.unwrap_or_default())?;
        }
        stream.write_value(&self.type_hash)
    }
}

/// Location of a script, by file and id within that file
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ScriptMeta {
    pub file_index: i32,
    pub id_in_file: i64,
}

impl ScriptMeta {
    pub fn read<R: Read + Seek>(stream: &mut Stream<R>) -> Result<ScriptMeta> {
        let file_index = stream.read_value()?;
        stream.skip_align(4)?;
        let id_in_file = stream.read_value()?;
        Ok(ScriptMeta {
            file_index,
            id_in_file,
        })
    }

    /// Encoded size, not counting the padding between the two fields
    pub fn encoded_len(&self) -> u32 {
        4 + 8
    }

    pub fn write<W: Write + Seek>(&self, stream: &mut Stream<W>) -> Result<()> {
        stream.write_value(&self.file_index)?;
        stream.pad_align(4)?;
        stream.write_value(&self.id_in_file)
    }
}

/// A reference to another asset file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalMeta {
    /// Leading bytes kept exactly as read. Mostly zero.
    pub prefix: [u8; EXTERNAL_PREFIX_LENGTH],

    /// Path of the referenced file
    pub path: String,
}

impl ExternalMeta {
    pub fn read<R: Read + Seek>(stream: &mut Stream<R>) -> Result<ExternalMeta> {
        Ok(ExternalMeta {
            prefix: stream.read_value()?,
            path: stream.read_string()?,
        })
    }

    pub fn encoded_len(&self) -> u32 {
        EXTERNAL_PREFIX_LENGTH as u32 + string_len(&self.path)
    }

    pub fn write<W: Write + Seek>(&self, stream: &mut Stream<W>) -> Result<()> {
        stream.write_bytes(&self.prefix)?;
        stream.write_string(&self.path)
    }
}

#[cfg(test)]
mod test {
    use binrw::Endian;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tracing_test::traced_test;

    use crate::error::{Result, Warning};
    use crate::primitives::Boolean;
    use crate::stream::Stream;
    use crate::types::{
        AssetType, ExternalMeta, Header, ScriptMeta, SCRIPT_CLASS_ID, SUPPORTED_FORMAT_VERSION,
    };

    fn written(endian: Endian, write: impl FnOnce(&mut Stream<Cursor<Vec<u8>>>) -> Result<()>) -> Result<Vec<u8>> {
        let mut stream = Stream::with_endian(Cursor::new(Vec::new()), endian);
        write(&mut stream)?;
        Ok(stream.into_inner().into_inner())
    }

    #[test]
    fn read_little_endian_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Stream::new(Cursor::new(vec![
            0x00, 0x00, 0x00, 0x25,
            0x00, 0x00, 0x00, 0x3C,
            0x00, 0x00, 0x00, 0x15,
            0x00, 0x00, 0x00, 0x40,
            0x00, 0x00, 0x00, 0x00,
            0x35, 0x2E, 0x36, 0x00,
            0x13, 0x00, 0x00, 0x00,
            0x00,
        ]));

        let header = Header::read(&mut input, SUPPORTED_FORMAT_VERSION)?;
        assert_eq!(
            header,
            Header {
                metadata_size: 0x25,
                file_size: 0x3C,
                data_offset: 0x40,
                ..Header::new("5.6", 19, false)
            }
        );
        assert_eq!(input.endian(), Endian::Little);
        assert!(input.warnings().is_empty());
        assert_eq!(header.encoded_len(), 29);

        Ok(())
    }

    #[test]
    fn write_big_endian_header() -> Result<()> {
        let header = Header {
            metadata_size: 1,
            file_size: 2,
            data_offset: 3,
            ..Header::new("5.6", 19, true)
        };

        #[rustfmt::skip]
        let expected = vec![
            0x00, 0x00, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x02,
            0x00, 0x00, 0x00, 0x15,
            0x00, 0x00, 0x00, 0x03,
            0x01, 0x00, 0x00, 0x00,
            0x35, 0x2E, 0x36, 0x00,
            0x00, 0x00, 0x00, 0x13,
            0x00,
        ];

        let actual = written(Endian::Little, |s| header.write(s))?;
        assert_eq!(actual.len() as u32, header.encoded_len());
        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn fixed_fields_stay_big_endian() -> Result<()> {
        let header = Header {
            metadata_size: 0x0102,
            ..Header::new("", 1, false)
        };

        let actual = written(Endian::Little, |s| header.write(s))?;
        assert_eq!(&actual[..4], &[0x00, 0x00, 0x01, 0x02]);
        assert_eq!(&actual[21..25], &[0x01, 0x00, 0x00, 0x00]);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_header_with_unsupported_features() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Stream::new(Cursor::new(vec![
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x11,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01,
        ]));

        let header = Header::read(&mut input, SUPPORTED_FORMAT_VERSION)?;
        assert_eq!(header.format_version, 17);
        assert!(header.enable_type_tree.get());
        assert_eq!(
            input.warnings(),
            &[
                Warning::UnsupportedVersion {
                    found: 17,
                    expected: SUPPORTED_FORMAT_VERSION
                },
                Warning::TypeTreeEnabled,
            ]
        );
        assert!(logs_contain("type trees are enabled but unsupported"));

        Ok(())
    }

    #[test]
    fn asset_type_without_script_id() -> Result<()> {
        #[rustfmt::skip]
        let bytes = vec![
            0x1C, 0x00, 0x00, 0x00,
            0x00,
            0xFF, 0xFF,
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
            0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10,
        ];

        let asset_type = AssetType::read(&mut Stream::with_endian(
            Cursor::new(bytes.clone()),
            Endian::Little,
        ))?;
        assert_eq!(asset_type.class_id, 28);
        assert_eq!(asset_type.script_type_index, -1);
        assert_eq!(asset_type.script_id, None);
        assert_eq!(asset_type.encoded_len(), 23);

        assert_eq!(written(Endian::Little, |s| asset_type.write(s))?, bytes);

        Ok(())
    }

    #[test]
    fn asset_type_with_script_id() -> Result<()> {
        #[rustfmt::skip]
        let bytes = vec![
            0x72, 0x00, 0x00, 0x00,
            0x01,
            0x00, 0x00,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
            0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB,
            0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB,
        ];

        let asset_type = AssetType::read(&mut Stream::with_endian(
            Cursor::new(bytes.clone()),
            Endian::Little,
        ))?;
        assert_eq!(asset_type.class_id, SCRIPT_CLASS_ID);
        assert!(asset_type.is_stripped.get());
        assert_eq!(asset_type.script_id, Some([0xAA; 16]));
        assert_eq!(asset_type.type_hash, [0xBB; 16]);
        assert_eq!(asset_type.encoded_len(), 39);

        assert_eq!(written(Endian::Little, |s| asset_type.write(s))?, bytes);

        Ok(())
    }

    #[test]
    fn asset_type_length_matches_bytes_written() -> Result<()> {
        for class_id in [0, 1, 28, 113, SCRIPT_CLASS_ID, 115, -1] {
            let asset_type = AssetType {
                class_id,
                is_stripped: Boolean(0),
                script_id: Some([0x11; 16]),
                ..Default::default()
            };

            let actual = written(Endian::Big, |s| asset_type.write(s))?;
            assert_eq!(actual.len() as u32, asset_type.encoded_len());

            let expected = if class_id == SCRIPT_CLASS_ID { 39 } else { 23 };
            assert_eq!(actual.len(), expected);
        }

        Ok(())
    }

    #[test]
    fn script_meta_aligns_between_fields() -> Result<()> {
        let script = ScriptMeta {
            file_index: 2,
            id_in_file: 0x0102,
        };

        let actual = written(Endian::Little, |s| {
            s.write_bytes(&[0xEE; 2])?;
            script.write(s)
        })?;

        #[rustfmt::skip]
        let expected = vec![
            0xEE, 0xEE,
            0x02, 0x00, 0x00, 0x00,
            0x00, 0x00,
            0x02, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(actual, expected);
        assert_eq!(script.encoded_len(), 12);

        let mut input = Stream::with_endian(Cursor::new(actual), Endian::Little);
        input.read_bytes(2)?;
        assert_eq!(ScriptMeta::read(&mut input)?, script);

        Ok(())
    }

    #[test]
    fn external_meta_keeps_prefix() -> Result<()> {
        let mut bytes = vec![0x00; 21];
        bytes[8] = 0x03;
        bytes.extend_from_slice(b"library/unity default resources\0");

        let external =
            ExternalMeta::read(&mut Stream::with_endian(Cursor::new(bytes.clone()), Endian::Little))?;
        assert_eq!(external.prefix[8], 0x03);
        assert_eq!(external.path, "library/unity default resources");
        assert_eq!(external.encoded_len() as usize, bytes.len());

        assert_eq!(written(Endian::Little, |s| external.write(s))?, bytes);

        Ok(())
    }
}
