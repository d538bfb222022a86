//! Types for writing asset files
//!

use std::io::{Cursor, Seek, Write};
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::primitives::string_len;
use crate::read::AssetFile;
use crate::stream::{padding_for, Stream};

/// The object data starts on a multiple of this
pub const DATA_OFFSET_BLOCK: u32 = 32;

/// Every payload is followed by enough zero bytes to reach a multiple of this
pub const PAYLOAD_ALIGNMENT: u32 = 8;

/// Zero bytes written after the user information. Readers never look at them.
pub const RESERVED_GAP: u64 = 4;

/// Offset of the object data for metadata of the given size.
///
/// This always moves to the *next* block, so an already aligned size still gains a full
/// [`DATA_OFFSET_BLOCK`].
pub fn data_offset_for(metadata_size: u32) -> u32 {
    metadata_size + DATA_OFFSET_BLOCK - metadata_size % DATA_OFFSET_BLOCK
}

/// Where an object's payload goes in the object data
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Offset from the start of the object data
    pub start_byte: u32,

    /// Zero bytes written after the payload
    pub alignment: u32,
}

/// Sizes and offsets derived from the current contents of an [`AssetFile`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Value stored as the header's metadata size
    pub metadata_size: u32,

    /// Bytes actually taken by the metadata, including array counts and padding
    pub metadata_end: u32,

    /// Absolute offset of the object data
    pub data_offset: u32,

    /// Total size of the object data, including padding
    pub payload_size: u32,

    /// One entry per object, in table order
    pub placements: Vec<Placement>,
}

impl Layout {
    /// Value stored as the header's file size
    pub fn file_size(&self) -> u32 {
        self.data_offset + self.payload_size - 4
    }
}

impl AssetFile {
    /// The metadata size as stored in the header.
    ///
    /// This is the sum of the header, every table record and the user information. Array counts,
    /// the reserved bytes and alignment padding are not counted.
    pub fn metadata_size(&self) -> u32 {
        self.header.encoded_len()
            + self.types.iter().map(|t| t.encoded_len()).sum::<u32>()
            + self.objects.iter().map(|o| o.encoded_len()).sum::<u32>()
            + self.scripts.iter().map(|s| s.encoded_len()).sum::<u32>()
            + self.externals.iter().map(|e| e.encoded_len()).sum::<u32>()
            + self.ref_types.iter().map(|t| t.encoded_len()).sum::<u32>()
            + string_len(&self.user_information)
    }

    /// Compute every derived size and offset without changing anything.
    ///
    /// When the metadata written to disk would run past the offset given by
    /// [`data_offset_for`], the data offset moves forward by whole blocks until it clears it.
    pub fn layout(&self) -> Result<Layout> {
        let metadata_size = self.metadata_size();
        let metadata_end = self.encode_metadata()?.len() as u32;

        let mut data_offset = data_offset_for(metadata_size);
        while data_offset < metadata_end {
            data_offset += DATA_OFFSET_BLOCK;
        }

        let mut offset = 0u32;
        let placements = self
            .objects
            .iter()
            .map(|object| {
                let start_byte = offset;
                offset += object.current_payload_length();
                let alignment = padding_for(offset as u64, PAYLOAD_ALIGNMENT as u64) as u32;
                offset += alignment;
                Placement {
                    start_byte,
                    alignment,
                }
            })
            .collect();

        Ok(Layout {
            metadata_size,
            metadata_end,
            data_offset,
            payload_size: offset,
            placements,
        })
    }

    /// Write the whole file, recomputing the header sizes and every object offset first
    #[instrument(skip_all, err)]
    pub fn write<W: Write + Seek>(&mut self, stream: &mut Stream<W>) -> Result<()> {
        let layout = self.layout()?;
        debug!(
            metadata_size = layout.metadata_size,
            metadata_end = layout.metadata_end,
            data_offset = layout.data_offset,
            payload_size = layout.payload_size,
            "computed layout"
        );

        self.header.metadata_size = layout.metadata_size;
        self.header.data_offset = layout.data_offset;
        self.header.file_size = layout.file_size();
        for (object, placement) in self.objects.iter_mut().zip(&layout.placements) {
            object.place(placement.start_byte, placement.alignment);
        }

        let metadata = self.encode_metadata()?;
        stream.write_bytes(&metadata)?;
        stream.fill((layout.data_offset - layout.metadata_end) as u64)?;

        stream.set_endian(self.header.endian());
        for object in self.objects.iter_mut() {
            trace!(
                path_id = object.path_id,
                start_byte = object.start_byte(),
                length = object.current_payload_length(),
                modified = object.is_modified(),
                "writing object"
            );
            object.write_payload(stream)?;
        }

        Ok(())
    }

    /// Encode everything before the object data, as it would sit at the start of a file
    fn encode_metadata(&self) -> Result<Vec<u8>> {
        let mut stream = Stream::new(Cursor::new(Vec::new()));

        self.header.write(&mut stream)?;
        stream.write_array(&self.types, |t, s| t.write(s))?;
        stream.write_array(&self.objects, |o, s| o.write(s))?;
        stream.write_array(&self.scripts, |m, s| m.write(s))?;
        stream.write_array(&self.externals, |e, s| e.write(s))?;
        stream.write_array(&self.ref_types, |t, s| t.write(s))?;
        stream.write_string(&self.user_information)?;
        stream.fill(RESERVED_GAP)?;

        Ok(stream.into_inner().into_inner())
    }
}

/// Write an asset file to `destination`, which should be positioned at its start.
///
/// This will return the writer.
#[instrument(skip_all, err)]
pub fn dump<W: Write + Seek>(archive: &mut AssetFile, destination: W) -> Result<W> {
    let mut stream = Stream::new(destination);
    archive.write(&mut stream)?;
    Ok(stream.into_inner())
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};
    use std::io::Cursor;
    use tracing_test::traced_test;

    use crate::error::Result;
    use crate::object::AssetObject;
    use crate::read::{load, AssetFile};
    use crate::types::{AssetType, Header};
    use crate::write::{data_offset_for, dump, Placement, DATA_OFFSET_BLOCK, RESERVED_GAP};

    #[test]
    fn data_offset_is_always_the_next_block() {
        let sizes = (0..=4096).chain([u32::MAX / 2, 1 << 20, (1 << 20) + 1]);
        for metadata_size in sizes {
            let data_offset = data_offset_for(metadata_size);
            assert_eq!(data_offset % DATA_OFFSET_BLOCK, 0, "size {metadata_size}");
            assert!(data_offset > metadata_size, "size {metadata_size}");
            assert!(data_offset - metadata_size <= DATA_OFFSET_BLOCK, "size {metadata_size}");
        }

        assert_eq!(data_offset_for(0), 32);
        assert_eq!(data_offset_for(31), 32);
        assert_eq!(data_offset_for(32), 64);
        assert_eq!(data_offset_for(33), 64);
    }

    #[traced_test]
    #[test]
    fn empty_file_write() -> Result<()> {
        #[rustfmt::skip]
        let mut expected = vec![
            // Header
            0x00, 0x00, 0x00, 0x20,
            0x00, 0x00, 0x00, 0x3C,
            0x00, 0x00, 0x00, 0x15,
            0x00, 0x00, 0x00, 0x40,
            0x00, 0x00, 0x00, 0x00,
            0x35, 0x2E, 0x36, 0x2E, 0x37, 0x00,
            0x13, 0x00, 0x00, 0x00,
            0x00,
        ];
        // Counts, user information, reserved bytes and padding up to the data offset
        expected.extend([0x00; 33]);

        let mut assets = AssetFile::new(Header::new("5.6.7", 19, false));
        let result = dump(&mut assets, Cursor::new(Vec::new()))?;

        assert_eq!(result.get_ref().len(), 64);
        assert_str_eq!(
            format!("{:02X?}", *result.get_ref()),
            format!("{:02X?}", expected)
        );
        assert_eq!(assets.header.metadata_size, 32);
        assert_eq!(assets.header.data_offset, 64);
        assert_eq!(assets.header.file_size, 60);

        Ok(())
    }

    #[test]
    fn reserved_gap_follows_user_information() -> Result<()> {
        let mut assets = AssetFile::new(Header::new("5.6.7", 19, false));
        assets.ref_types.push(AssetType {
            class_id: 1,
            ..Default::default()
        });
        assets.user_information = "u".into();
        let written = dump(&mut assets, Cursor::new(Vec::new()))?.into_inner();

        // Header (31), then the type, object, script and external counts
        assert_eq!(&written[43..47], &[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(&written[47..51], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&written[51..55], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&written[74..76], &[b'u', 0x00]);
        assert_eq!(assets.layout()?.metadata_end, 76 + RESERVED_GAP as u32);

        let loaded = load(Cursor::new(written))?;
        assert_eq!(loaded.ref_types, assets.ref_types);
        assert_eq!(loaded.user_information, "u");

        Ok(())
    }

    #[test]
    fn data_offset_clears_written_metadata() -> Result<()> {
        let assets = AssetFile::new(Header::new("5.6", 19, false));
        let layout = assets.layout()?;

        assert_eq!(layout.metadata_size, 30);
        assert_eq!(data_offset_for(layout.metadata_size), 32);
        assert_eq!(layout.metadata_end, 54);
        assert_eq!(layout.data_offset, 64);
        assert_eq!(layout.file_size(), 60);

        Ok(())
    }

    #[test]
    fn payloads_are_packed_on_eight_bytes() -> Result<()> {
        let mut assets = AssetFile::new(Header::new("5.6.7", 19, false));
        assets.objects.push(AssetObject::new(1, 0, "a", b"x".to_vec()));
        assets.objects.push(AssetObject::new(2, 0, "bb", b"12345678".to_vec()));
        assets.objects.push(AssetObject::new(3, 0, "", Vec::new()));

        let layout = assets.layout()?;
        assert_eq!(
            layout.placements,
            vec![
                Placement { start_byte: 0, alignment: 6 },
                Placement { start_byte: 16, alignment: 6 },
                Placement { start_byte: 40, alignment: 0 },
            ]
        );
        assert_eq!(layout.payload_size, 48);

        let written = dump(&mut assets, Cursor::new(Vec::new()))?.into_inner();
        assert_eq!(written.len() as u32, layout.data_offset + layout.payload_size);
        assert_eq!(assets.header.file_size, written.len() as u32 - 4);
        assert_eq!(assets.objects[1].start_byte(), 16);
        assert_eq!(assets.objects[1].alignment(), 6);

        let start = (layout.data_offset + 16) as usize;
        assert_eq!(&written[start..start + 6], &[0x02, 0x00, 0x00, 0x00, b'b', b'b']);

        Ok(())
    }

    #[test]
    fn written_file_reads_back() -> Result<()> {
        let mut assets = AssetFile::new(Header::new("2019.4.0f1", 5, true));
        assets.objects.push(AssetObject::new(-4, 1, "first", b"one".to_vec()));
        assets.objects.push(AssetObject::new(9, 0, "second", b"two\0\0".to_vec()));
        assets.user_information = "user".into();

        let written = dump(&mut assets, Cursor::new(Vec::new()))?.into_inner();
        let loaded = load(Cursor::new(written))?;

        assert!(loaded.warnings().is_empty());
        assert!(loaded.header.big_endian.get());
        assert_eq!(loaded.header.data_offset, assets.header.data_offset);
        assert_eq!(loaded.user_information, "user");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.objects[0].path_id, -4);
        assert_eq!(loaded.objects[0].type_id, 1);
        assert_eq!(loaded.objects[0].file_name(), "first");
        assert_eq!(loaded.objects[0].file_content(), b"one");
        assert_eq!(loaded.objects[1].file_name(), "second");
        assert_eq!(loaded.objects[1].file_content(), b"two");
        assert_eq!(loaded.objects[1].start_byte(), 16);

        Ok(())
    }
}
