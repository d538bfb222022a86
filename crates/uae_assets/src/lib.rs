//! This library handles reading, editing and rewriting *Unity* serialized asset files.
//!
//! # Asset File Format Documentation
//!
//! Asset files (`sharedassets0.assets`, `resources.assets`, ...) hold the serialized objects of a
//! Unity build. This crate reads the format version 21 layout, lets an object's embedded name and
//! content be replaced, and writes the file back with every size and offset recomputed.
//!
//! ## File Structure
//!
//! An asset file consists of a header, a series of metadata tables, a user information string
//! and finally the object data.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Metadata Size          | 4 bytes: Size of the metadata (big endian)                 |
//! | 0x0004         | File Size              | 4 bytes: Size of the file minus 4 (big endian)             |
//! | 0x0008         | Format Version         | 4 bytes: Fixed value 21 (big endian)                       |
//! | 0x000C         | Data Offset            | 4 bytes: Offset of the object data (big endian)            |
//! | 0x0010         | Endianness             | 1 byte: Non zero when the rest of the file is big endian   |
//! | 0x0011         | Reserved               | 3 bytes                                                    |
//! | 0x0014         | Unity Version          | Null-terminated string                                     |
//! |                | Target Platform        | 4 bytes: Build target identifier                           |
//! |                | Enable Type Tree       | 1 byte: Type trees are not supported                       |
//!
//! ### Metadata Tables
//!
//! Every table is a 4-byte count followed by that many records, in this order:
//!
//! - **Types**: class id (4), stripped flag (1), script type index (2), a 16 byte script id
//!   *only when the class id is 114*, and a 16 byte type hash.
//! - **Objects**: aligned to 4 bytes, path id (8), start byte (4), byte length (4), type id (4).
//!   The start byte is relative to the data offset.
//! - **Scripts**: file index (4), padding to a multiple of 4, id in file (8).
//! - **Externals**: 21 unidentified bytes followed by a null-terminated path.
//! - **Ref Types**: same layout as types.
//!
//! A null-terminated user information string closes the metadata. Files written by this crate
//! follow it with 4 zero bytes, which readers skip along with the rest of the gap before the
//! object data.
//!
//! ### Object Data
//!
//! Starting at the data offset, every object's payload is stored in table order. A payload
//! starts with a char array (a 4-byte length followed by utf-8 bytes) holding the object's name,
//! then a 4-byte content length and the content. Each payload is followed by zero bytes up to the
//! next multiple of 8.
//!
//! ## Additional Information
//!
//! - The metadata size excludes the table counts, the reserved bytes and any alignment padding.
//! - The data offset is the next multiple of 32 past the metadata size, even when the metadata
//!   size is already a multiple of 32. Because the metadata size leaves out the counts and padding,
//!   the metadata actually written can run past that offset. The writer then moves the data offset
//!   forward by whole 32 byte blocks until it clears the metadata, so the stored value can be
//!   larger than `metadata_size + 32 - metadata_size % 32`. An empty `5.6` file has a metadata size
//!   of 30 and a data offset of 64, not 32.
//! - Everything after the endianness flag uses the endianness it selects.
//!
//! ```no_run
//! use std::fs::File;
//!
//! fn rename_first(input: &str, output: &str) -> uae_assets::error::Result<()> {
//!     let mut assets = uae_assets::load(File::open(input)?)?;
//!     if let Some(object) = assets.objects.first_mut() {
//!         object.set_file_name("renamed");
//!     }
//!     uae_assets::dump(&mut assets, File::create(output)?)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod object;
pub mod primitives;
pub mod read;
pub mod stream;
pub mod types;
pub mod write;

pub use error::Warning;
pub use object::AssetObject;
pub use read::{load, load_with, AssetFile, LoadOptions};
pub use write::{dump, Layout};
