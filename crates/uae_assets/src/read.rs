//! Types for reading asset files
//!

use bon::Builder;
use std::io::{Read, Seek};
use tracing::{debug, instrument};

use crate::error::{Result, Warning};
use crate::object::AssetObject;
use crate::stream::Stream;
use crate::types::{AssetType, ExternalMeta, Header, ScriptMeta, SUPPORTED_FORMAT_VERSION};

/// Options for how an asset file should be read
#[derive(Debug, Clone, Copy, Builder)]
pub struct LoadOptions {
    /// Fail on the first warning instead of collecting it
    #[builder(default)]
    pub strict: bool,

    /// The format version to accept without a warning
    #[builder(default = SUPPORTED_FORMAT_VERSION)]
    pub expected_version: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions::builder().build()
    }
}

/// A parsed asset file.
///
/// The tables keep the order they had on disk. Sizes and offsets stored in the header and on
/// each object are only valid until something is edited; they are recomputed by
/// [`AssetFile::write`](crate::write).
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_objects(reader: impl Read + Seek) -> uae_assets::error::Result<()> {
///     let assets = uae_assets::load(reader)?;
///
///     for object in &assets.objects {
///         println!("{}: {}", object.path_id, object.file_name());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct AssetFile {
    pub header: Header,
    pub types: Vec<AssetType>,
    pub objects: Vec<AssetObject>,
    pub scripts: Vec<ScriptMeta>,
    pub externals: Vec<ExternalMeta>,
    pub ref_types: Vec<AssetType>,
    pub user_information: String,

    warnings: Vec<Warning>,
}

impl AssetFile {
    /// An asset file with empty tables
    pub fn new(header: Header) -> AssetFile {
        AssetFile {
            header,
            types: Vec::new(),
            objects: Vec::new(),
            scripts: Vec::new(),
            externals: Vec::new(),
            ref_types: Vec::new(),
            user_information: String::new(),
            warnings: Vec::new(),
        }
    }

    /// Read a whole asset file from the start of the stream
    #[instrument(skip_all, err)]
    pub fn read<R: Read + Seek>(stream: &mut Stream<R>, options: LoadOptions) -> Result<AssetFile> {
        let header = Header::read(stream, options.expected_version)?;
        let data_offset = header.data_offset;

        let types = stream.read_array(AssetType::read)?;
        let objects = stream.read_array(|s| AssetObject::read(s, data_offset))?;
        let scripts = stream.read_array(ScriptMeta::read)?;
        let externals = stream.read_array(ExternalMeta::read)?;
        let ref_types = stream.read_array(AssetType::read)?;
        let user_information = stream.read_string()?;

        debug!(
            version = %header.unity_version,
            types = types.len(),
            objects = objects.len(),
            scripts = scripts.len(),
            externals = externals.len(),
            ref_types = ref_types.len(),
            "read asset file"
        );

        Ok(AssetFile {
            header,
            types,
            objects,
            scripts,
            externals,
            ref_types,
            user_information,
            warnings: stream.take_warnings(),
        })
    }

    /// Warnings raised while this file was read
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Number of objects in the file
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the file holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Find an object by its path id
    pub fn object(&self, path_id: i64) -> Option<&AssetObject> {
        self.objects.iter().find(|o| o.path_id == path_id)
    }

    /// Find an object by its path id, for editing
    pub fn object_mut(&mut self, path_id: i64) -> Option<&mut AssetObject> {
        self.objects.iter_mut().find(|o| o.path_id == path_id)
    }
}

/// Read an asset file with the default [`LoadOptions`]
pub fn load<R: Read + Seek>(source: R) -> Result<AssetFile> {
    load_with(source, LoadOptions::default())
}

/// Read an asset file.
///
/// Everything needed later is copied out of `source`, which can be dropped once this returns.
#[instrument(skip(source), err)]
pub fn load_with<R: Read + Seek>(source: R, options: LoadOptions) -> Result<AssetFile> {
    let mut stream = Stream::new(source).strict(options.strict);
    AssetFile::read(&mut stream, options)
}
