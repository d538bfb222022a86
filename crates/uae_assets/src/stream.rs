//! Random access cursor used for every read and write in the crate
//!

use binrw::{BinRead, BinWrite, Endian};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use tracing::warn;

use crate::error::{Error, Result, Warning};

/// An independent in-memory stream, as produced by [`Stream::slice`]
pub type Payload = Stream<Cursor<Vec<u8>>>;

/// Number of fill bytes needed to move `position` onto a multiple of `alignment`
pub fn padding_for(position: u64, alignment: u64) -> u64 {
    (alignment - position % alignment) % alignment
}

/// A byte cursor carrying the endianness every value is encoded with.
///
/// The stream also collects the [`Warning`]s raised while reading through it. In strict mode the
/// first warning is returned as [`Error::Strict`] instead.
#[derive(Debug)]
pub struct Stream<T> {
    pub(crate) inner: T,
    endian: Endian,
    strict: bool,
    warnings: Vec<Warning>,
}

impl<T> Stream<T> {
    /// Wrap a reader or writer. Asset files start big endian.
    pub fn new(inner: T) -> Self {
        Self::with_endian(inner, Endian::Big)
    }

    /// Wrap a reader or writer using the given endianness
    pub fn with_endian(inner: T, endian: Endian) -> Self {
        Self {
            inner,
            endian,
            strict: false,
            warnings: Vec::new(),
        }
    }

    /// Turn recoverable warnings into errors
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Warnings raised so far
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Take the warnings raised so far, leaving none behind
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Raise a recoverable condition
    pub fn warn(&mut self, warning: Warning) -> Result<()> {
        warn!("{warning}");
        if self.strict {
            return Err(Error::Strict(warning));
        }
        self.warnings.push(warning);
        Ok(())
    }

    /// Adopt warnings that were already raised on another stream
    pub(crate) fn absorb(&mut self, warnings: Vec<Warning>) {
        self.warnings.extend(warnings);
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Unwrap and return the inner reader or writer
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Seek> Stream<T> {
    /// Current absolute position
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Move back to the start of the stream
    pub fn rewind(&mut self) -> Result<()> {
        self.inner.rewind()?;
        Ok(())
    }
}

impl<T: Read + Seek> Stream<T> {
    /// Read a fixed width value in the current endianness
    pub fn read_value<V>(&mut self) -> Result<V>
    where
        V: for<'a> BinRead<Args<'a> = ()>,
    {
        Ok(V::read_options(&mut self.inner, self.endian, ())?)
    }

    /// Read exactly `length` bytes
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; length];
        self.inner.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read everything from the current position to the end of the stream
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.inner.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Skip forward to the next multiple of `alignment` without reading anything
    pub fn skip_align(&mut self, alignment: u64) -> Result<()> {
        let padding = padding_for(self.position()?, alignment);
        if padding != 0 {
            self.inner.seek(SeekFrom::Current(padding as i64))?;
        }
        Ok(())
    }

    /// Copy `length` bytes starting at `offset` into a new stream.
    ///
    /// The position of this stream is left untouched. The new stream starts at its own offset 0
    /// and inherits the endianness and strictness of this one.
    pub fn slice(&mut self, offset: u64, length: usize) -> Result<Payload> {
        let previous = self.position()?;
        self.inner.seek(SeekFrom::Start(offset))?;
        let data = self.read_bytes(length);
        self.inner.seek(SeekFrom::Start(previous))?;

        Ok(Stream::with_endian(Cursor::new(data?), self.endian).strict(self.strict))
    }

    /// Read a u32 count followed by that many records
    pub fn read_array<V>(&mut self, mut read: impl FnMut(&mut Self) -> Result<V>) -> Result<Vec<V>> {
        let count: u32 = self.read_value()?;
        (0..count).map(|_| read(self)).collect()
    }
}

impl<T: Write + Seek> Stream<T> {
    /// Write a fixed width value in the current endianness
    pub fn write_value<V>(&mut self, value: &V) -> Result<()>
    where
        V: for<'a> BinWrite<Args<'a> = ()>,
    {
        value.write_options(&mut self.inner, self.endian, ())?;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    /// Write `count` zero bytes
    pub fn fill(&mut self, count: u64) -> Result<()> {
        std::io::copy(&mut std::io::repeat(0).take(count), &mut self.inner)?;
        Ok(())
    }

    /// Write zero bytes up to the next multiple of `alignment`
    pub fn pad_align(&mut self, alignment: u64) -> Result<()> {
        let padding = padding_for(self.position()?, alignment);
        self.fill(padding)
    }

    /// Write a u32 count followed by every record
    pub fn write_array<V>(
        &mut self,
        values: &[V],
        mut write: impl FnMut(&V, &mut Self) -> Result<()>,
    ) -> Result<()> {
        self.write_value(&(values.len() as u32))?;
        values.iter().try_for_each(|value| write(value, self))
    }
}
