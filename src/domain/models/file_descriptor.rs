//! File descriptors handed to configuration loaders.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

enum ByteSource {
    Path(PathBuf),
    Memory(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

/// A file to be loaded: its name, extension and a not-yet-opened byte source.
///
/// The descriptor is consumed by [`FileDescriptor::read_all`], so the
/// underlying stream is opened, read to the end and released inside a
/// single call whatever the outcome.
pub struct FileDescriptor {
    filename: String,
    extension: String,
    source: ByteSource,
}

impl FileDescriptor {
    /// Describe a file on disk. The file is not opened until read.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            extension: extension_of(&filename),
            filename,
            source: ByteSource::Path(path),
        }
    }

    /// Describe an in-memory file.
    pub fn from_bytes(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        Self {
            extension: extension_of(&filename),
            filename,
            source: ByteSource::Memory(bytes.into()),
        }
    }

    /// Describe an arbitrary byte stream.
    pub fn from_reader(filename: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        let filename = filename.into();
        Self {
            extension: extension_of(&filename),
            filename,
            source: ByteSource::Reader(Box::new(reader)),
        }
    }

    /// File name without directories.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Extension without the leading dot; empty when the name has none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path on disk, for descriptors created with [`FileDescriptor::from_path`].
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            ByteSource::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Description used in origins and error messages.
    pub fn describe(&self) -> String {
        match &self.source {
            ByteSource::Path(path) => path.display().to_string(),
            ByteSource::Memory(_) | ByteSource::Reader(_) => self.filename.clone(),
        }
    }

    /// Open the source and read it to completion.
    pub fn read_all(self) -> io::Result<Vec<u8>> {
        match self.source {
            ByteSource::Path(path) => {
                let mut file = File::open(path)?;
                let mut buffer = Vec::new();
                file.read_to_end(&mut buffer)?;
                Ok(buffer)
            }
            ByteSource::Memory(bytes) => Ok(bytes),
            ByteSource::Reader(mut reader) => {
                let mut buffer = Vec::new();
                reader.read_to_end(&mut buffer)?;
                Ok(buffer)
            }
        }
    }
}

impl fmt::Debug for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            ByteSource::Path(_) => "path",
            ByteSource::Memory(_) => "memory",
            ByteSource::Reader(_) => "reader",
        };
        f.debug_struct("FileDescriptor")
            .field("filename", &self.filename)
            .field("extension", &self.extension)
            .field("source", &source)
            .finish()
    }
}

fn extension_of(filename: &str) -> String {
    match filename.rfind('.') {
        Some(dot) if dot + 1 < filename.len() => filename[dot + 1..].to_string(),
        _ => String::new(),
    }
}
