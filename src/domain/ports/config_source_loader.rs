//! Configuration source loader port.

use crate::domain::errors::LoadError;
use crate::domain::models::{FileDescriptor, PropertySource};

/// Port for loaders that bridge a file format into property sources.
///
/// A host registers many loaders and dispatches on
/// [`recognized_extensions`](ConfigSourceLoader::recognized_extensions)
/// without looking at file contents.
pub trait ConfigSourceLoader: Send + Sync {
    /// Extensions this loader claims, without the leading dot.
    ///
    /// Case sensitive and fixed for the lifetime of the loader.
    fn recognized_extensions(&self) -> &[String];

    /// Load `file` as property sources named `source_name`.
    ///
    /// Returns an empty list when the file defines nothing, otherwise
    /// exactly one source. The file's stream is consumed and released
    /// before returning on every path.
    fn load(
        &self,
        source_name: &str,
        file: FileDescriptor,
    ) -> Result<Vec<PropertySource>, LoadError>;
}
