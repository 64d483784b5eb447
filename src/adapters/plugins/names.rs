//! `NameService` capability: a display name for the application.

use crate::domain::ports::Capability;
use crate::services::capability_registry::RegistryBuilder;

/// Contract name of [`NameService`].
pub const NAME_SERVICE: &str = "NameService";

/// Provides a display name.
pub trait NameService: Send + Sync {
    /// The name to show.
    fn name(&self) -> String;
}

impl Capability for dyn NameService {
    const NAME: &'static str = NAME_SERVICE;
}

/// English display name.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishNameService;

impl NameService for EnglishNameService {
    fn name(&self) -> String {
        "husky".to_string()
    }
}

/// Chinese display name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChineseNameService;

impl NameService for ChineseNameService {
    fn name(&self) -> String {
        "哈士奇".to_string()
    }
}

pub(super) fn register(builder: &mut RegistryBuilder) {
    builder
        .register::<dyn NameService, _>("husky.names.EnglishNameService", || {
            Ok(Box::new(EnglishNameService))
        })
        .register::<dyn NameService, _>("husky.names.ChineseNameService", || {
            Ok(Box::new(ChineseNameService))
        });
}
