use bedrock_actions_core::registry::{ActionGroupVariant, VariantParseError};
use thiserror::Error;

pub const VARIANT_ENV: &str = "ACTION_GROUP_VARIANT";
pub const DEFAULT_VARIANT: ActionGroupVariant = ActionGroupVariant::CustomerService;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ACTION_GROUP_VARIANT is invalid: {0}")]
    Variant(#[from] VariantParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub variant: ActionGroupVariant,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let variant = match lookup(VARIANT_ENV) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => DEFAULT_VARIANT,
        };
        Ok(Self { variant })
    }
}
