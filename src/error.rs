use thiserror::Error;

/// Failures of the persistence substrate. Backends return these; the
/// preference store absorbs them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage rejected the operation: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration overrides: {0}")]
    InvalidOverrides(#[from] serde_json::Error),
}

/// Problems building the DOM surface around a host element.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Error)]
pub enum BindError {
    #[error("no window/document available")]
    NoDocument,
    #[error("media element has no parent node")]
    Detached,
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for BindError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        BindError::Dom(format!("{value:?}"))
    }
}
