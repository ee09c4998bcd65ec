pub mod anchor;
pub mod compose;
pub mod extract;
pub mod fit;
pub mod keying;
pub mod pipeline;
pub mod preview;
pub mod text;
pub mod view;

pub mod errors {
    use std::path::PathBuf;

    use thiserror::Error;

    /// 单条记录渲染过程中的错误。前两类只导致降级，后两类使记录失败。
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum RenderError {
        #[error("template asset not found: {0}")]
        MissingAsset(String),
        #[error("failed to decode template {path:?}: {message}")]
        DecodeFailure { path: PathBuf, message: String },
        #[error("invalid record: {0}")]
        InvalidRecord(String),
        #[error("failed to write {path:?}: {message}")]
        WriteFailure { path: PathBuf, message: String },
    }

    impl RenderError {
        /// 是否只需以占位图继续渲染。
        #[inline]
        pub fn is_degradation(&self) -> bool {
            matches!(
                self,
                RenderError::MissingAsset(_) | RenderError::DecodeFailure { .. }
            )
        }
    }
}
