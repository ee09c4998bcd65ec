use secdraw_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("无法读取记录表: {0}")]
    Records(#[from] IoError),
    #[error("无法创建工作线程池: {0}")]
    WorkerPool(String),
}
