use std::path::Path;
use std::sync::Arc;

use secdraw_config::AppConfig;
use secdraw_engine::pipeline::Renderer;
use secdraw_engine::text::TextRenderer;
use secdraw_io::RecordTable;
use tracing::info;

use crate::errors::FrontendError;

/// 读取导出的记录表。文件本身不可读或不是 JSON 数组时返回错误，单行问题留给批处理报告。
pub fn load_record_table(path: &Path) -> Result<RecordTable, FrontendError> {
    let table = RecordTable::load(path)?;
    info!(path = %path.display(), rows = table.len(), "已读取记录表");
    Ok(table)
}

/// 字体只加载一次，在工作线程间只读共享。
pub fn load_text_renderer(config: &AppConfig) -> Arc<TextRenderer> {
    Arc::new(TextRenderer::load(config.resources.font_path.as_deref()))
}

pub fn build_renderer(config: &AppConfig) -> Renderer {
    Renderer::new(
        config.canvas.clone(),
        config.labels.clone(),
        load_text_renderer(config),
    )
}
