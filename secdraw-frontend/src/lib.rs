pub mod batch;
pub mod errors;
pub mod loader;
pub mod resource_locator;

use std::path::PathBuf;

use batch::{BatchReport, BatchRunner};
use errors::FrontendError;
use resource_locator::TemplateLocator;
use secdraw_config::AppConfig;
use tracing::info;

/// 批处理的输入。`extra_template_roots` 排在配置的模板目录之前。
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub records: PathBuf,
    pub extra_template_roots: Vec<PathBuf>,
}

/// 读取记录表并渲染每一行。只有记录表本身不可用时返回错误。
pub fn run_batch(request: &BatchRequest, config: &AppConfig) -> Result<BatchReport, FrontendError> {
    let table = loader::load_record_table(&request.records)?;
    let locator = TemplateLocator::from_config(&request.extra_template_roots, config);
    info!(roots = ?locator.search_roots(), "模板目录");
    let runner = BatchRunner::new(
        loader::build_renderer(config),
        locator,
        config.resources.output_dir.clone(),
        config.batch.workers,
    );
    runner.run(&table.into_rows())
}
