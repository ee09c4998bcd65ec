use std::path::PathBuf;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use secdraw_engine::errors::RenderError;
use secdraw_engine::pipeline::Renderer;
use secdraw_io::ParsedRow;
use tracing::{debug, info, warn};

use crate::errors::FrontendError;
use crate::resource_locator::TemplateLocator;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRecord {
    pub row: usize,
    pub record_id: String,
    pub path: PathBuf,
    /// 以占位图输出时的原因。
    pub degraded: Option<RenderError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub row: usize,
    pub record_id: String,
    pub error: RenderError,
}

/// 批处理结果，按输入行号排序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub rendered: Vec<RenderedRecord>,
    pub skipped_blank: usize,
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    pub fn degraded(&self) -> usize {
        self.rendered
            .iter()
            .filter(|record| record.degraded.is_some())
            .count()
    }

    pub fn summary(&self) -> String {
        format!(
            "rendered {} ({} degraded), failed {}, skipped {} blank",
            self.rendered.len(),
            self.degraded(),
            self.failures.len(),
            self.skipped_blank
        )
    }

    fn push(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Rendered(record) => self.rendered.push(record),
            RowOutcome::Blank => self.skipped_blank += 1,
            RowOutcome::Failed(failure) => self.failures.push(failure),
        }
    }
}

enum RowOutcome {
    Rendered(RenderedRecord),
    Blank,
    Failed(RecordFailure),
}

/// 逐条渲染记录。记录之间互不依赖，任何单条失败都不会中止批处理。
pub struct BatchRunner {
    renderer: Renderer,
    locator: TemplateLocator,
    output_dir: PathBuf,
    workers: usize,
}

impl BatchRunner {
    pub fn new(renderer: Renderer, locator: TemplateLocator, output_dir: PathBuf, workers: usize) -> Self {
        Self {
            renderer,
            locator,
            output_dir,
            workers: workers.max(1),
        }
    }

    /// `workers > 1` 时在独立的 rayon 线程池中并行处理，结果仍按输入顺序汇总。
    pub fn run(&self, rows: &[ParsedRow]) -> Result<BatchReport, FrontendError> {
        info!(rows = rows.len(), workers = self.workers, output = %self.output_dir.display(), "开始批处理");
        let outcomes: Vec<RowOutcome> = if self.workers > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .thread_name(|index| format!("secdraw-worker-{index}"))
                .build()
                .map_err(|err| FrontendError::WorkerPool(err.to_string()))?;
            pool.install(|| rows.par_iter().map(|row| self.process(row)).collect())
        } else {
            rows.iter().map(|row| self.process(row)).collect()
        };

        let mut report = BatchReport::default();
        for outcome in outcomes {
            report.push(outcome);
        }
        info!(
            rendered = report.rendered.len(),
            degraded = report.degraded(),
            failed = report.failures.len(),
            blank = report.skipped_blank,
            "批处理完成"
        );
        Ok(report)
    }

    fn process(&self, row: &ParsedRow) -> RowOutcome {
        match row {
            ParsedRow::Blank { row } => {
                debug!(row, "空行，已跳过");
                RowOutcome::Blank
            }
            ParsedRow::Invalid {
                row,
                record_id,
                error,
            } => {
                let error = RenderError::InvalidRecord(error.to_string());
                warn!(record = %record_id, row, error = %error, "记录无效，已跳过");
                RowOutcome::Failed(RecordFailure {
                    row: *row,
                    record_id: record_id.clone(),
                    error,
                })
            }
            ParsedRow::Valid(record) => {
                let template = self.locator.resolve(record);
                match self
                    .renderer
                    .render_to_file(record, template.as_ref(), &self.output_dir)
                {
                    Ok(saved) => RowOutcome::Rendered(RenderedRecord {
                        row: record.row,
                        record_id: record.display_id(),
                        path: saved.path,
                        degraded: saved.degraded,
                    }),
                    Err(error) => {
                        warn!(record = %record.display_id(), error = %error, "写出图像失败");
                        RowOutcome::Failed(RecordFailure {
                            row: record.row,
                            record_id: record.display_id(),
                            error,
                        })
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(row: usize, degraded: Option<RenderError>) -> RenderedRecord {
        RenderedRecord {
            row,
            record_id: format!("#{row}"),
            path: PathBuf::from(format!("{row}.png")),
            degraded,
        }
    }

    #[test]
    fn summary_counts_each_outcome() {
        let mut report = BatchReport::default();
        report.push(RowOutcome::Rendered(rendered(1, None)));
        report.push(RowOutcome::Rendered(rendered(
            2,
            Some(RenderError::MissingAsset("Brace".to_string())),
        )));
        report.push(RowOutcome::Blank);
        report.push(RowOutcome::Failed(RecordFailure {
            row: 4,
            record_id: "#4".to_string(),
            error: RenderError::InvalidRecord("missing shape".to_string()),
        }));

        assert_eq!(report.degraded(), 1);
        assert_eq!(
            report.summary(),
            "rendered 2 (1 degraded), failed 1, skipped 1 blank"
        );
    }
}
