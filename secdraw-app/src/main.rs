use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use secdraw_config::{AnchorMode, AppConfig};
use secdraw_frontend::BatchRequest;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// 根据截面尺寸表批量生成带标注的截面图
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 导出的记录表（JSON 对象数组）
    #[arg(long)]
    records: PathBuf,
    /// 配置文件，缺省时按 SECDRAW_CONFIG 与 ./config/default.toml 查找
    #[arg(long)]
    config: Option<PathBuf>,
    /// 输出目录
    #[arg(long)]
    output: Option<PathBuf>,
    /// 额外的模板目录，可重复，优先于配置中的目录
    #[arg(long = "templates")]
    templates: Vec<PathBuf>,
    /// 并行工作线程数
    #[arg(long)]
    workers: Option<usize>,
    /// 锚点公式选择方式
    #[arg(long, value_enum)]
    anchor_mode: Option<AnchorModeArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnchorModeArg {
    Auto,
    Drawing,
    Pixel,
}

impl From<AnchorModeArg> for AnchorMode {
    fn from(value: AnchorModeArg) -> Self {
        match value {
            AnchorModeArg::Auto => AnchorMode::Auto,
            AnchorModeArg::Drawing => AnchorMode::Drawing,
            AnchorModeArg::Pixel => AnchorMode::Pixel,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_configuration(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);
    info!(records = %args.records.display(), "启动 secdraw 批处理");

    let request = BatchRequest {
        records: args.records.clone(),
        extra_template_roots: args.templates.clone(),
    };
    match secdraw_frontend::run_batch(&request, &config) {
        Ok(report) => {
            for failure in &report.failures {
                error!(record = %failure.record_id, row = failure.row, error = %failure.error, "记录处理失败");
            }
            println!("{}", report.summary());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "批处理无法开始");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// 读取配置并叠加命令行覆盖项。配置无效时返回可直接打印的错误信息。
fn load_configuration(args: &Args) -> Result<AppConfig, String> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    }
    .map_err(|err| format!("配置无效: {err}"))?;

    if let Some(output) = &args.output {
        config.resources.output_dir = output.clone();
    }
    if let Some(workers) = args.workers {
        config.batch.workers = workers;
    }
    if let Some(mode) = args.anchor_mode {
        config.labels.anchor_mode = mode.into();
    }
    config
        .validate()
        .map_err(|err| format!("配置无效: {err}"))?;
    Ok(config)
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
