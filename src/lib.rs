pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::core::etl::{ConvertSummary, EtlEngine};
pub use crate::core::pipeline::ConvertPipeline;
pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use config::{default_output_name, ConvertJob};
pub use domain::model::{FilterCriteria, ProjectedRecord};
pub use utils::error::{EtlError, Result};

use crate::utils::validation::Validate;
use std::path::Path;

/// 一行式轉換：讀 source_path，套過濾條件，寫出 destination_path，回傳輸出筆數。
/// 目的地的父目錄不存在時會自動建立；已存在的檔案直接覆蓋。
pub async fn convert(
    source_path: &str,
    destination_path: &str,
    filters: FilterCriteria,
) -> Result<usize> {
    let destination = Path::new(destination_path);
    let output_file = destination
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| EtlError::InvalidConfigValueError {
            field: "destination".to_string(),
            value: destination_path.to_string(),
            reason: "Destination must name a file".to_string(),
        })?;
    let output_path = destination
        .parent()
        .map(|parent| parent.to_string_lossy().to_string())
        .filter(|parent| !parent.is_empty())
        .unwrap_or_else(|| ".".to_string());

    let job = ConvertJob {
        source_path: source_path.to_string(),
        output_path: output_path.clone(),
        output_file,
        delimiter: b',',
        filters,
        pretty: true,
    };
    job.validate()?;

    let storage = LocalStorage::new(output_path);
    let pipeline = ConvertPipeline::new(storage, job);
    let summary = EtlEngine::new(pipeline).run().await?;
    Ok(summary.records_written)
}
