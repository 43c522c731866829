pub mod cli;
pub mod interactive;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::columns::output_key;
use crate::domain::model::FilterCriteria;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

/// 一次轉換需要的全部設定；由前端（旗標、TOML 或互動流程）解析完成後傳入管線
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertJob {
    pub source_path: String,
    pub output_path: String,
    pub output_file: String,
    pub delimiter: u8,
    pub filters: FilterCriteria,
    pub pretty: bool,
}

impl ConfigProvider for ConvertJob {
    fn source_path(&self) -> &str {
        &self.source_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    fn pretty_output(&self) -> bool {
        self.pretty
    }
}

impl Validate for ConvertJob {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validation::validate_path("input", &self.source_path)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("output_file", &self.output_file)?;
        validation::validate_year_range(self.filters.start_year, self.filters.end_year)?;
        Ok(())
    }
}

/// 依過濾條件推導預設輸出檔名（未含副檔名），和互動模式顯示的預設一致：
/// filtered_data[_{town}][_{start|min}_{end|max}]
pub fn default_output_name(filters: &FilterCriteria) -> String {
    let mut name = String::from("filtered_data");
    if let Some(town) = &filters.town {
        name.push('_');
        name.push_str(&output_key(town));
    }
    if filters.start_year.is_some() || filters.end_year.is_some() {
        let start = filters
            .start_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "min".to_string());
        let end = filters
            .end_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "max".to_string());
        name.push_str(&format!("_{}_{}", start, end));
    }
    name
}

/// 補上 .json 副檔名；已經有的不重複加
pub fn json_file_name(name: &str) -> String {
    if name.ends_with(".json") {
        name.to_string()
    } else {
        format!("{}.json", name)
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "estate-etl")]
#[command(about = "Convert real-estate sales CSV exports into filtered JSON")]
pub struct CliConfig {
    #[arg(short, long, help = "Source CSV file to convert")]
    pub input: Option<String>,

    #[arg(short, long, help = "TOML job file with source, filters and output settings")]
    pub config: Option<String>,

    #[arg(long, help = "Output directory (default: ./output)")]
    pub output_path: Option<String>,

    #[arg(long, help = "Output file name; derived from the filters when omitted")]
    pub output_file: Option<String>,

    #[arg(long, help = "Keep records listed in or after this year")]
    pub start_year: Option<i32>,

    #[arg(long, help = "Keep records listed in or before this year")]
    pub end_year: Option<i32>,

    #[arg(long, help = "Keep records in this town (case-insensitive)")]
    pub town: Option<String>,

    #[arg(long, help = "Keep records with this property type (case-insensitive)")]
    pub property_type: Option<String>,

    #[arg(long, help = "Field delimiter, a single character (\\t for tab)")]
    pub delimiter: Option<String>,

    #[arg(long, help = "Write compact JSON instead of pretty-printed")]
    pub compact: bool,

    #[arg(long, help = "Prompt for source and filters instead of reading flags")]
    pub interactive: bool,

    #[arg(long, help = "Show the source header row and projected columns, then exit")]
    pub inspect: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-phase CPU/memory stats")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 合併旗標與 TOML 任務檔（旗標逐欄位優先），補上預設值，產出一個驗證過的 ConvertJob
    pub fn resolve(&self) -> Result<ConvertJob> {
        let file_config = match &self.config {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None => None,
        };

        let source_path = self
            .input
            .clone()
            .or_else(|| file_config.as_ref().map(|c| c.source.path.clone()));
        let source_path = validation::validate_required_field("input", &source_path)?.clone();

        let output_path = self
            .output_path
            .clone()
            .or_else(|| file_config.as_ref().map(|c| c.load.output_path.clone()))
            .unwrap_or_else(|| "./output".to_string());

        let delimiter_text = self.delimiter.clone().or_else(|| {
            file_config
                .as_ref()
                .and_then(|c| c.source.delimiter.clone())
        });
        let delimiter = match delimiter_text {
            Some(text) => validation::validate_delimiter(&text)?,
            None => b',',
        };

        let file_filters = file_config
            .as_ref()
            .map(|c| c.filters.clone())
            .unwrap_or_default();
        let filters = FilterCriteria {
            start_year: self.start_year.or(file_filters.start_year),
            end_year: self.end_year.or(file_filters.end_year),
            town: self.town.clone().or(file_filters.town),
            property_type: self.property_type.clone().or(file_filters.property_type),
        };

        // 檔名最後才推導，合併後的過濾條件才算數
        let output_file = self
            .output_file
            .clone()
            .or_else(|| {
                file_config
                    .as_ref()
                    .and_then(|c| c.load.output_file.clone())
            })
            .unwrap_or_else(|| default_output_name(&filters));
        let output_file = json_file_name(&output_file);

        let pretty = if self.compact {
            false
        } else {
            file_config
                .as_ref()
                .and_then(|c| c.load.pretty)
                .unwrap_or(true)
        };

        let job = ConvertJob {
            source_path,
            output_path,
            output_file,
            delimiter,
            filters,
            pretty,
        };
        job.validate()?;
        Ok(job)
    }
}
