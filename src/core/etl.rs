use crate::core::Pipeline;
use crate::domain::model::TransformStats;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 單次轉換的結果摘要
#[derive(Debug, Clone)]
pub struct ConvertSummary {
    pub records_written: usize,
    pub output_path: String,
    pub stats: TransformStats,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<ConvertSummary> {
        tracing::info!("🚀 Starting conversion");

        // Extract
        tracing::info!("📥 Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} rows", raw_data.len());
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔄 Transforming data...");
        let result = self.pipeline.transform(raw_data).await?;
        let stats = result.stats.clone();
        let records_written = result.records.len();
        tracing::info!(
            "🔄 {} rows in, {} accepted, {} filtered out",
            stats.rows_in,
            stats.accepted,
            stats.filtered()
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Loading data...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();

        Ok(ConvertSummary {
            records_written,
            output_path,
            stats,
        })
    }
}
