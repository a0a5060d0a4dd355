use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::ScanMonitor;

pub struct ScanEngine<P: Pipeline> {
    pipeline: P,
    monitor: ScanMonitor,
}

impl<P: Pipeline> ScanEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: ScanMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting places scan...");
        self.monitor.log_stats("Start");

        let outcomes = self.pipeline.extract().await?;
        tracing::info!("Queried {} tiles", outcomes.len());
        self.monitor.log_stats("Query");

        let result = self.pipeline.transform(outcomes).await?;
        tracing::info!(
            "Merged into {} unique places ({} raw)",
            result.places.len(),
            result.raw_place_count
        );
        self.monitor.log_stats("Merge");

        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
