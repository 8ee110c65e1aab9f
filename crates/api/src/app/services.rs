use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use salesadvisor_ai::{
    DataFetcher, DataSourceError, DisabledGenerator, Narrator, RuleEngine, SalesDataSource,
    SalesPipeline, TextGenerator,
};
use salesadvisor_core::SalesWindow;
use salesadvisor_infra::{InMemorySalesSource, OpenAiGenerator, PostgresSalesSource, Settings};

/// Long-lived services shared by every request.
#[derive(Clone)]
pub struct AppServices {
    pipeline: Arc<SalesPipeline>,
}

impl AppServices {
    /// Wire the pipeline around an injected data source and generator.
    pub fn new(
        source: Arc<dyn SalesDataSource>,
        generator: Arc<dyn TextGenerator>,
        window: SalesWindow,
        narration_timeout: Duration,
    ) -> Self {
        let pipeline = SalesPipeline::new(
            DataFetcher::new(source).with_window(window),
            RuleEngine::new().with_window(window),
            Narrator::new(generator).with_timeout(narration_timeout),
        );
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Production wiring: Postgres when configured, else an empty in-memory catalog.
    pub async fn from_settings(settings: &Settings) -> Result<Self, DataSourceError> {
        let source: Arc<dyn SalesDataSource> = match settings.database_url.as_deref() {
            Some(url) => {
                info!("using postgres sales data source");
                Arc::new(PostgresSalesSource::connect(url).await?)
            }
            None => Arc::new(InMemorySalesSource::new()),
        };

        let generator: Arc<dyn TextGenerator> = if settings.openai.api_key.is_some() {
            info!(model = %settings.openai.model, "using openai-compatible narration");
            Arc::new(OpenAiGenerator::new(settings.openai.clone()))
        } else {
            Arc::new(DisabledGenerator)
        };

        Ok(Self::new(
            source,
            generator,
            settings.sales_window,
            settings.narration_timeout,
        ))
    }

    pub fn pipeline(&self) -> Arc<SalesPipeline> {
        self.pipeline.clone()
    }
}
