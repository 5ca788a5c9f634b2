use crate::config::AppConfig;
use crate::db::{PgWarehouse, Warehouse};
use crate::llm::{CompletionClient, OpenAiClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub warehouse: Arc<dyn Warehouse>,
    pub completion: Arc<dyn CompletionClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let warehouse = PgWarehouse::new(&config.warehouse);

        // Run migrations if present
        if let Err(e) = warehouse.run_migrations().await {
            tracing::warn!(error = %e, "migrations failed; continuing");
        }

        let completion = OpenAiClient::new(&config.completion);

        Ok(Self::from_parts(
            Arc::new(warehouse),
            Arc::new(completion),
            Arc::new(config),
        ))
    }

    pub fn from_parts(
        warehouse: Arc<dyn Warehouse>,
        completion: Arc<dyn CompletionClient>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            warehouse,
            completion,
            config,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> Self {
        use crate::testing::{FakeCompletion, FakeWarehouse};
        Self::with_fakes(FakeWarehouse::default(), FakeCompletion::replying("fake reply"))
    }

    pub fn with_fakes(
        warehouse: crate::testing::FakeWarehouse,
        completion: crate::testing::FakeCompletion,
    ) -> Self {
        use crate::config::{CompletionConfig, JwtConfig, WarehouseConfig};

        let config = Arc::new(AppConfig {
            warehouse: WarehouseConfig {
                user: "fake".into(),
                password: "fake".into(),
                account: "localhost:5432".into(),
                database: "fake".into(),
                schema: "public".into(),
                warehouse: "fake".into(),
            },
            completion: CompletionConfig {
                api_key: "fake".into(),
                base_url: "https://fake.local/v1".into(),
                model: "fake-model".into(),
            },
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            cors_origin: "http://localhost:3000".into(),
        });
        Self::from_parts(Arc::new(warehouse), Arc::new(completion), config)
    }
}
