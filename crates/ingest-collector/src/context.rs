//! 파이프라인 실행 컨텍스트.

use crate::Result;
use ingest_core::PipelineConfig;
use ingest_data::{
    http::build_client, DocumentStore, MarketDataSource, MongoDocumentStore, PgRelationalStore,
    RelationalStore, YahooMarketSource,
};
use std::sync::Arc;

/// 한 번의 실행(및 데몬의 모든 실행)이 공유하는 설정, HTTP 클라이언트, 저장소.
#[derive(Clone)]
pub struct PipelineContext {
    pub config: Arc<PipelineConfig>,
    pub http: reqwest::Client,
    pub market_source: Arc<dyn MarketDataSource>,
    pub document_store: Arc<dyn DocumentStore>,
    pub relational_store: Arc<dyn RelationalStore>,
}

impl PipelineContext {
    pub fn new(
        config: PipelineConfig,
        http: reqwest::Client,
        market_source: Arc<dyn MarketDataSource>,
        document_store: Arc<dyn DocumentStore>,
        relational_store: Arc<dyn RelationalStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            http,
            market_source,
            document_store,
            relational_store,
        }
    }

    /// 설정된 MongoDB / PostgreSQL / Yahoo Finance에 연결합니다.
    pub async fn connect(config: PipelineConfig) -> Result<Self> {
        let http = build_client(&config.http)?;
        let market_source = YahooMarketSource::new()?;

        let document_store = MongoDocumentStore::connect(&config.document_store).await?;
        tracing::info!(
            database = %config.document_store.database,
            collection = %config.document_store.collection,
            "문서 저장소 연결 성공"
        );

        let relational_store = PgRelationalStore::connect(&config.database).await?;
        tracing::info!("데이터베이스 연결 성공");

        Ok(Self::new(
            config,
            http,
            Arc::new(market_source),
            Arc::new(document_store),
            Arc::new(relational_store),
        ))
    }

    /// 저장소 연결을 정리합니다.
    pub async fn close(&self) {
        self.relational_store.close().await;
    }
}
