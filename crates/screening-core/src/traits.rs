use crate::{CompanyRecord, CompanyVerdict, ScreeningError};
use async_trait::async_trait;

/// Trait for sources of candidate companies (files, upstream filters, tests)
#[async_trait]
pub trait CompanyProvider: Send + Sync {
    async fn load_universe(&self) -> Result<Vec<CompanyRecord>, ScreeningError>;
}

/// Receives per-company notifications while a screening pass runs.
///
/// The engine is synchronous; transports that need async delivery bridge
/// these callbacks through a channel.
pub trait ProgressSink: Send + Sync {
    fn on_company(&self, verdict: &CompanyVerdict);
}

/// Sink that discards all progress events.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_company(&self, _verdict: &CompanyVerdict) {}
}
