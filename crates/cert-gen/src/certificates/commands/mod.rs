//! Payload commands. Each command owns a disjoint set of payload keys and
//! returns an empty fragment when the certificate type is not its concern.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CertificateConfig;

use super::domain::TestResult;
use super::lookup::RemoteLookup;
use super::payload::PartialPayload;
use super::resolver::CertificateType;
use super::service::CertificateError;

mod adr;
mod defects;
mod iva;
mod make_and_model;
mod msva;
mod odometer;
mod pass_or_fail;
mod reissue;
mod roadworthiness;
mod signature;
mod watermark;

pub use adr::AdrCommand;
pub use defects::DefectsCommand;
pub use iva::IvaCommand;
pub use make_and_model::MakeAndModelCommand;
pub use msva::MsvaCommand;
pub use odometer::OdometerHistoryCommand;
pub use pass_or_fail::PassOrFailCommand;
pub use reissue::ReissueCommand;
pub use roadworthiness::RoadworthinessCommand;
pub use signature::SignatureCommand;
pub use watermark::WatermarkCommand;

/// State shared by every command for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandState {
    pub certificate_type: CertificateType,
    pub is_welsh: bool,
}

impl Default for CommandState {
    fn default() -> Self {
        Self {
            certificate_type: CertificateType::PassData,
            is_welsh: false,
        }
    }
}

/// Produces one fragment of the certificate payload.
#[async_trait]
pub trait PayloadCommand: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        state: &CommandState,
        test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError>;
}

/// Commands in merge order. Later commands win on key collisions.
pub fn standard_commands(
    lookup: Arc<dyn RemoteLookup>,
    config: &CertificateConfig,
) -> Vec<Box<dyn PayloadCommand>> {
    vec![
        Box::new(PassOrFailCommand),
        Box::new(MakeAndModelCommand::new(lookup.clone())),
        Box::new(OdometerHistoryCommand::new(lookup.clone())),
        Box::new(DefectsCommand::new(
            lookup.clone(),
            config.welsh_fetch_attempts,
        )),
        Box::new(SignatureCommand::new(lookup.clone())),
        Box::new(WatermarkCommand::new(config.watermark.clone())),
        Box::new(ReissueCommand),
        Box::new(AdrCommand::new(lookup.clone())),
        Box::new(IvaCommand),
        Box::new(MsvaCommand),
        Box::new(RoadworthinessCommand::new(lookup)),
    ]
}
