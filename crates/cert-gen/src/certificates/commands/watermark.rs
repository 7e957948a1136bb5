use async_trait::async_trait;
use serde_json::Value;

use crate::certificates::domain::TestResult;
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

pub struct WatermarkCommand {
    watermark: String,
}

impl WatermarkCommand {
    pub fn new(watermark: impl Into<String>) -> Self {
        Self {
            watermark: watermark.into(),
        }
    }
}

#[async_trait]
impl PayloadCommand for WatermarkCommand {
    fn name(&self) -> &'static str {
        "watermark"
    }

    async fn generate(
        &self,
        _state: &CommandState,
        _test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError> {
        let mut payload = PartialPayload::empty();
        payload.insert_raw(SectionKey::Watermark, Value::String(self.watermark.clone()));
        Ok(payload)
    }
}
