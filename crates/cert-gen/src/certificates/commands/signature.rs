use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::certificates::domain::TestResult;
use crate::certificates::lookup::RemoteLookup;
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

/// Tester signature image, printed on every certificate.
pub struct SignatureCommand {
    lookup: Arc<dyn RemoteLookup>,
}

impl SignatureCommand {
    pub fn new(lookup: Arc<dyn RemoteLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl PayloadCommand for SignatureCommand {
    fn name(&self) -> &'static str {
        "signature"
    }

    async fn generate(
        &self,
        _state: &CommandState,
        test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError> {
        let staff_id = test_result.signature_key();
        let image = self.lookup.signature(staff_id).await?;
        if image.is_none() {
            debug!(staff_id, "no signature stored for tester");
        }

        let mut payload = PartialPayload::empty();
        payload.insert_raw(
            SectionKey::Signature,
            json!({ "ImageType": "png", "ImageData": image }),
        );
        Ok(payload)
    }
}
