use async_trait::async_trait;
use std::sync::Arc;

use crate::certificates::defects::{fetch_flat_defects, DefectBuckets, WelshRendering};
use crate::certificates::domain::TestResult;
use crate::certificates::lookup::RemoteLookup;
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

/// Defect lists for the pass and fail sections, with Welsh text when bilingual.
pub struct DefectsCommand {
    lookup: Arc<dyn RemoteLookup>,
    welsh_fetch_attempts: u8,
}

impl DefectsCommand {
    pub fn new(lookup: Arc<dyn RemoteLookup>, welsh_fetch_attempts: u8) -> Self {
        Self {
            lookup,
            welsh_fetch_attempts,
        }
    }
}

#[async_trait]
impl PayloadCommand for DefectsCommand {
    fn name(&self) -> &'static str {
        "defects"
    }

    async fn generate(
        &self,
        state: &CommandState,
        test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError> {
        let mut payload = PartialPayload::empty();
        if !state.certificate_type.is_pass_or_fail() {
            return Ok(payload);
        }

        let flat_defects = if state.is_welsh {
            fetch_flat_defects(self.lookup.as_ref(), self.welsh_fetch_attempts).await
        } else {
            Vec::new()
        };
        // An empty catalogue means the fetch gave up: no Welsh lists at all.
        let welsh = (!flat_defects.is_empty()).then(|| WelshRendering {
            vehicle_type: test_result.vehicle_type,
            flat_defects: &flat_defects,
        });

        let outcome = test_result.outcome();
        for section in SectionKey::for_outcome(outcome) {
            let buckets =
                DefectBuckets::build(&test_result.test_types.defects, outcome, *section, welsh);
            payload.insert(*section, &buckets)?;
        }
        Ok(payload)
    }
}
