use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::certificates::domain::{TestResult, VehicleType};
use crate::certificates::lookup::RemoteLookup;
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

/// Previous odometer readings. Trailers have no odometer.
pub struct OdometerHistoryCommand {
    lookup: Arc<dyn RemoteLookup>,
}

impl OdometerHistoryCommand {
    pub fn new(lookup: Arc<dyn RemoteLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl PayloadCommand for OdometerHistoryCommand {
    fn name(&self) -> &'static str {
        "odometer_history"
    }

    async fn generate(
        &self,
        state: &CommandState,
        test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError> {
        let mut payload = PartialPayload::empty();
        if !state.certificate_type.is_pass_or_fail() || test_result.vehicle_type == VehicleType::Trl
        {
            return Ok(payload);
        }

        let history = match self.lookup.odometer_history(&test_result.system_number).await {
            Ok(history) => history,
            Err(err) => {
                warn!(
                    system_number = %test_result.system_number,
                    error = %err,
                    "odometer history unavailable; certificate printed without it"
                );
                return Ok(payload);
            }
        };

        if history.odometer_history_list.is_empty() {
            return Ok(payload);
        }

        for section in SectionKey::for_outcome(test_result.outcome()) {
            payload.insert(*section, &history)?;
        }
        Ok(payload)
    }
}
