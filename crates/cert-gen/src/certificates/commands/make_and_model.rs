use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::certificates::domain::{TestResult, VehicleType};
use crate::certificates::lookup::{RemoteLookup, TrailerRegistration};
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

/// Make and model from the tech record, plus the trailer registration for trailers.
pub struct MakeAndModelCommand {
    lookup: Arc<dyn RemoteLookup>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MakeAndModel<'a> {
    make: Option<&'a str>,
    model: Option<&'a str>,
    #[serde(flatten)]
    trailer: Option<TrailerRegistration>,
}

impl MakeAndModelCommand {
    pub fn new(lookup: Arc<dyn RemoteLookup>) -> Self {
        Self { lookup }
    }

    async fn trailer_registration(
        &self,
        vin: &str,
        make: &str,
    ) -> Result<TrailerRegistration, CertificateError> {
        match self.lookup.trailer_registration(vin, make).await {
            Ok(registration) => Ok(registration),
            Err(err) if err.is_not_found() => {
                debug!(vin, "trailer not registered; printing without a TRN");
                Ok(TrailerRegistration::unregistered())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl PayloadCommand for MakeAndModelCommand {
    fn name(&self) -> &'static str {
        "make_and_model"
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

        let record = self.lookup.vehicle_record(test_result).await?;
        let (make, model) = record.make_and_model(test_result.vehicle_type);
        let make = make.filter(|make| !make.trim().is_empty());

        let trailer = match (test_result.vehicle_type, make) {
            (VehicleType::Trl, Some(make)) => {
                Some(self.trailer_registration(&test_result.vin, make).await?)
            }
            _ => None,
        };

        let fields = MakeAndModel {
            make,
            model,
            trailer,
        };
        for section in SectionKey::for_outcome(test_result.outcome()) {
            payload.insert(*section, &fields)?;
        }
        Ok(payload)
    }
}
