use async_trait::async_trait;
use serde::Serialize;

use crate::certificates::dates::approval_date;
use crate::certificates::domain::{RequiredStandard, TestResult};
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::resolver::CertificateType;
use crate::certificates::service::CertificateError;

use super::iva::{additional_defects, reapplication_date, sorted_required_standards, AdditionalDefect};
use super::{CommandState, PayloadCommand};

/// Motorcycle Single Vehicle Approval fail notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsvaCommand;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MsvaFailDetails<'a> {
    vin: &'a str,
    serial_number: Option<&'a str>,
    vehicle_z_number: Option<&'a str>,
    make: Option<&'a str>,
    model: Option<&'a str>,
    #[serde(rename = "type")]
    vehicle_type: &'static str,
    tester_name: &'a str,
    date: String,
    reapplication_date: String,
    station: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    additional_defects: Vec<AdditionalDefect<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    required_standards: Vec<&'a RequiredStandard>,
}

#[async_trait]
impl PayloadCommand for MsvaCommand {
    fn name(&self) -> &'static str {
        "msva"
    }

    async fn generate(
        &self,
        state: &CommandState,
        test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError> {
        let mut payload = PartialPayload::empty();
        if state.certificate_type != CertificateType::MsvaData {
            return Ok(payload);
        }

        let test_type = &test_result.test_types;
        let details = MsvaFailDetails {
            vin: &test_result.vin,
            serial_number: test_result.vehicle_identifier(),
            vehicle_z_number: test_result.vehicle_identifier(),
            make: test_result.make.as_deref(),
            model: test_result.model.as_deref(),
            vehicle_type: test_result.vehicle_type.as_str(),
            tester_name: &test_result.tester_name,
            date: approval_date(test_type.test_type_start_timestamp.date_naive()),
            reapplication_date: reapplication_date(test_result),
            station: &test_result.test_station_name,
            additional_defects: additional_defects(&test_type.custom_defects),
            required_standards: sorted_required_standards(&test_type.required_standards),
        };

        payload.insert(SectionKey::MsvaData, &details)?;
        Ok(payload)
    }
}
