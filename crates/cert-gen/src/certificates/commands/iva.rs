use async_trait::async_trait;
use serde::Serialize;

use crate::certificates::dates::approval_date;
use crate::certificates::domain::{CustomDefect, RequiredStandard, TestResult};
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::resolver::{is_basic_iva_test, CertificateType};
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

/// Individual Vehicle Approval fail notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct IvaCommand;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AdditionalDefect<'a> {
    defect_name: &'a str,
    defect_notes: &'a str,
}

pub(super) fn additional_defects(custom: &[CustomDefect]) -> Vec<AdditionalDefect<'_>> {
    custom
        .iter()
        .map(|defect| AdditionalDefect {
            defect_name: &defect.defect_name,
            defect_notes: defect.defect_notes.as_deref().unwrap_or_default(),
        })
        .collect()
}

/// Failed standards in the order they appear in the inspection manual.
pub(super) fn sorted_required_standards(standards: &[RequiredStandard]) -> Vec<&RequiredStandard> {
    let mut sorted: Vec<_> = standards.iter().collect();
    sorted.sort_by(|a, b| a.ref_calculation.cmp(&b.ref_calculation));
    sorted
}

/// Reapplication date in approval format, blank when none was set.
pub(super) fn reapplication_date(test_result: &TestResult) -> String {
    test_result
        .test_types
        .reapplication_date
        .map(approval_date)
        .unwrap_or_default()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IvaFailDetails<'a> {
    vin: &'a str,
    serial_number: Option<&'a str>,
    vehicle_trailer_nr_no: Option<&'a str>,
    test_category_class: Option<&'a str>,
    test_category_basic_normal: &'static str,
    make: Option<&'a str>,
    model: Option<&'a str>,
    body_type: Option<&'a str>,
    date: String,
    tester_name: &'a str,
    reapplication_date: String,
    station: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    additional_defects: Vec<AdditionalDefect<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    required_standards: Vec<&'a RequiredStandard>,
}

#[async_trait]
impl PayloadCommand for IvaCommand {
    fn name(&self) -> &'static str {
        "iva"
    }

    async fn generate(
        &self,
        state: &CommandState,
        test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError> {
        let mut payload = PartialPayload::empty();
        if state.certificate_type != CertificateType::IvaData {
            return Ok(payload);
        }

        let test_type = &test_result.test_types;
        let details = IvaFailDetails {
            vin: &test_result.vin,
            serial_number: test_result.vehicle_identifier(),
            vehicle_trailer_nr_no: test_result.vehicle_identifier(),
            test_category_class: test_result.eu_vehicle_category.as_deref(),
            test_category_basic_normal: if is_basic_iva_test(&test_type.test_type_id) {
                "Basic"
            } else {
                "Normal"
            },
            make: test_result.make.as_deref(),
            model: test_result.model.as_deref(),
            body_type: test_result
                .body_type
                .as_ref()
                .map(|body| body.description.as_str()),
            date: approval_date(test_type.test_type_start_timestamp.date_naive()),
            tester_name: &test_result.tester_name,
            reapplication_date: reapplication_date(test_result),
            station: &test_result.test_station_name,
            additional_defects: additional_defects(&test_type.custom_defects),
            required_standards: sorted_required_standards(&test_type.required_standards),
        };

        payload.insert(SectionKey::IvaData, &details)?;
        Ok(payload)
    }
}
