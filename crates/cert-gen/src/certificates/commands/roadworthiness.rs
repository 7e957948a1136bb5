use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::certificates::dates::certificate_date;
use crate::certificates::defects::format_defect;
use crate::certificates::domain::{TechRecord, TestOutcome, TestResult, VehicleType};
use crate::certificates::lookup::RemoteLookup;
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::resolver::CertificateType;
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

/// Roadworthiness certificate for goods vehicles and trailers.
pub struct RoadworthinessCommand {
    lookup: Arc<dyn RemoteLookup>,
}

impl RoadworthinessCommand {
    pub fn new(lookup: Arc<dyn RemoteLookup>) -> Self {
        Self { lookup }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RoadworthinessCertificate<'a> {
    dgvw: u32,
    weight2: u32,
    vehicle_number: Option<&'a str>,
    vin: &'a str,
    issuers_name: &'a str,
    date_of_inspection: String,
    #[serde(rename = "TestStationPNumber")]
    test_station_p_number: &'a str,
    document_number: Option<&'a str>,
    date: String,
    defects: Option<Vec<String>>,
    is_trailer: bool,
}

/// Train weight for a motor vehicle; the summed axle design weights for a trailer.
fn second_weight(record: &TechRecord, vehicle_type: VehicleType) -> Result<u32, CertificateError> {
    match vehicle_type {
        VehicleType::Trl => {
            let weights: Vec<u32> = record
                .axles
                .iter()
                .filter_map(|axle| axle.design_weight)
                .collect();
            if weights.is_empty() {
                return Err(CertificateError::MissingData("axle design weights"));
            }
            Ok(weights.into_iter().sum())
        }
        VehicleType::Hgv | VehicleType::Psv => Ok(record.train_design_weight.unwrap_or_default()),
    }
}

#[async_trait]
impl PayloadCommand for RoadworthinessCommand {
    fn name(&self) -> &'static str {
        "roadworthiness"
    }

    async fn generate(
        &self,
        state: &CommandState,
        test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError> {
        let mut payload = PartialPayload::empty();
        if state.certificate_type != CertificateType::RwtData {
            return Ok(payload);
        }

        let record = self.lookup.vehicle_record(test_result).await?;
        let dgvw = record
            .gross_design_weight
            .ok_or(CertificateError::MissingData("gross design weight"))?;

        let test_type = &test_result.test_types;
        let inspected = certificate_date(test_type.test_type_start_timestamp.date_naive());
        let defects: Option<Vec<String>> = (test_result.outcome() == TestOutcome::Fail)
            .then(|| test_type.defects.iter().map(format_defect).collect());

        let certificate = RoadworthinessCertificate {
            dgvw,
            weight2: second_weight(&record, test_result.vehicle_type)?,
            vehicle_number: test_result.vehicle_identifier(),
            vin: &test_result.vin,
            issuers_name: &test_result.tester_name,
            date_of_inspection: inspected.clone(),
            test_station_p_number: &test_result.test_station_p_number,
            document_number: test_type.certificate_number.as_deref(),
            date: inspected,
            defects,
            is_trailer: test_result.vehicle_type == VehicleType::Trl,
        };

        payload.insert(SectionKey::RwtData, &certificate)?;
        Ok(payload)
    }
}
