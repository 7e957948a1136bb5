use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::certificates::dates::certificate_date;
use crate::certificates::domain::{AdrDetails, TestResult};
use crate::certificates::lookup::RemoteLookup;
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::resolver::CertificateType;
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

/// ADR dangerous goods certificate contents, read from the tech record.
pub struct AdrCommand {
    lookup: Arc<dyn RemoteLookup>,
}

impl AdrCommand {
    pub fn new(lookup: Arc<dyn RemoteLookup>) -> Self {
        Self { lookup }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AdrCertificate<'a> {
    chasis_number: &'a str,
    registration_number: Option<&'a str>,
    applicant_details: ApplicantDetails<'a>,
    vehicle_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    permitted_dangerous_goods: Vec<&'a str>,
    brake_endurance: Option<bool>,
    weight: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    guidance_notes: Vec<&'a str>,
    adr_certificate_notes: Option<&'a str>,
    expiry_date: Option<String>,
    #[serde(rename = "AtfNameAtfPNumber")]
    atf_name_atf_p_number: String,
    notes: Option<&'a str>,
    test_type_date: String,
    #[serde(flatten)]
    tank: Option<TankDetails<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicantDetails<'a> {
    name: Option<&'a str>,
    address1: Option<&'a str>,
    address2: Option<&'a str>,
    address3: Option<&'a str>,
    post_code: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TankDetails<'a> {
    tank_manufacturer: Option<&'a str>,
    tc2_init_approval_no: Option<&'a str>,
    tank_manufacture_serial_no: Option<&'a str>,
    year_of_manufacture: Option<u32>,
    tank_code: Option<&'a str>,
    special_provisions: Option<&'a str>,
    tank_statement: TankStatement<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TankStatement<'a> {
    substances_permitted: Option<&'a str>,
    statement: Option<&'a str>,
    product_list_ref_no: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    product_list_un_no: Vec<&'a str>,
    product_list: Option<&'a str>,
}

impl<'a> TankDetails<'a> {
    fn from_adr(adr: &'a AdrDetails) -> Option<Self> {
        if !adr.is_tank_or_battery() {
            return None;
        }

        Some(Self {
            tank_manufacturer: adr.tank_manufacturer.as_deref(),
            tc2_init_approval_no: adr.tc2_approval_number.as_deref(),
            tank_manufacture_serial_no: adr.tank_serial_number.as_deref(),
            year_of_manufacture: adr.tank_year_of_manufacture,
            tank_code: adr.tank_code.as_deref(),
            special_provisions: adr.special_provisions.as_deref(),
            tank_statement: TankStatement {
                substances_permitted: adr.substances_permitted.as_deref(),
                statement: adr.tank_statement.as_deref(),
                product_list_ref_no: adr.product_list_ref_no.as_deref(),
                product_list_un_no: adr.product_list_un_no.iter().map(String::as_str).collect(),
                product_list: adr.product_list.as_deref(),
            },
        })
    }
}

#[async_trait]
impl PayloadCommand for AdrCommand {
    fn name(&self) -> &'static str {
        "adr"
    }

    async fn generate(
        &self,
        state: &CommandState,
        test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError> {
        let mut payload = PartialPayload::empty();
        if state.certificate_type != CertificateType::AdrData {
            return Ok(payload);
        }

        let record = self.lookup.vehicle_record(test_result).await?;
        let adr = &record.adr;
        if !adr.is_present() {
            return Err(CertificateError::MissingData("ADR details"));
        }

        let test_type = &test_result.test_types;
        let certificate = AdrCertificate {
            chasis_number: &test_result.vin,
            registration_number: test_result.vehicle_identifier(),
            applicant_details: ApplicantDetails {
                name: adr.applicant_name.as_deref(),
                address1: adr.applicant_street.as_deref(),
                address2: adr.applicant_town.as_deref(),
                address3: adr.applicant_city.as_deref(),
                post_code: adr.applicant_postcode.as_deref(),
            },
            vehicle_type: adr.vehicle_details_type.as_deref(),
            permitted_dangerous_goods: adr
                .permitted_dangerous_goods
                .iter()
                .map(String::as_str)
                .collect(),
            brake_endurance: adr.brake_endurance,
            weight: adr.weight,
            guidance_notes: adr.guidance_notes.iter().map(String::as_str).collect(),
            adr_certificate_notes: adr.certificate_notes.as_deref(),
            expiry_date: test_type.test_expiry_date.map(certificate_date),
            atf_name_atf_p_number: format!(
                "{} {}",
                test_result.test_station_name, test_result.test_station_p_number
            ),
            notes: test_type.additional_notes_recorded.as_deref(),
            test_type_date: certificate_date(test_type.test_type_start_timestamp.date_naive()),
            tank: TankDetails::from_adr(adr),
        };

        payload.insert(SectionKey::AdrData, &certificate)?;
        Ok(payload)
    }
}
