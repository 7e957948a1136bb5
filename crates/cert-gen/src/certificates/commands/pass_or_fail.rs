use async_trait::async_trait;
use serde::Serialize;

use crate::certificates::dates::{certificate_date, earliest_date_of_next_test};
use crate::certificates::domain::TestResult;
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

/// Printed in place of the previous seatbelt check date when none is recorded.
const NO_PREVIOUS_CHECK: &str = "\u{00A0}";

/// Core fields of the annual pass and fail certificates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassOrFailCommand;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CoreFields<'a> {
    test_number: Option<&'a str>,
    #[serde(rename = "TestStationPNumber")]
    test_station_p_number: &'a str,
    test_station_name: &'a str,
    current_odometer: CurrentOdometer<'a>,
    issuers_name: &'a str,
    date_of_the_test: String,
    country_of_registration_code: Option<&'a str>,
    vehicle_eu_classification: Option<String>,
    #[serde(rename = "RawVIN")]
    raw_vin: &'a str,
    #[serde(rename = "RawVRM")]
    raw_vrm: Option<&'a str>,
    expiry_date: Option<String>,
    earliest_date_of_the_next_test: Option<String>,
    seat_belt_tested: &'static str,
    seat_belt_previous_check_date: String,
    seat_belt_number: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CurrentOdometer<'a> {
    value: Option<u32>,
    unit: Option<&'a str>,
}

impl<'a> CoreFields<'a> {
    fn from_test_result(test_result: &'a TestResult) -> Self {
        let test_type = &test_result.test_types;

        Self {
            test_number: test_type.test_number.as_deref(),
            test_station_p_number: &test_result.test_station_p_number,
            test_station_name: &test_result.test_station_name,
            current_odometer: CurrentOdometer {
                value: test_result.odometer_reading,
                unit: test_result.odometer_reading_units.as_deref(),
            },
            issuers_name: &test_result.tester_name,
            date_of_the_test: certificate_date(test_result.test_end_timestamp.date_naive()),
            country_of_registration_code: test_result.country_of_registration.as_deref(),
            vehicle_eu_classification: test_result
                .eu_vehicle_category
                .as_deref()
                .map(str::to_uppercase),
            raw_vin: &test_result.vin,
            raw_vrm: test_result.vehicle_identifier(),
            expiry_date: test_type.test_expiry_date.map(certificate_date),
            earliest_date_of_the_next_test: test_type.test_anniversary_date.map(|anniversary| {
                certificate_date(earliest_date_of_next_test(
                    test_result.vehicle_type,
                    test_result.outcome(),
                    anniversary,
                ))
            }),
            seat_belt_tested: if test_type.seatbelt_installation_check_date == Some(true) {
                "Yes"
            } else {
                "No"
            },
            seat_belt_previous_check_date: test_type
                .last_seatbelt_installation_check_date
                .map(certificate_date)
                .unwrap_or_else(|| NO_PREVIOUS_CHECK.to_string()),
            seat_belt_number: test_type.number_of_seatbelts_fitted,
        }
    }
}

#[async_trait]
impl PayloadCommand for PassOrFailCommand {
    fn name(&self) -> &'static str {
        "pass_or_fail"
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

        let fields = CoreFields::from_test_result(test_result);
        for section in SectionKey::for_outcome(test_result.outcome()) {
            payload.insert(*section, &fields)?;
        }
        Ok(payload)
    }
}
