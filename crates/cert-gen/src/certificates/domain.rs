use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::dates::{
    deserialize_optional_date, deserialize_optional_timestamp, deserialize_timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Psv,
    Hgv,
    Trl,
}

impl VehicleType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Psv => "psv",
            Self::Hgv => "hgv",
            Self::Trl => "trl",
        }
    }

    /// Heavy goods vehicles and trailers share the annual test calendar rules.
    pub const fn is_goods_vehicle(self) -> bool {
        matches!(self, Self::Hgv | Self::Trl)
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vehicle type '{0}'")]
pub struct UnknownVehicleType(pub String);

impl FromStr for VehicleType {
    type Err = UnknownVehicleType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "psv" => Ok(Self::Psv),
            "hgv" => Ok(Self::Hgv),
            "trl" => Ok(Self::Trl),
            other => Err(UnknownVehicleType(other.to_string())),
        }
    }
}

/// Result recorded against the test type. PRS reads as a pass with defects
/// rectified at the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Pass,
    Fail,
    Prs,
}

impl TestOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Prs => "prs",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inspection record received from the test results service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub system_number: String,
    pub vin: String,
    #[serde(default)]
    pub vrm: Option<String>,
    #[serde(default)]
    pub trailer_id: Option<String>,
    pub vehicle_type: VehicleType,
    pub test_station_name: String,
    #[serde(rename = "testStationPNumber")]
    pub test_station_p_number: String,
    #[serde(default)]
    pub test_station_type: Option<String>,
    pub tester_name: String,
    pub tester_staff_id: String,
    #[serde(default)]
    pub created_by_id: Option<String>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub test_start_timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub test_end_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub odometer_reading: Option<u32>,
    #[serde(default)]
    pub odometer_reading_units: Option<String>,
    #[serde(default)]
    pub country_of_registration: Option<String>,
    #[serde(default)]
    pub eu_vehicle_category: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub body_type: Option<BodyType>,
    pub test_types: TestType,
    #[serde(default)]
    pub test_history: Vec<TestHistoryEntry>,
}

impl TestResult {
    pub fn outcome(&self) -> TestOutcome {
        self.test_types.test_result
    }

    /// Trailers are identified by their trailer id, everything else by VRM.
    pub fn vehicle_identifier(&self) -> Option<&str> {
        match self.vehicle_type {
            VehicleType::Trl => self.trailer_id.as_deref(),
            VehicleType::Psv | VehicleType::Hgv => self.vrm.as_deref(),
        }
    }

    /// Staff id under which the tester's signature image is stored.
    pub fn signature_key(&self) -> &str {
        self.created_by_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(&self.tester_staff_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyType {
    #[serde(default)]
    pub code: Option<String>,
    pub description: String,
}

/// The single test type a certificate is generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestType {
    pub test_type_id: String,
    #[serde(default)]
    pub test_code: Option<String>,
    #[serde(default)]
    pub test_number: Option<String>,
    #[serde(default)]
    pub certificate_number: Option<String>,
    #[serde(default)]
    pub test_type_name: Option<String>,
    pub test_result: TestOutcome,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub test_type_start_timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub test_type_end_timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub test_expiry_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub test_anniversary_date: Option<NaiveDate>,
    #[serde(default)]
    pub seatbelt_installation_check_date: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub last_seatbelt_installation_check_date: Option<NaiveDate>,
    #[serde(default)]
    pub number_of_seatbelts_fitted: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub reapplication_date: Option<NaiveDate>,
    #[serde(default)]
    pub additional_notes_recorded: Option<String>,
    #[serde(default)]
    pub defects: Vec<Defect>,
    #[serde(default)]
    pub custom_defects: Vec<CustomDefect>,
    #[serde(default)]
    pub required_standards: Vec<RequiredStandard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectCategory {
    Dangerous,
    Major,
    Minor,
    Advisory,
}

impl DefectCategory {
    /// Categories arrive in mixed case from the mobile app.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dangerous" => Some(Self::Dangerous),
            "major" => Some(Self::Major),
            "minor" => Some(Self::Minor),
            "advisory" => Some(Self::Advisory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    #[serde(rename = "deficiencyRef")]
    pub reference: String,
    pub deficiency_category: String,
    pub item_description: String,
    #[serde(default)]
    pub deficiency_text: Option<String>,
    #[serde(default)]
    pub prs: bool,
    #[serde(default)]
    pub additional_information: AdditionalInformation,
}

impl Defect {
    pub fn category(&self) -> Option<DefectCategory> {
        DefectCategory::parse(&self.deficiency_category)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInformation {
    #[serde(default)]
    pub location: Option<DefectLocation>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectLocation {
    #[serde(default)]
    pub vertical: Option<String>,
    #[serde(default)]
    pub horizontal: Option<String>,
    #[serde(default)]
    pub lateral: Option<String>,
    #[serde(default)]
    pub longitudinal: Option<String>,
    #[serde(default)]
    pub row_number: Option<u32>,
    #[serde(default)]
    pub seat_number: Option<u32>,
    #[serde(default)]
    pub axle_number: Option<u32>,
}

/// Defect recorded outside the defect catalogue during IVA/MSVA inspections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDefect {
    #[serde(default)]
    pub reference_number: Option<String>,
    pub defect_name: String,
    #[serde(default)]
    pub defect_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredStandard {
    pub section_number: String,
    pub section_description: String,
    pub rs_number: u32,
    pub required_standard: String,
    pub ref_calculation: String,
    #[serde(default)]
    pub additional_info: bool,
    #[serde(default)]
    pub inspection_type_id: Option<String>,
}

/// Earlier revision of the same test result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestHistoryEntry {
    #[serde(default)]
    pub test_types: Vec<HistoricTestType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricTestType {
    #[serde(default)]
    pub test_code: Option<String>,
}

/// Flattened technical record as returned by the vehicle registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechRecord {
    #[serde(rename = "systemNumber", default)]
    pub system_number: Option<String>,
    #[serde(rename = "vin", default)]
    pub vin: Option<String>,
    #[serde(rename = "primaryVrm", default)]
    pub primary_vrm: Option<String>,
    #[serde(rename = "techRecord_vehicleType", default)]
    pub vehicle_type: Option<String>,
    #[serde(rename = "techRecord_make", default)]
    pub make: Option<String>,
    #[serde(rename = "techRecord_model", default)]
    pub model: Option<String>,
    #[serde(rename = "techRecord_chassisMake", default)]
    pub chassis_make: Option<String>,
    #[serde(rename = "techRecord_chassisModel", default)]
    pub chassis_model: Option<String>,
    #[serde(rename = "techRecord_grossDesignWeight", default)]
    pub gross_design_weight: Option<u32>,
    #[serde(rename = "techRecord_trainDesignWeight", default)]
    pub train_design_weight: Option<u32>,
    #[serde(rename = "techRecord_axles", default)]
    pub axles: Vec<TechRecordAxle>,
    #[serde(flatten)]
    pub adr: AdrDetails,
}

impl TechRecord {
    /// PSV records carry make and model against the chassis.
    pub fn make_and_model(&self, vehicle_type: VehicleType) -> (Option<&str>, Option<&str>) {
        match vehicle_type {
            VehicleType::Psv => (self.chassis_make.as_deref(), self.chassis_model.as_deref()),
            VehicleType::Hgv | VehicleType::Trl => (self.make.as_deref(), self.model.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechRecordAxle {
    #[serde(rename = "axleNumber", default)]
    pub axle_number: Option<u32>,
    #[serde(rename = "weights_designWeight", default)]
    pub design_weight: Option<u32>,
}

/// ADR fitment fields flattened onto the tech record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdrDetails {
    #[serde(rename = "techRecord_adrDetails_vehicleDetails_type", default)]
    pub vehicle_details_type: Option<String>,
    #[serde(rename = "techRecord_adrDetails_permittedDangerousGoods", default)]
    pub permitted_dangerous_goods: Vec<String>,
    #[serde(rename = "techRecord_adrDetails_additionalNotes_number", default)]
    pub guidance_notes: Vec<String>,
    #[serde(rename = "techRecord_adrDetails_adrCertificateNotes", default)]
    pub certificate_notes: Option<String>,
    #[serde(rename = "techRecord_adrDetails_brakeEndurance", default)]
    pub brake_endurance: Option<bool>,
    #[serde(rename = "techRecord_adrDetails_weight", default)]
    pub weight: Option<f64>,
    #[serde(rename = "techRecord_adrDetails_applicantDetails_name", default)]
    pub applicant_name: Option<String>,
    #[serde(rename = "techRecord_adrDetails_applicantDetails_street", default)]
    pub applicant_street: Option<String>,
    #[serde(rename = "techRecord_adrDetails_applicantDetails_town", default)]
    pub applicant_town: Option<String>,
    #[serde(rename = "techRecord_adrDetails_applicantDetails_city", default)]
    pub applicant_city: Option<String>,
    #[serde(rename = "techRecord_adrDetails_applicantDetails_postcode", default)]
    pub applicant_postcode: Option<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_tankManufacturer",
        default
    )]
    pub tank_manufacturer: Option<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_tc2Details_tc2IntermediateApprovalNo",
        default
    )]
    pub tc2_approval_number: Option<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_tankManufacturerSerialNo",
        default
    )]
    pub tank_serial_number: Option<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_yearOfManufacture",
        default
    )]
    pub tank_year_of_manufacture: Option<u32>,
    #[serde(rename = "techRecord_adrDetails_tank_tankDetails_tankCode", default)]
    pub tank_code: Option<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_specialProvisions",
        default
    )]
    pub special_provisions: Option<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_tankStatement_substancesPermitted",
        default
    )]
    pub substances_permitted: Option<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_tankStatement_statement",
        default
    )]
    pub tank_statement: Option<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_tankStatement_productListRefNo",
        default
    )]
    pub product_list_ref_no: Option<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_tankStatement_productListUnNo",
        default
    )]
    pub product_list_un_no: Vec<String>,
    #[serde(
        rename = "techRecord_adrDetails_tank_tankDetails_tankStatement_productList",
        default
    )]
    pub product_list: Option<String>,
}

impl AdrDetails {
    /// A record without an ADR vehicle type has never been through ADR fitment.
    pub fn is_present(&self) -> bool {
        self.vehicle_details_type
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
    }

    pub fn is_tank_or_battery(&self) -> bool {
        self.vehicle_details_type.as_deref().is_some_and(|value| {
            let lowered = value.to_ascii_lowercase();
            lowered.contains("tank") || lowered.contains("battery")
        })
    }
}
