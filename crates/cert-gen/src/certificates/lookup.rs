use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dates::{certificate_date, deserialize_timestamp};
use super::domain::{TechRecord, TestOutcome, TestResult};

/// Classification carried by the annual tests that appear in odometer history.
pub const ANNUAL_WITH_CERTIFICATE: &str = "Annual With Certificate";
const HISTORY_LENGTH: usize = 3;

/// Remote capabilities the payload commands depend on. Implementations wrap
/// the inter-service transport; the core only relies on these return contracts.
#[async_trait]
pub trait RemoteLookup: Send + Sync {
    async fn vehicle_record(&self, test_result: &TestResult) -> Result<TechRecord, LookupError>;

    async fn trailer_registration(
        &self,
        vin: &str,
        make: &str,
    ) -> Result<TrailerRegistration, LookupError>;

    async fn odometer_history(&self, system_number: &str) -> Result<OdometerHistory, LookupError>;

    async fn welsh_defect_dictionary(&self) -> Result<Vec<DefectCategoryNode>, LookupError>;

    /// Base64 PNG of the tester's signature, `None` when no image is stored.
    async fn signature(&self, staff_id: &str) -> Result<Option<String>, LookupError>;

    async fn test_station_is_welsh(&self, p_number: &str) -> Result<bool, LookupError>;
}

/// Error raised by a remote lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("{service} responded with status {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },
    #[error("{service} returned an empty response")]
    Empty { service: &'static str },
    #[error("{service} unreachable: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },
}

impl LookupError {
    pub fn not_found(service: &'static str, message: impl Into<String>) -> Self {
        Self::Status {
            service,
            status: 404,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrailerRegistration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trn: Option<String>,
    pub is_trailer: bool,
}

impl TrailerRegistration {
    pub fn registered(trn: impl Into<String>) -> Self {
        Self {
            trn: Some(trn.into()),
            is_trailer: true,
        }
    }

    /// Trailers the registration service has never seen still print as trailers.
    pub fn unregistered() -> Self {
        Self {
            trn: None,
            is_trailer: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OdometerHistory {
    pub odometer_history_list: Vec<OdometerHistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdometerHistoryEntry {
    pub value: Option<u32>,
    pub unit: Option<String>,
    pub date: String,
}

/// Summary of a historic test as returned by the test results service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricTestResult {
    pub test_status: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub test_end_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub odometer_reading: Option<u32>,
    #[serde(default)]
    pub odometer_reading_units: Option<String>,
    #[serde(default)]
    pub test_types: Vec<HistoricTestTypeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricTestTypeSummary {
    #[serde(default)]
    pub test_type_classification: Option<String>,
    pub test_result: TestOutcome,
}

impl HistoricTestResult {
    fn counts_towards_history(&self) -> bool {
        self.test_status.eq_ignore_ascii_case("submitted")
            && self.test_types.iter().any(|test_type| {
                test_type.test_type_classification.as_deref() == Some(ANNUAL_WITH_CERTIFICATE)
                    && matches!(test_type.test_result, TestOutcome::Pass | TestOutcome::Prs)
            })
    }
}

impl OdometerHistory {
    /// Builds the history printed on a certificate: qualifying annual tests,
    /// newest first, skipping the test being certified, at most three entries.
    pub fn from_test_results(mut results: Vec<HistoricTestResult>) -> Self {
        results.retain(HistoricTestResult::counts_towards_history);
        results.sort_by(|a, b| b.test_end_timestamp.cmp(&a.test_end_timestamp));

        let odometer_history_list = results
            .into_iter()
            .skip(1)
            .take(HISTORY_LENGTH)
            .map(|result| OdometerHistoryEntry {
                value: result.odometer_reading,
                unit: result.odometer_reading_units.as_deref().map(short_unit),
                date: certificate_date(result.test_end_timestamp.date_naive()),
            })
            .collect();

        Self {
            odometer_history_list,
        }
    }
}

fn short_unit(unit: &str) -> String {
    match unit.trim().to_ascii_lowercase().as_str() {
        "kilometres" | "kilometers" => "km".to_string(),
        "miles" => "mi".to_string(),
        other => other.to_string(),
    }
}

/// Top level of the deficiency tree served by the defects service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectCategoryNode {
    pub im_number: u32,
    pub im_description: String,
    #[serde(default)]
    pub im_description_welsh: Option<String>,
    #[serde(default)]
    pub for_vehicle_type: Vec<String>,
    #[serde(default)]
    pub items: Vec<DefectItemNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectItemNode {
    pub item_number: u32,
    pub item_description: String,
    #[serde(default)]
    pub item_description_welsh: Option<String>,
    #[serde(default)]
    pub for_vehicle_type: Vec<String>,
    #[serde(default)]
    pub deficiencies: Vec<DeficiencyNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeficiencyNode {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub deficiency_id: Option<String>,
    #[serde(default)]
    pub deficiency_sub_id: Option<String>,
    #[serde(default)]
    pub deficiency_category: Option<String>,
    #[serde(default)]
    pub deficiency_text: Option<String>,
    #[serde(default)]
    pub deficiency_text_welsh: Option<String>,
    #[serde(default)]
    pub for_vehicle_type: Vec<String>,
}
