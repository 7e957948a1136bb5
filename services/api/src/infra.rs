use async_trait::async_trait;
use cert_gen::certificates::lookup::{
    DefectCategoryNode, HistoricTestResult, LookupError, OdometerHistory, RemoteLookup,
    TrailerRegistration,
};
use cert_gen::certificates::{TechRecord, TestResult};
use cert_gen::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Lookup data served from a local JSON file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixtures {
    /// Keyed by system number.
    #[serde(default)]
    tech_records: HashMap<String, TechRecord>,
    /// Trailer registration numbers keyed by VIN.
    #[serde(default)]
    trailer_registrations: HashMap<String, String>,
    /// Historic test results keyed by system number.
    #[serde(default)]
    test_history: HashMap<String, Vec<HistoricTestResult>>,
    #[serde(default)]
    welsh_defects: Vec<DefectCategoryNode>,
    /// Base64 signature images keyed by staff id.
    #[serde(default)]
    signatures: HashMap<String, String>,
    #[serde(default)]
    welsh_test_stations: HashSet<String>,
}

/// Fixture-backed lookup for local runs and demos. Anything absent from the
/// fixture file answers as not found.
#[derive(Debug, Default)]
pub(crate) struct FixtureLookup {
    fixtures: Fixtures,
}

impl FixtureLookup {
    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub(crate) fn from_json(raw: &str) -> Result<Self, AppError> {
        Ok(Self {
            fixtures: serde_json::from_str(raw)?,
        })
    }
}

#[async_trait]
impl RemoteLookup for FixtureLookup {
    async fn vehicle_record(&self, test_result: &TestResult) -> Result<TechRecord, LookupError> {
        self.fixtures
            .tech_records
            .get(&test_result.system_number)
            .cloned()
            .ok_or_else(|| {
                LookupError::not_found(
                    "vehicle registry",
                    format!("no tech record for {}", test_result.system_number),
                )
            })
    }

    async fn trailer_registration(
        &self,
        vin: &str,
        _make: &str,
    ) -> Result<TrailerRegistration, LookupError> {
        self.fixtures
            .trailer_registrations
            .get(vin)
            .map(TrailerRegistration::registered)
            .ok_or_else(|| LookupError::not_found("trailer registration", format!("no TRN for {vin}")))
    }

    async fn odometer_history(&self, system_number: &str) -> Result<OdometerHistory, LookupError> {
        let results = self
            .fixtures
            .test_history
            .get(system_number)
            .cloned()
            .unwrap_or_default();
        Ok(OdometerHistory::from_test_results(results))
    }

    async fn welsh_defect_dictionary(&self) -> Result<Vec<DefectCategoryNode>, LookupError> {
        if self.fixtures.welsh_defects.is_empty() {
            return Err(LookupError::Empty { service: "defects" });
        }
        Ok(self.fixtures.welsh_defects.clone())
    }

    async fn signature(&self, staff_id: &str) -> Result<Option<String>, LookupError> {
        Ok(self.fixtures.signatures.get(staff_id).cloned())
    }

    async fn test_station_is_welsh(&self, p_number: &str) -> Result<bool, LookupError> {
        Ok(self.fixtures.welsh_test_stations.contains(p_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_result() -> TestResult {
        serde_json::from_value(json!({
            "systemNumber": "10000001",
            "vin": "XMGDE02FS0H012345",
            "trailerId": "C000001",
            "vehicleType": "trl",
            "testStationName": "Abshire-Kub",
            "testStationPNumber": "09-4129632",
            "testerName": "Dorel",
            "testerStaffId": "1",
            "testStartTimestamp": "2019-01-14T10:36:33.987Z",
            "testEndTimestamp": "2019-01-14T10:36:33.987Z",
            "testTypes": {
                "testTypeId": "94",
                "testResult": "pass",
                "testTypeStartTimestamp": "2019-01-14T10:36:33.987Z"
            }
        }))
        .expect("test result parses")
    }

    fn lookup() -> FixtureLookup {
        FixtureLookup::from_json(
            &json!({
                "techRecords": {
                    "10000001": { "techRecord_make": "Schmitz", "techRecord_model": "S.KO" }
                },
                "trailerRegistrations": { "XMGDE02FS0H012345": "ABC123" },
                "signatures": { "1": "aW1hZ2U=" },
                "welshTestStations": ["09-4129632"]
            })
            .to_string(),
        )
        .expect("fixtures parse")
    }

    #[tokio::test]
    async fn serves_configured_records() {
        let lookup = lookup();
        let record = lookup
            .vehicle_record(&test_result())
            .await
            .expect("record present");
        assert_eq!(record.make.as_deref(), Some("Schmitz"));

        let registration = lookup
            .trailer_registration("XMGDE02FS0H012345", "Schmitz")
            .await
            .expect("registration present");
        assert_eq!(registration.trn.as_deref(), Some("ABC123"));

        assert_eq!(
            lookup.signature("1").await.expect("signature"),
            Some("aW1hZ2U=".to_string())
        );
        assert!(lookup
            .test_station_is_welsh("09-4129632")
            .await
            .expect("station"));
    }

    #[tokio::test]
    async fn missing_entries_answer_not_found() {
        let lookup = FixtureLookup::default();

        let err = lookup
            .vehicle_record(&test_result())
            .await
            .expect_err("no record");
        assert!(err.is_not_found());

        let err = lookup
            .trailer_registration("VIN", "Make")
            .await
            .expect_err("no registration");
        assert!(err.is_not_found());

        assert!(lookup.welsh_defect_dictionary().await.is_err());
        assert_eq!(lookup.signature("1").await.expect("signature"), None);
        assert!(lookup
            .odometer_history("10000001")
            .await
            .expect("history")
            .odometer_history_list
            .is_empty());
    }
}
