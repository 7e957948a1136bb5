use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::certificates::domain::{TechRecord, TestResult};
use crate::certificates::lookup::{
    DefectCategoryNode, LookupError, OdometerHistory, OdometerHistoryEntry, RemoteLookup,
    TrailerRegistration,
};
use crate::certificates::{CertificateDocument, CertificateError, CertificateService};
use crate::config::CertificateConfig;

pub(super) const GOLDEN_DEFECT: &str = "54.1.a.ii Power steering: not working correctly and obviously affects steering control. Axles: 7. Inner Offside. Asdasd";
pub(super) const GOLDEN_DEFECT_WELSH: &str =
    "54.1.a.ii Llywio pŵer: ddim yn gweithio'n gywir. Echelau: 7. Mewnol Ochr allanol. Asdasd";

/// Canned lookup responses plus a log of which lookups were made.
pub(super) struct FakeLookup {
    pub(super) tech_record: Result<TechRecord, LookupError>,
    pub(super) trailer: Result<TrailerRegistration, LookupError>,
    pub(super) odometer: Result<OdometerHistory, LookupError>,
    pub(super) welsh_dictionary: Result<Vec<DefectCategoryNode>, LookupError>,
    pub(super) signature: Result<Option<String>, LookupError>,
    pub(super) welsh_station: Result<bool, LookupError>,
    pub(super) log: Mutex<Vec<&'static str>>,
}

impl Default for FakeLookup {
    fn default() -> Self {
        Self {
            tech_record: Ok(tech_record(json!({
                "techRecord_make": "Volvo",
                "techRecord_model": "FH",
                "techRecord_chassisMake": "Plaxton",
                "techRecord_chassisModel": "Elite",
                "techRecord_grossDesignWeight": 26000,
                "techRecord_trainDesignWeight": 44000
            }))),
            trailer: Ok(TrailerRegistration::registered("ABC123")),
            odometer: Ok(OdometerHistory {
                odometer_history_list: vec![OdometerHistoryEntry {
                    value: Some(350_000),
                    unit: Some("km".to_string()),
                    date: "14.01.2018".to_string(),
                }],
            }),
            welsh_dictionary: Ok(welsh_dictionary()),
            signature: Ok(Some("c2lnbmF0dXJl".to_string())),
            welsh_station: Ok(false),
            log: Mutex::new(Vec::new()),
        }
    }
}

impl FakeLookup {
    pub(super) fn calls(&self, name: &str) -> usize {
        self.log
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|call| **call == name)
            .count()
    }

    fn record(&self, name: &'static str) {
        self.log.lock().expect("calls lock").push(name);
    }
}

#[async_trait]
impl RemoteLookup for FakeLookup {
    async fn vehicle_record(&self, _test_result: &TestResult) -> Result<TechRecord, LookupError> {
        self.record("vehicle_record");
        self.tech_record.clone()
    }

    async fn trailer_registration(
        &self,
        _vin: &str,
        _make: &str,
    ) -> Result<TrailerRegistration, LookupError> {
        self.record("trailer_registration");
        self.trailer.clone()
    }

    async fn odometer_history(&self, _system_number: &str) -> Result<OdometerHistory, LookupError> {
        self.record("odometer_history");
        self.odometer.clone()
    }

    async fn welsh_defect_dictionary(&self) -> Result<Vec<DefectCategoryNode>, LookupError> {
        self.record("welsh_defect_dictionary");
        self.welsh_dictionary.clone()
    }

    async fn signature(&self, _staff_id: &str) -> Result<Option<String>, LookupError> {
        self.record("signature");
        self.signature.clone()
    }

    async fn test_station_is_welsh(&self, _p_number: &str) -> Result<bool, LookupError> {
        self.record("test_station_is_welsh");
        self.welsh_station.clone()
    }
}

pub(super) fn tech_record(value: Value) -> TechRecord {
    serde_json::from_value(value).expect("tech record parses")
}

pub(super) fn service(lookup: FakeLookup) -> (CertificateService<FakeLookup>, Arc<FakeLookup>) {
    let lookup = Arc::new(lookup);
    let service = CertificateService::new(lookup.clone(), CertificateConfig::default());
    (service, lookup)
}

pub(super) async fn generate(
    lookup: FakeLookup,
    test_result: &TestResult,
    bilingual: bool,
) -> Result<CertificateDocument, CertificateError> {
    let (service, _) = service(lookup);
    service.generate(test_result, bilingual).await
}

/// Defect rendered as the golden certificate line.
pub(super) fn power_steering_defect(category: &str, prs: bool) -> Value {
    json!({
        "deficiencyRef": "54.1.a.ii",
        "deficiencyCategory": category,
        "itemDescription": "Power steering:",
        "deficiencyText": "not working correctly and obviously affects steering control.",
        "prs": prs,
        "additionalInformation": {
            "location": {
                "axleNumber": 7,
                "horizontal": "inner",
                "lateral": "offside"
            },
            "notes": "Asdasd"
        }
    })
}

pub(super) fn minor_defect() -> Value {
    json!({
        "deficiencyRef": "1.1.b",
        "deficiencyCategory": "minor",
        "itemDescription": "A registration plate:",
        "deficiencyText": "insecure.",
        "prs": false
    })
}

pub(super) fn test_result_json(vehicle_type: &str, outcome: &str, defects: Vec<Value>) -> Value {
    json!({
        "systemNumber": "10000001",
        "vin": "XMGDE02FS0H012345",
        "vrm": "AB12CDE",
        "trailerId": "C000001",
        "vehicleType": vehicle_type,
        "testStationName": "Abshire-Kub",
        "testStationPNumber": "09-4129632",
        "testerName": "Dorel",
        "testerStaffId": "1",
        "createdById": "2",
        "createdByName": "Dorel Amend",
        "createdAt": "2020-02-01T09:00:00.000Z",
        "testStartTimestamp": "2019-01-14T10:36:33.987Z",
        "testEndTimestamp": "2019-01-14T10:36:33.987Z",
        "odometerReading": 350000,
        "odometerReadingUnits": "kilometres",
        "countryOfRegistration": "gb",
        "euVehicleCategory": "n3",
        "testTypes": {
            "testTypeId": "94",
            "testCode": "aat",
            "testNumber": "W01A00310",
            "certificateNumber": "W01A00310",
            "testResult": outcome,
            "testTypeStartTimestamp": "2019-01-14T10:36:33.987Z",
            "testTypeEndTimestamp": "2019-01-14T10:36:33.987Z",
            "testExpiryDate": "2020-01-14",
            "testAnniversaryDate": "2020-01-15",
            "seatbeltInstallationCheckDate": true,
            "lastSeatbeltInstallationCheckDate": "2019-01-14",
            "numberOfSeatbeltsFitted": 2,
            "defects": defects
        }
    })
}

pub(super) fn test_result(vehicle_type: &str, outcome: &str, defects: Vec<Value>) -> TestResult {
    parse(test_result_json(vehicle_type, outcome, defects))
}

pub(super) fn parse(value: Value) -> TestResult {
    serde_json::from_value(value).expect("test result parses")
}

pub(super) fn welsh_dictionary() -> Vec<DefectCategoryNode> {
    serde_json::from_value(json!([{
        "imNumber": 54,
        "imDescription": "Steering",
        "imDescriptionWelsh": "Llywio",
        "forVehicleType": ["psv", "hgv", "trl"],
        "items": [{
            "itemNumber": 1,
            "itemDescription": "Power steering:",
            "itemDescriptionWelsh": "Llywio pŵer:",
            "deficiencies": [{
                "ref": "54.1.a.ii",
                "deficiencyId": "a",
                "deficiencySubId": "ii",
                "deficiencyCategory": "dangerous",
                "deficiencyText": "not working correctly and obviously affects steering control.",
                "deficiencyTextWelsh": "ddim yn gweithio'n gywir."
            }]
        }]
    }]))
    .expect("dictionary parses")
}
