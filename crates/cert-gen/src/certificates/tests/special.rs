use super::common::*;
use serde_json::{json, Value};

use crate::certificates::{CertificateError, CertificateTemplate, SectionKey, TestOutcome};

fn with_test_type(vehicle_type: &str, outcome: &str, test_type_id: &str, extra: Value) -> Value {
    let mut value = test_result_json(vehicle_type, outcome, Vec::new());
    value["testTypes"]["testTypeId"] = json!(test_type_id);
    if let (Some(test_types), Some(extra)) =
        (value["testTypes"].as_object_mut(), extra.as_object())
    {
        test_types.extend(extra.clone());
    }
    value
}

fn adr_record(vehicle_details_type: &str) -> FakeLookup {
    FakeLookup {
        tech_record: Ok(tech_record(json!({
            "techRecord_make": "Volvo",
            "techRecord_adrDetails_vehicleDetails_type": vehicle_details_type,
            "techRecord_adrDetails_permittedDangerousGoods": ["FP <61 (FL)", "AT"],
            "techRecord_adrDetails_additionalNotes_number": ["1", "1A"],
            "techRecord_adrDetails_adrCertificateNotes": "Notes for certificate",
            "techRecord_adrDetails_brakeEndurance": true,
            "techRecord_adrDetails_weight": 7.5,
            "techRecord_adrDetails_applicantDetails_name": "Acme Haulage",
            "techRecord_adrDetails_applicantDetails_street": "1 Dock Road",
            "techRecord_adrDetails_applicantDetails_town": "Barry",
            "techRecord_adrDetails_applicantDetails_city": "Cardiff",
            "techRecord_adrDetails_applicantDetails_postcode": "CF1 1AA",
            "techRecord_adrDetails_tank_tankDetails_tankManufacturer": "Tanks Ltd",
            "techRecord_adrDetails_tank_tankDetails_tankCode": "L4BN",
            "techRecord_adrDetails_tank_tankDetails_yearOfManufacture": 2012,
            "techRecord_adrDetails_tank_tankDetails_tankStatement_substancesPermitted": "Substances permitted under the tank code",
            "techRecord_adrDetails_tank_tankDetails_tankStatement_productListUnNo": ["UN1203"]
        }))),
        ..FakeLookup::default()
    }
}

#[tokio::test]
async fn adr_pass_reads_tech_record_and_includes_tank_details() {
    let result = parse(with_test_type("hgv", "pass", "50", json!({})));

    let document = generate(adr_record("Rigid tank"), &result, false)
        .await
        .expect("adr certificate");
    let payload = &document.payload;

    assert_eq!(document.template, CertificateTemplate::AdrPass);
    assert!(!payload.contains(SectionKey::Data));
    assert!(payload.contains(SectionKey::Signature));

    let field = |name: &str| payload.field(SectionKey::AdrData, name).cloned();
    assert_eq!(field("ChasisNumber"), Some(json!("XMGDE02FS0H012345")));
    assert_eq!(field("RegistrationNumber"), Some(json!("AB12CDE")));
    assert_eq!(field("VehicleType"), Some(json!("Rigid tank")));
    assert_eq!(
        field("PermittedDangerousGoods"),
        Some(json!(["FP <61 (FL)", "AT"]))
    );
    assert_eq!(field("GuidanceNotes"), Some(json!(["1", "1A"])));
    assert_eq!(field("BrakeEndurance"), Some(json!(true)));
    assert_eq!(field("Weight"), Some(json!(7.5)));
    assert_eq!(field("ExpiryDate"), Some(json!("14.01.2020")));
    assert_eq!(field("TestTypeDate"), Some(json!("14.01.2019")));
    assert_eq!(
        field("AtfNameAtfPNumber"),
        Some(json!("Abshire-Kub 09-4129632"))
    );
    assert_eq!(
        field("ApplicantDetails"),
        Some(json!({
            "name": "Acme Haulage",
            "address1": "1 Dock Road",
            "address2": "Barry",
            "address3": "Cardiff",
            "postCode": "CF1 1AA"
        }))
    );
    assert_eq!(field("TankCode"), Some(json!("L4BN")));
    assert_eq!(field("YearOfManufacture"), Some(json!(2012)));
    assert_eq!(
        field("TankStatement")
            .and_then(|statement| statement.get("ProductListUnNo").cloned()),
        Some(json!(["UN1203"]))
    );
}

#[tokio::test]
async fn adr_non_tank_vehicle_has_no_tank_fields() {
    let result = parse(with_test_type("hgv", "pass", "59", json!({})));

    let document = generate(adr_record("Artic tractor"), &result, false)
        .await
        .expect("adr certificate");

    let adr = document
        .payload
        .section(SectionKey::AdrData)
        .expect("adr section");
    assert!(adr.get("TankManufacturer").is_none());
    assert!(adr.get("TankStatement").is_none());
}

#[tokio::test]
async fn adr_without_fitment_details_is_missing_data() {
    let result = parse(with_test_type("hgv", "pass", "50", json!({})));

    let err = generate(FakeLookup::default(), &result, false)
        .await
        .expect_err("no ADR details on record");
    assert!(matches!(err, CertificateError::MissingData(_)));
}

#[tokio::test]
async fn failed_adr_test_is_not_certifiable() {
    let result = parse(with_test_type("hgv", "fail", "50", json!({})));

    let err = generate(FakeLookup::default(), &result, false)
        .await
        .expect_err("no ADR fail certificate");
    assert!(matches!(
        err,
        CertificateError::NotCertifiable {
            outcome: TestOutcome::Fail,
            ..
        }
    ));
}

fn approval_extras() -> Value {
    json!({
        "reapplicationDate": "2019-02-14",
        "customDefects": [
            { "referenceNumber": "1", "defectName": "Rust", "defectNotes": "on the frame" }
        ],
        "requiredStandards": [
            {
                "sectionNumber": "01",
                "sectionDescription": "Noise",
                "rsNumber": 2,
                "requiredStandard": "The exhaust must be securely mounted",
                "refCalculation": "1.2",
                "additionalInfo": false
            },
            {
                "sectionNumber": "01",
                "sectionDescription": "Noise",
                "rsNumber": 1,
                "requiredStandard": "A silencer must be fitted",
                "refCalculation": "1.1",
                "additionalInfo": true,
                "inspectionTypeId": "basic"
            }
        ]
    })
}

#[tokio::test]
async fn iva_fail_notice_uses_approval_dates() {
    let mut value = with_test_type("hgv", "fail", "125", approval_extras());
    value["make"] = json!("Mercedes");
    value["model"] = json!("Actros");
    value["bodyType"] = json!({ "code": "b", "description": "box" });
    let result = parse(value);

    let document = generate(FakeLookup::default(), &result, false)
        .await
        .expect("iva notice");
    let payload = &document.payload;

    assert_eq!(document.template, CertificateTemplate::Iva30);
    let field = |name: &str| payload.field(SectionKey::IvaData, name).cloned();
    assert_eq!(field("testCategoryBasicNormal"), Some(json!("Basic")));
    assert_eq!(field("testCategoryClass"), Some(json!("n3")));
    assert_eq!(field("date"), Some(json!("14/01/2019")));
    assert_eq!(field("reapplicationDate"), Some(json!("14/02/2019")));
    assert_eq!(field("bodyType"), Some(json!("box")));
    assert_eq!(field("make"), Some(json!("Mercedes")));
    assert_eq!(field("station"), Some(json!("Abshire-Kub")));
    assert_eq!(
        field("additionalDefects"),
        Some(json!([{ "defectName": "Rust", "defectNotes": "on the frame" }]))
    );

    let refs: Vec<_> = field("requiredStandards")
        .and_then(|standards| standards.as_array().cloned())
        .unwrap_or_default()
        .iter()
        .filter_map(|standard| standard["refCalculation"].as_str().map(str::to_string))
        .collect();
    assert_eq!(refs, vec!["1.1", "1.2"]);
}

#[tokio::test]
async fn msva_fail_notice_identifies_vehicle_by_registration() {
    let result = parse(with_test_type("hgv", "fail", "133", approval_extras()));

    let document = generate(FakeLookup::default(), &result, false)
        .await
        .expect("msva notice");
    let payload = &document.payload;

    assert_eq!(document.template, CertificateTemplate::Msva30);
    let field = |name: &str| payload.field(SectionKey::MsvaData, name).cloned();
    assert_eq!(field("vehicleZNumber"), Some(json!("AB12CDE")));
    assert_eq!(field("type"), Some(json!("hgv")));
    assert_eq!(field("testerName"), Some(json!("Dorel")));
    assert!(!payload.contains(SectionKey::IvaData));
}

#[tokio::test]
async fn iva_pass_is_not_certifiable() {
    let result = parse(with_test_type("hgv", "pass", "187", json!({})));

    let err = generate(FakeLookup::default(), &result, false)
        .await
        .expect_err("no IVA pass certificate");
    assert!(matches!(err, CertificateError::NotCertifiable { .. }));
}

#[tokio::test]
async fn trailer_roadworthiness_sums_axle_weights_and_lists_failures() {
    let lookup = FakeLookup {
        tech_record: Ok(tech_record(json!({
            "techRecord_grossDesignWeight": 18000,
            "techRecord_axles": [
                { "axleNumber": 1, "weights_designWeight": 9000 },
                { "axleNumber": 2, "weights_designWeight": 8000 }
            ]
        }))),
        ..FakeLookup::default()
    };
    let mut value = with_test_type("trl", "fail", "62", json!({}));
    value["testTypes"]["defects"] = json!([power_steering_defect("major", false)]);
    let result = parse(value);

    let document = generate(lookup, &result, false)
        .await
        .expect("roadworthiness certificate");
    let payload = &document.payload;

    assert_eq!(document.template, CertificateTemplate::Rwt);
    let field = |name: &str| payload.field(SectionKey::RwtData, name).cloned();
    assert_eq!(field("Dgvw"), Some(json!(18000)));
    assert_eq!(field("Weight2"), Some(json!(17000)));
    assert_eq!(field("VehicleNumber"), Some(json!("C000001")));
    assert_eq!(field("IsTrailer"), Some(json!(true)));
    assert_eq!(field("DocumentNumber"), Some(json!("W01A00310")));
    assert_eq!(field("DateOfInspection"), Some(json!("14.01.2019")));
    assert_eq!(field("Defects"), Some(json!([GOLDEN_DEFECT])));
}

#[tokio::test]
async fn passed_roadworthiness_omits_defects() {
    let result = parse(with_test_type("hgv", "pass", "91", json!({})));

    let document = generate(FakeLookup::default(), &result, false)
        .await
        .expect("roadworthiness certificate");
    let payload = &document.payload;

    assert_eq!(payload.field(SectionKey::RwtData, "Weight2"), Some(&json!(44000)));
    assert_eq!(payload.field(SectionKey::RwtData, "IsTrailer"), Some(&json!(false)));
    assert!(payload.field(SectionKey::RwtData, "Defects").is_none());
}

#[tokio::test]
async fn roadworthiness_without_design_weight_is_missing_data() {
    let lookup = FakeLookup {
        tech_record: Ok(tech_record(json!({ "techRecord_make": "Volvo" }))),
        ..FakeLookup::default()
    };
    let result = parse(with_test_type("hgv", "pass", "62", json!({})));

    let err = generate(lookup, &result, false)
        .await
        .expect_err("missing gross design weight");
    assert!(matches!(err, CertificateError::MissingData("gross design weight")));
}
