use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{TestOutcome, TestResult, VehicleType};
use super::payload::SectionKey;
use super::service::CertificateError;

pub const ADR_TEST_TYPE_IDS: &[&str] = &["50", "59", "60"];
pub const ROADWORTHINESS_TEST_TYPE_IDS: &[&str] = &["62", "63", "91", "101", "122"];
pub const IVA_TEST_TYPE_IDS: &[&str] = &[
    "125", "126", "186", "187", "188", "189", "192", "193", "194", "195", "196", "197",
];
/// IVA inspections printed as "Basic" rather than "Normal".
pub const BASIC_IVA_TEST_TYPE_IDS: &[&str] = &["125", "126", "186", "188", "192", "194", "196"];
pub const MSVA_TEST_TYPE_IDS: &[&str] = &["133", "134", "135", "136", "138", "139", "140"];

/// Payload family requested from the commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateType {
    PassData,
    FailData,
    AdrData,
    IvaData,
    MsvaData,
    RwtData,
}

impl CertificateType {
    /// The standard annual certificate; commands treat pass and fail alike and
    /// pick sections from the test outcome.
    pub const fn is_pass_or_fail(self) -> bool {
        matches!(self, Self::PassData | Self::FailData)
    }
}

/// Document template rendered by the document generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificateTemplate {
    #[serde(rename = "VTP20")]
    Vtp20,
    #[serde(rename = "VTP30")]
    Vtp30,
    #[serde(rename = "VTG5")]
    Vtg5,
    #[serde(rename = "VTG5A")]
    Vtg5a,
    #[serde(rename = "VTG30")]
    Vtg30,
    #[serde(rename = "RWT")]
    Rwt,
    #[serde(rename = "ADR_PASS")]
    AdrPass,
    #[serde(rename = "IVA30")]
    Iva30,
    #[serde(rename = "MSVA30")]
    Msva30,
}

impl CertificateTemplate {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Vtp20 => "VTP20",
            Self::Vtp30 => "VTP30",
            Self::Vtg5 => "VTG5",
            Self::Vtg5a => "VTG5A",
            Self::Vtg30 => "VTG30",
            Self::Rwt => "RWT",
            Self::AdrPass => "ADR_PASS",
            Self::Iva30 => "IVA30",
            Self::Msva30 => "MSVA30",
        }
    }
}

impl fmt::Display for CertificateTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Special category a test type id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestCategory {
    Standard,
    Adr,
    Roadworthiness,
    Iva,
    Msva,
}

impl TestCategory {
    pub fn of(test_type_id: &str, vehicle_type: VehicleType) -> Self {
        let id = test_type_id.trim();
        if ADR_TEST_TYPE_IDS.contains(&id) {
            Self::Adr
        } else if ROADWORTHINESS_TEST_TYPE_IDS.contains(&id) && vehicle_type.is_goods_vehicle() {
            Self::Roadworthiness
        } else if IVA_TEST_TYPE_IDS.contains(&id) {
            Self::Iva
        } else if MSVA_TEST_TYPE_IDS.contains(&id) {
            Self::Msva
        } else {
            Self::Standard
        }
    }
}

pub fn is_basic_iva_test(test_type_id: &str) -> bool {
    BASIC_IVA_TEST_TYPE_IDS.contains(&test_type_id.trim())
}

/// What to generate for a test result and where it lands in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePlan {
    pub template: CertificateTemplate,
    pub certificate_type: CertificateType,
    pub sections: Vec<SectionKey>,
}

impl CertificatePlan {
    fn new(template: CertificateTemplate, certificate_type: CertificateType, data: &[SectionKey]) -> Self {
        let mut sections = data.to_vec();
        sections.extend([SectionKey::Signature, SectionKey::Watermark]);
        Self {
            template,
            certificate_type,
            sections,
        }
    }
}

pub fn resolve(test_result: &TestResult) -> Result<CertificatePlan, CertificateError> {
    let test_type_id = &test_result.test_types.test_type_id;
    let category = TestCategory::of(test_type_id, test_result.vehicle_type);
    resolve_plan(test_result.vehicle_type, category, test_result.outcome()).ok_or_else(|| {
        CertificateError::NotCertifiable {
            test_type_id: test_type_id.clone(),
            outcome: test_result.outcome(),
        }
    })
}

/// PRS selects the fail template while still populating both pass and fail sections.
pub fn resolve_plan(
    vehicle_type: VehicleType,
    category: TestCategory,
    outcome: TestOutcome,
) -> Option<CertificatePlan> {
    use CertificateTemplate as T;

    let plan = match category {
        TestCategory::Standard => {
            let template = match (vehicle_type, outcome) {
                (VehicleType::Psv, TestOutcome::Pass) => T::Vtp20,
                (VehicleType::Psv, _) => T::Vtp30,
                (VehicleType::Hgv, TestOutcome::Pass) => T::Vtg5,
                (VehicleType::Trl, TestOutcome::Pass) => T::Vtg5a,
                (VehicleType::Hgv | VehicleType::Trl, _) => T::Vtg30,
            };
            let certificate_type = match outcome {
                TestOutcome::Pass => CertificateType::PassData,
                TestOutcome::Fail | TestOutcome::Prs => CertificateType::FailData,
            };
            CertificatePlan::new(template, certificate_type, SectionKey::for_outcome(outcome))
        }
        TestCategory::Adr if outcome == TestOutcome::Pass => CertificatePlan::new(
            T::AdrPass,
            CertificateType::AdrData,
            &[SectionKey::AdrData],
        ),
        TestCategory::Roadworthiness => {
            CertificatePlan::new(T::Rwt, CertificateType::RwtData, &[SectionKey::RwtData])
        }
        TestCategory::Iva if outcome == TestOutcome::Fail => {
            CertificatePlan::new(T::Iva30, CertificateType::IvaData, &[SectionKey::IvaData])
        }
        TestCategory::Msva if outcome == TestOutcome::Fail => {
            CertificatePlan::new(T::Msva30, CertificateType::MsvaData, &[SectionKey::MsvaData])
        }
        TestCategory::Adr | TestCategory::Iva | TestCategory::Msva => return None,
    };

    Some(plan)
}
