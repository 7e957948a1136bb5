use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::CertificateConfig;

use super::domain::{TestOutcome, TestResult};
use super::generator::PayloadGenerator;
use super::lookup::{LookupError, RemoteLookup};
use super::payload::CertificatePayload;
use super::resolver::{resolve, CertificateTemplate, CertificateType};

/// Service resolving the certificate for a test result and assembling its payload.
pub struct CertificateService<L> {
    lookup: Arc<L>,
    config: CertificateConfig,
}

/// Everything the document generation service needs to render a certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDocument {
    pub template: CertificateTemplate,
    pub certificate_type: CertificateType,
    pub bilingual: bool,
    pub payload: CertificatePayload,
}

impl<L> CertificateService<L>
where
    L: RemoteLookup + 'static,
{
    pub fn new(lookup: Arc<L>, config: CertificateConfig) -> Self {
        Self { lookup, config }
    }

    pub fn config(&self) -> &CertificateConfig {
        &self.config
    }

    /// Generate the certificate document for a test result. `bilingual` asks
    /// for Welsh text alongside English where the station and test allow it.
    pub async fn generate(
        &self,
        test_result: &TestResult,
        bilingual: bool,
    ) -> Result<CertificateDocument, CertificateError> {
        validate(test_result)?;
        let plan = resolve(test_result)?;
        let is_welsh = self.welsh_output(test_result, bilingual).await;

        let lookup: Arc<dyn RemoteLookup> = self.lookup.clone();
        let mut generator = PayloadGenerator::standard(lookup, &self.config);
        generator.initialise(plan.certificate_type, is_welsh);
        let payload = generator.generate(test_result).await?;

        info!(
            system_number = %test_result.system_number,
            template = %plan.template,
            bilingual = is_welsh,
            "certificate payload assembled"
        );

        Ok(CertificateDocument {
            template: plan.template,
            certificate_type: plan.certificate_type,
            bilingual: is_welsh,
            payload,
        })
    }

    async fn welsh_output(&self, test_result: &TestResult, bilingual: bool) -> bool {
        if !bilingual {
            return false;
        }

        if !self
            .config
            .welsh
            .allows(test_result.vehicle_type, test_result.outcome())
        {
            debug!(
                vehicle_type = %test_result.vehicle_type,
                outcome = %test_result.outcome(),
                "no bilingual certificate for this vehicle and outcome"
            );
            return false;
        }

        match self
            .lookup
            .test_station_is_welsh(&test_result.test_station_p_number)
            .await
        {
            Ok(is_welsh) => is_welsh,
            Err(err) => {
                warn!(
                    p_number = %test_result.test_station_p_number,
                    error = %err,
                    "unable to confirm test station location; issuing English certificate"
                );
                false
            }
        }
    }
}

/// Rejects test results missing the identifiers every certificate prints.
pub fn validate(test_result: &TestResult) -> Result<(), CertificateError> {
    let required = [
        ("systemNumber", test_result.system_number.as_str()),
        ("vin", test_result.vin.as_str()),
        ("testStationPNumber", test_result.test_station_p_number.as_str()),
        ("testerStaffId", test_result.tester_staff_id.as_str()),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(CertificateError::InvalidTestResult(format!(
                "{field} must not be empty"
            )));
        }
    }
    Ok(())
}

/// Error raised while generating a certificate payload.
#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error("invalid test result: {0}")]
    InvalidTestResult(String),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("required data missing: {0}")]
    MissingData(&'static str),
    #[error("test type {test_type_id} with result {outcome} does not produce a certificate")]
    NotCertifiable {
        test_type_id: String,
        outcome: TestOutcome,
    },
    #[error("unable to serialize payload section: {0}")]
    Serialization(#[from] serde_json::Error),
}
