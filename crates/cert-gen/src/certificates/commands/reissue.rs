use async_trait::async_trait;
use serde::Serialize;

use crate::certificates::dates::certificate_date;
use crate::certificates::domain::TestResult;
use crate::certificates::payload::{PartialPayload, SectionKey};
use crate::certificates::service::CertificateError;

use super::{CommandState, PayloadCommand};

pub const REISSUE_REASON: &str = "Replacement";

/// Marks a certificate as a replacement when the test was amended after issue.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReissueCommand;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Reissue<'a> {
    reason: &'static str,
    issuer: Option<&'a str>,
    date: Option<String>,
}

fn is_reissue(test_result: &TestResult) -> bool {
    let Some(code) = test_result.test_types.test_code.as_deref() else {
        return false;
    };
    test_result.test_history.iter().any(|entry| {
        entry
            .test_types
            .iter()
            .any(|historic| historic.test_code.as_deref() == Some(code))
    })
}

#[async_trait]
impl PayloadCommand for ReissueCommand {
    fn name(&self) -> &'static str {
        "reissue"
    }

    async fn generate(
        &self,
        state: &CommandState,
        test_result: &TestResult,
    ) -> Result<PartialPayload, CertificateError> {
        let mut payload = PartialPayload::empty();
        if !state.certificate_type.is_pass_or_fail() || !is_reissue(test_result) {
            return Ok(payload);
        }

        let reissue = Reissue {
            reason: REISSUE_REASON,
            issuer: test_result.created_by_name.as_deref(),
            date: test_result
                .created_at
                .map(|created| certificate_date(created.date_naive())),
        };
        payload.insert(SectionKey::Reissue, &reissue)?;
        Ok(payload)
    }
}
