use futures::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

use crate::config::CertificateConfig;

use super::commands::{standard_commands, CommandState, PayloadCommand};
use super::domain::TestResult;
use super::lookup::RemoteLookup;
use super::payload::{CertificatePayload, PartialPayload};
use super::resolver::CertificateType;
use super::service::CertificateError;

/// Runs every registered command against one test result and merges the fragments.
pub struct PayloadGenerator {
    commands: Vec<Box<dyn PayloadCommand>>,
    state: CommandState,
}

impl PayloadGenerator {
    pub fn new(commands: Vec<Box<dyn PayloadCommand>>) -> Self {
        Self {
            commands,
            state: CommandState::default(),
        }
    }

    pub fn standard(lookup: Arc<dyn RemoteLookup>, config: &CertificateConfig) -> Self {
        Self::new(standard_commands(lookup, config))
    }

    pub fn initialise(&mut self, certificate_type: CertificateType, is_welsh: bool) {
        self.state = CommandState {
            certificate_type,
            is_welsh,
        };
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    /// Commands run concurrently; the first failure fails the whole payload.
    /// Fragments merge in registration order regardless of completion order.
    pub async fn generate(
        &self,
        test_result: &TestResult,
    ) -> Result<CertificatePayload, CertificateError> {
        let state = &self.state;
        let fragments = try_join_all(self.commands.iter().map(|command| async move {
            let fragment = command.generate(state, test_result).await?;
            debug!(
                command = command.name(),
                empty = fragment.is_empty(),
                "payload command finished"
            );
            Ok::<_, CertificateError>(fragment)
        }))
        .await?;

        let mut payload = PartialPayload::empty();
        for fragment in fragments {
            payload.merge(fragment);
        }
        Ok(payload.into())
    }
}
