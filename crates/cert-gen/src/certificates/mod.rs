pub mod commands;
pub mod dates;
pub mod defects;
pub mod domain;
pub mod generator;
pub mod lookup;
pub mod payload;
pub mod resolver;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use commands::{CommandState, PayloadCommand};
pub use domain::{Defect, TechRecord, TestOutcome, TestResult, VehicleType};
pub use generator::PayloadGenerator;
pub use lookup::{LookupError, OdometerHistory, RemoteLookup, TrailerRegistration};
pub use payload::{CertificatePayload, PartialPayload, SectionKey};
pub use resolver::{resolve, CertificatePlan, CertificateTemplate, CertificateType};
pub use router::certificate_router;
pub use service::{CertificateDocument, CertificateError, CertificateService};
