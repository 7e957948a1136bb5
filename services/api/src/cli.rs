use crate::infra::FixtureLookup;
use crate::server;
use cert_gen::certificates::{CertificateError, CertificateService, TestResult};
use cert_gen::config::AppConfig;
use cert_gen::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "Certificate Payload Service",
    about = "Serve or generate vehicle test certificate payloads",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Generate one certificate payload and print it as JSON
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Test result JSON file
    #[arg(long)]
    pub(crate) test_result: PathBuf,
    /// Include Welsh text when the station and test allow it
    #[arg(long)]
    pub(crate) bilingual: bool,
    /// Lookup fixture file; defaults to CERT_FIXTURES_PATH
    #[arg(long)]
    pub(crate) fixtures: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Generate(args) => run_generate(args).await,
    }
}

pub(crate) async fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let fixtures = args.fixtures.or(config.certificates.fixtures_path.clone());
    let lookup = match fixtures {
        Some(path) => FixtureLookup::from_path(&path)?,
        None => FixtureLookup::default(),
    };

    let raw = std::fs::read_to_string(&args.test_result)?;
    let test_result = parse_test_result(&raw)?;

    let service = CertificateService::new(Arc::new(lookup), config.certificates);
    let document = service.generate(&test_result, args.bilingual).await?;

    let rendered = serde_json::to_string_pretty(&document).map_err(CertificateError::from)?;
    println!("{rendered}");
    Ok(())
}

fn parse_test_result(raw: &str) -> Result<TestResult, CertificateError> {
    serde_json::from_str(raw).map_err(|err| CertificateError::InvalidTestResult(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_arguments_parse() {
        let cli = Cli::try_parse_from([
            "cert-gen-api",
            "generate",
            "--test-result",
            "result.json",
            "--bilingual",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Generate(args)) => {
                assert_eq!(args.test_result, PathBuf::from("result.json"));
                assert!(args.bilingual);
                assert!(args.fixtures.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn malformed_test_result_is_invalid_input() {
        let err = parse_test_result("{\"vin\": 1}").expect_err("rejected");
        assert!(matches!(err, CertificateError::InvalidTestResult(_)));
    }
}
