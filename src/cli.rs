//! Command-line options for the `closeout` binary.

use crate::application::{AppOptions, FeatureFlags, SessionContext};
use crate::domain::Pounds;
use crate::infrastructure::{ApiClient, DocumentSource, FileRepository, SourceError, SourceResult};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "closeout.log";

#[derive(Parser, Debug)]
#[command(name = "closeout", version, about = "Document and submit a PPM closeout")]
#[command(group(ArgGroup::new("source").required(true).args(["data", "api_url"])))]
pub struct Cli {
    #[arg(long, help = "Closeout JSON file to read and update")]
    pub data: Option<PathBuf>,
    #[arg(long, requires = "shipment_id", help = "Base URL of the closeout API")]
    pub api_url: Option<String>,
    #[arg(long, help = "PPM shipment id (with --api-url)")]
    pub shipment_id: Option<String>,
    #[arg(
        long,
        requires = "api_url",
        help = "Orders id to read weight allowances from (with --api-url)"
    )]
    pub orders_id: Option<String>,
    #[arg(long, help = "Signed-in user shown in the header")]
    pub user: Option<String>,
    #[arg(long, help = "GBLOC selected for this session")]
    pub gbloc: Option<String>,
    #[arg(long, help = "Open on the final page without allowing changes")]
    pub read_only: bool,
    #[arg(long, help = "Include the gun safe page and review section")]
    pub enable_gun_safe: bool,
    #[arg(long, value_name = "LBS", help = "Pro-gear allowance for the service member")]
    pub pro_gear_weight: Option<i64>,
    #[arg(long, value_name = "LBS", help = "Pro-gear allowance for the spouse")]
    pub spouse_pro_gear_weight: Option<i64>,
    #[arg(long, default_value = DEFAULT_LOG_FILE, help = "Where log output goes")]
    pub log_file: PathBuf,
    #[arg(long, conflicts_with = "export_csv", help = "Print the closeout summary and exit")]
    pub summary: bool,
    #[arg(long, value_name = "FILE", help = "Write the summary and review as CSV and exit")]
    pub export_csv: Option<PathBuf>,
}

impl Cli {
    /// Opens the document source named on the command line.
    pub fn open_source(&self) -> SourceResult<Box<dyn DocumentSource>> {
        match (&self.data, &self.api_url) {
            (Some(path), _) => Ok(Box::new(FileRepository::new(path.clone()))),
            (None, Some(url)) => {
                let id = self.shipment_id.as_deref().unwrap_or_default();
                let client = ApiClient::new(url, id)?;
                Ok(match &self.orders_id {
                    Some(orders_id) => Box::new(client.with_orders(orders_id)),
                    None => Box::new(client),
                })
            }
            (None, None) => Err(SourceError::NotFound("document source".to_string())),
        }
    }

    pub fn session(&self) -> SessionContext {
        let mut session = SessionContext::new();
        if let Some(user) = &self.user {
            session.login(user.clone());
        }
        if let Some(gbloc) = &self.gbloc {
            session.select_gbloc(gbloc.clone());
        }
        session
    }

    pub fn options(&self) -> AppOptions {
        AppOptions {
            read_only: self.read_only,
            features: FeatureFlags {
                gun_safe: self.enable_gun_safe,
            },
            pro_gear_weight: self.pro_gear_weight.map(Pounds),
            spouse_pro_gear_weight: self.spouse_pro_gear_weight.map(Pounds),
        }
    }

    /// Whether the run prints or exports instead of opening the terminal UI.
    pub fn is_batch(&self) -> bool {
        self.summary || self.export_csv.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source() {
        let cli = Cli::try_parse_from(["closeout", "--data", "move.json"]).unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("move.json")));
        assert_eq!(cli.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert!(!cli.is_batch());
    }

    #[test]
    fn test_a_source_is_required() {
        assert!(Cli::try_parse_from(["closeout"]).is_err());
        let both = ["closeout", "--data", "a.json", "--api-url", "http://x"];
        assert!(Cli::try_parse_from(both).is_err());
    }

    #[test]
    fn test_api_needs_shipment_id() {
        assert!(Cli::try_parse_from(["closeout", "--api-url", "http://localhost"]).is_err());
        let cli = Cli::try_parse_from([
            "closeout",
            "--api-url",
            "http://localhost",
            "--shipment-id",
            "ppm-1",
        ])
        .unwrap();
        assert_eq!(cli.shipment_id.as_deref(), Some("ppm-1"));
    }

    #[test]
    fn test_orders_id_needs_api() {
        let file_source = ["closeout", "--data", "a.json", "--orders-id", "ord-7"];
        assert!(Cli::try_parse_from(file_source).is_err());
        let cli = Cli::try_parse_from([
            "closeout",
            "--api-url",
            "http://localhost",
            "--shipment-id",
            "ppm-1",
            "--orders-id",
            "ord-7",
        ])
        .unwrap();
        assert_eq!(cli.orders_id.as_deref(), Some("ord-7"));
    }

    #[test]
    fn test_options_from_flags() {
        let cli = Cli::try_parse_from(["closeout", "--data", "a.json"]).unwrap();
        assert_eq!(cli.options(), AppOptions::default());

        let cli = Cli::try_parse_from([
            "closeout",
            "--data",
            "a.json",
            "--read-only",
            "--enable-gun-safe",
            "--spouse-pro-gear-weight",
            "300",
        ])
        .unwrap();
        let options = cli.options();
        assert!(options.read_only);
        assert!(options.features.gun_safe);
        assert_eq!(options.pro_gear_weight, None);
        assert_eq!(options.spouse_pro_gear_weight, Some(Pounds(300)));
    }

    #[test]
    fn test_session_from_flags() {
        let cli = Cli::try_parse_from([
            "closeout", "--data", "a.json", "--user", "jdoe", "--gbloc", "KKFA",
        ])
        .unwrap();
        let session = cli.session();
        assert_eq!(session.user(), Some("jdoe"));
        assert_eq!(session.selected_gbloc(), Some("KKFA"));
    }

    #[test]
    fn test_batch_flags() {
        let args = ["closeout", "--data", "a.json", "--export-csv", "out.csv"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.is_batch());
        let both = ["closeout", "--data", "a.json", "--summary", "--export-csv", "out.csv"];
        assert!(Cli::try_parse_from(both).is_err());
    }
}
