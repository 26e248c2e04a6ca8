use clap::{Args, Parser, Subcommand};
use outreach_core::{ApplicationId, ApplicationResponse, ApplicationStatus, IsoDate};
use std::path::PathBuf;

/// CLI arguments for outreach
#[derive(Debug, Parser)]
#[command(
    name = "outreach",
    version,
    about = "Track outreach applications to professors"
)]
pub struct CliArgs {
    /// SQLite database file (default: $OUTREACH_DB_PATH, else professor_applications.db)
    #[arg(long = "db", global = true)]
    pub db: Option<PathBuf>,

    /// Absolute directory for rolling log files; no file logging when omitted
    #[arg(long = "log-dir", global = true)]
    pub log_dir: Option<String>,

    /// Log level used with --log-dir (trace|debug|info|warn|error)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database and schema if missing
    Init,

    /// List every application
    List {
        /// Print JSON instead of one line per record
        #[arg(long)]
        json: bool,
    },

    /// Show one application in full
    Show {
        id: ApplicationId,
        #[arg(long)]
        json: bool,
    },

    /// Add an application and print its id
    Add(NewApplicationArgs),

    /// Change fields of an existing application; omitted fields keep their value
    Update {
        id: ApplicationId,
        #[command(flatten)]
        fields: ApplicationPatchArgs,
    },

    /// Delete an application (unknown ids are ignored)
    Delete { id: ApplicationId },

    /// Fuzzy-search professor emails, then narrow by exact field filters
    Search(SearchArgs),

    /// Show the yes-response ratio and applications per country
    Stats {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct NewApplicationArgs {
    #[arg(long = "professor-name")]
    pub professor_name: String,

    #[arg(long = "professor-email")]
    pub professor_email: String,

    #[arg(long = "university")]
    pub university_name: String,

    #[arg(long = "program")]
    pub program_name: String,

    #[arg(long = "country")]
    pub country_name: String,

    /// Application deadline (YYYY-MM-DD)
    #[arg(long = "deadline")]
    pub application_last_date: IsoDate,

    #[arg(long = "subject")]
    pub email_subject: Option<String>,

    #[arg(long = "body")]
    pub email_body: Option<String>,

    /// Date the email was sent (YYYY-MM-DD)
    #[arg(long = "sent")]
    pub email_send_date: Option<IsoDate>,

    /// pending or done
    #[arg(long = "status")]
    pub status: Option<ApplicationStatus>,

    /// no, yes or partial
    #[arg(long = "response")]
    pub response: Option<ApplicationResponse>,
}

/// Same fields as [`NewApplicationArgs`], all optional.
///
/// An empty `--subject`, `--body` or `--sent` clears the stored value.
#[derive(Debug, Default, Args)]
pub struct ApplicationPatchArgs {
    #[arg(long = "professor-name")]
    pub professor_name: Option<String>,

    #[arg(long = "professor-email")]
    pub professor_email: Option<String>,

    #[arg(long = "university")]
    pub university_name: Option<String>,

    #[arg(long = "program")]
    pub program_name: Option<String>,

    #[arg(long = "country")]
    pub country_name: Option<String>,

    #[arg(long = "deadline")]
    pub application_last_date: Option<IsoDate>,

    #[arg(long = "subject")]
    pub email_subject: Option<String>,

    #[arg(long = "body")]
    pub email_body: Option<String>,

    #[arg(long = "sent")]
    pub email_send_date: Option<String>,

    #[arg(long = "status")]
    pub status: Option<ApplicationStatus>,

    #[arg(long = "response")]
    pub response: Option<ApplicationResponse>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text term matched against professor emails
    pub term: Option<String>,

    /// Professor name equals (contains when no term is given)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub university: Option<String>,

    #[arg(long)]
    pub program: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub response: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, Commands};
    use clap::Parser;
    use outreach_core::ApplicationStatus;

    #[test]
    fn parses_add_with_typed_fields() {
        let args = CliArgs::try_parse_from([
            "outreach",
            "--db",
            "/tmp/a.db",
            "add",
            "--professor-name",
            "Ada",
            "--professor-email",
            "ada@cam.ac.uk",
            "--university",
            "Cambridge",
            "--program",
            "PhD",
            "--country",
            "UK",
            "--deadline",
            "2025-01-15",
            "--status",
            "Done",
        ])
        .unwrap();

        assert_eq!(args.db.unwrap().to_str(), Some("/tmp/a.db"));
        match args.command {
            Commands::Add(add) => {
                assert_eq!(add.application_last_date.to_string(), "2025-01-15");
                assert_eq!(add.status, Some(ApplicationStatus::Done));
                assert_eq!(add.response, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_deadline() {
        let result = CliArgs::try_parse_from([
            "outreach",
            "add",
            "--professor-name",
            "Ada",
            "--professor-email",
            "ada@cam.ac.uk",
            "--university",
            "Cambridge",
            "--program",
            "PhD",
            "--country",
            "UK",
            "--deadline",
            "2025-02-30",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn search_term_is_optional() {
        let args = CliArgs::try_parse_from(["outreach", "search", "--country", "US"]).unwrap();
        match args.command {
            Commands::Search(search) => {
                assert_eq!(search.term, None);
                assert_eq!(search.country.as_deref(), Some("US"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_db_flag_is_accepted_after_subcommand() {
        let args = CliArgs::try_parse_from(["outreach", "stats", "--db", "x.db"]).unwrap();
        assert!(args.db.is_some());
        assert!(matches!(args.command, Commands::Stats { json: false }));
    }
}
