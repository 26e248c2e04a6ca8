//! outreach: command-line front end for `outreach_core`.
//!
//! Usage examples
//! --------------
//!
//! - Record an application
//!   $ outreach add --professor-name "Ada Lovelace" --professor-email ada@cam.ac.uk \
//!       --university Cambridge --program "PhD Computing" --country UK --deadline 2025-01-15
//!
//! - Fuzzy-search by email, keeping only US records
//!   $ outreach search alice@mit --country US
//!
//! - Mark a reply
//!   $ outreach update 3 --status done --response yes
//!
//! - Response ratio and per-country counts
//!   $ outreach stats
//!
//! The database file comes from `--db`, else `OUTREACH_DB_PATH`, else
//! `professor_applications.db` in the working directory.
mod args;

use crate::args::{ApplicationPatchArgs, CliArgs, Commands, NewApplicationArgs, SearchArgs};
use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use outreach_core::{
    default_log_level, init_logging, Application, ApplicationRecord, ApplicationStore,
    FilterField, FilterSet, IsoDate, StoreConfig,
};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)
            .map_err(anyhow::Error::msg)
            .context("failed to start logging")?;
    }

    let config = match args.db {
        Some(path) => StoreConfig::new(path),
        None => StoreConfig::from_env(),
    };
    let store = ApplicationStore::open(config.clone()).with_context(|| {
        format!("failed to open database `{}`", config.db_path().display())
    })?;

    match args.command {
        Commands::Init => {
            println!("Database ready: {}", config.db_path().display());
        }

        Commands::List { json } => {
            let records = store.get_all().context("failed to list applications")?;
            print_records(&records, json)?;
        }

        Commands::Show { id, json } => {
            let record = store
                .get(id)
                .with_context(|| format!("failed to load application {id}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_details(&record);
            }
        }

        Commands::Add(fields) => {
            let id = store
                .add(&new_application(fields))
                .context("failed to add application")?;
            println!("Added application {id}");
        }

        Commands::Update { id, fields } => {
            let current = store
                .get(id)
                .with_context(|| format!("failed to load application {id}"))?;
            let updated = apply_patch(current.application, fields)?;
            store
                .update(id, &updated)
                .with_context(|| format!("failed to update application {id}"))?;
            println!("Updated application {id}");
        }

        Commands::Delete { id } => {
            store
                .delete(id)
                .with_context(|| format!("failed to delete application {id}"))?;
            println!("Deleted application {id}");
        }

        Commands::Search(search) => {
            let json = search.json;
            let term = search.term.clone();
            let filters = search_filters(search);
            debug!(
                "event=cli_search module=cli status=start has_term={} filters={}",
                term.is_some(),
                filters.len()
            );
            let records = store
                .search(term.as_deref(), &filters)
                .context("search failed")?;
            if records.is_empty() && !json {
                println!("No applications found");
            } else {
                print_records(&records, json)?;
            }
        }

        Commands::Stats { json } => {
            let responses = store
                .response_stats()
                .context("failed to read response stats")?;
            let countries = store
                .country_stats()
                .context("failed to read country stats")?;
            if json {
                let value = serde_json::json!({
                    "responses": responses,
                    "countries": countries,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Response ({responses})");
                println!("Applications by country:");
                for country in &countries {
                    println!("  {}", country.label());
                }
            }
        }
    }

    Ok(())
}

fn new_application(fields: NewApplicationArgs) -> Application {
    let mut application = Application::new(
        fields.professor_name,
        fields.professor_email,
        fields.university_name,
        fields.program_name,
        fields.country_name,
        fields.application_last_date,
    );
    application.email_subject = non_blank(fields.email_subject);
    application.email_body = non_blank(fields.email_body);
    application.email_send_date = fields.email_send_date;
    application.status = fields.status.unwrap_or_default();
    application.response = fields.response.unwrap_or_default();
    application
}

/// Overlays the given flags on `application`.
fn apply_patch(mut application: Application, patch: ApplicationPatchArgs) -> Result<Application> {
    if let Some(value) = patch.professor_name {
        application.professor_name = value;
    }
    if let Some(value) = patch.professor_email {
        application.professor_email = value;
    }
    if let Some(value) = patch.university_name {
        application.university_name = value;
    }
    if let Some(value) = patch.program_name {
        application.program_name = value;
    }
    if let Some(value) = patch.country_name {
        application.country_name = value;
    }
    if let Some(value) = patch.application_last_date {
        application.application_last_date = value;
    }
    if let Some(value) = patch.email_subject {
        application.email_subject = non_blank(Some(value));
    }
    if let Some(value) = patch.email_body {
        application.email_body = non_blank(Some(value));
    }
    if let Some(value) = patch.email_send_date {
        application.email_send_date = match non_blank(Some(value)) {
            Some(date) => Some(
                IsoDate::parse(&date).with_context(|| format!("invalid --sent date `{date}`"))?,
            ),
            None => None,
        };
    }
    if let Some(value) = patch.status {
        application.status = value;
    }
    if let Some(value) = patch.response {
        application.response = value;
    }
    Ok(application)
}

fn search_filters(search: SearchArgs) -> FilterSet {
    let pairs = [
        (FilterField::ProfessorName, search.name),
        (FilterField::ProfessorEmail, search.email),
        (FilterField::UniversityName, search.university),
        (FilterField::ProgramName, search.program),
        (FilterField::CountryName, search.country),
        (FilterField::Status, search.status),
        (FilterField::Response, search.response),
    ];

    let mut filters = FilterSet::new();
    for (field, value) in pairs {
        if let Some(value) = value {
            filters.insert(field, value);
        }
    }
    filters
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn print_records(records: &[ApplicationRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    for record in records {
        let app = &record.application;
        println!(
            "{:>4}  {} <{}>  {} / {} ({})  deadline {}  {} / {}",
            record.id,
            app.professor_name,
            app.professor_email,
            app.university_name,
            app.program_name,
            app.country_name,
            app.application_last_date,
            app.status,
            app.response
        );
    }
    Ok(())
}

fn print_details(record: &ApplicationRecord) {
    let app = &record.application;
    println!("Application: {}", record.id);
    println!("Professor: {} <{}>", app.professor_name, app.professor_email);
    println!("University: {}", app.university_name);
    println!("Program: {}", app.program_name);
    println!("Country: {}", app.country_name);
    println!("Deadline: {}", app.application_last_date);
    println!("Subject: {}", app.email_subject.as_deref().unwrap_or("-"));
    println!(
        "Sent: {}",
        app.email_send_date
            .map(IsoDate::to_iso_string)
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Status: {}", app.status);
    println!("Response: {}", app.response);
    if let Some(body) = &app.email_body {
        println!();
        println!("{body}");
    }
}
