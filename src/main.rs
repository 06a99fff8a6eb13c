//! Pay-Transparency Complaint Assembler - Command Line Interface
//! Author: kartik4091
//! Created: 2025-06-06
//!
//! Fills the complaint form from command line values or a record file, attaches
//! the addendum and redacted evidence, and writes one PDF.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::Ordering;
use std::time::Instant;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command, ValueEnum};
use epoa::utils::default_output_name;
use epoa::{
    Address, Assembler, AssemblerConfig, ComplaintRecord, Error, MergeBackend, MyInfo,
    RedactionFailurePolicy,
};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages
    Warn,
    /// Info, warning, and error messages (default)
    Info,
    /// Debug and all messages
    Debug,
    /// Trace and all messages (most verbose)
    Trace,
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches
        .get_one::<LogLevel>("verbose")
        .copied()
        .unwrap_or(LogLevel::Info);
    init_logging(log_level);

    info!(
        "🚀 Pay-Transparency Complaint Assembler v{} - Starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = match build_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let record = match build_record(&matches) {
        Ok(record) => record,
        Err(e) => {
            error!("❌ {}", e);
            process::exit(1);
        }
    };

    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| {
            PathBuf::from(default_output_name(
                &record,
                chrono::Local::now().date_naive(),
            ))
        });

    if output.exists() && !config.overwrite {
        error!("❌ Output file already exists: {}", output.display());
        error!("   Use --overwrite to replace existing files");
        process::exit(1);
    }

    display_summary(&config, &record, &output);

    let assembler = Assembler::new(config);
    let cancel = assembler.cancellation();
    let start_time = Instant::now();

    let mut task = tokio::task::spawn_blocking(move || assembler.assemble(&record, &output));
    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            warn!("🛑 Interrupt received, stopping at the next stage");
            cancel.store(true, Ordering::SeqCst);
            task.await
        }
    };

    match joined {
        Ok(Ok(path)) => {
            info!(
                "✅ Complaint written to {} in {:.2?}",
                path.display(),
                start_time.elapsed()
            );
        }
        Ok(Err(Error::Cancelled)) => {
            error!("❌ Assembly cancelled, no output written");
            process::exit(130);
        }
        Ok(Err(e)) => {
            error!("❌ Assembly failed: {}", e);
            process::exit(1);
        }
        Err(e) => {
            error!("❌ Assembly task failed: {}", e);
            process::exit(1);
        }
    }
}

fn build_cli() -> Command {
    Command::new("epoa")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Assemble a pay transparency complaint: fill the form, attach and redact evidence")
        .long_about(
            "Fills the complaint form template, renders any additional information as an \
             addendum page, redacts the given words from evidence documents and concatenates \
             everything into a single PDF.",
        )
        // Complaint
        .arg(Arg::new("company-name")
            .value_name("COMPANY")
            .help("Name of the company the complaint is about")
            .required_unless_present("record"))

        .arg(Arg::new("evidence")
            .value_name("EVIDENCE")
            .num_args(0..)
            .value_parser(value_parser!(PathBuf))
            .help("Evidence file(s), attached in the order given"))

        .arg(Arg::new("record")
            .long("record")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Complaint record file (JSON/YAML); other options override its values"))

        // Complainant
        .arg(Arg::new("name")
            .short('n')
            .long("name")
            .value_name("NAME")
            .help("Your name; omit to file anonymously"))

        .arg(Arg::new("email")
            .short('e')
            .long("email")
            .value_name("EMAIL")
            .help("Your email address"))

        .arg(Arg::new("phone")
            .short('p')
            .long("phone")
            .value_name("PHONE")
            .help("Your phone number"))

        .arg(Arg::new("street").long("street").value_name("STREET").help("Your mailing address street"))
        .arg(Arg::new("city").long("city").value_name("CITY").help("Your mailing address city"))
        .arg(Arg::new("state").long("state").value_name("STATE").help("Your mailing address state"))
        .arg(Arg::new("zip").long("zip").value_name("ZIP").help("Your mailing address zip code"))

        // Company
        .arg(Arg::new("company-email")
            .long("company-email")
            .value_name("EMAIL")
            .help("Company email address"))

        .arg(Arg::new("company-phone")
            .long("company-phone")
            .value_name("PHONE")
            .help("Company phone number"))

        .arg(Arg::new("company-street").long("company-street").value_name("STREET").help("Company mailing address street"))
        .arg(Arg::new("company-city").long("company-city").value_name("CITY").help("Company mailing address city"))
        .arg(Arg::new("company-state").long("company-state").value_name("STATE").help("Company mailing address state"))
        .arg(Arg::new("company-zip").long("company-zip").value_name("ZIP").help("Company mailing address zip code"))

        .arg(Arg::new("additional-information")
            .short('i')
            .long("additional-information")
            .visible_alias("addinfo")
            .value_name("TEXT")
            .help("Additional complaint information, rendered as an addendum page"))

        .arg(Arg::new("redact")
            .short('r')
            .long("redact")
            .value_name("WORD")
            .action(ArgAction::Append)
            .help("Redact tokens containing this word from evidence (repeatable)"))

        // Configuration
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Configuration file (JSON/YAML)"))

        .arg(Arg::new("template")
            .long("template")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Complaint form template (default: data/F700-200-000.pdf, or $EPOA_FORM_TEMPLATE)"))

        .arg(Arg::new("pdftk")
            .long("pdftk")
            .value_name("PROGRAM")
            .value_parser(value_parser!(PathBuf))
            .help("pdftk executable"))

        .arg(Arg::new("on-redaction-error")
            .long("on-redaction-error")
            .value_parser(value_parser!(RedactionFailurePolicy))
            .help("Abort, or leave out evidence that cannot be redacted"))

        .arg(Arg::new("merge-backend")
            .long("merge-backend")
            .value_parser(value_parser!(MergeBackend))
            .help("How the final document is concatenated"))

        // Output
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Output PDF path (default: derived from your name, the company and today's date)"))

        .arg(Arg::new("overwrite")
            .long("overwrite")
            .visible_alias("force")
            .action(ArgAction::SetTrue)
            .help("Replace the output file if it exists"))

        // Logging
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_parser(value_parser!(LogLevel))
            .default_value("info")
            .help("Set logging verbosity"))
}

fn init_logging(level: LogLevel) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let filter_level = match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(format!("epoa={}", filter_level)))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Config file, then `EPOA_FORM_TEMPLATE`, then command line flags
fn build_config(matches: &ArgMatches) -> epoa::Result<AssemblerConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AssemblerConfig::load(path)?,
        None => AssemblerConfig::default(),
    }
    .with_env_overrides();

    if let Some(template) = matches.get_one::<PathBuf>("template") {
        config.template_path = template.clone();
    }
    if let Some(pdftk) = matches.get_one::<PathBuf>("pdftk") {
        config.tools.pdftk = pdftk.clone();
    }
    if let Some(policy) = matches.get_one::<RedactionFailurePolicy>("on-redaction-error") {
        config.redaction_failure_policy = *policy;
    }
    if let Some(backend) = matches.get_one::<MergeBackend>("merge-backend") {
        config.merge_backend = *backend;
    }
    if matches.get_flag("overwrite") {
        config.overwrite = true;
    }

    config.validate()?;
    Ok(config)
}

/// Record file values, overridden by whatever was given on the command line.
/// Evidence files and redact words are added to the record's own.
fn build_record(matches: &ArgMatches) -> epoa::Result<ComplaintRecord> {
    let mut record = match matches.get_one::<PathBuf>("record") {
        Some(path) => ComplaintRecord::from_file(path)?,
        None => ComplaintRecord::new(MyInfo::default(), String::new()),
    };
    let text = |id: &str| matches.get_one::<String>(id).cloned();

    if let Some(name) = text("name") {
        record.my_info.name = Some(name);
    }
    if let Some(email) = text("email") {
        record.my_info.email = Some(email);
    }
    if let Some(phone) = text("phone") {
        record.my_info.phone = Some(phone);
    }
    if let Some(address) =
        Address::from_parts("your address", text("street"), text("city"), text("state"), text("zip"))?
    {
        record.my_info.address = Some(address);
    }

    if let Some(company) = text("company-name") {
        record.company_name = company;
    }
    if let Some(email) = text("company-email") {
        record.company_email = Some(email);
    }
    if let Some(phone) = text("company-phone") {
        record.company_phone = Some(phone);
    }
    if let Some(address) = Address::from_parts(
        "company address",
        text("company-street"),
        text("company-city"),
        text("company-state"),
        text("company-zip"),
    )? {
        record.company_mailing_address = Some(address);
    }

    if let Some(info) = text("additional-information") {
        record.additional_information = Some(info);
    }
    if let Some(files) = matches.get_many::<PathBuf>("evidence") {
        record.evidence_files.extend(files.cloned());
    }
    if let Some(words) = matches.get_many::<String>("redact") {
        record.redact_words.extend(words.cloned());
    }

    record.validate()?;
    Ok(record)
}

fn display_summary(config: &AssemblerConfig, record: &ComplaintRecord, output: &Path) {
    info!("📋 Complaint Summary:");
    info!("   Company:  {}", record.company_name);
    info!(
        "   Filed as: {}",
        record.my_info.name().unwrap_or("anonymous")
    );
    info!("   Evidence: {} file(s)", record.evidence_files.len());
    if record.wants_redaction() {
        info!(
            "   Redacting {} word(s), on failure: {:?}",
            record.redact_words.len(),
            config.redaction_failure_policy
        );
    }
    info!("   Template: {}", config.template_path.display());
    info!("   Output:   {}", output.display());
}
