//! `dcmkit-findscu`: issue a C-FIND query against a DICOM peer and print
//! the matching identifiers.

mod query;

use std::process::ExitCode;

use clap::Parser;
use dcmkit_dictionary::uids::sop_class::{PATIENT_ROOT_FIND, STUDY_ROOT_FIND};
use dcmkit_ul::pdu::commands::Priority;
use dcmkit_ul::ClientAssociationOptions;

use query::QueryLevel;

/// Send a C-FIND request to a DICOM peer and print each match.
#[derive(Debug, Parser)]
#[command(name = "dcmkit-findscu", version)]
struct Args {
    /// Hostname or IP address of the peer.
    host: String,
    /// TCP port of the peer.
    port: u16,
    /// Query/retrieve level.
    #[arg(short = 'L', long, value_enum, default_value_t = QueryLevel::Study)]
    level: QueryLevel,
    /// Use the Study Root model instead of Patient Root.
    #[arg(long)]
    study_root: bool,
    /// A query key, `keyword=value` or `gggg,eeee=value`; repeatable.
    #[arg(short = 'k', long = "key")]
    keys: Vec<String>,
    /// Calling AE title.
    #[arg(short = 'c', long, default_value = "DCMKIT_FINDSCU")]
    calling_ae_title: String,
    /// Called AE title.
    #[arg(short = 'a', long, default_value = "ANY_SCP")]
    called_ae_title: String,
    /// Maximum PDU length to advertise.
    #[arg(long, default_value_t = dcmkit_ul::association::client::DEFAULT_MAX_PDU_LENGTH, value_parser = clap::value_parser!(u32).range(4096..=131_072))]
    max_pdu_length: u32,
    /// Enable debug-level logging.
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let abstract_syntax = if args.study_root { STUDY_ROOT_FIND } else { PATIENT_ROOT_FIND };
    let identifier = query::build_identifier(args.level, &args.keys)?;

    let mut association = ClientAssociationOptions::new()
        .calling_ae_title(&args.calling_ae_title)
        .called_ae_title(&args.called_ae_title)
        .max_pdu_length(args.max_pdu_length)
        .with_default_transfer_syntaxes(abstract_syntax)
        .establish((args.host.as_str(), args.port))?;

    let mut count = 0;
    for result in dcmkit_ul::dimse::c_find(&mut association, abstract_syntax, Priority::Medium, &identifier)? {
        let identifier = result?;
        count += 1;
        println!("--- match {count} ---");
        for (tag, element) in identifier.iter() {
            if let Some(value) = element.value.primitive() {
                println!("{tag} {}", value.to_str());
            }
        }
    }
    println!("{count} match(es) found");

    association.release()?;
    Ok(())
}
