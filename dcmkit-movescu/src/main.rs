//! `dcmkit-movescu`: issue a C-MOVE request against a DICOM peer, asking
//! it to send matching instances to a destination AE.

mod query;

use std::process::ExitCode;

use clap::Parser;
use dcmkit_dictionary::uids::sop_class::{PATIENT_ROOT_MOVE, STUDY_ROOT_MOVE};
use dcmkit_ul::pdu::commands::Priority;
use dcmkit_ul::ClientAssociationOptions;

use query::QueryLevel;

/// Send a C-MOVE request to a DICOM peer, asking it to send matching
/// instances to a destination AE title.
#[derive(Debug, Parser)]
#[command(name = "dcmkit-movescu", version)]
struct Args {
    /// Hostname or IP address of the peer.
    host: String,
    /// TCP port of the peer.
    port: u16,
    /// AE title of the destination the peer should send instances to.
    #[arg(short = 'd', long)]
    move_destination: String,
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
    #[arg(short = 'c', long, default_value = "DCMKIT_MOVESCU")]
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
    let abstract_syntax = if args.study_root { STUDY_ROOT_MOVE } else { PATIENT_ROOT_MOVE };
    let identifier = query::build_identifier(args.level, &args.keys)?;

    let mut association = ClientAssociationOptions::new()
        .calling_ae_title(&args.calling_ae_title)
        .called_ae_title(&args.called_ae_title)
        .max_pdu_length(args.max_pdu_length)
        .with_default_transfer_syntaxes(abstract_syntax)
        .establish((args.host.as_str(), args.port))?;

    for result in dcmkit_ul::dimse::c_move(
        &mut association,
        abstract_syntax,
        Priority::Medium,
        &args.move_destination,
        &identifier,
    )? {
        let progress = result?;
        println!(
            "remaining={} completed={} failed={} warning={} status={:#06x}",
            progress.remaining, progress.completed, progress.failed, progress.warning, progress.status.0
        );
    }

    association.release()?;
    Ok(())
}
