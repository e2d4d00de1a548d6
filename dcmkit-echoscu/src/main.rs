//! `dcmkit-echoscu`: verify a DICOM peer is reachable and speaks the
//! Verification SOP class.

use std::process::ExitCode;

use clap::Parser;
use dcmkit_dictionary::uids::sop_class::VERIFICATION;
use dcmkit_ul::ClientAssociationOptions;

/// Send a C-ECHO request to a DICOM peer.
#[derive(Debug, Parser)]
#[command(name = "dcmkit-echoscu", version)]
struct Args {
    /// Hostname or IP address of the peer.
    host: String,
    /// TCP port of the peer.
    port: u16,
    /// Calling AE title.
    #[arg(short = 'c', long, default_value = "DCMKIT_ECHOSCU")]
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

fn run(args: &Args) -> dcmkit_ul::Result<()> {
    let mut association = ClientAssociationOptions::new()
        .calling_ae_title(&args.calling_ae_title)
        .called_ae_title(&args.called_ae_title)
        .max_pdu_length(args.max_pdu_length)
        .with_default_transfer_syntaxes(VERIFICATION)
        .establish((args.host.as_str(), args.port))?;

    let status = dcmkit_ul::dimse::c_echo(&mut association, VERIFICATION)?;
    if status.is_success() {
        println!("C-ECHO succeeded");
    } else {
        println!("C-ECHO failed with status {:#06x}", status.0);
    }

    association.release()?;
    Ok(())
}
