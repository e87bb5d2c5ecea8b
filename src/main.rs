//! # Voucher CLI
//!
//! Usage:
//!   voucher form.json -o TravelVoucher.pdf
//!   echo '{ ... }' | voucher --logo static/triplogo.png
//!   voucher --example > form.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use voucher::{FormFields, ListPolicy, VoucherConfig, VoucherError, VoucherRenderer};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON form file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Where to write the PDF.
    #[arg(short, long, default_value = voucher::DOWNLOAD_FILENAME)]
    output: PathBuf,

    /// Logo drawn in the first-page banner.
    #[arg(long, env = "VOUCHER_LOGO")]
    logo: Option<PathBuf>,

    /// How to reconcile hotel/activity arrays of different lengths.
    #[arg(long, value_enum, default_value_t = PolicyArg::Strict)]
    list_policy: PolicyArg,

    /// Print the help-line contact above the address footer.
    #[arg(long)]
    helpline: bool,

    /// Print a sample form and exit.
    #[arg(long)]
    example: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Strict,
    Truncate,
    Pad,
}

impl From<PolicyArg> for ListPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => ListPolicy::Strict,
            PolicyArg::Truncate => ListPolicy::Truncate,
            PolicyArg::Pad => ListPolicy::Pad,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.example {
        print!("{}", example_form_json());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to render voucher: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), VoucherError> {
    let input = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let form = FormFields::from_json(&input)?;

    let mut config = VoucherConfig::new()
        .with_list_policy(args.list_policy.into())
        .with_helpline(args.helpline);
    if let Some(logo) = &args.logo {
        config = config.with_logo_path(logo);
    }

    let voucher = VoucherRenderer::new(config).render_form(&form)?;
    fs::write(&args.output, voucher.bytes())?;
    eprintln!(
        "Written {} bytes ({} page(s)) to {}",
        voucher.bytes().len(),
        voucher.page_count,
        args.output.display()
    );
    Ok(())
}

fn example_form_json() -> &'static str {
    r##"{
  "trip_id": "DXB-2026-0142",
  "arrival_date": "12 Mar 2026",
  "departure": "17 Mar 2026",
  "duration": "5 Nights / 6 Days",
  "guest_name": "A. Sharma",
  "guest_phone": "+91 98200 00000",
  "pax": "2 Adults",
  "reference_id": "REF-88421",
  "hotel_name[]": ["Marina View Hotel", "Desert Oasis Camp"],
  "check_in[]": ["12 Mar 2026", "16 Mar 2026"],
  "check_out[]": ["16 Mar 2026", "17 Mar 2026"],
  "accommodation[]": ["Deluxe Double", "Bedouin Tent"],
  "day[]": ["1", "2", "3"],
  "start_time[]": ["14:00", "09:00", "15:30"],
  "service[]": ["Airport pickup and hotel transfer", "Dubai city tour with Burj Khalifa", "Desert safari with BBQ dinner"],
  "pax_or_vehicle[]": ["Sedan", "2 pax SIC", "4x4 shared"],
  "remarks[]": ["Driver waits at arrivals hall with a name board", "", "Pickup from hotel lobby"]
}
"##
}
