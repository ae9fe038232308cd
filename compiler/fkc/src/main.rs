//! Fortran kernel extraction CLI.

use std::path::PathBuf;

use fk_diagnostic::ErrorMode;
use fkc::{init_tracing, run, DriverError, Invocation, RunConfig, EXIT_FAILURE};

fn print_usage() {
    eprintln!("Usage: fkc --index <index.json> --kernels <kernels.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file>     Run configuration (JSON)");
    eprintln!("  -o <prefix>         Output prefix; writes <prefix>.kernels.json");
    eprintln!("  --strict            Abort on the first lookup failure");
    eprintln!("  --lenient           Warn and continue on lookup failures (default)");
    eprintln!();
    eprintln!("Logging: set FKC_LOG (or RUST_LOG), e.g. FKC_LOG=fk_scope=debug");
}

/// Command-line arguments before the configuration file is merged in.
#[derive(Default)]
struct Args {
    index: Option<PathBuf>,
    kernels: Option<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    mode: Option<ErrorMode>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        // Options taking a value need lookahead.
        let slot = match arg {
            "--index" => Some(&mut parsed.index),
            "--kernels" => Some(&mut parsed.kernels),
            "--config" => Some(&mut parsed.config),
            "-o" => Some(&mut parsed.output),
            _ => None,
        };
        if let Some(slot) = slot {
            let Some(value) = args.get(i + 1) else {
                return Err(format!("missing value for '{arg}'"));
            };
            *slot = Some(PathBuf::from(value));
            i += 2;
            continue;
        }
        match arg {
            "--strict" => parsed.mode = Some(ErrorMode::Strict),
            "--lenient" => parsed.mode = Some(ErrorMode::Lenient),
            other => return Err(format!("unknown argument '{other}'")),
        }
        i += 1;
    }
    Ok(parsed)
}

fn report(error: &DriverError) -> ! {
    match error.code() {
        Some(code) => eprintln!("error[{code}]: {error}"),
        None => eprintln!("error: {error}"),
    }
    std::process::exit(error.exit_status());
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            std::process::exit(EXIT_FAILURE);
        }
    };
    let (Some(index), Some(kernels)) = (args.index, args.kernels) else {
        eprintln!("error: both --index and --kernels are required");
        print_usage();
        std::process::exit(EXIT_FAILURE);
    };

    let mut config = match &args.config {
        Some(path) => RunConfig::load(path).unwrap_or_else(|e| report(&e.into())),
        None => RunConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.error_handling = mode;
    }

    let invocation = Invocation {
        index,
        kernels,
        output_prefix: args.output,
        config,
    };
    match run(&invocation) {
        Ok(Some(path)) => println!("{}", path.display()),
        Ok(None) => eprintln!("no kernels selected"),
        Err(error) => report(&error),
    }
}
