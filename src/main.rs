use clap::Parser;
use env_logger::Env;
use threatscore::cli::{self, Args};

fn main() {
    let args = Args::parse();

    let log_level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    log::debug!("Threatscore starting with args: {:?}", args);

    let result = cli::run(&args).and_then(|report| cli::emit(&report, args.output.as_deref()));
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
