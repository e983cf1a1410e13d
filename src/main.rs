use clap::Parser;
use manuscripts_lib::cli::{execute, CliArgs};
use manuscripts_lib::settings::load_or_create_settings;

fn main() {
    let args = CliArgs::parse();

    let settings = match load_or_create_settings(&args.settings) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {:#}", e);
            std::process::exit(1);
        }
    };

    let level = if args.debug || settings.debug_mode {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    log::debug!("Using settings from {}", args.settings.display());

    match execute(&args.command, &settings) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
