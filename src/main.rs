use btmon_report::app::{Options, run_with_io};
use btmon_report::source::FileSource;
use clap::{CommandFactory, Parser};
use log::LevelFilter;
use std::panic::{self, PanicHookInfo};

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

/// Install the `env_logger` backend. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp_secs()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook to ensure clean exit codes for wrapper scripts
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    if std::env::args_os().len() <= 1 {
        let usage = Options::command().render_usage();
        println!("{usage}");
        std::process::exit(EXIT_SUCCESS);
    }

    let options = Options::parse();
    init_logging(options.verbose);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    match run_with_io(options, &FileSource, &mut stdin.lock(), &mut stdout.lock()).await {
        Ok(_) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
