//! fan command line entry point

use fan::cli::{self, CliError, exit_code_for, render_error};
use fan::commands::{self, Command};
use fan::config;
use fan::context::AppContext;
use fan::tracing::{TracingConfig, init_tracing};

/// Exit code for SIGINT (128 + signal number 2)
const EXIT_SIGINT: i32 = 130;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    #[allow(clippy::print_stderr)]
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
    };
    // Ignore error if tracing already initialized
    let _ = init_tracing(tracing_config);

    let command = cli.command.into_command();

    // The child shares our process group and receives Ctrl-C itself; fan
    // stays alive to report its exit code.
    let _ = if matches!(command, Command::Run { .. }) {
        ctrlc::set_handler(|| {})
    } else {
        ctrlc::set_handler(|| std::process::exit(EXIT_SIGINT))
    };

    let exit_code = match run(cli.config, command) {
        Ok(code) => code,
        Err(err) => {
            render_error(&err);
            exit_code_for(&err)
        }
    };
    std::process::exit(exit_code);
}

fn run(config_path: Option<std::path::PathBuf>, command: Command) -> Result<i32, CliError> {
    let config_path = config_path.unwrap_or_else(config::default_config_path);
    let mut ctx = AppContext::load(&config_path)?;
    commands::execute(command, &mut ctx)
}
