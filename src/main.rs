use hub_tag_cleaner::cli::{Args, Runner};
use hub_tag_cleaner::logging::{self, Logger};
use hub_tag_cleaner::output::ActionOutput;
use hub_tag_cleaner::{CleanerError, Result};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let action_output = ActionOutput::from_env();

    let args = match Args::try_parse_args() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            logging::init(false);
            let _ = e.print();
            return conclude(
                &action_output,
                &Logger::default(),
                Err(CleanerError::Config("Invalid command-line arguments".to_string())),
            );
        }
    };

    logging::init(args.verbose);
    let output = Logger::new(args.verbose);

    let result = match args.into_config() {
        Ok(config) => Runner::new(config, output.clone()).run().await.map(|_| ()),
        Err(e) => Err(e),
    };

    conclude(&action_output, &output, result)
}

/// Record the outcome for the CI runner and map it to the process exit code
fn conclude(action_output: &ActionOutput, output: &Logger, result: Result<()>) -> ExitCode {
    if let Err(e) = action_output.set_success(result.is_ok()) {
        output.warning(&format!("Failed to write action output: {}", e));
    }

    match result {
        Ok(()) => {
            output.success("Cleanup finished successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            output.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
