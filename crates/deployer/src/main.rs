use {clap::Parser, std::process::ExitCode};

#[tokio::main]
async fn main() -> ExitCode {
    let args = deployer::arguments::Arguments::parse();
    observe::tracing::initialize(&observe::Config::new(
        &args.log,
        Some(args.stderr_threshold),
        args.use_json_logs,
    ));
    tracing::info!("running deployer with validated arguments:\n{}", args);
    deployer::run(args).await
}
