use std::{process::ExitCode, time::Duration};

use clap::Parser;
use didyoumean::{
    CallContext,
    DocumentStore,
    ManagerConfig,
    MongoStore,
    Verifier,
    cli::{Cli, Command},
    commands,
    error,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DIDYOUMEAN_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Some(Command::Completions(args)) = &cli.command {
        args.generate();
        return ExitCode::SUCCESS;
    }

    let verifier = Verifier::new();
    let cfg = match ManagerConfig::load(&cli.config, &verifier) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let timeout = cli.timeout;
    let ctx = move || match timeout {
        0 => CallContext::background(),
        secs => CallContext::with_timeout(Duration::from_secs(secs)),
    };

    let store = match MongoStore::connect(&ctx(), &cfg.mongo, &verifier).await
    {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "cannot connect to mongo db");
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(&store, &verifier, &ctx(), cli.command).await;
    let closed = store.close(&ctx()).await;

    match outcome.and(closed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run<S: DocumentStore>(
    store: &S,
    verifier: &Verifier,
    ctx: &CallContext,
    command: Option<Command>,
) -> error::Result<()> {
    let mut out = std::io::stdout().lock();

    match command {
        Some(Command::Search(args)) => {
            commands::search(store, ctx, &args, &mut out).await?;
        }
        Some(Command::Import(args)) => {
            commands::import(store, ctx, verifier, &args, &mut out).await?;
        }
        Some(Command::Index(args)) => {
            commands::index(store, ctx, &args, &mut out).await?;
        }
        Some(Command::Completions(_)) | None => {}
    }

    Ok(())
}
