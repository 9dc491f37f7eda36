use std::time::Duration;

use clap::Parser;
use miette::Result;
use prerender::{read_config, watch::watch, Build, TemplatePlugin};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use crate::args::{Args, Command};

mod args;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = Args::parse();
    init_tracing();

    match args.command {
        Command::Build(build_args) => {
            let options = read_config(&build_args.directory).await?;
            let report = Build::new()
                .with_hook(TemplatePlugin::new(options))
                .run()
                .await?;
            tracing::info!("{} files written", report.written.len());

            Ok(())
        }
        Command::Watch(watch_args) => {
            let options = read_config(&watch_args.directory).await?;
            let build = Build::new().with_hook(TemplatePlugin::new(options));

            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("cannot listen for ctrl-c: {e}");
                    std::future::pending::<()>().await;
                }
            };
            let debounce = Duration::from_millis(watch_args.debounce);
            let passes = watch(&build, debounce, shutdown).await?;
            tracing::info!("{passes} passes run");

            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .compact()
        .init();
}
