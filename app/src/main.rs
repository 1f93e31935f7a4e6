use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use tokio::fs::create_dir_all;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod bench;

/// Sweep fio over a range of iodepth values and plot the resulting
/// read/write latency curve.
#[derive(Parser)]
struct Cli {
    /// Name for the fio jobs
    test_name: String,
    /// Target file or device fio reads and writes
    filename: String,
    /// Output plot image path
    plot_file: PathBuf,
    /// Number of sweep points between the minimum and maximum depth
    #[arg(long, default_value_t = 9)]
    num_points: u32,
    #[arg(long, default_value_t = 1)]
    min_depth: u32,
    #[arg(long, default_value_t = 256)]
    max_depth: u32,
    /// Optional YAML file overriding the fio job defaults
    #[arg(short, long)]
    config_file: Option<String>,
    #[arg(long, default_value_t = false)]
    no_progress: bool,
    /// Extra tracing directives
    #[arg(short, long)]
    log: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("info".to_owned());
    let args = Cli::parse();

    create_dir_all("logs").await?;
    let file_appender = tracing_appender::rolling::never("logs", "blktest.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("blktest={log_level}"));
    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }
    for module in ["common", "fio", "latency_plot"] {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    let sweep = bench::SweepArgs {
        test_name: args.test_name,
        filename: args.filename,
        plot_file: args.plot_file,
        num_points: args.num_points,
        min_depth: args.min_depth,
        max_depth: args.max_depth,
        config_file: args.config_file,
        no_progress: args.no_progress,
    };
    if let Err(err) = bench::run_benchmark(sweep).await {
        error!("{err:#?}");
        return Err(err);
    }
    Ok(())
}
