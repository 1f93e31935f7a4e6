use std::path::PathBuf;

use common::{
    config::JobConfig,
    sweep::{self, QueueDepth},
};
use eyre::{Context, Result};
use fio::{
    Fio, READ_SECTION, WRITE_SECTION,
    report::{self, LatencySample},
};
use indicatif::{ProgressBar, ProgressStyle};
use latency_plot::LatencyPlot;
use tokio::fs::read_to_string;
use tracing::{debug, info};

pub struct SweepArgs {
    pub test_name: String,
    pub filename: String,
    pub plot_file: PathBuf,
    pub num_points: u32,
    pub min_depth: u32,
    pub max_depth: u32,
    pub config_file: Option<String>,
    pub no_progress: bool,
}

pub async fn run_benchmark(args: SweepArgs) -> Result<()> {
    let job: JobConfig = match &args.config_file {
        Some(path) => serde_yml::from_str(
            &read_to_string(path)
                .await
                .context(format!("Read config file {path}"))?,
        )
        .context("Parse config file")?,
        None => JobConfig::default(),
    };

    let depths = sweep::generate(args.num_points, args.min_depth, args.max_depth)?;
    info!("sweeping iodepth values: {depths:?}");

    let bench = Fio::new(args.test_name, args.filename, job);

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(depths.len() as u64).with_style(
            ProgressStyle::with_template("[{bar:40}] {pos}/{len} iodepth={msg}")?
                .progress_chars("=>-"),
        )
    };

    let result = collect_latencies(&depths, |depth| {
        progress.set_message(depth.to_string());
        progress.inc(1);
        bench.run(depth)
    })
    .await;
    progress.finish_and_clear();
    let curve = result?;

    println!("iodepth\tread (usec)\twrite (usec)");
    for sample in &curve {
        println!(
            "{}\t{}\t{}",
            sample.iodepth,
            fmt_latency(sample.read_usec),
            fmt_latency(sample.write_usec)
        );
    }

    LatencyPlot::new(curve, args.plot_file).render().await
}

/// Run one benchmark per depth, in ascending order, and parse each report
/// into a curve point. Runs never overlap: they all target the same file and
/// concurrent access would distort the measured latencies. The first failure
/// aborts the sweep and discards every sample collected so far.
async fn collect_latencies<R, Fut>(depths: &[QueueDepth], mut run: R) -> Result<Vec<LatencySample>>
where
    R: FnMut(QueueDepth) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut curve = Vec::with_capacity(depths.len());
    for &depth in depths {
        let stdout = run(depth).await?;
        let report = report::parse(&stdout, READ_SECTION, WRITE_SECTION)?;
        debug!(
            "iodepth={depth} read={:?} write={:?}",
            report.read_usec, report.write_usec
        );
        curve.push(LatencySample::new(depth, report));
    }
    Ok(curve)
}

fn fmt_latency(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "-".to_owned(),
    }
}
