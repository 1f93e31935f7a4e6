use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use common::error::Error;
use eyre::{Context, Result};
use fio::report::LatencySample;
use tokio::{
    fs::{remove_file, write},
    process::Command,
};
use tracing::{debug, info, warn};

const DATA_FILE: &str = "data.dat";
const SCRIPT_FILE: &str = "plot.gp";

/// Renders the finished latency curve to a png through gnuplot.
#[derive(Debug, Clone)]
pub struct LatencyPlot {
    points: Vec<LatencySample>,
    output: PathBuf,
}

impl LatencyPlot {
    pub fn new(points: Vec<LatencySample>, output: PathBuf) -> Self {
        Self { points, output }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Whitespace-separated rows, one per sweep point, ascending depth.
    fn data_file(&self) -> String {
        let mut data = String::from("iodepth\tread_latency\twrite_latency\n");
        for point in &self.points {
            let _ = writeln!(
                data,
                "{}\t{}\t{}",
                point.iodepth,
                fmt_latency(point.read_usec),
                fmt_latency(point.write_usec)
            );
        }
        data
    }

    fn script(&self) -> String {
        format!(
            r#"set title "Latency with different IO Depth" font "15"

set xlabel "IO Depth"
set ylabel "Latency (usec)"
set logscale x 2

set terminal pngcairo size 800,600
set output "{output}"

set key outside

plot "{DATA_FILE}" using 1:2 with linespoints title "Read Latency", \
     "{DATA_FILE}" using 1:3 with linespoints title "Write Latency"
"#,
            output = self.output.display()
        )
    }

    /// Write the data and script files, run gnuplot, and clean both up again.
    pub async fn render(&self) -> Result<()> {
        write(DATA_FILE, self.data_file())
            .await
            .context("Write plot data")?;
        write(SCRIPT_FILE, self.script())
            .await
            .context("Write gnuplot script")?;
        info!("rendering {}", self.output.display());

        let status = Command::new("gnuplot").arg(SCRIPT_FILE).status().await;

        for file in [DATA_FILE, SCRIPT_FILE] {
            if let Err(err) = remove_file(file).await {
                warn!("could not remove {file}: {err}");
            }
        }
        debug!("removed {DATA_FILE} and {SCRIPT_FILE}");

        let status = status.context("Spawn gnuplot")?;
        if !status.success() {
            return Err(Error::ExecutionFailure {
                program: "gnuplot".to_owned(),
                code: status.code(),
            }
            .into());
        }
        Ok(())
    }
}

// gnuplot skips NaN points, so an absent latency never plots as zero
fn fmt_latency(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "NaN".to_owned(),
    }
}
