use std::time::Instant;

use common::{config::JobConfig, error::Error, sweep::QueueDepth};
use eyre::{Context, Result};
use tokio::{
    fs::{remove_file, write},
    process::Command,
};
use tracing::{debug, info, warn};


/// Section names in the generated job file. The report parser keys off the
/// same names, since fio echoes them at the start of each sub-test section.
pub const READ_SECTION: &str = "read_test";
pub const WRITE_SECTION: &str = "write_test";

const JOB_FILE: &str = "config.fio";

/// One fio benchmark over a fixed target file, run once per iodepth.
#[derive(Debug, Clone)]
pub struct Fio {
    pub test_name: String,
    pub filename: String,
    pub job: JobConfig,
}

impl Fio {
    pub fn new(test_name: String, filename: String, job: JobConfig) -> Self {
        Self {
            test_name,
            filename,
            job,
        }
    }

    /// Render the job file for one sweep point: a global section holding the
    /// iodepth under test plus a read and a write sub-test.
    pub fn job_file(&self, iodepth: QueueDepth) -> String {
        let JobConfig {
            ioengine,
            direct,
            bs,
            size,
            numjobs,
            read_rw,
            write_rw,
            ..
        } = &self.job;

        let mut text = format!(
            "[global]\n\
             name={name}\n\
             ioengine={ioengine}\n\
             direct={direct}\n\
             bs={bs}\n\
             size={size}\n\
             numjobs={numjobs}\n\
             iodepth={iodepth}\n",
            name = self.test_name,
            direct = u8::from(*direct),
        );
        if let Some(runtime) = &self.job.runtime {
            text.push_str(&format!("runtime={runtime}\ntime_based=1\n"));
        }
        text.push_str(&format!(
            "\n[{READ_SECTION}]\nfilename={file}\nrw={read_rw}\n\
             \n[{WRITE_SECTION}]\nfilename={file}\nrw={write_rw}\n",
            file = self.filename,
        ));
        text
    }

    /// Run one blocking fio execution at the given iodepth and return its
    /// stdout. The job file is removed again whether fio succeeds or not.
    pub async fn run(&self, iodepth: QueueDepth) -> Result<String> {
        write(JOB_FILE, self.job_file(iodepth))
            .await
            .context("Write fio job file")?;
        debug!("wrote {JOB_FILE} for iodepth={iodepth}");

        info!("starting {} with iodepth={iodepth}", self.job.program);
        let started = Instant::now();
        let output = Command::new(&self.job.program)
            .arg(JOB_FILE)
            .output()
            .await;
        info!("fio execution time: {:.2?}", started.elapsed());

        if let Err(err) = remove_file(JOB_FILE).await {
            warn!("could not remove {JOB_FILE}: {err}");
        }

        let output = output.context("Spawn fio")?;
        if !output.status.success() {
            return Err(Error::ExecutionFailure {
                program: self.job.program.clone(),
                code: output.status.code(),
            }
            .into());
        }

        String::from_utf8(output.stdout).context("Fio output is not valid utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench() -> Fio {
        Fio::new(
            "nvme-sweep".to_owned(),
            "/dev/nvme0n1".to_owned(),
            JobConfig::default(),
        )
    }

    #[test]
    fn job_file_holds_the_swept_iodepth() {
        let text = bench().job_file(QueueDepth::new(64).unwrap());
        assert!(text.contains("iodepth=64\n"));
        assert!(text.contains("name=nvme-sweep\n"));
        assert!(text.contains("direct=1\n"));
        assert!(text.contains("numjobs=1\n"));
    }

    #[test]
    fn job_file_has_one_section_per_sub_test() {
        let text = bench().job_file(QueueDepth::new(1).unwrap());
        assert!(text.starts_with("[global]\n"));
        assert!(text.contains("[read_test]\nfilename=/dev/nvme0n1\nrw=randread\n"));
        assert!(text.contains("[write_test]\nfilename=/dev/nvme0n1\nrw=randwrite\n"));
    }

    #[test]
    fn runtime_turns_the_job_time_based() {
        let mut fio = bench();
        fio.job.runtime = Some("30s".to_owned());
        let text = fio.job_file(QueueDepth::new(8).unwrap());
        assert!(text.contains("runtime=30s\ntime_based=1\n"));
    }
}
