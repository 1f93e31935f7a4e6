use serde::{Deserialize, Serialize};

/// Fio job options shared by both sub-tests. Everything except the iodepth
/// under sweep is fixed for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct JobConfig {
    /// Fio binary to invoke
    pub program: String,
    pub ioengine: String,
    pub direct: bool,
    pub bs: String,
    pub size: String,
    pub numjobs: usize,
    pub read_rw: String,
    pub write_rw: String,
    pub runtime: Option<String>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            program: "fio".to_owned(),
            ioengine: "libaio".to_owned(),
            direct: true,
            bs: "4k".to_owned(),
            size: "1G".to_owned(),
            numjobs: 1,
            read_rw: "randread".to_owned(),
            write_rw: "randwrite".to_owned(),
            runtime: None,
        }
    }
}
