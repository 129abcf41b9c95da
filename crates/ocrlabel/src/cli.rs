use std::path::PathBuf;

use clap::Parser;

use ocrlabel_core::labels::{DEFAULT_DATA_DIR, DEFAULT_LABEL_FILE};

/// ocrlabel: labeling server for OCR image datasets with per-image
/// sidecar label files.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Directory holding the images, their `.txt` sidecars and the label index.
    #[arg(long, default_value = DEFAULT_DATA_DIR, env = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// File name of the aggregate label index inside the data directory.
    #[arg(long, default_value = DEFAULT_LABEL_FILE, env = "LABEL_FILE")]
    pub label_file: String,

    /// Address to bind the web server to.
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// Extra browser origins allowed to call the API (repeatable), e.g. a
    /// labeling UI served from another port.
    #[arg(long)]
    pub cors_origin: Vec<String>,
}
