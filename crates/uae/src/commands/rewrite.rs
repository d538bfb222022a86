use clap::Args;
use miette::{IntoDiagnostic, Result};
use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing::info;

#[derive(Args)]
pub struct RewriteArgs {
    /// An input asset file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The rewritten asset file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl RewriteArgs {
    pub fn handle(&self) -> Result<()> {
        let mut assets = uae_assets::load(super::open(&self.file)?)?;
        info!(objects = assets.len(), "read {}", self.file.display());

        let out = BufWriter::new(super::create(&self.output, self.overwrite)?);
        uae_assets::dump(&mut assets, out)?.flush().into_diagnostic()?;
        info!(file_size = assets.header.file_size, "wrote {}", self.output.display());

        Ok(())
    }
}
