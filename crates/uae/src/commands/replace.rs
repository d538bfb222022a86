use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing::info;

#[derive(Args)]
pub struct ReplaceArgs {
    /// An input asset file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The edited asset file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Path id of the object to edit
    #[arg(short, long, allow_negative_numbers = true)]
    path_id: i64,

    /// A new name for the object
    #[arg(short, long)]
    name: Option<String>,

    /// A file holding the new content of the object
    #[arg(short, long, value_name = "FILE")]
    content: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ReplaceArgs {
    pub fn handle(&self) -> Result<()> {
        if self.name.is_none() && self.content.is_none() {
            return Err(miette!("nothing to replace, pass --name or --content"));
        }

        let mut assets = uae_assets::load(super::open(&self.file)?)?;
        let object = assets
            .object_mut(self.path_id)
            .ok_or(miette!("no object with path id {}", self.path_id))?;

        if let Some(name) = &self.name {
            info!("renaming {} to {}", object.file_name(), name);
            object.set_file_name(name.as_str());
        }

        if let Some(content) = &self.content {
            let data = std::fs::read(content)
                .into_diagnostic()
                .context(format!("reading {}", content.display()))?;
            info!(
                old = object.file_content().len(),
                new = data.len(),
                "replacing content of {}",
                object.file_name()
            );
            object.set_file_content(data);
        }

        let out = BufWriter::new(super::create(&self.output, self.overwrite)?);
        uae_assets::dump(&mut assets, out)?.flush().into_diagnostic()?;

        Ok(())
    }
}
