use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::{io::Write, path::Path, path::PathBuf};
use tracing::info;
use uae_assets::AssetObject;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input asset file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// Names that are not a single plain path component fall back to the path id
fn target_name(object: &AssetObject) -> String {
    let name = object.file_name();
    match Path::new(name).file_name() {
        Some(component) if component == name => name.to_string(),
        _ => object.path_id.to_string(),
    }
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let assets = uae_assets::load(super::open(&self.file)?)?;

        std::fs::create_dir_all(&self.directory)
            .into_diagnostic()
            .context(format!("creating {}", self.directory.display()))?;

        for object in &assets.objects {
            let p = self.directory.join(target_name(object));
            info!("writing {}", p.display());

            let mut out = super::create(&p, self.overwrite)?;
            out.write_all(object.file_content())
                .into_diagnostic()
                .context(format!("writing {}", p.display()))?;
        }

        Ok(())
    }
}
