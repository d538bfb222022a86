use miette::{Context, IntoDiagnostic, Result};
use std::{fs::File, path::Path};

pub mod extract;
pub mod list;
pub mod replace;
pub mod rewrite;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print the header and object table of an asset file
    List(list::ListArgs),
    /// Read an asset file and write it back out unchanged
    Rewrite(rewrite::RewriteArgs),
    /// Replace the name or content of one object
    Replace(replace::ReplaceArgs),
    /// Write the content of every object into a directory
    Extract(extract::ExtractArgs),
}

impl Commands {
    pub fn handle(&self) -> Result<()> {
        match self {
            Commands::List(list) => list.handle(),
            Commands::Rewrite(rewrite) => rewrite.handle(),
            Commands::Replace(replace) => replace.handle(),
            Commands::Extract(extract) => extract.handle(),
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))
}

fn create(path: &Path, overwrite: bool) -> Result<File> {
    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}
