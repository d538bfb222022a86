use clap::Args;
use miette::Result;
use owo_colors::{OwoColorize, Stream::Stdout};
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input asset file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let assets = uae_assets::load(super::open(&self.file)?)?;
        let header = &assets.header;

        println!(
            "{} {} (format {}, platform {}, {})",
            self.file
                .display()
                .if_supports_color(Stdout, |t| t.bold()),
            header.unity_version,
            header.format_version,
            header.target_platform,
            if header.big_endian.get() {
                "big endian"
            } else {
                "little endian"
            }
        );
        println!(
            "metadata size {}, data offset {}, file size {}",
            header.metadata_size, header.data_offset, header.file_size
        );
        println!(
            "{} types, {} objects, {} scripts, {} externals, {} ref types",
            assets.types.len(),
            assets.len(),
            assets.scripts.len(),
            assets.externals.len(),
            assets.ref_types.len()
        );

        for object in &assets.objects {
            println!(
                "{:>20} {:>6} {:>10} {:>10} {}",
                object.path_id.if_supports_color(Stdout, |t| t.blue()),
                object.type_id,
                object.start_byte(),
                object.byte_length(),
                object.file_name().if_supports_color(Stdout, |t| t.green())
            );
        }

        for external in &assets.externals {
            println!("external: {}", external.path);
        }

        for warning in assets.warnings() {
            println!(
                "{} {}",
                "warning:".if_supports_color(Stdout, |t| t.yellow()),
                warning
            );
        }

        Ok(())
    }
}
