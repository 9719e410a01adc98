use clap::Args;
use miette::{Context, Result};
use q2_pak::{AssetCatalog, CatalogOptions};
use std::path::PathBuf;
use tracing::info;

use crate::{pipeline::Unpacker, sink::DirectorySink};

#[derive(Args)]
pub struct UnpackArgs {
    /// A game data directory holding loose files and PAK archives
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Copy images unchanged instead of converting them
    #[arg(long, default_value_t = false)]
    no_convert: bool,

    /// Allow overwriting files in the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl UnpackArgs {
    pub fn handle(&self) -> Result<()> {
        let catalog = AssetCatalog::from_directory(&self.input, &CatalogOptions::default())
            .context(format!("reading {}", self.input.display()))?;
        info!("found {} files", catalog.len());

        let unpacker = if self.no_convert {
            Unpacker::raw(&catalog)
        } else {
            Unpacker::converting(&catalog)?
        };

        let mut sink = DirectorySink::new(&self.output, self.overwrite);
        let summary = unpacker.run(&mut sink)?;
        info!(
            "unpacked {} files into {} ({} skins repaired)",
            summary.images + summary.copied,
            self.output.display(),
            summary.repaired
        );

        Ok(())
    }
}
