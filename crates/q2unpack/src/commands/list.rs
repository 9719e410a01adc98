use clap::Args;
use itertools::Itertools;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use q2_pak::{AssetCatalog, CatalogOptions, EntryKind};
use std::path::PathBuf;

use crate::pipeline::Conversion;

#[derive(Args)]
pub struct ListArgs {
    /// A game data directory holding loose files and PAK archives
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let catalog = AssetCatalog::from_directory(&self.input, &CatalogOptions::default())
            .context(format!("reading {}", self.input.display()))?;

        for entry in catalog.iter() {
            let kind = match entry.kind {
                EntryKind::Loose => format!("{}", "loose".green()),
                EntryKind::Archived => format!("{}", "pak  ".cyan()),
            };
            println!(
                "{} {:>10} {:>10} {}",
                kind,
                entry.source.offset,
                entry.len(),
                entry.name()
            );
        }

        let by_kind = catalog.iter().map(|e| e.kind).counts();
        let by_conversion = catalog
            .iter()
            .map(|e| Conversion::for_name(e.name()))
            .counts();

        println!(
            "{} files: {} loose, {} archived",
            catalog.len().bold(),
            by_kind.get(&EntryKind::Loose).unwrap_or(&0),
            by_kind.get(&EntryKind::Archived).unwrap_or(&0)
        );
        println!(
            "{}",
            by_conversion
                .iter()
                .sorted()
                .map(|(conversion, count)| format!("{conversion:?}: {count}"))
                .join(", ")
                .dimmed()
        );

        Ok(())
    }
}
