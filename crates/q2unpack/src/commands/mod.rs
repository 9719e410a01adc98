pub mod list;
pub mod unpack;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Unpack a data tree into a directory, converting images to PNG
    Unpack(unpack::UnpackArgs),
    /// List every asset of a data tree
    List(list::ListArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Unpack(unpack) => unpack.handle(),
            Commands::List(list) => list.handle(),
        }
    }
}
