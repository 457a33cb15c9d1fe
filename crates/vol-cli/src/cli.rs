use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vol_api::{IndexType, IterOrder, Traversal};

#[derive(Parser)]
#[command(
    name = "vol",
    about = "Virtual object layer: token tools and container walks",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Native connector settings (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Encode, decode, or compare object tokens
    #[command(subcommand)]
    Token(TokenCommand),
    /// Build a demo container and visit every object in it
    Walk(WalkArgs),
}

#[derive(Subcommand)]
pub enum TokenCommand {
    /// Encode an address into a token
    Encode(EncodeArgs),
    /// Decode a hex token back into an address
    Decode(DecodeArgs),
    /// Compare two hex tokens
    Compare(CompareArgs),
}

#[derive(Args)]
pub struct EncodeArgs {
    pub addr: u64,
    /// Address width in bytes
    #[arg(long, default_value_t = 8)]
    pub width: usize,
}

#[derive(Args)]
pub struct DecodeArgs {
    pub token: String,
    #[arg(long, default_value_t = 8)]
    pub width: usize,
}

#[derive(Args)]
pub struct CompareArgs {
    pub left: String,
    pub right: String,
}

#[derive(Args)]
pub struct WalkArgs {
    #[arg(long, default_value = "name")]
    pub index: IndexArg,
    #[arg(long, default_value = "inc")]
    pub order: OrderArg,
    /// Report legacy records (address plus header statistics)
    #[arg(long)]
    pub legacy: bool,
}

impl WalkArgs {
    pub fn traversal(&self) -> Traversal {
        Traversal::new(self.index.into(), self.order.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum IndexArg {
    Name,
    Creation,
}

impl From<IndexArg> for IndexType {
    fn from(arg: IndexArg) -> Self {
        match arg {
            IndexArg::Name => IndexType::Name,
            IndexArg::Creation => IndexType::CreationOrder,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OrderArg {
    Inc,
    Dec,
    Native,
}

impl From<OrderArg> for IterOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Inc => IterOrder::Increasing,
            OrderArg::Dec => IterOrder::Decreasing,
            OrderArg::Native => IterOrder::Native,
        }
    }
}
