use clap::{ArgAction, Parser, Subcommand};

use super::fetch::FetchArg;

#[derive(Clone, Debug, Parser)]
#[command(name="updraft",version=env!("CARGO_PKG_VERSION"),about,long_about=None,propagate_version=true)]
pub struct App {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "f", name = "fetch", about = "Download a file, resuming a previous attempt")]
    Fetch(FetchArg),
}
