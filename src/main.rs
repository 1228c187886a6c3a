use clap::Parser;
use wx_station_check::cli::{run, Cli};
use wx_station_check::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
