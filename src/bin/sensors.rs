use anyhow::Context;
use clap::Parser;
use septic_monitor::{
    config::ConfigStore,
    sensors::{StubSensorReader, sync_readings},
    util::get_config_path,
};
use tracing::{info, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(name = "septic-sensors")]
#[command(about = "Read the tank sensors into the tank document", long_about = None)]
struct Args {
    /// Tank document to update
    #[arg(short, long, value_name = "FILE", default_value_t = get_config_path())]
    config: String,
}

fn init() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(true),
        )
        .with(filter::LevelFilter::DEBUG)
        .init();
}

fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let mut store = ConfigStore::load(&args.config)
        .with_context(|| format!("failed to load tank document {}", args.config))?;

    sync_readings(&mut store, &mut StubSensorReader::default())?;
    store
        .save()
        .with_context(|| format!("failed to save tank document {}", args.config))?;

    info!("updated readings in {}", store.path().display());
    Ok(())
}
