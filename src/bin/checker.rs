use anyhow::Context;
use clap::Parser;
use septic_monitor::{
    TankSnapshot,
    alerts::{AlertSink, NoopSink},
    checker::HealthChecker,
    config::ConfigStore,
    mqtt::MqttSink,
    report::HealthReport,
    util::{get_config_path, get_log_path, get_publish_grace},
};
use tracing::{debug, error, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(name = "septic-checker")]
#[command(about = "Check septic tank readings and publish alerts", long_about = None)]
struct Args {
    /// Tank document with `config`, `data` and optional `MQTT` sections
    #[arg(short, long, value_name = "FILE", default_value_t = get_config_path())]
    config: String,

    /// Issue log, appended to
    #[arg(short, long, value_name = "FILE", default_value_t = get_log_path())]
    log: String,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("septic_monitor", LevelFilter::DEBUG),
        ("septic_checker", LevelFilter::TRACE),
        ("rumqttc", LevelFilter::WARN),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let store = ConfigStore::load(&args.config)
        .with_context(|| format!("failed to load tank document {}", args.config))?;
    let snapshot = store.snapshot().context("tank document is incomplete")?;
    let mqtt = store.mqtt().context("invalid MQTT section")?;

    let (sink, topic, connection) = match mqtt {
        Some(mqtt) => {
            let (sink, connection) = MqttSink::connect(&mqtt);
            (Box::new(sink) as Box<dyn AlertSink>, mqtt.topic, Some(connection))
        }
        None => {
            debug!("no MQTT section configured, alerts are only logged");
            (Box::new(NoopSink) as Box<dyn AlertSink>, String::new(), None)
        }
    };

    let result = check(&args.log, sink, topic, &snapshot);

    match &result {
        Ok(report) => print!("{report}"),
        Err(e) => error!("health check aborted: {e:#}"),
    }

    if let Some(connection) = connection {
        connection.shutdown(get_publish_grace()).await;
    }

    result.map(|_| ())
}

/// The issue log is closed when the checker goes out of scope, on success or error.
fn check(
    log: &str,
    sink: Box<dyn AlertSink>,
    topic: String,
    snapshot: &TankSnapshot,
) -> anyhow::Result<HealthReport> {
    let mut checker = HealthChecker::open(log, sink, topic)
        .with_context(|| format!("failed to open issue log {log}"))?;

    let report = checker.check_health(snapshot)?;
    Ok(report)
}
