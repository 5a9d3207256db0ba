use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use flytrap::capture::ImageFileSource;
use flytrap::delivery::{ApiDelivery, EmailDelivery, EmailMessage, ShareHandler};
use flytrap::report::write_to_directory;
use flytrap::{Delivery, DeliveryContext, FlyTrapConfig, Gesture, Overlay};

/// Replay a gesture script over a screenshot and deliver the bug report
#[derive(Parser, Debug)]
#[command(name = "flytrap", version)]
struct Cli {
    /// Screenshot to annotate
    #[arg(long)]
    base: PathBuf,

    /// JSON array of gestures to replay
    #[arg(long)]
    gestures: PathBuf,

    /// Config file (default: the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scratch directory for screenshots and packaged reports
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Report title (default: TRAP_REPORT_<timestamp>)
    #[arg(long)]
    title: Option<String>,

    /// Email the report to this address
    #[arg(long, conflicts_with = "upload_url")]
    email: Option<String>,

    /// Upload the report to this endpoint
    #[arg(long)]
    upload_url: Option<String>,

    /// Write the report directory without delivering it
    #[arg(long)]
    package_only: bool,
}

/// Stands in for a mail client by printing what would be sent
struct StdoutShare;

impl ShareHandler for StdoutShare {
    fn send(&self, message: EmailMessage) -> Result<(), String> {
        println!("To: {}", message.to.join(", "));
        println!("Subject: {}", message.subject);
        if !message.body.is_empty() {
            println!("\n{}\n", message.body);
        }
        println!("Attachment: {}", message.attachment.display());
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FlyTrapConfig::load_from(path),
        None => FlyTrapConfig::load(),
    };
    if let Some(address) = cli.email {
        config.delivery = Some(Delivery::Email(EmailDelivery::new(
            address,
            "App Feedback",
            "",
        )));
    } else if let Some(url) = cli.upload_url {
        config.delivery = Some(Delivery::Api(ApiDelivery::new(url)));
    }

    let cache_dir = cli
        .cache_dir
        .unwrap_or_else(DeliveryContext::default_cache_dir);
    let script = std::fs::read_to_string(&cli.gestures)
        .with_context(|| format!("Failed to read gestures from {}", cli.gestures.display()))?;
    let gestures: Vec<Gesture> =
        serde_json::from_str(&script).context("Failed to parse gesture script")?;

    let source = ImageFileSource::new(&cli.base);
    let mut overlay = Overlay::start(config.clone(), &source, &cache_dir)
        .context("Unable to capture screenshots, please try again")?;
    for gesture in gestures {
        log::debug!("Gesture {:?}", gesture);
        overlay.handle(gesture);
    }
    let report = overlay
        .finish(&cache_dir, cli.title)
        .context("Failed to finish annotation")?;

    let delivery = match config.delivery {
        Some(delivery) if !cli.package_only => delivery,
        _ => {
            let dir = write_to_directory(&report, &cache_dir)?;
            println!("{}", dir.display());
            return Ok(());
        }
    };

    let ctx = DeliveryContext::new(&cache_dir).with_share(Arc::new(StdoutShare));
    let (tx, rx) = tokio::sync::oneshot::channel();
    delivery.spawn(ctx, report, move |result| {
        let _ = tx.send(result);
    });
    match rx.await? {
        Ok(delivered) => log::info!("Report delivered: {:?}", delivered),
        // Delivery problems never fail the run; they are already logged
        Err(err) => eprintln!("Report not delivered: {}", err),
    }
    Ok(())
}
