use anyhow::Context;
use beetle_sync::{
    config::{ensure_defaults, load_or_default},
    session::CalibrationSession,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    let explicit = std::env::var("CONFIG").ok();
    let required = explicit.is_some();
    let path = explicit.unwrap_or_else(|| "config/beetle-sync.toml".into());
    let mut cfg = load_or_default(&path, required)?;
    ensure_defaults(&mut cfg);

    let mut session = CalibrationSession::new(cfg);
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut lineno = 0usize;
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        lineno += 1;
        match session.ingest_line(&line) {
            Ok(Some(report)) => {
                stdout.write_all(format!("{report}\n").as_bytes()).await?;
            }
            Ok(None) => continue,
            Err(err) => warn!("line {}: {}", lineno, err),
        }
    }
    stdout.flush().await?;

    for summary in session.summaries() {
        let alias = session
            .config()
            .device(summary.device_id)
            .and_then(|d| d.alias.as_deref())
            .unwrap_or("-");
        info!(
            "device {} ({}): samples={} median_offset={} smoothed={} median_rtt={} jitter={} drift_ppm={:.3}",
            summary.device_id,
            alias,
            summary.samples,
            summary.median_offset,
            summary.smoothed_offset,
            summary.median_rtt,
            summary.jitter,
            summary.drift_ppm
        );
    }
    Ok(())
}
