use anyhow::Result;
use log::{info, warn};

use hue_ble::lamp_client::{LampClient, LampClientConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // ── Logging ───────────────────────────────────────────────────────────────
    // Set RUST_LOG=debug to see every payload written and read, e.g.:
    //   RUST_LOG=hue_ble=debug cargo run
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = LampClientConfig {
        scan_timeout_secs: 15,
        name_prefix: None,
        ..LampClientConfig::default()
    };
    let scan_timeout_secs = config.scan_timeout_secs;
    let client = LampClient::new(config);

    // ── Discover ──────────────────────────────────────────────────────────────
    info!("Scanning for lamps ({scan_timeout_secs} s) …");
    let mut scanner = client.scan().await?;
    let first = tokio::time::timeout(
        std::time::Duration::from_secs(scan_timeout_secs),
        scanner.next(),
    )
    .await;
    scanner.stop().await;

    let Ok(Some(device)) = first else {
        warn!("No lamps found");
        return Ok(());
    };
    info!("Discovered {} ({})", device.name, device.id);

    // ── Connect ───────────────────────────────────────────────────────────────
    let lamp = client.connect_to(device).await?;

    let name = lamp.lamp_name().await?;
    if name.is_empty() {
        warn!("The lamp returned an empty name; it is probably still bonded to another device.");
        warn!("Reset the lamp and connect this computer BEFORE your phone.");
    }
    info!("Lamp name: {name}");
    info!("Lamp type: {}", lamp.kind());
    info!("Turned on: {}", lamp.is_on().await?);

    // ── Drive ─────────────────────────────────────────────────────────────────
    lamp.on().await?;
    lamp.set_brightness(100.0).await?;
    if lamp.has_color() {
        let payload = lamp.set_rgb_color("f00").await?;
        info!("Color: {payload}");
    } else {
        lamp.set_temperature(50.0).await?;
        info!("Temperature: {:.1} %", lamp.temperature().await?);
    }
    info!("Brightness: {:.1} %", lamp.brightness().await?);

    lamp.disconnect().await?;
    info!("Disconnected");
    Ok(())
}
