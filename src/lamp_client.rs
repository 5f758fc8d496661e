use std::collections::HashSet;
use std::hash::Hash;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use btleplug::api::{
    Central, CentralEvent, Manager as _, Peripheral as _, PeripheralProperties, ScanFilter,
    WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::codec::{
    decode_brightness, decode_power, decode_temperature, encode_brightness, encode_power,
    encode_temperature,
};
use crate::color::ColorValue;
use crate::error::{LampError, Result};
use crate::protocol::{
    characteristic_name, BRIGHTNESS_CHARACTERISTIC, COLOR_CHARACTERISTIC,
    LAMP_NAME_CHARACTERISTIC, LAMP_SERVICES, POWER_CHARACTERISTIC, POWER_OFF,
    TEMPERATURE_CHARACTERISTIC,
};
use crate::transport::{BtleLink, LampLink};
use crate::types::{DeviceColor, LampKind};

// ── LampDevice ────────────────────────────────────────────────────────────────

/// A lamp discovered during a BLE scan.
///
/// Yielded by [`LampScanner`] and returned by [`LampClient::scan_all`]; pass
/// to [`LampClient::connect_to`] to open a session.
#[derive(Clone, Debug)]
pub struct LampDevice {
    /// Advertised local name, or `"Unknown"` if the lamp did not send one.
    pub name: String,
    /// Platform BLE identifier.
    /// • macOS / Windows: a UUID string
    /// • Linux: a Bluetooth MAC address (`AA:BB:CC:DD:EE:FF`)
    pub id: String,
    /// Signal strength at discovery time, when the platform reports it.
    pub rssi: Option<i16>,
    pub(crate) peripheral: Peripheral,
}

// ── LampClientConfig ──────────────────────────────────────────────────────────

/// Configuration for [`LampClient`].
#[derive(Debug, Clone)]
pub struct LampClientConfig {
    /// How long [`LampClient::scan_all`] and [`LampClient::connect`] scan
    /// before giving up.  Default: `15`.
    pub scan_timeout_secs: u64,
    /// Upper bound on the BLE connect step.  Default: `10`.
    pub connect_timeout_secs: u64,
    /// Upper bound on GATT service discovery.  Default: `15`.
    pub discover_timeout_secs: u64,
    /// Only report lamps whose advertised name starts with this string.
    /// `None` reports every peripheral advertising the lamp services.
    ///
    /// Some platforms ignore the scan's service filter and deliver
    /// advertisements with no service list.  Those are reported only when
    /// their name matches this prefix, so set it (e.g. `"Hue"`) to find
    /// lamps that do not advertise their services.  Default: `None`.
    pub name_prefix: Option<String>,
    /// Use write-without-response for characteristic writes.
    ///
    /// Lamps acknowledge writes, so the default (`false`) waits for the
    /// acknowledgement.
    pub write_without_response: bool,
}

impl Default for LampClientConfig {
    fn default() -> Self {
        Self {
            scan_timeout_secs: 15,
            connect_timeout_secs: 10,
            discover_timeout_secs: 15,
            name_prefix: None,
            write_without_response: false,
        }
    }
}

impl LampClientConfig {
    fn write_type(&self) -> WriteType {
        if self.write_without_response {
            WriteType::WithoutResponse
        } else {
            WriteType::WithResponse
        }
    }
}

// ── LampClient ────────────────────────────────────────────────────────────────

/// BLE client for Hue lamps.
///
/// Scans for peripherals advertising the light or settings service, connects,
/// and hands back a [`LampHandle`].  Color support is detected at connect
/// time from the discovered characteristics; white-only lamps get a handle
/// whose color operations fail with [`LampError::UnsupportedOperation`].
pub struct LampClient {
    config: LampClientConfig,
}

impl LampClient {
    pub fn new(config: LampClientConfig) -> Self {
        Self { config }
    }

    // ── Public: scan ─────────────────────────────────────────────────────────

    /// Start scanning and return the stream of discovered lamps.
    ///
    /// Each lamp is yielded once.  The scan keeps running until
    /// [`LampScanner::stop`] is called or the scanner is dropped; there is no
    /// built-in timeout.
    pub async fn scan(&self) -> Result<LampScanner> {
        let adapter = default_adapter().await?;
        let events = adapter.events().await?;

        adapter
            .start_scan(ScanFilter {
                services: LAMP_SERVICES.to_vec(),
            })
            .await?;
        info!("scan: started");

        let (tx, rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(discovery_loop(
            adapter,
            events,
            self.config.name_prefix.clone(),
            tx,
            stop_rx,
        ));

        Ok(LampScanner {
            rx,
            stop_tx: Some(stop_tx),
            task: Some(task),
        })
    }

    /// Scan for `config.scan_timeout_secs` seconds and return every lamp found.
    pub async fn scan_all(&self) -> Result<Vec<LampDevice>> {
        let secs = self.config.scan_timeout_secs;
        info!("scan_all: scanning for {secs} s …");

        let mut scanner = self.scan().await?;
        let deadline = tokio::time::sleep(Duration::from_secs(secs));
        tokio::pin!(deadline);

        let mut found = vec![];
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                device = scanner.next() => match device {
                    Some(device) => found.push(device),
                    None => break,
                },
            }
        }
        scanner.stop().await;

        info!("scan_all: {} lamp(s) found", found.len());
        Ok(found)
    }

    // ── Public: connect_to ────────────────────────────────────────────────────

    /// Connect to a lamp returned by a scan and discover its characteristics.
    pub async fn connect_to(&self, device: LampDevice) -> Result<LampHandle> {
        let LampDevice {
            name,
            id,
            peripheral,
            ..
        } = device;

        // BlueZ's Device1.Connect can block indefinitely on a lamp that has
        // gone out of range.
        let secs = self.config.connect_timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), peripheral.connect())
            .await
            .map_err(|_| LampError::Timeout {
                what: "connect",
                secs,
            })??;

        // bluez-async reports the connection before the remote GATT cache is
        // populated; discovering too early returns an empty set.
        #[cfg(target_os = "linux")]
        tokio::time::sleep(Duration::from_millis(600)).await;

        let secs = self.config.discover_timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), peripheral.discover_services())
            .await
            .map_err(|_| LampError::Timeout {
                what: "service discovery",
                secs,
            })??;

        let link = BtleLink::new(peripheral, self.config.write_type());
        if !link.has_characteristic(POWER_CHARACTERISTIC) {
            warn!("{name}: light service not found, is this a Hue lamp?");
        }

        let handle = LampHandle::new(link, name);
        info!(
            "{}: connected ({id}), {} lamp",
            handle.advertised_name(),
            handle.kind()
        );
        Ok(handle)
    }

    // ── Public: connect (convenience) ────────────────────────────────────────

    /// Scan until the first lamp appears, stop scanning, and connect to it.
    ///
    /// Fails with [`LampError::Timeout`] if nothing shows up within
    /// `config.scan_timeout_secs`.
    pub async fn connect(&self) -> Result<LampHandle> {
        let secs = self.config.scan_timeout_secs;
        info!("Scanning for lamps (timeout: {secs} s) …");

        let mut scanner = self.scan().await?;
        let first = tokio::time::timeout(Duration::from_secs(secs), scanner.next()).await;
        scanner.stop().await;

        match first {
            Ok(Some(device)) => self.connect_to(device).await,
            Ok(None) | Err(_) => Err(LampError::Timeout {
                what: "scan",
                secs,
            }),
        }
    }
}

// ── Adapter helpers ───────────────────────────────────────────────────────────

async fn default_adapter() -> Result<Adapter> {
    let manager = Manager::new().await?;
    let adapter = manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or(LampError::NoAdapter)?;
    wait_powered_on(&adapter).await;
    Ok(adapter)
}

/// CoreBluetooth starts in an "unknown" state and silently ignores scans
/// issued before it reaches PoweredOn.
#[cfg(target_os = "macos")]
async fn wait_powered_on(adapter: &Adapter) {
    use btleplug::api::CentralState;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        match adapter.adapter_state().await {
            Ok(CentralState::PoweredOn) => {
                debug!("macOS: adapter is PoweredOn");
                break;
            }
            Ok(state) if tokio::time::Instant::now() >= deadline => {
                warn!("macOS: adapter still in state {state:?} after 3 s, proceeding anyway");
                break;
            }
            Ok(state) => debug!("macOS: adapter state = {state:?}, waiting…"),
            Err(e) => {
                warn!("macOS: adapter_state() error: {e}");
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[cfg(not(target_os = "macos"))]
async fn wait_powered_on(_adapter: &Adapter) {}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Background half of [`LampScanner`]: turns adapter events into
/// [`LampDevice`]s until told to stop or the consumer goes away.
async fn discovery_loop(
    adapter: Adapter,
    mut events: Pin<Box<dyn Stream<Item = CentralEvent> + Send>>,
    name_prefix: Option<String>,
    tx: mpsc::Sender<LampDevice>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut filter = DiscoveryFilter::new(name_prefix);

    loop {
        let id = tokio::select! {
            // Fires on an explicit stop and when the scanner is dropped.
            _ = &mut stop_rx => break,
            event = events.next() => match event {
                Some(CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id)) => id,
                Some(_) => continue,
                None => {
                    warn!("scan: adapter event stream ended");
                    break;
                }
            },
        };
        if filter.is_reported(&id) {
            continue;
        }

        let peripheral = match adapter.peripheral(&id).await {
            Ok(p) => p,
            Err(e) => {
                debug!("scan: {id:?} vanished before it could be inspected: {e}");
                continue;
            }
        };
        let Ok(Some(props)) = peripheral.properties().await else {
            continue;
        };
        if !filter.accept(id, &props) {
            continue;
        }

        let device = LampDevice {
            name: props.local_name.unwrap_or_else(|| "Unknown".into()),
            id: peripheral.id().to_string(),
            rssi: props.rssi,
            peripheral,
        };
        info!("scan: found {}  id={}", device.name, device.id);

        if !deliver(&tx, device, &mut stop_rx).await {
            break;
        }
    }

    if let Err(e) = adapter.stop_scan().await {
        warn!("scan: stop_scan failed: {e}");
    }
    info!("scan: stopped");
}

/// Hand `item` to the scanner.  Returns `false` once the scan should end:
/// a stop was requested or the receiver is gone.  A full channel does not
/// keep the stop signal from being seen.
async fn deliver<T>(
    tx: &mpsc::Sender<T>,
    item: T,
    stop_rx: &mut oneshot::Receiver<()>,
) -> bool {
    tokio::select! {
        _ = stop_rx => false,
        sent = tx.send(item) => sent.is_ok(),
    }
}

/// Decides which advertisements become [`LampDevice`]s.
///
/// Each id is accepted at most once per scan.  A rejected id stays eligible,
/// since a later `DeviceUpdated` may carry the name or services that were
/// missing from the first advertisement.
struct DiscoveryFilter<K> {
    name_prefix: Option<String>,
    reported: HashSet<K>,
}

impl<K: Eq + Hash> DiscoveryFilter<K> {
    fn new(name_prefix: Option<String>) -> Self {
        Self {
            name_prefix,
            reported: HashSet::new(),
        }
    }

    fn is_reported(&self, id: &K) -> bool {
        self.reported.contains(id)
    }

    /// `true` the first time `id` shows up looking like a lamp.
    fn accept(&mut self, id: K, props: &PeripheralProperties) -> bool {
        if self.is_reported(&id) || !is_lamp(props, self.name_prefix.as_deref()) {
            return false;
        }
        self.reported.insert(id)
    }
}

/// The platform scan filter is not honoured everywhere, so services are
/// checked again here.  An advertisement without a service list only passes
/// on a name-prefix match; without a prefix it is held back until an update
/// lists a lamp service.
fn is_lamp(props: &PeripheralProperties, name_prefix: Option<&str>) -> bool {
    let name_matches = match (name_prefix, props.local_name.as_deref()) {
        (None, _) => true,
        (Some(prefix), Some(name)) => name.starts_with(prefix),
        (Some(_), None) => false,
    };
    let advertises_lamp_service = props.services.iter().any(|s| LAMP_SERVICES.contains(s));
    let services_unknown = props.services.is_empty() && name_prefix.is_some();
    name_matches && (advertises_lamp_service || services_unknown)
}

// ── LampScanner ───────────────────────────────────────────────────────────────

/// Cancellable stream of lamps found by [`LampClient::scan`].
///
/// Use [`LampScanner::next`] or the [`Stream`] impl to consume it.
/// [`LampScanner::stop`] stops the radio scan and waits for the background
/// task to exit; dropping the scanner stops it as well, without waiting.
pub struct LampScanner {
    rx: mpsc::Receiver<LampDevice>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LampScanner {
    /// Next newly discovered lamp, or `None` once scanning has ended.
    pub async fn next(&mut self) -> Option<LampDevice> {
        self.rx.recv().await
    }

    /// Stop scanning.  Returns once the adapter scan has been stopped.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        self.rx.close();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("scan: discovery task failed: {e}");
            }
        }
    }
}

impl Stream for LampScanner {
    type Item = LampDevice;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<LampDevice>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

// ── LampHandle ────────────────────────────────────────────────────────────────

/// An open session with one lamp.
///
/// Every method is a single request/response over the link.  The handle does
/// not queue: do not issue overlapping calls against the same characteristic.
pub struct LampHandle {
    link: Box<dyn LampLink>,
    advertised_name: String,
    has_color: bool,
}

impl LampHandle {
    /// Wrap an already-connected link.  Capabilities are read from the link
    /// once, here.
    pub fn new(link: impl LampLink + 'static, advertised_name: impl Into<String>) -> Self {
        let has_color = link.has_characteristic(COLOR_CHARACTERISTIC);
        Self {
            link: Box::new(link),
            advertised_name: advertised_name.into(),
            has_color,
        }
    }

    /// Name from the advertisement, as seen during the scan.
    pub fn advertised_name(&self) -> &str {
        &self.advertised_name
    }

    /// `true` when the lamp exposes the color characteristic.
    pub fn has_color(&self) -> bool {
        self.has_color
    }

    pub fn kind(&self) -> LampKind {
        if self.has_color {
            LampKind::Color
        } else {
            LampKind::White
        }
    }

    // ── Power ─────────────────────────────────────────────────────────────

    pub async fn on(&self) -> Result<()> {
        self.set_power(true).await
    }

    pub async fn off(&self) -> Result<()> {
        self.set_power(false).await
    }

    pub async fn set_power(&self, on: bool) -> Result<()> {
        self.write(POWER_CHARACTERISTIC, &[encode_power(on)]).await
    }

    pub async fn is_on(&self) -> Result<bool> {
        let [state] = self.read_exact(POWER_CHARACTERISTIC).await?;
        Ok(decode_power(state))
    }

    /// Flip the power state and return the new one.
    ///
    /// Only an explicit `0x00` counts as off; any other state byte turns the
    /// lamp off.
    pub async fn toggle(&self) -> Result<bool> {
        let [state] = self.read_exact(POWER_CHARACTERISTIC).await?;
        let turn_on = state == POWER_OFF;
        self.set_power(turn_on).await?;
        Ok(turn_on)
    }

    // ── Brightness / temperature ──────────────────────────────────────────

    /// Set brightness in percent, `0.0..=100.0`.
    pub async fn set_brightness(&self, pct: f64) -> Result<()> {
        let byte = encode_brightness(pct)?;
        self.write(BRIGHTNESS_CHARACTERISTIC, &[byte]).await
    }

    pub async fn brightness(&self) -> Result<f64> {
        let [byte] = self.read_exact(BRIGHTNESS_CHARACTERISTIC).await?;
        Ok(decode_brightness(byte))
    }

    /// Set color temperature in percent, `0.0` coolest to `100.0` warmest.
    pub async fn set_temperature(&self, pct: f64) -> Result<()> {
        let bytes = encode_temperature(pct)?;
        self.write(TEMPERATURE_CHARACTERISTIC, &bytes).await
    }

    pub async fn temperature(&self) -> Result<f64> {
        let bytes = self.read_exact(TEMPERATURE_CHARACTERISTIC).await?;
        Ok(decode_temperature(bytes))
    }

    // ── Color ─────────────────────────────────────────────────────────────

    /// Parse `color`, encode it, and write it.  Returns the payload written.
    ///
    /// ```no_run
    /// # async fn demo(lamp: &hue_ble::lamp_client::LampHandle) -> hue_ble::Result<()> {
    /// lamp.set_rgb_color("#ff8000").await?;
    /// lamp.set_rgb_color(0x00ff00u32).await?;
    /// lamp.set_rgb_color([0.0, 0.0, 255.0]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set_rgb_color(&self, color: impl Into<ColorValue>) -> Result<DeviceColor> {
        let device_color = color.into().encode()?;
        self.set_device_color(device_color).await?;
        Ok(device_color)
    }

    /// Write a raw 4-byte color payload as-is.
    pub async fn set_color(&self, payload: &[u8]) -> Result<()> {
        let device_color = DeviceColor::from_bytes(payload)?;
        self.set_device_color(device_color).await
    }

    pub async fn set_device_color(&self, color: DeviceColor) -> Result<()> {
        self.require_color()?;
        self.write(COLOR_CHARACTERISTIC, &color.to_bytes()).await
    }

    /// Current color payload, exactly as the lamp reports it.
    pub async fn color(&self) -> Result<DeviceColor> {
        self.require_color()?;
        let [mode, c0, c1, c2] = self.read_exact(COLOR_CHARACTERISTIC).await?;
        Ok(DeviceColor {
            mode,
            channels: [c0, c1, c2],
        })
    }

    // ── Name ──────────────────────────────────────────────────────────────

    /// User-assigned lamp name.
    ///
    /// An empty name usually means the lamp is still bonded to another
    /// central and is refusing reads.
    pub async fn lamp_name(&self) -> Result<String> {
        let bytes = self.read(LAMP_NAME_CHARACTERISTIC).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn set_lamp_name(&self, name: &str) -> Result<()> {
        self.write(LAMP_NAME_CHARACTERISTIC, name.as_bytes()).await
    }

    // ── Connection ────────────────────────────────────────────────────────

    pub async fn is_connected(&self) -> bool {
        self.link.is_connected().await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.link.disconnect().await?;
        info!("{}: disconnected", self.advertised_name);
        Ok(())
    }

    // ── Private ───────────────────────────────────────────────────────────

    fn require_color(&self) -> Result<()> {
        if self.has_color {
            Ok(())
        } else {
            Err(LampError::UnsupportedOperation("lamp does not support color"))
        }
    }

    fn require(&self, uuid: Uuid) -> Result<()> {
        if self.link.has_characteristic(uuid) {
            Ok(())
        } else {
            Err(LampError::CharacteristicNotFound(uuid))
        }
    }

    async fn read(&self, uuid: Uuid) -> Result<Vec<u8>> {
        self.require(uuid)?;
        let payload = self.link.read(uuid).await?;
        debug!("read {}: {payload:02x?}", characteristic_name(&uuid));
        Ok(payload)
    }

    /// Read and keep the first `N` bytes; a shorter payload is an error.
    async fn read_exact<const N: usize>(&self, uuid: Uuid) -> Result<[u8; N]> {
        let payload = self.read(uuid).await?;
        payload
            .get(..N)
            .and_then(|head| <[u8; N]>::try_from(head).ok())
            .ok_or(LampError::MalformedPayload {
                uuid,
                expected: N,
                actual: payload.len(),
            })
    }

    async fn write(&self, uuid: Uuid, payload: &[u8]) -> Result<()> {
        self.require(uuid)?;
        debug!("write {}: {payload:02x?}", characteristic_name(&uuid));
        self.link.write(uuid, payload).await
    }
}
