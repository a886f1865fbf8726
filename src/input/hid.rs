//! Key state from a USB keyboard's boot-protocol input reports

use std::sync::Arc;

use hidapi::{HidApi, HidDevice};
use tracing::{debug, info, warn};

use super::boot::boot_report_keys;
use super::triggers::TriggerTable;
use super::KeyStateSource;
use crate::error::{Error, Result};

/// Input report buffer size
const READ_BUF_LEN: usize = 64;

/// Reads boot keyboard reports and exposes the held keys as the trigger
/// codes of `table`, so the detector resolves them like native codes.
pub struct HidKeySource {
    device: HidDevice,
    table: Arc<TriggerTable>,
    down: [bool; 256],
}

impl HidKeySource {
    /// Open the first device matching `vid:pid`
    pub fn open(vid: u16, pid: u16, table: Arc<TriggerTable>) -> Result<Self> {
        let api = HidApi::new().map_err(|e| Error::Input(format!("HID init failed: {e}")))?;
        let device = api
            .open(vid, pid)
            .map_err(|e| Error::Input(format!("cannot open {vid:04x}:{pid:04x}: {e}")))?;
        device
            .set_blocking_mode(false)
            .map_err(|e| Error::Input(format!("cannot set non-blocking mode: {e}")))?;
        info!("Opened HID keyboard {:04x}:{:04x}", vid, pid);
        Ok(Self {
            device,
            table,
            down: [false; 256],
        })
    }

    fn apply_report(&mut self, report: &[u8]) {
        self.down = [false; 256];
        for key in boot_report_keys(report) {
            if let Some(codes) = self.table.codes(key) {
                for &c in codes {
                    self.down[c as usize] = true;
                }
            }
        }
    }
}

impl KeyStateSource for HidKeySource {
    fn begin_poll(&mut self) {
        let mut buf = [0u8; READ_BUF_LEN];
        let mut latest: Option<Vec<u8>> = None;
        // Drain queued reports, the newest one describes the current state
        loop {
            match self.device.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => latest = Some(buf[..n].to_vec()),
                Err(e) => {
                    warn!("HID read failed: {}", e);
                    break;
                }
            }
        }
        if let Some(report) = latest {
            debug!(len = report.len(), "HID report");
            self.apply_report(&report);
        }
    }

    fn is_down(&mut self, code: u8) -> bool {
        self.down[code as usize]
    }
}
