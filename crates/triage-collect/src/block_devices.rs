//! Host block device collector

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;
use triage_core::MemoryEvidence;
use triage_core::artifacts::BLOCK_DEVICES_PATH;
use triage_core::multitype::is_excluded;
use triage_core::spec::BlockDevices;

use crate::collector::{CollectContext, Collector};
use crate::error::{CollectError, Result};

const LSBLK: &str = "lsblk";
const LSBLK_COLUMNS: &str = "NAME,KNAME,PKNAME,TYPE,MAJ:MIN,SIZE,FSTYPE,MOUNTPOINT,SERIAL,RO,RM";

/// One line of `lsblk --pairs` output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDeviceInfo {
    pub name: String,
    pub kernel_name: String,
    pub parent_kernel_name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub major: u32,
    pub minor: u32,
    pub size: u64,
    pub filesystem_type: String,
    pub mountpoint: String,
    pub serial: String,
    pub read_only: bool,
    pub removable: bool,
}

/// Parse `KEY="value"` pairs output.
///
/// Missing or malformed fields keep their zero value. Blank lines are
/// skipped.
pub fn parse_lsblk(output: &str) -> Vec<BlockDeviceInfo> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> BlockDeviceInfo {
    let mut device = BlockDeviceInfo::default();

    for (key, value) in pairs(line) {
        match key {
            "NAME" => device.name = value.to_string(),
            "KNAME" => device.kernel_name = value.to_string(),
            "PKNAME" => device.parent_kernel_name = value.to_string(),
            "TYPE" => device.device_type = value.to_string(),
            "MAJ:MIN" => {
                if let Some((major, minor)) = value.split_once(':') {
                    device.major = major.trim().parse().unwrap_or_default();
                    device.minor = minor.trim().parse().unwrap_or_default();
                }
            }
            "SIZE" => device.size = value.parse().unwrap_or_default(),
            "FSTYPE" => device.filesystem_type = value.to_string(),
            "MOUNTPOINT" => device.mountpoint = value.to_string(),
            "SERIAL" => device.serial = value.to_string(),
            "RO" => device.read_only = value == "1",
            "RM" => device.removable = value == "1",
            _ => {}
        }
    }

    device
}

/// Split `A="x" B="y z"` into `(A, x)`, `(B, y z)`
fn pairs(line: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = line.trim_start();

    while let Some(eq) = rest.find("=\"") {
        let key = rest[..eq].trim();
        let after = &rest[eq + 2..];
        let Some(end) = after.find('"') else { break };
        out.push((key, &after[..end]));
        rest = after[end + 1..].trim_start();
    }

    out
}

/// Runs `lsblk` and stores `system/block_devices.json`
pub struct BlockDevicesCollector<'a> {
    spec: &'a BlockDevices,
}

impl<'a> BlockDevicesCollector<'a> {
    pub fn new(spec: &'a BlockDevices) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl Collector for BlockDevicesCollector<'_> {
    fn title(&self) -> String {
        match self.spec.meta.collector_name.as_str() {
            "" => "Block Devices".to_string(),
            name => name.to_string(),
        }
    }

    fn is_excluded(&self) -> Result<bool> {
        Ok(is_excluded(self.spec.meta.exclude.as_ref())?)
    }

    async fn collect(&self, _ctx: &CollectContext) -> Result<MemoryEvidence> {
        let output = Command::new(LSBLK)
            .args(["--noheadings", "--bytes", "--pairs", "-o", LSBLK_COLUMNS])
            .output()
            .await
            .map_err(|e| CollectError::Command {
                command: LSBLK.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(CollectError::Command {
                command: LSBLK.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let devices = parse_lsblk(&String::from_utf8_lossy(&output.stdout));
        debug!(count = devices.len(), "collected block devices");

        let mut evidence = MemoryEvidence::new();
        evidence.insert(BLOCK_DEVICES_PATH, serde_json::to_vec(&devices)?);
        Ok(evidence)
    }
}
