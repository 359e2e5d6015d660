//! PrinterChannel middleware for monitoring channel traffic
//!
//! Wraps any channel and prints every write and read passing through it.
//!
//! # Example
//!
//! ```ignore
//! use nattiq_transport::{HidDiscovery, PrinterChannel, PrinterConfig, DeviceLocator};
//!
//! let channel = HidDiscovery::new().open(&DeviceLocator::Any)?;
//! let monitored = PrinterChannel::wrap(channel, PrinterConfig::default());
//! ```

use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::{BoxedChannel, Channel, ChannelInfo, TransportError};

/// Output format for the printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for the PrinterChannel
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// Print bytes sent to the device
    pub show_writes: bool,
    /// Print bytes received from the device
    pub show_reads: bool,
    /// Output format
    pub format: OutputFormat,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            show_writes: true,
            show_reads: true,
            format: OutputFormat::Text,
        }
    }
}

impl PrinterConfig {
    /// Create config with output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Only print device-bound traffic
    pub fn writes_only(mut self) -> Self {
        self.show_reads = false;
        self
    }
}

#[derive(Serialize)]
struct TrafficRecord<'a> {
    t: f64,
    dir: &'a str,
    len: usize,
    hex: String,
}

/// Channel middleware that prints all traffic
pub struct PrinterChannel {
    inner: BoxedChannel,
    config: PrinterConfig,
    start: Instant,
}

impl PrinterChannel {
    /// Wrap a channel with printing middleware
    pub fn wrap(inner: BoxedChannel, config: PrinterConfig) -> BoxedChannel {
        Box::new(Self {
            inner,
            config,
            start: Instant::now(),
        })
    }

    fn print(&self, dir: &str, bytes: &[u8]) {
        let line = format_traffic(
            self.config.format,
            self.start.elapsed().as_secs_f64(),
            dir,
            bytes,
        );
        eprintln!("{line}");
    }
}

/// Render one traffic line in the configured format
fn format_traffic(format: OutputFormat, t: f64, dir: &str, bytes: &[u8]) -> String {
    let hex = bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");

    match format {
        OutputFormat::Text => format!("[{t:9.3}] {dir} ({:3}) {hex}", bytes.len()),
        OutputFormat::Json => {
            let record = TrafficRecord {
                t,
                dir,
                len: bytes.len(),
                hex,
            };
            serde_json::to_string(&record).unwrap_or_default()
        }
    }
}

impl Channel for PrinterChannel {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.config.show_writes {
            self.print(">>", bytes);
        }
        self.inner.write_bytes(bytes)
    }

    fn read_bytes(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        let n = self.inner.read_bytes(buf, timeout)?;
        if n > 0 && self.config.show_reads {
            self.print("<<", &buf[..n]);
        }
        Ok(n)
    }

    fn info(&self) -> &ChannelInfo {
        self.inner.info()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_line_contains_direction_and_hex() {
        let line = format_traffic(OutputFormat::Text, 1.5, ">>", &[0x1C, 0x01, 0x02, 0x1F]);
        assert!(line.contains(">>"));
        assert!(line.ends_with("1C 01 02 1F"));
        assert!(line.contains("(  4)"));
    }

    #[test]
    fn json_line_is_parseable() {
        let line = format_traffic(OutputFormat::Json, 0.25, "<<", &[0xFA, 0x00]);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["dir"], "<<");
        assert_eq!(value["len"], 2);
        assert_eq!(value["hex"], "FA 00");
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
