//! Serial transport for the sensor link

use myo_core::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Connection lifecycle of a serial link.
///
/// `Failed` is terminal: once a link has failed, the caller constructs a
/// new one to retry. The instance itself never reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkState {
    Disconnected,
    Connected,
    Failed,
}

/// Non-blocking source of newline-delimited sensor lines.
///
/// The seam between the reader task and the transport: production code
/// uses [`SerialLink`], tests script their own sources.
pub trait LineSource: Send {
    /// Return the freshest complete line received since the last poll,
    /// or `None` when nothing new has arrived. Must not block.
    fn poll_line(&mut self) -> BridgeResult<Option<String>>;
}

/// Accumulates raw serial bytes and yields the freshest complete line.
///
/// Lines arriving between polls are discarded except the newest one;
/// stale readings are worthless for a real-time trigger. A trailing
/// partial line stays buffered until its newline arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append freshly received bytes
    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Drain every complete line and return the newest non-empty one.
    ///
    /// Invalid UTF-8 is replaced, surrounding whitespace trimmed. When
    /// the newest complete line trims to nothing the poll yields `None`,
    /// matching the wire protocol of one reading per line.
    pub fn take_freshest(&mut self) -> Option<String> {
        let mut freshest = None;
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            freshest = Some(String::from_utf8_lossy(&line).trim().to_string());
        }
        freshest.filter(|line| !line.is_empty())
    }

    /// Bytes of an unterminated line currently held back
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Serial connection to the sensor device.
///
/// The device streams ASCII decimal readings, one per line. Reads are
/// non-blocking with a zero timeout; polling drains whatever the OS has
/// buffered and never waits for more.
pub struct SerialLink {
    port: Box<dyn serialport::SerialPort>,
    port_name: String,
    state: LinkState,
    buffer: LineBuffer,
}

impl SerialLink {
    /// Open `port` at `baud`.
    ///
    /// Fails with [`BridgeError::Connection`] when the device is absent
    /// or refuses the settings; no retry is attempted here.
    pub fn open(port: &str, baud: u32) -> BridgeResult<Self> {
        let handle = serialport::new(port, baud)
            .timeout(Duration::from_millis(0))
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| BridgeError::Connection {
                port: port.to_string(),
                reason: e.to_string(),
            })?;

        debug!(port, baud, "serial link opened");
        Ok(SerialLink {
            port: handle,
            port_name: port.to_string(),
            state: LinkState::Connected,
            buffer: LineBuffer::default(),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Port identifier this link was opened on
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn fail(&mut self, reason: String) -> BridgeError {
        self.state = LinkState::Failed;
        BridgeError::Connection {
            port: self.port_name.clone(),
            reason,
        }
    }
}

impl LineSource for SerialLink {
    fn poll_line(&mut self) -> BridgeResult<Option<String>> {
        if self.state != LinkState::Connected {
            return Err(BridgeError::Connection {
                port: self.port_name.clone(),
                reason: "link is no longer connected".to_string(),
            });
        }

        let available = self
            .port
            .bytes_to_read()
            .map_err(|e| self.fail(e.to_string()))? as usize;

        if available > 0 {
            let mut chunk = vec![0u8; available];
            let read = self
                .port
                .read(&mut chunk)
                .map_err(|e| self.fail(e.to_string()))?;
            self.buffer.extend(&chunk[..read]);
        }

        Ok(self.buffer.take_freshest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshest_line_wins() {
        let mut buffer = LineBuffer::default();
        buffer.extend(b"100\n250\n700\n");
        assert_eq!(buffer.take_freshest(), Some("700".to_string()));
        // Earlier lines in the same poll are gone
        assert_eq!(buffer.take_freshest(), None);
    }

    #[test]
    fn test_partial_line_carries_over() {
        let mut buffer = LineBuffer::default();
        buffer.extend(b"45");
        assert_eq!(buffer.take_freshest(), None);
        assert_eq!(buffer.pending_len(), 2);

        buffer.extend(b"0\n");
        assert_eq!(buffer.take_freshest(), Some("450".to_string()));
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_crlf_trimmed() {
        let mut buffer = LineBuffer::default();
        buffer.extend(b"  612 \r\n");
        assert_eq!(buffer.take_freshest(), Some("612".to_string()));
    }

    #[test]
    fn test_blank_freshest_line_yields_none() {
        let mut buffer = LineBuffer::default();
        buffer.extend(b"500\n\n");
        assert_eq!(buffer.take_freshest(), None);
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let mut buffer = LineBuffer::default();
        buffer.extend(b"4\xff5\n");
        let line = buffer.take_freshest().unwrap();
        assert!(line.contains('\u{fffd}'));
    }

    #[test]
    fn test_open_missing_device_fails_synchronously() {
        let result = SerialLink::open("/dev/ttyMISSING99", 115_200);
        match result {
            Err(BridgeError::Connection { port, .. }) => {
                assert_eq!(port, "/dev/ttyMISSING99");
            }
            other => panic!("expected connection error, got {:?}", other.map(|_| ())),
        }
    }
}
