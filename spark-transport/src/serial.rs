use crate::error::TransportError;
use crate::motion::{MotionCommand, MotionSink};
use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, info};
use parking_lot::Mutex;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Write;
use std::time::Duration;

/// Writes motion commands to a byte link, one ASCII line per command:
/// `<sequence>,<lateral>,<forward>,<rotation>\n`.
pub struct SerialMotionSink<W = Box<dyn SerialPort>> {
    port: Mutex<W>,
}

impl SerialMotionSink<Box<dyn SerialPort>> {
    /// Opens the port as 8N1 without flow control.
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()?;

        info!("Opened serial port: {} at {} baud", path, baud_rate);
        Ok(Self::new(port))
    }
}

impl<W: Write + Send> SerialMotionSink<W> {
    pub fn new(port: W) -> Self {
        Self {
            port: Mutex::new(port),
        }
    }

    pub fn into_inner(self) -> W {
        self.port.into_inner()
    }
}

pub fn encode_motion_line(command: &MotionCommand) -> Bytes {
    let line = format!(
        "{},{},{},{}\n",
        command.sequence_id, command.lateral, command.forward, command.rotation
    );
    let mut buf = BytesMut::with_capacity(line.len());
    buf.put_slice(line.as_bytes());
    buf.freeze()
}

impl<W: Write + Send> MotionSink for SerialMotionSink<W> {
    fn send(&self, command: &MotionCommand) -> Result<(), TransportError> {
        let frame = encode_motion_line(command);
        let mut port = self.port.lock();
        port.write_all(&frame)
            .and_then(|_| port.flush())
            .map_err(|e| TransportError::unavailable("motion serial link", e))?;
        debug!("Sent motion command {}", command);
        Ok(())
    }
}
