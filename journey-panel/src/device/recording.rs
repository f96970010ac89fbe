//! In-memory device that records every operation, for tests.

use embedded_graphics::geometry::Size;
use embedded_graphics::primitives::Rectangle;

use super::{DeviceError, EpdDevice};

/// One recorded device call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeviceOp {
    Init,
    InitFast,
    InitPart,
    Display(Vec<u8>),
    DisplayPartial(Vec<u8>, Rectangle),
    Clear,
    Sleep,
}

impl DeviceOp {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            DeviceOp::Init => "init",
            DeviceOp::InitFast => "init_fast",
            DeviceOp::InitPart => "init_part",
            DeviceOp::Display(_) => "display",
            DeviceOp::DisplayPartial(..) => "display_partial",
            DeviceOp::Clear => "clear",
            DeviceOp::Sleep => "sleep",
        }
    }
}

/// Pretends to be an 800x480 panel.
#[derive(Debug, Default)]
pub(crate) struct RecordingDevice {
    pub(crate) ops: Vec<DeviceOp>,
    /// Operation name that fails with an I/O error.
    pub(crate) fail_on: Option<&'static str>,
}

impl RecordingDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_on(op: &'static str) -> Self {
        Self {
            ops: Vec::new(),
            fail_on: Some(op),
        }
    }

    /// Names of recorded operations, in order.
    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.ops.iter().map(DeviceOp::name).collect()
    }

    pub(crate) fn take(&mut self) -> Vec<&'static str> {
        let names = self.names();
        self.ops.clear();
        names
    }

    fn record(&mut self, op: DeviceOp) -> Result<(), DeviceError> {
        if self.fail_on == Some(op.name()) {
            return Err(DeviceError::Io(std::io::Error::other(format!(
                "{} failed",
                op.name()
            ))));
        }
        self.ops.push(op);
        Ok(())
    }
}

impl EpdDevice for RecordingDevice {
    fn size(&self) -> Size {
        Size::new(800, 480)
    }

    fn init(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceOp::Init)
    }

    fn init_fast(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceOp::InitFast)
    }

    fn init_part(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceOp::InitPart)
    }

    fn display(&mut self, buffer: &[u8]) -> Result<(), DeviceError> {
        self.record(DeviceOp::Display(buffer.to_vec()))
    }

    fn display_partial(&mut self, buffer: &[u8], region: Rectangle) -> Result<(), DeviceError> {
        self.record(DeviceOp::DisplayPartial(buffer.to_vec(), region))
    }

    fn clear(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceOp::Clear)
    }

    fn sleep(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceOp::Sleep)
    }
}
