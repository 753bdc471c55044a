use thiserror::Error;

use super::DeviceId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeatError {
    #[error("Unknown device {0:?}")]
    UnknownDevice(DeviceId),
    #[error("Device {0:?} is not a pointing device")]
    NotAPointer(DeviceId),
    #[error("Already grabbed at {grab_time}, newer than the request at {time}")]
    AlreadyGrabbed { time: u32, grab_time: u32 },
}
