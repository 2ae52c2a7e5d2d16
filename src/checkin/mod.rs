//! Invitation check-in: code capture (typed or scanned) and validation at
//! the door.

pub mod camera;
pub mod code;
pub mod desk;
pub mod scanner;

pub use camera::{
    CameraConstraints, Facing, MediaDevices, MediaError, MediaStream, MediaTrack,
    PermissionError, StreamGuard, TrackState,
};
pub use code::{CodeError, TicketCode, MANUAL_CODE_LEN};
pub use desk::CheckInDesk;
pub use scanner::{DecodeError, QrDecoder, QrScanner, ScannerState};
