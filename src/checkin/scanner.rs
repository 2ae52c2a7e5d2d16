//! QR scanning state machine.
//!
//! `Idle -> Scanning -> Decoded`, with `Denied` and `Failed` as exits that
//! allow a retry. Whatever the exit, the camera stream is released before the
//! new state becomes visible.

use thiserror::Error;

use super::camera::{CameraConstraints, MediaDevices, MediaStream, PermissionError, StreamGuard};
use super::code::TicketCode;
use crate::errors::{EventDeskError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("QR decoding failed: {0}")]
pub struct DecodeError(pub String);

/// Reads QR payloads from the frames of a live stream.
pub trait QrDecoder {
    /// `Ok(None)` when the current frame holds no readable code.
    fn decode(&mut self, stream: &MediaStream) -> std::result::Result<Option<String>, DecodeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Scanning,
    Denied { guidance: String },
    Failed { reason: String },
    Decoded(TicketCode),
}

pub struct QrScanner<D: MediaDevices, Q: QrDecoder> {
    devices: D,
    decoder: Q,
    constraints: CameraConstraints,
    guard: Option<StreamGuard>,
    state: ScannerState,
}

impl<D: MediaDevices, Q: QrDecoder> QrScanner<D, Q> {
    pub fn new(devices: D, decoder: Q) -> Self {
        Self {
            devices,
            decoder,
            constraints: CameraConstraints::default(),
            guard: None,
            state: ScannerState::Idle,
        }
    }

    pub fn with_constraints(mut self, constraints: CameraConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    /// Tracks still capturing; zero whenever the scanner is not scanning.
    pub fn live_tracks(&self) -> usize {
        self.guard
            .as_ref()
            .and_then(StreamGuard::stream)
            .map(|stream| stream.live_tracks())
            .unwrap_or(0)
    }

    /// Opens the camera. A no-op while already scanning.
    pub fn start(&mut self) -> &ScannerState {
        if self.state == ScannerState::Scanning {
            return &self.state;
        }
        match self.devices.get_user_media(&self.constraints) {
            Ok(stream) => {
                self.guard = Some(StreamGuard::new(stream));
                self.state = ScannerState::Scanning;
                tracing::debug!("camera stream acquired");
            }
            Err(error) => {
                let permission = PermissionError::classify(&error);
                tracing::warn!(error = %error, "camera unavailable");
                self.state = match permission {
                    PermissionError::Denied => ScannerState::Denied {
                        guidance: permission.guidance(),
                    },
                    other => ScannerState::Failed {
                        reason: other.guidance(),
                    },
                };
            }
        }
        &self.state
    }

    /// Examines one frame. Returns the code once decoded.
    pub fn poll(&mut self) -> Option<TicketCode> {
        if self.state != ScannerState::Scanning {
            return None;
        }
        let stream = self.guard.as_ref().and_then(StreamGuard::stream)?;
        match self.decoder.decode(stream) {
            Ok(Some(payload)) => match TicketCode::scanned(&payload) {
                Ok(code) => {
                    self.release();
                    tracing::info!("QR code decoded");
                    self.state = ScannerState::Decoded(code.clone());
                    Some(code)
                }
                Err(_) => None,
            },
            Ok(None) => None,
            Err(error) => {
                self.release();
                tracing::warn!(%error, "scan aborted");
                self.state = ScannerState::Failed {
                    reason: error.to_string(),
                };
                None
            }
        }
    }

    /// Polls up to `max_frames` frames, releasing the camera however it ends.
    pub fn scan(&mut self, max_frames: usize) -> Result<TicketCode> {
        self.start();
        for _ in 0..max_frames {
            if let Some(code) = self.poll() {
                return Ok(code);
            }
            if self.state != ScannerState::Scanning {
                break;
            }
        }
        let message = match &self.state {
            ScannerState::Denied { guidance } => guidance.clone(),
            ScannerState::Failed { reason } => reason.clone(),
            _ => "No QR code detected".to_string(),
        };
        self.stop();
        Err(EventDeskError::Camera(message))
    }

    /// Leaves scanning and releases the camera.
    pub fn stop(&mut self) {
        self.release();
        if self.state == ScannerState::Scanning {
            self.state = ScannerState::Idle;
        }
    }

    /// Starts over after a denial, failure or previous decode.
    pub fn retry(&mut self) -> &ScannerState {
        self.release();
        self.state = ScannerState::Idle;
        self.start()
    }

    fn release(&mut self) {
        if let Some(mut guard) = self.guard.take() {
            guard.release();
        }
    }
}
