//! Camera access for QR scanning.
//!
//! A [`StreamGuard`] owns an acquired [`MediaStream`] and stops every track
//! exactly once: on explicit release, or when dropped.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// One video or audio track of a camera stream.
pub trait MediaTrack {
    fn label(&self) -> &str;
    fn ready_state(&self) -> TrackState;
    /// Stops capture. Stopping an ended track has no effect.
    fn stop(&mut self);
}

pub struct MediaStream {
    tracks: Vec<Box<dyn MediaTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Box<dyn MediaTrack>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Box<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn live_tracks(&self) -> usize {
        self.tracks
            .iter()
            .filter(|track| track.ready_state() == TrackState::Live)
            .count()
    }

    fn stop_all(&mut self) {
        for track in &mut self.tracks {
            track.stop();
        }
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("tracks", &self.tracks.len())
            .field("live", &self.live_tracks())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Environment,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing: Facing,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// Failure reported by the platform when opening the camera, named the way
/// browsers name them (`NotAllowedError`, `NotFoundError`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct MediaError {
    pub name: String,
    pub message: String,
}

impl MediaError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Source of camera streams.
pub trait MediaDevices {
    fn get_user_media(&mut self, constraints: &CameraConstraints) -> Result<MediaStream, MediaError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    Denied,
    NoCamera,
    InUse,
    Overconstrained,
    Insecure,
    Unknown(String),
}

impl PermissionError {
    pub fn classify(error: &MediaError) -> Self {
        match error.name.as_str() {
            "NotAllowedError" | "PermissionDeniedError" => PermissionError::Denied,
            "NotFoundError" | "DevicesNotFoundError" => PermissionError::NoCamera,
            "NotReadableError" | "TrackStartError" => PermissionError::InUse,
            "OverconstrainedError" | "ConstraintNotSatisfiedError" => {
                PermissionError::Overconstrained
            }
            "SecurityError" => PermissionError::Insecure,
            _ => PermissionError::Unknown(error.message.clone()),
        }
    }

    pub fn guidance(&self) -> String {
        match self {
            PermissionError::Denied => {
                "Camera access was denied. Allow camera access in your browser settings and try again."
                    .into()
            }
            PermissionError::NoCamera => {
                "No camera was found. Connect a camera or enter the 7-digit code manually.".into()
            }
            PermissionError::InUse => {
                "The camera is already in use by another application. Close it and try again."
                    .into()
            }
            PermissionError::Overconstrained => {
                "The camera does not support the requested settings. Try a different camera."
                    .into()
            }
            PermissionError::Insecure => {
                "Camera access requires a secure (HTTPS) connection.".into()
            }
            PermissionError::Unknown(message) if message.trim().is_empty() => {
                "Unable to access the camera. Enter the code manually instead.".into()
            }
            PermissionError::Unknown(message) => format!("Unable to access the camera: {message}"),
        }
    }
}

/// Owns a stream for the scanner's lifetime and releases it once.
pub struct StreamGuard {
    stream: Option<MediaStream>,
}

impl StreamGuard {
    pub fn new(stream: MediaStream) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub fn stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.stream.is_none()
    }

    /// Stops every track. Returns `false` when already released.
    pub fn release(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                stream.stop_all();
                tracing::debug!(tracks = stream.tracks().len(), "camera stream released");
                true
            }
            None => false,
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingTrack {
        stops: Rc<Cell<usize>>,
        ended: bool,
    }

    impl MediaTrack for CountingTrack {
        fn label(&self) -> &str {
            "video"
        }

        fn ready_state(&self) -> TrackState {
            if self.ended {
                TrackState::Ended
            } else {
                TrackState::Live
            }
        }

        fn stop(&mut self) {
            if !self.ended {
                self.ended = true;
                self.stops.set(self.stops.get() + 1);
            }
        }
    }

    fn stream(stops: &Rc<Cell<usize>>, tracks: usize) -> MediaStream {
        MediaStream::new(
            (0..tracks)
                .map(|_| {
                    Box::new(CountingTrack {
                        stops: Rc::clone(stops),
                        ended: false,
                    }) as Box<dyn MediaTrack>
                })
                .collect(),
        )
    }

    #[test]
    fn release_is_idempotent() {
        let stops = Rc::new(Cell::new(0));
        let mut guard = StreamGuard::new(stream(&stops, 2));
        assert_eq!(guard.stream().map(MediaStream::live_tracks), Some(2));
        assert!(guard.release());
        assert!(!guard.release());
        drop(guard);
        assert_eq!(stops.get(), 2);
    }

    #[test]
    fn drop_releases_stream() {
        let stops = Rc::new(Cell::new(0));
        {
            let _guard = StreamGuard::new(stream(&stops, 1));
        }
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn errors_are_classified_by_name() {
        let denied = PermissionError::classify(&MediaError::new("NotAllowedError", "Permission denied"));
        assert_eq!(denied, PermissionError::Denied);
        assert!(denied.guidance().contains("denied"));
        assert_eq!(
            PermissionError::classify(&MediaError::new("NotReadableError", "busy")),
            PermissionError::InUse
        );
        assert_eq!(
            PermissionError::classify(&MediaError::new("AbortError", "boom")),
            PermissionError::Unknown("boom".into())
        );
    }
}
