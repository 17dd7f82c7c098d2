//! Event type definitions for state-change reporting.

use crate::core::exposure::ExposureMode;
use crate::core::library::ImageKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the camera core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Exposure controller events
    Exposure(ExposureEvent),
    /// Image library events
    Library(LibraryEvent),
    /// Coordinator events (capture, processing, preview)
    Studio(StudioEvent),
}

/// Events from the exposure controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExposureEvent {
    /// Exposure mode switched; manual controls follow the mode
    ModeChanged {
        mode: ExposureMode,
        controls_enabled: bool,
    },
    /// Values were written to the driver (0 means automatic)
    Applied { iso: u32, shutter_micros: u32 },
    /// A manual control moved to a new index
    IndexChanged { iso_index: u32, shutter_index: usize },
}

/// Events from the image library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LibraryEvent {
    /// A refresh completed
    Refreshed {
        full: bool,
        discovered: usize,
        total: usize,
    },
    /// A file was left out of a refresh
    Skipped { path: PathBuf, reason: String },
    /// A file was removed from disk
    Deleted { path: PathBuf },
}

/// Events from the studio coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StudioEvent {
    /// A capture is about to be written under this id
    CaptureStarted { id: u64, path: PathBuf },
    /// The driver finished writing a capture
    Captured { path: PathBuf, bytes_written: u64 },
    /// The DNG converter produced a raw file
    Converted { dng_path: PathBuf },
    /// A derived image was written to the library
    OutputWritten { path: PathBuf, kind: ImageKind },
    /// The live preview was started
    PreviewStarted,
    /// The live preview was stopped
    PreviewStopped,
    /// An operation failed; `FollowUp` messages name a file that did change
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Library(LibraryEvent::Refreshed {
            full: false,
            discovered: 2,
            total: 7,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Library(LibraryEvent::Refreshed { discovered, total, .. }) => {
                assert_eq!(discovered, 2);
                assert_eq!(total, 7);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn exposure_mode_change_is_serializable() {
        let event = Event::Exposure(ExposureEvent::ModeChanged {
            mode: ExposureMode::Manual,
            controls_enabled: true,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("Manual"));
    }
}
