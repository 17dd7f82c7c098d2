//! # Events Module
//!
//! Event-driven reporting so a UI can observe the core without holding
//! references into it.
//!
//! ## Design
//! Components receive an [`EventSender`] at construction and emit events
//! after every state change. Any UI (CLI, GUI, web) subscribes to the
//! receiving end and refreshes its widgets from there.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let mut library = ImageLibrary::new("./images", LibraryConfig::default(), sender);
//!
//! library.refresh(true)?;
//! while let Some(event) = receiver.try_recv() {
//!     if let Event::Library(LibraryEvent::Refreshed { total, .. }) = event {
//!         println!("{} images", total);
//!     }
//! }
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
