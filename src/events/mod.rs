//! # Events Module
//!
//! Progress reporting through channels.
//!
//! ## Design
//! The core library emits events through channels so any front end can
//! subscribe and display progress. Events are observational only: a run
//! behaves the same whether or not anyone is listening.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Fingerprint(FingerprintEvent::Progress(p)) = event {
//!             println!("{}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
