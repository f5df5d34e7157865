//! # Runout: Time-Bucketed Run Output Organizer
//!
//! Runout gives each experimental run its own uniquely numbered output
//! directory under `out/<year>/<month>/<day>/<hour>-<minute>/<seq>/` and
//! uniform save/load operations for everything the run produces: plot
//! images, numeric arrays (plain or compressed multi-member archives),
//! free-text logs, and caller-defined formats - plus a structural report of
//! what was written.
//!
//! ## Components
//!
//! - [`Session`]: allocates (or opens) the run directory; the root entity.
//! - [`ArtifactStore`]: category-specific save/load rooted at the session.
//! - [`Logger`]: appends to `text/log.txt` while mirroring to stdout.
//! - [`Reporter`]: reads the tree back into a summary.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use runout::Session;
//!
//! let mut session = Session::create()?;
//! session.set_config("model", serde_json::json!("resnet50"));
//!
//! session.logger().log("training started")?;
//! session.store().save_array(&[0.9, 0.5, 0.3], "loss", false)?;
//! session.store().save_array(&[0.9, 0.5, 0.3], "loss", true)?;
//!
//! session.reporter().print()?;
//! # Ok::<(), runout::Error>(())
//! ```
//!
//! Everything is synchronous and single-threaded; concurrent multi-process
//! use of one time bucket needs external coordination (see the sequence
//! allocation notes on [`session`]).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod logger;
pub mod report;
pub mod session;
pub mod store;

pub use error::{Error, Result};
pub use logger::{LogOptions, Logger};
pub use report::{Report, Reporter};
pub use session::{Session, SessionMode};
pub use store::{
    ArchiveCompression, ArrayData, ArtifactStore, Category, FormatCodec, LineStyle, Marker, Plot,
    Plot3d, PlotRenderer, PlotStyle, Series2d, Series3d,
};
