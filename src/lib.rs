//! fileindex
//!
//! Recursively walks files and directories, hands each file to the first
//! handler whose glob matches its name, and collects the results into one
//! map keyed by path.
//!
//! ```no_run
//! # async fn run() -> fileindex::Result<()> {
//! let results = fileindex::load("./config", None).await?;
//! for (path, content) in &results {
//!     println!("{}: {:?}", path.display(), content);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod index;
pub mod observability;

pub use config::Config;
pub use error::{Error, Result};
pub use index::{
    handle, load, scan, Content, ContentHandler, FileMetadata, JsonHandler, LoadTarget, Loader,
    MetadataHandler, PatternRules, Patterns, RawBytesHandler, RawTextHandler, ResultMap,
    RulesBuilder,
};
