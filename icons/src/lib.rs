//! Icon-provider toolkit: fetch upstream icon fonts, build a searchable
//! SVG catalog, and print icons in a few output formats.
//!
//! The `icons` binary wires these pieces to a clap CLI; the library
//! surface exists mostly so the subcommand plumbing stays testable.

pub mod fetch;
pub mod output;
pub mod select;

pub use fetch::{FetchError, FetchResult, FontData};
pub use output::{OutputFormat, render_icons};
