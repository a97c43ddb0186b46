//! Odds and ends shared by the other crates: logging setup, a Timer for profiling long phases,
//! reading and writing files, and some formatting helpers.

#[macro_use]
extern crate log;

mod collections;
mod io;
pub mod logger;
mod time;
mod utils;

pub use crate::collections::wraparound_index;
pub use crate::io::{read_json, slurp_file, to_json, write_json, write_lines};
pub use crate::time::{elapsed_seconds, prettyprint_time, Timer};
pub use crate::utils::{basename, prettyprint_usize};
