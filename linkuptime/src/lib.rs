//! Map the server links of an IRC network, along with how long each link has
//! been up, as a Graphviz graph.
//!
//! A run is a single snapshot: `LINKS` to find the topology, `STATS l` against
//! every server that has something linked beneath it, then one `graph`
//! document on standard output.

pub mod accumulator;
pub mod cli;
pub mod config;
pub mod driver;
pub mod lifecycle;
pub mod render;
pub mod reply;
pub mod utils;

mod run;
pub use run::run;

mod tracing_config;
pub use tracing_config::build_subscriber;
