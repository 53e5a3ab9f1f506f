//! Graphviz output for a completed snapshot.

mod duration;
pub use duration::*;

mod style;
pub use style::*;

mod topology;
pub use topology::*;

use crate::accumulator::ReplyAccumulator;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::{fmt, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderOptions {
    pub style: Style,
    /// Colour labelled edges by link age
    pub colour_edges: bool,
    /// Add the longest path through the network to the annotation
    pub longest_path: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            style: Style::Light,
            colour_edges: true,
            longest_path: false,
        }
    }
}

/// Turns the tables collected for a snapshot into a `graph` document
#[derive(Debug, Clone)]
pub struct GraphRenderer {
    name: String,
    options: RenderOptions,
}

impl GraphRenderer {
    pub fn new(name: impl ToString, options: RenderOptions) -> Self {
        Self {
            name: name.to_string(),
            options,
        }
    }

    /// The complete document, terminated by a newline
    pub fn render(
        &self,
        tables: &ReplyAccumulator,
        generated: DateTime<Utc>,
        elapsed: Duration,
    ) -> String {
        Document {
            renderer: self,
            tables,
            generated,
            elapsed,
        }
        .to_string()
    }
}

struct Document<'a> {
    renderer: &'a GraphRenderer,
    tables: &'a ReplyAccumulator,
    generated: DateTime<Utc>,
    elapsed: Duration,
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = &self.renderer.options;

        writeln!(f, "graph {} {{", Quoted(&self.renderer.name))?;
        for directive in options.style.directives() {
            writeln!(f, "{}", directive)?;
        }

        for (hub, leaves) in self.tables.links() {
            for leaf in leaves {
                write!(f, "{} -- {}", Quoted(hub), Quoted(leaf))?;

                // Uptimes are keyed with the leaf first
                if let Some(uptime) = self.tables.uptime(leaf, hub) {
                    write!(f, " [label=\"{}\"", DisplayDuration(uptime))?;
                    if options.colour_edges {
                        write!(f, ";color=\"{},1,.8\"", DisplayHue(hue(uptime)))?;
                    }
                    f.write_str("]")?;
                }
                writeln!(f, ";")?;
            }
        }

        f.write_str("\"")?;
        if options.longest_path {
            if let Some(path) = longest_path(self.tables.links()) {
                write!(
                    f,
                    "longest path {} hops, from {} to {}\\n",
                    path.hops,
                    Escaped(&path.from),
                    Escaped(&path.to)
                )?;
            }
        }
        writeln!(
            f,
            "generated {}\\n{} seconds elapsed\" [shape=\"box\"];",
            self.generated.format("%Y-%m-%d %H:%M:%SZ"),
            self.elapsed.as_secs()
        )?;
        writeln!(f, "}}")
    }
}

/// A DOT identifier in double quotes
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", Escaped(self.0))
    }
}

struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            if c == '"' || c == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
