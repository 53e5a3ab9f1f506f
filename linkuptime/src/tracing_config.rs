use crate::config::{BuiltinLogTarget, LogEntry, LogLevel, LogTarget, LoggingConfig};

use std::{io, path::Path};
use tracing::{Metadata, Subscriber};
use tracing_core::LevelFilter;
use tracing_subscriber::{
    filter::{filter_fn, Targets},
    fmt::writer::BoxMakeWriter,
    prelude::*,
    registry::LookupSpan,
    Layer,
};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

impl LogEntry {
    /// Whether this target wants an event described by `metadata`
    fn accepts(&self, metadata: &Metadata<'_>) -> bool {
        let level = self.level.map_or(LevelFilter::TRACE, LevelFilter::from);
        if metadata.level() > &level {
            return false;
        }

        match metadata.module_path() {
            Some(module) if !self.modules.is_empty() => {
                self.modules.iter().any(|m| module.starts_with(m.as_str()))
            }
            _ => true,
        }
    }

    /// The writer for this target, and whether it's a terminal stream that
    /// should get colours
    fn make_writer(&self, dir: &Path) -> io::Result<(BoxMakeWriter, bool)> {
        Ok(match &self.target {
            LogTarget::File { filename } => {
                std::fs::create_dir_all(dir)?;
                let appender = tracing_appender::rolling::daily(dir, filename);
                (BoxMakeWriter::new(appender), false)
            }
            LogTarget::Builtin(BuiltinLogTarget::Stdout) => (BoxMakeWriter::new(io::stdout), true),
            LogTarget::Builtin(BuiltinLogTarget::Stderr) => (BoxMakeWriter::new(io::stderr), true),
        })
    }
}

fn target_layer<S>(entry: LogEntry, dir: &Path) -> io::Result<BoxedLayer<S>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let (writer, ansi) = entry.make_writer(dir)?;

    Ok(tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_filter(filter_fn(move |metadata| entry.accepts(metadata)))
        .boxed())
}

/// Build the subscriber described by `conf`. Nothing is installed; call
/// `init()` on the result.
pub fn build_subscriber(conf: LoggingConfig) -> io::Result<impl Subscriber> {
    let LoggingConfig {
        dir,
        default_level,
        module_levels,
        targets,
    } = conf;

    let layers = targets
        .into_iter()
        .map(|entry| target_layer(entry, &dir))
        .collect::<io::Result<Vec<_>>>()?;

    // Per-module levels apply to every target, before each target's own filter
    let modules = Targets::new()
        .with_default(default_level.unwrap_or(LogLevel::Trace))
        .with_targets(module_levels);

    Ok(tracing_subscriber::registry().with(modules).with(layers))
}
