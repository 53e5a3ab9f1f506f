use crate::config::{Config, ConfigError};
use crate::render::Style;

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Graph an IRC network's server links and how long they've been up")]
pub struct Opts {
    /// Server to connect to
    pub host: String,

    /// Enable dark mode
    #[arg(short, long)]
    pub dark: bool,

    /// Wait for RPL_YOUREOPER before querying
    #[arg(short = 'o', long)]
    pub wait_oper: bool,

    /// Port to connect to [default: 6697]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Connect without TLS
    #[arg(long)]
    pub plaintext: bool,

    /// Nickname to register with
    #[arg(short, long)]
    pub nick: Option<String>,

    /// Session name, used for the protocol trace and the graph name
    #[arg(long)]
    pub name: Option<String>,

    /// Don't colour edges by link age
    #[arg(long)]
    pub no_colour: bool,

    /// Annotate the graph with its longest path
    #[arg(long)]
    pub longest_path: bool,

    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Opts {
    /// Load the config file, if one was given, and apply the command line
    /// on top of it.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load_file(path)?,
            None => Config::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if self.dark {
            config.render.style = Style::Dark;
        }
        if self.wait_oper {
            config.wait_oper = true;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.plaintext {
            config.tls = false;
        }
        if let Some(nick) = &self.nick {
            config.nick = nick.clone();
        }
        if let Some(name) = &self.name {
            config.session_name = name.clone();
        }
        if self.no_colour {
            config.render.colour_edges = false;
        }
        if self.longest_path {
            config.render.longest_path = true;
        }
    }
}
