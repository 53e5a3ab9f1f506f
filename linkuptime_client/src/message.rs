use std::fmt;

/// A message tag attached to an inbound (server->client) message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessageTag {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundTagSet(pub Vec<InboundMessageTag>);

impl InboundTagSet {
    pub fn has(&self, name: &str) -> Option<&InboundMessageTag> {
        self.0.iter().find(|t| t.name == name)
    }
}

/// A tokenised message received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerMessage {
    /// The message prefix, without the leading colon, if there was one
    pub source: Option<String>,
    /// The command or three-digit numeric
    pub command: String,
    /// The list of arguments
    pub args: Vec<String>,
    /// The list of tags attached to the message
    pub tags: InboundTagSet,
}

impl ServerMessage {
    /// Create a `ServerMessage` from a received line
    pub fn parse(raw: &str) -> Option<Self> {
        let mut args = Vec::new();
        let mut tags = Vec::new();

        let mut raw = raw.trim_start();
        if raw.is_empty() {
            return None;
        }

        if raw.starts_with('@') {
            let space_offset = raw.find(' ')?;

            // Take the text between the '@' and the delimiting space and split
            for tag_def in raw[1..space_offset].split(';') {
                let (name, value) = match tag_def.split_once('=') {
                    Some((n, v)) => (n.to_string(), Some(v.to_string())),
                    None => (tag_def.to_string(), None),
                };

                tags.push(InboundMessageTag { name, value });
            }

            raw = raw[space_offset..].trim_start();
        }

        let mut source = None;
        if let Some(prefixed) = raw.strip_prefix(':') {
            // A prefix with nothing after it isn't a message
            let space_offset = prefixed.find(' ')?;
            source = Some(prefixed[..space_offset].to_string());
            raw = prefixed[space_offset..].trim_start();
        }

        if raw.is_empty() {
            return None;
        }

        let offset = match raw.find(' ') {
            Some(offset) => offset,
            None => {
                return Some(Self {
                    source,
                    command: raw.to_string(),
                    args: Vec::new(),
                    tags: InboundTagSet(tags),
                });
            }
        };

        let command = &raw[0..offset];
        let mut rest = &raw[offset + 1..];

        loop {
            if let Some(arg) = rest.strip_prefix(':') {
                args.push(arg.to_string());
                break;
            }

            match rest.find(' ') {
                Some(offset) => {
                    let arg = &rest[0..offset];

                    if !arg.is_empty() {
                        args.push(arg.to_string());
                    }

                    rest = &rest[offset + 1..];
                }
                None => {
                    if !rest.is_empty() {
                        args.push(rest.to_string());
                    }
                    break;
                }
            }
        }

        Some(Self {
            source,
            command: command.to_string(),
            args,
            tags: InboundTagSet(tags),
        })
    }

    /// The nickname or server name part of the source prefix, i.e. everything
    /// before the first `!`
    pub fn source_name(&self) -> Option<&str> {
        self.source
            .as_deref()
            .map(|s| s.split_once('!').map_or(s, |(name, _)| name))
    }
}

/// A command to be sent to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub command: String,
    pub args: Vec<String>,
}

impl OutboundMessage {
    pub fn new(command: impl ToString, args: impl IntoIterator<Item = impl ToString>) -> Self {
        Self {
            command: command.to_string(),
            args: args.into_iter().map(|a| a.to_string()).collect(),
        }
    }

    /// A command with no arguments
    pub fn bare(command: impl ToString) -> Self {
        Self {
            command: command.to_string(),
            args: Vec::new(),
        }
    }

    /// The protocol line for this message, without the line terminator
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;

        if let Some((last, init)) = self.args.split_last() {
            for arg in init {
                write!(f, " {}", arg)?;
            }
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }

        Ok(())
    }
}
