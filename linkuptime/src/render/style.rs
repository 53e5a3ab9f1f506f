use serde::Deserialize;

/// Graph-wide presentation. Only affects the styling statements at the top
/// of the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Light,
    Dark,
}

impl Style {
    pub fn directives(self) -> &'static [&'static str] {
        match self {
            Self::Light => &["edge [penwidth=2];"],
            Self::Dark => &[
                "bgcolor = black;",
                r#"node [color=white;fontcolor=white;fontname="Comic Sans MS"];"#,
                r#"edge [penwidth=2;color=gray;fontcolor=white;fontname="Comic Sans MS"];"#,
            ],
        }
    }
}
