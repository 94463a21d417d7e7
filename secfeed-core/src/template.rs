//! Placeholder templates for the plain-text digest.
//!
//! A template is literal text with `{{ field }}` placeholders. Field names are
//! case-insensitive and may start with a dot, so `{{ .Title }}` and
//! `{{ title }}` render the same value.

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::error::TemplateError;
use crate::feed::FeedEntry;

pub const DEFAULT_OUTPUT_FORMAT: &str = "----
{{ .Title }}
{{ .Date }}
{{ .Summary }}
{{ .Link }}
----
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Date,
    Summary,
    Link,
}

impl Field {
    fn parse(name: &str) -> Result<Self, TemplateError> {
        let bare = name.strip_prefix('.').unwrap_or(name);
        match bare.to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "date" => Ok(Self::Date),
            "summary" => Ok(Self::Summary),
            "link" => Ok(Self::Link),
            _ => Err(TemplateError::UnknownField(name.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Field),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    segments: Vec<Segment>,
}

impl OutputTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_owned()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or(TemplateError::Unclosed(offset + open))?;
            let name = after_open[..close].trim();
            if name.is_empty() {
                return Err(TemplateError::Empty(offset + open));
            }
            segments.push(Segment::Field(Field::parse(name)?));

            let consumed = open + 2 + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_owned()));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, entry: &FeedEntry) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(Field::Title) => out.push_str(&entry.title),
                Segment::Field(Field::Date) => {
                    if let Some(date) = entry.published_at {
                        out.push_str(&format_date(date));
                    }
                }
                Segment::Field(Field::Summary) => out.push_str(&entry.summary),
                Segment::Field(Field::Link) => out.push_str(&entry.link),
            }
        }
        out
    }

    pub fn render_to<W: Write>(&self, out: &mut W, entry: &FeedEntry) -> std::io::Result<()> {
        out.write_all(self.render(entry).as_bytes())
    }
}

impl Default for OutputTemplate {
    fn default() -> Self {
        Self::parse(DEFAULT_OUTPUT_FORMAT).unwrap_or(Self {
            segments: Vec::new(),
        })
    }
}

pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M:%S %z %Z").to_string()
}
