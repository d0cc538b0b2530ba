//! Report artifact generation

pub mod json;
pub mod markdown;

use crate::{AnalysisRecord, CoreResult};

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => ReportFormat::Json,
            _ => ReportFormat::Markdown,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Markdown => "text/markdown",
        }
    }
}

/// Render a stored analysis into the requested format
pub fn generate(record: &AnalysisRecord, project_name: &str, format: ReportFormat) -> CoreResult<String> {
    match format {
        ReportFormat::Json => json::generate(record),
        ReportFormat::Markdown => Ok(markdown::generate(record, project_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_defaults_to_markdown() {
        assert_eq!(ReportFormat::parse("json"), ReportFormat::Json);
        assert_eq!(ReportFormat::parse("markdown"), ReportFormat::Markdown);
        assert_eq!(ReportFormat::parse("pdf"), ReportFormat::Markdown);
        assert_eq!(ReportFormat::Markdown.extension(), "md");
    }
}
