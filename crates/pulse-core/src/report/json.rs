//! JSON report generation

use crate::{AnalysisRecord, CoreResult};

pub fn generate(record: &AnalysisRecord) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(record)?)
}
