pub mod json;
pub mod md;

use crate::error::ScoutError;
use md::ToMarkdown;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render<T>(view: &T, format: OutputFormat) -> Result<String, ScoutError>
where
    T: Serialize + ToMarkdown,
{
    match format {
        OutputFormat::Json => json::to_json(view).map_err(ScoutError::Json),
        OutputFormat::Md => Ok(view.to_markdown()),
    }
}
