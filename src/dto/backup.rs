use serde::Serialize;
use utoipa::ToSchema;

/// Tally of a CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Games added.
    pub games_created: usize,
    /// Games whose name already existed.
    pub games_skipped: usize,
    /// Platforms added from platform columns.
    pub platforms_created: usize,
    /// Platform cells that reused an existing platform.
    pub platforms_skipped: usize,
    /// Tags added from the tags column.
    pub tags_created: usize,
    /// One `Row {n}: {message}` entry per failed row.
    pub errors: Vec<String>,
}
