use thiserror::Error;

/// Fatal problems with the source file; the dashboard cannot start without
/// a usable dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column '{0}' holds no numeric values")]
    NonNumericAmounts(&'static str),

    #[error("workbook has no sheet named '{0}'")]
    MissingSheet(String),

    #[error("workbook contains no sheets")]
    EmptyWorkbook,
}
