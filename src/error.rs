use thiserror::Error;

/// Failures the shell reports to the user. Per-category decode problems never
/// reach this type; the extractor logs and skips them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Page fetched fine but carried no known data source.
    #[error("no data found on page")]
    NoDataFound,

    #[error("sheet {sheet} is larger than a worksheet allows")]
    SheetTooLarge { sheet: String },

    #[error("spreadsheet export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
