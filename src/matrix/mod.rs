//! Scatterplot matrix over the numeric columns of a dataset.

pub mod columns;
pub mod layout;
pub mod plotter;

use thiserror::Error;

pub use columns::{ColumnInfo, numeric_columns, parse_columns_info};
pub use layout::{
    FACET_TYPE, FacetOptions, MatrixCell, MatrixRow, MatrixSettings, PlotContext,
    ScatterplotMatrix,
};
pub use plotter::{DotSize, PlotMethod, PlotterParams, Rotation, plot_size};

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Error calling 'get-columns-info'")]
    ColumnsInfo,
    #[error("There are no columns in this dataset")]
    NoColumns,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid server URL: {0}")]
    Url(String),
}
