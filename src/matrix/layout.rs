use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::columns::{ColumnInfo, numeric_columns};
use super::plotter::{DotSize, PlotMethod, PlotterParams, Rotation, plot_size};
use super::MatrixError;
use crate::loader::ImageDescriptor;

/// Server path that renders one scatterplot thumbnail.
pub const SCATTERPLOT_COMMAND: &str = "/command/core/get-scatterplot";

/// Facet type registered when a cell is picked.
pub const FACET_TYPE: &str = "scatterplot";

/// Edge of the plot shown in a scatterplot facet.
pub const FACET_PLOT_SIZE: u32 = 150;

/// Options the user can change while the matrix is open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixSettings {
    pub plot_method: PlotMethod,
    pub rotation: Rotation,
    pub dot_size: DotSize,
    /// Thumbnail edge. Computed from the column count on first build and kept
    /// afterwards.
    pub plot_size: Option<u32>,
    pub max_matrix_px: u32,
}

impl Default for MatrixSettings {
    fn default() -> Self {
        Self {
            plot_method: PlotMethod::default(),
            rotation: Rotation::default(),
            dot_size: DotSize::default(),
            plot_size: None,
            max_matrix_px: 500,
        }
    }
}

/// What every thumbnail request shares.
#[derive(Debug, Clone)]
pub struct PlotContext {
    pub server: Url,
    pub project: String,
    /// Current browsing engine state, sent verbatim as the `engine` parameter.
    pub engine: serde_json::Value,
}

impl PlotContext {
    pub fn scatterplot_url(&self, plotter: &PlotterParams) -> Result<Url, MatrixError> {
        let mut url = self
            .server
            .join(SCATTERPLOT_COMMAND)
            .map_err(|e| MatrixError::Url(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("project", &self.project)
            .append_pair("engine", &serde_json::to_string(&self.engine)?)
            .append_pair("plotter", &serde_json::to_string(plotter)?);
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixCell {
    pub cx: String,
    pub cy: String,
    /// One of the axes is the focus column.
    pub current: bool,
    pub url: Url,
}

impl MatrixCell {
    pub fn title(&self) -> String {
        format!("{} (x) vs. {} (y)", self.cx, self.cy)
    }
}

/// Row `i`: header for column `i`, then plots against every later column.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    pub column: String,
    pub current: bool,
    pub cells: Vec<MatrixCell>,
}

/// Options of the scatterplot facet created from a picked cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetOptions {
    pub name: String,
    pub cx: String,
    pub cy: String,
    pub l: u32,
    pub ex: String,
    pub ey: String,
    pub dot: f64,
    pub dim_x: PlotMethod,
    pub dim_y: PlotMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Rotation>,
}

/// Upper-triangle matrix of scatterplots over the numeric columns.
#[derive(Debug, Clone)]
pub struct ScatterplotMatrix {
    rows: Vec<MatrixRow>,
    focus: Option<String>,
    settings: MatrixSettings,
}

impl ScatterplotMatrix {
    pub fn build(
        columns: &[ColumnInfo],
        focus: Option<&str>,
        settings: MatrixSettings,
        context: &PlotContext,
    ) -> Result<Self, MatrixError> {
        if columns.is_empty() {
            return Err(MatrixError::NoColumns);
        }
        let numeric = numeric_columns(columns);
        let mut settings = settings;
        let max_px = settings.max_matrix_px;
        let size = *settings
            .plot_size
            .get_or_insert_with(|| plot_size(numeric.len(), max_px));
        let is_focus = |name: &str| focus == Some(name);

        let mut rows = Vec::with_capacity(numeric.len());
        for (i, x) in numeric.iter().enumerate() {
            let mut cells = Vec::with_capacity(numeric.len() - i - 1);
            for y in &numeric[i + 1..] {
                let plotter = PlotterParams {
                    cx: x.name.clone(),
                    cy: y.name.clone(),
                    l: size,
                    dot: settings.dot_size.radius(),
                    dim_x: settings.plot_method,
                    dim_y: settings.plot_method,
                    r: settings.rotation.as_param(),
                };
                cells.push(MatrixCell {
                    url: context.scatterplot_url(&plotter)?,
                    current: is_focus(&x.name) || is_focus(&y.name),
                    cx: plotter.cx,
                    cy: plotter.cy,
                });
            }
            rows.push(MatrixRow {
                column: x.name.clone(),
                current: is_focus(&x.name),
                cells,
            });
        }
        tracing::debug!(columns = rows.len(), plot_size = size, "built scatterplot matrix");

        Ok(Self {
            rows,
            focus: focus.map(str::to_string),
            settings,
        })
    }

    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// Settings with the plot size resolved; pass them back to `build` to
    /// re-render with the same thumbnail size.
    pub fn settings(&self) -> MatrixSettings {
        self.settings
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn header(&self) -> String {
        match &self.focus {
            Some(column) => format!("Scatterplot Matrix (focusing on '{column}')"),
            None => "Scatterplot Matrix".to_string(),
        }
    }

    /// Cells in row-major order, the order their thumbnails are loaded in.
    pub fn cells(&self) -> impl Iterator<Item = &MatrixCell> {
        self.rows.iter().flat_map(|row| row.cells.iter())
    }

    pub fn cell_at(&self, cx: &str, cy: &str) -> Option<&MatrixCell> {
        self.cells().find(|c| c.cx == cx && c.cy == cy)
    }

    /// One pending descriptor per cell, in load order.
    pub fn descriptors(&self) -> Vec<ImageDescriptor> {
        self.cells()
            .map(|c| ImageDescriptor::pending(c.title(), c.url.as_str()))
            .collect()
    }

    pub fn facet_options(&self, cell: &MatrixCell) -> FacetOptions {
        FacetOptions {
            name: cell.title(),
            cx: cell.cx.clone(),
            cy: cell.cy.clone(),
            l: FACET_PLOT_SIZE,
            ex: "value".to_string(),
            ey: "value".to_string(),
            dot: self.settings.dot_size.radius(),
            dim_x: self.settings.plot_method,
            dim_y: self.settings.plot_method,
            r: self.settings.rotation.as_param(),
        }
    }
}
