use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Smallest thumbnail edge in pixels.
pub const MIN_PLOT_SIZE: u32 = 20;

/// Axis scaling used for both dimensions of a plot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlotMethod {
    #[default]
    Lin,
    Log,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    None,
    Cw,
    Ccw,
}

impl Rotation {
    /// Value for the `r` parameter; no rotation leaves it out.
    pub fn as_param(self) -> Option<Self> {
        match self {
            Self::None => None,
            other => Some(other),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DotSize {
    Small,
    #[default]
    Regular,
    Big,
}

impl DotSize {
    pub fn radius(self) -> f64 {
        match self {
            Self::Small => 0.4,
            Self::Regular => 0.8,
            Self::Big => 1.4,
        }
    }
}

/// Thumbnail edge for a matrix over `numeric_columns` columns: a row of
/// thumbnails spans at most `max_matrix_px`, rounded down to a multiple of 5,
/// never below [`MIN_PLOT_SIZE`].
pub fn plot_size(numeric_columns: usize, max_matrix_px: u32) -> u32 {
    if numeric_columns == 0 {
        return max_matrix_px.max(MIN_PLOT_SIZE);
    }
    let n = u32::try_from(numeric_columns).unwrap_or(u32::MAX);
    let size = (max_matrix_px / n / 5).saturating_mul(5);
    size.max(MIN_PLOT_SIZE)
}

/// Parameters of one scatterplot as sent in the `plotter` query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotterParams {
    pub cx: String,
    pub cy: String,
    pub l: u32,
    pub dot: f64,
    pub dim_x: PlotMethod,
    pub dim_y: PlotMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Rotation>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plot_size_rule() {
        assert_eq!(plot_size(1, 500), 500);
        assert_eq!(plot_size(3, 500), 165);
        assert_eq!(plot_size(4, 500), 125);
        assert_eq!(plot_size(7, 500), 70);
        assert_eq!(plot_size(30, 500), MIN_PLOT_SIZE);
        assert_eq!(plot_size(0, 500), 500);
    }

    #[test]
    fn test_dot_sizes() {
        assert_eq!(DotSize::Small.radius(), 0.4);
        assert_eq!(DotSize::default().radius(), 0.8);
        assert_eq!(DotSize::Big.radius(), 1.4);
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(PlotMethod::Log.to_string(), "log");
        assert_eq!("lin".parse::<PlotMethod>().unwrap(), PlotMethod::Lin);
        assert_eq!("ccw".parse::<Rotation>().unwrap(), Rotation::Ccw);
        assert!("huge".parse::<DotSize>().is_err());
        // clap accepts the same spellings on the command line.
        assert_eq!(
            <DotSize as ValueEnum>::from_str("big", false).unwrap(),
            DotSize::Big
        );
    }

    #[test]
    fn test_plotter_params_json_omits_unset_rotation() {
        let params = PlotterParams {
            cx: "a".into(),
            cy: "b".into(),
            l: 25,
            dot: DotSize::Regular.radius(),
            dim_x: PlotMethod::Lin,
            dim_y: PlotMethod::Lin,
            r: Rotation::None.as_param(),
        };
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"cx":"a","cy":"b","l":25,"dot":0.8,"dim_x":"lin","dim_y":"lin"}"#
        );

        let rotated = PlotterParams {
            r: Rotation::Cw.as_param(),
            ..params
        };
        assert!(serde_json::to_string(&rotated).unwrap().ends_with(r#","r":"cw"}"#));
    }
}
