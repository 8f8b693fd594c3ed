use foundation::color::ScaleDomain;
use foundation::math::ProjectionKind;
use layers::MapStyle;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LEFT_SCENARIO: &str = "ssp126";
pub const DEFAULT_RIGHT_SCENARIO: &str = "ssp245";
pub const DEFAULT_LEGEND_STEPS: usize = 50;

/// Viewer settings. Every field is optional in JSON; missing fields take
/// the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Scenario shown on the left after a load, when the dataset has it.
    pub left_scenario: String,
    pub right_scenario: String,
    pub domain: ScaleDomain,
    pub projection: ProjectionKind,
    pub style: MapStyle,
    /// Fail the load on the first malformed row instead of skipping it.
    pub strict_rows: bool,
    pub legend_steps: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            left_scenario: DEFAULT_LEFT_SCENARIO.to_string(),
            right_scenario: DEFAULT_RIGHT_SCENARIO.to_string(),
            domain: ScaleDomain::default(),
            projection: ProjectionKind::default(),
            style: MapStyle::default(),
            strict_rows: false,
            legend_steps: DEFAULT_LEGEND_STEPS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid viewer config: {0}")]
    Json(#[from] serde_json::Error),
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ViewerConfig};
    use foundation::color::ScaleDomain;
    use foundation::math::ProjectionKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        let cfg = ViewerConfig::from_json_str("{}").expect("parse");
        assert_eq!(cfg, ViewerConfig::default());
        assert_eq!(cfg.left_scenario, "ssp126");
        assert_eq!(cfg.right_scenario, "ssp245");
        assert_eq!(cfg.legend_steps, 50);
    }

    #[test]
    fn overrides_nested_fields() {
        let cfg = ViewerConfig::from_json_str(
            r#"{
                "right_scenario": "ssp585",
                "domain": {"kind": "shared_max", "min": 0.0},
                "projection": {"kind": "orthographic", "center_lon_deg": 20.0, "center_lat_deg": 10.0},
                "style": {"graticule_step_deg": 15.0},
                "strict_rows": true
            }"#,
        )
        .expect("parse");
        assert_eq!(cfg.left_scenario, "ssp126");
        assert_eq!(cfg.right_scenario, "ssp585");
        assert_eq!(cfg.domain, ScaleDomain::SharedMax { min: 0.0 });
        assert_eq!(
            cfg.projection,
            ProjectionKind::Orthographic {
                center_lon_deg: 20.0,
                center_lat_deg: 10.0
            }
        );
        assert_eq!(cfg.style.graticule_step_deg, 15.0);
        assert_eq!(cfg.style.marker.width_divisor, 72.0);
        assert!(cfg.strict_rows);
    }

    #[test]
    fn rejects_bad_json() {
        let err = ViewerConfig::from_json_str(r#"{"style": {"background": "blue"}}"#).expect_err("bad color");
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().starts_with("invalid viewer config"));
    }
}
