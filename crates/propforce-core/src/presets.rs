//! Named loading shapes for demos and initial guesses.

use propforce_types::error::PropError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingPreset {
    Uniform,
    Linear,
    #[default]
    Elliptic,
    Quadratic,
}

impl LoadingPreset {
    pub const ALL: [LoadingPreset; 4] = [
        LoadingPreset::Uniform,
        LoadingPreset::Linear,
        LoadingPreset::Elliptic,
        LoadingPreset::Quadratic,
    ];

    /// Five coefficients, lowest power first.
    pub fn coefficients(&self) -> [f64; 5] {
        match self {
            LoadingPreset::Uniform => [2.0, 0.0, 0.0, 0.0, 0.0],
            LoadingPreset::Linear => [1.0, 2.0, 0.0, 0.0, 0.0],
            LoadingPreset::Elliptic => [0.5, 1.0, 3.0, -1.5, 0.0],
            LoadingPreset::Quadratic => [1.0, 0.5, 2.0, 0.0, 0.0],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoadingPreset::Uniform => "uniform",
            LoadingPreset::Linear => "linear",
            LoadingPreset::Elliptic => "elliptic",
            LoadingPreset::Quadratic => "quadratic",
        }
    }
}

impl fmt::Display for LoadingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LoadingPreset {
    type Err = PropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        LoadingPreset::ALL
            .into_iter()
            .find(|p| p.name() == key)
            .ok_or_else(|| {
                PropError::InvalidArgument(format!(
                    "Unknown profile: {s}. Choose from uniform, linear, elliptic, quadratic"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names() {
        for preset in LoadingPreset::ALL {
            assert_eq!(preset.name().parse::<LoadingPreset>().unwrap(), preset);
        }
        assert_eq!(" Elliptic ".parse::<LoadingPreset>().unwrap(), LoadingPreset::Elliptic);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            "parabolic".parse::<LoadingPreset>(),
            Err(PropError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_default_is_elliptic() {
        assert_eq!(
            LoadingPreset::default().coefficients(),
            [0.5, 1.0, 3.0, -1.5, 0.0]
        );
    }
}
