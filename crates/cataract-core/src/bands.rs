//! Clinical interpretation bands for numeric measurements

use serde::Serialize;

/// Lens opacity interpretation (0-3 normal, up to 7 moderate, above high)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LensOpacityBand {
    Normal,
    Moderate,
    High,
}

impl LensOpacityBand {
    pub fn classify(opacity: f64) -> Self {
        if opacity <= 3.0 {
            Self::Normal
        } else if opacity <= 7.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Normal => "0-3: normal",
            Self::Moderate => "4-7: moderate opacity",
            Self::High => "8-10: high opacity",
        }
    }
}

/// Visual acuity interpretation (1.0 normal, 0.8-0.9 mild, 0.5-0.7 moderate, below severe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualAcuityBand {
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl VisualAcuityBand {
    pub fn classify(acuity: f64) -> Self {
        if acuity >= 1.0 {
            Self::Normal
        } else if acuity >= 0.8 {
            Self::Mild
        } else if acuity >= 0.5 {
            Self::Moderate
        } else {
            Self::Severe
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Normal => "1.0: normal",
            Self::Mild => "0.8-0.9: mild impairment",
            Self::Moderate => "0.5-0.7: moderate impairment",
            Self::Severe => "below 0.5: severe impairment",
        }
    }
}

/// Intraocular pressure interpretation (normal range 12-22 mmHg)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureBand {
    Low,
    Normal,
    Elevated,
}

impl PressureBand {
    pub fn classify(mmhg: f64) -> Self {
        if mmhg < 12.0 {
            Self::Low
        } else if mmhg <= 22.0 {
            Self::Normal
        } else {
            Self::Elevated
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "below 12 mmHg",
            Self::Normal => "12-22 mmHg: normal",
            Self::Elevated => "above 22 mmHg: elevated",
        }
    }
}
