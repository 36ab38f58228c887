//! Colour profiles.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A named gamma curve / colour space combination recorded by a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorProfile {
    /// Standard BT.709 rendering.
    Normal,
    /// DJI's flat BT.709 profile.
    DCinelike,
    /// DJI's wide-gamut logarithmic profile.
    DLog,
    /// Hybrid-Log-Gamma HDR.
    Hlg,
}

impl ColorProfile {
    /// Every known profile, in catalog order.
    pub const ALL: [ColorProfile; 4] = [
        ColorProfile::Normal,
        ColorProfile::DCinelike,
        ColorProfile::DLog,
        ColorProfile::Hlg,
    ];

    /// Machine name used on the command line and in logs (`d_log`).
    pub fn name(self) -> &'static str {
        match self {
            ColorProfile::Normal => "normal",
            ColorProfile::DCinelike => "d_cinelike",
            ColorProfile::DLog => "d_log",
            ColorProfile::Hlg => "hlg",
        }
    }

    /// Human-readable name (`D-Log`).
    pub fn display_name(self) -> &'static str {
        match self {
            ColorProfile::Normal => "Normal",
            ColorProfile::DCinelike => "D-Cinelike",
            ColorProfile::DLog => "D-Log",
            ColorProfile::Hlg => "HLG",
        }
    }

    /// Look up a profile by machine name, case-insensitively. Hyphenated
    /// spellings (`d-log`) are accepted too.
    pub fn from_name(name: &str) -> Option<ColorProfile> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        ColorProfile::ALL
            .into_iter()
            .find(|profile| profile.name() == normalized)
    }
}

impl Display for ColorProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}
