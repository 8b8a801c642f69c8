use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Operator mapping linear HDR radiance to displayable `0..=1`.
///
/// Applied only on the main surface; cube targets stay linear so captured
/// radiance can feed the environment term unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    None,
    Linear,
    Reinhard,
    Cineon,
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    pub const ALL: [ToneMapping; 5] = [
        ToneMapping::None,
        ToneMapping::Linear,
        ToneMapping::Reinhard,
        ToneMapping::Cineon,
        ToneMapping::AcesFilmic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No",
            Self::Linear => "Linear",
            Self::Reinhard => "Reinhard",
            Self::Cineon => "Cineon",
            Self::AcesFilmic => "ACESFilmic",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn apply(self, color: Vec3, exposure: f32) -> Vec3 {
        let c = color.max(Vec3::ZERO);
        let mapped = match self {
            Self::None => c,
            Self::Linear => c * exposure,
            Self::Reinhard => {
                let c = c * exposure;
                c / (Vec3::ONE + c)
            }
            Self::Cineon => {
                // Optimized filmic operator by Jim Hejl and Richard Burgess-Dawson.
                let x = (c * exposure - Vec3::splat(0.004)).max(Vec3::ZERO);
                let y = (x * (6.2 * x + Vec3::splat(0.5))) / (x * (6.2 * x + Vec3::splat(1.7)) + Vec3::splat(0.06));
                y.powf(2.2)
            }
            Self::AcesFilmic => {
                // Narkowicz fit of the ACES RRT+ODT curve.
                let x = c * (exposure / 0.6);
                (x * (2.51 * x + Vec3::splat(0.03))) / (x * (2.43 * x + Vec3::splat(0.59)) + Vec3::splat(0.14))
            }
        };
        mapped.clamp(Vec3::ZERO, Vec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for t in ToneMapping::ALL {
            assert_eq!(ToneMapping::from_label(t.label()), Some(t));
        }
        assert_eq!(ToneMapping::from_label("Filmic"), None);
    }

    #[test]
    fn operators_stay_in_range() {
        let hot = Vec3::splat(50.0);
        for t in ToneMapping::ALL {
            let out = t.apply(hot, 1.0);
            assert!(out.max_element() <= 1.0);
            assert!(out.min_element() >= 0.0);
        }
    }

    #[test]
    fn reinhard_halves_unit() {
        let out = ToneMapping::Reinhard.apply(Vec3::ONE, 1.0);
        assert!((out - Vec3::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn none_is_identity_in_range() {
        let c = Vec3::new(0.2, 0.4, 0.6);
        assert_eq!(ToneMapping::None.apply(c, 1.0), c);
    }
}
