//! The fixed 13-feature input contract.

use std::fmt;

use serde::{Serialize, Serializer};

/// Number of input features per sample.
pub const FEATURE_COUNT: usize = 13;

/// Column holding the binary label in tabular inputs.
pub const LABEL_COLUMN: &str = "willHitStumps";

/// One sample's features, in [`FeatureId::ALL`] order.
pub type FeatureVector = [f32; FEATURE_COUNT];

/// Identifies one input feature and its position in a [`FeatureVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureId {
    /// Spin type, encoded `0` (back spin) or `1` (top spin).
    SpinType,
    Speed,
    SpinAmount,
    TimeSinceRelease,
    BallPosX,
    BallPosY,
    BallVelX,
    BallVelY,
    BallAngularVel,
    DistanceToStumps,
    DistanceToPad,
    /// `1` if the ball touched the pad.
    HitPad,
    /// `1` if the ball reached the pad's position.
    ReachedPad,
}

impl FeatureId {
    /// All features in vector order.
    pub const ALL: [Self; FEATURE_COUNT] = [
        Self::SpinType,
        Self::Speed,
        Self::SpinAmount,
        Self::TimeSinceRelease,
        Self::BallPosX,
        Self::BallPosY,
        Self::BallVelX,
        Self::BallVelY,
        Self::BallAngularVel,
        Self::DistanceToStumps,
        Self::DistanceToPad,
        Self::HitPad,
        Self::ReachedPad,
    ];

    /// Position of this feature in a [`FeatureVector`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Column name used by the simulator exports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SpinType => "spinType",
            Self::Speed => "speed",
            Self::SpinAmount => "spinAmount",
            Self::TimeSinceRelease => "timeSinceRelease",
            Self::BallPosX => "ballPosX",
            Self::BallPosY => "ballPosY",
            Self::BallVelX => "ballVelX",
            Self::BallVelY => "ballVelY",
            Self::BallAngularVel => "ballAngularVel",
            Self::DistanceToStumps => "distanceToStumps",
            Self::DistanceToPad => "distanceToPad",
            Self::HitPad => "hitPad",
            Self::ReachedPad => "reachedPad",
        }
    }

    /// Alternative key accepted by the JSON loader.
    ///
    /// The simulator's JSON export uses a longer key for the pad flag.
    #[must_use]
    pub const fn json_alias(self) -> Option<&'static str> {
        match self {
            Self::ReachedPad => Some("reachedPadPosition"),
            _ => None,
        }
    }

    /// Looks a feature up by its column name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for FeatureId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

/// Column names in vector order.
#[must_use]
pub fn feature_names() -> Vec<&'static str> {
    FeatureId::ALL.iter().map(|f| f.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_position() {
        for (i, feature) in FeatureId::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn test_name_roundtrip() {
        for feature in FeatureId::ALL {
            assert_eq!(FeatureId::from_name(feature.name()), Some(feature));
        }
        assert_eq!(FeatureId::from_name("willHitStumps"), None);
    }

    #[test]
    fn test_serializes_as_name() {
        let json = serde_json::to_string(&[FeatureId::SpinType, FeatureId::ReachedPad]).unwrap();
        assert_eq!(json, r#"["spinType","reachedPad"]"#);
    }

    #[test]
    fn test_contract_order() {
        assert_eq!(
            feature_names(),
            [
                "spinType",
                "speed",
                "spinAmount",
                "timeSinceRelease",
                "ballPosX",
                "ballPosY",
                "ballVelX",
                "ballVelY",
                "ballAngularVel",
                "distanceToStumps",
                "distanceToPad",
                "hitPad",
                "reachedPad",
            ]
        );
    }
}
