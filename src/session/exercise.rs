//! Exercise identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exercise {
    Squat,
    BicepCurl,
    ShoulderFlexion,
    KneeRaise,
}

impl Exercise {
    pub const ALL: [Exercise; 4] = [
        Exercise::Squat,
        Exercise::BicepCurl,
        Exercise::ShoulderFlexion,
        Exercise::KneeRaise,
    ];

    /// Exact match on the wire identifier
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|exercise| exercise.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Exercise::Squat => "squat",
            Exercise::BicepCurl => "bicep-curl",
            Exercise::ShoulderFlexion => "shoulder-flexion",
            Exercise::KneeRaise => "knee-raise",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        for exercise in Exercise::ALL {
            assert_eq!(Exercise::from_name(exercise.as_str()), Some(exercise));
        }
        assert_eq!(Exercise::from_name("Squat"), None);
        assert_eq!(Exercise::from_name("all"), None);
        assert_eq!(
            serde_json::to_string(&Exercise::ShoulderFlexion).unwrap(),
            "\"shoulder-flexion\""
        );
    }
}
