//! Transition effects and the random rotation policy
//!
//! A [`Transition`] names the visual effect the viewport uses between two
//! slides. The display record selects a [`TransitionMode`]: either one
//! fixed effect for the whole session, or `random`, which starts on
//! [`ROTATION`]`[0]` and draws a new effect every [`ROTATION_INTERVAL`]
//! slides.

use crate::error::SlideshowError;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of slides between two random transition changes
pub const ROTATION_INTERVAL: usize = 10;

/// Visual effect used between consecutive slides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    #[default]
    Slide,
    Fade,
    Cube,
    Coverflow,
    Cards,
    Creative,
}

/// Effects drawn from in random mode; the first one opens the session
pub const ROTATION: [Transition; 5] = [
    Transition::Fade,
    Transition::Cube,
    Transition::Coverflow,
    Transition::Creative,
    Transition::Cards,
];

impl Transition {
    pub const ALL: [Transition; 6] = [
        Transition::Slide,
        Transition::Fade,
        Transition::Cube,
        Transition::Coverflow,
        Transition::Cards,
        Transition::Creative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Slide => "slide",
            Transition::Fade => "fade",
            Transition::Cube => "cube",
            Transition::Coverflow => "coverflow",
            Transition::Cards => "cards",
            Transition::Creative => "creative",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transition {
    type Err = SlideshowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Transition::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SlideshowError::UnknownTransition(s.to_string()))
    }
}

/// Transition selection stored in the display record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionMode {
    Fixed(Transition),
    Random,
}

impl Default for TransitionMode {
    fn default() -> Self {
        TransitionMode::Fixed(Transition::default())
    }
}

impl TransitionMode {
    pub const RANDOM: &'static str = "random";

    /// Effect active when a session becomes ready
    pub fn initial_transition(&self) -> Transition {
        match self {
            TransitionMode::Fixed(t) => *t,
            TransitionMode::Random => ROTATION[0],
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(self, TransitionMode::Random)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionMode::Fixed(t) => t.as_str(),
            TransitionMode::Random => Self::RANDOM,
        }
    }
}

impl fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionMode {
    type Err = SlideshowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(Self::RANDOM) {
            Ok(TransitionMode::Random)
        } else {
            s.parse().map(TransitionMode::Fixed)
        }
    }
}

impl Serialize for TransitionMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransitionMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => raw.parse().map_err(serde::de::Error::custom),
            _ => Ok(TransitionMode::default()),
        }
    }
}

/// Decides whether reaching `new_index` changes the active effect.
///
/// Only random mode ever changes effect, and only when the viewport lands
/// on a positive multiple of [`ROTATION_INTERVAL`]. Reporting the same
/// index twice in a row never draws again.
pub fn next_transition<R: Rng>(
    previous_index: Option<usize>,
    new_index: usize,
    mode: TransitionMode,
    rng: &mut R,
) -> Option<Transition> {
    if !mode.is_random() || previous_index == Some(new_index) {
        return None;
    }
    if new_index == 0 || new_index % ROTATION_INTERVAL != 0 {
        return None;
    }
    Some(ROTATION[rng.random_range(0..ROTATION.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_parse_transitions() {
        assert_eq!("fade".parse::<Transition>().unwrap(), Transition::Fade);
        assert_eq!(" Cube ".parse::<Transition>().unwrap(), Transition::Cube);
        assert!(matches!(
            "sparkle".parse::<Transition>(),
            Err(SlideshowError::UnknownTransition(_))
        ));
        assert_eq!(
            "random".parse::<TransitionMode>().unwrap(),
            TransitionMode::Random
        );
        assert_eq!(
            "coverflow".parse::<TransitionMode>().unwrap(),
            TransitionMode::Fixed(Transition::Coverflow)
        );
    }

    #[test]
    fn test_initial_transition() {
        assert_eq!(TransitionMode::Random.initial_transition(), Transition::Fade);
        assert_eq!(TransitionMode::default().initial_transition(), Transition::Slide);
    }

    #[test]
    fn test_fixed_mode_never_changes() {
        let mut rng = StdRng::seed_from_u64(7);
        let mode = TransitionMode::Fixed(Transition::Fade);
        let mut previous = Some(0);
        for index in 1..=100 {
            assert_eq!(next_transition(previous, index, mode, &mut rng), None);
            previous = Some(index);
        }
    }

    #[test]
    fn test_random_mode_changes_on_multiples_of_ten() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut previous = Some(0);
        for index in 1..=35 {
            let change = next_transition(previous, index, TransitionMode::Random, &mut rng);
            if index == 10 || index == 20 || index == 30 {
                assert!(ROTATION.contains(&change.unwrap()));
            } else {
                assert_eq!(change, None, "index {}", index);
            }
            previous = Some(index);
        }
    }

    #[test]
    fn test_index_zero_and_repeats_never_draw() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(next_transition(None, 0, TransitionMode::Random, &mut rng), None);
        assert_eq!(
            next_transition(Some(10), 10, TransitionMode::Random, &mut rng),
            None
        );
        assert!(next_transition(Some(9), 10, TransitionMode::Random, &mut rng).is_some());
    }

    #[test]
    fn test_mode_serde_as_string() {
        let yaml = serde_yaml::to_string(&TransitionMode::Random).unwrap();
        assert_eq!(yaml.trim(), "random");
        let mode: TransitionMode = serde_yaml::from_str("cards").unwrap();
        assert_eq!(mode, TransitionMode::Fixed(Transition::Cards));
        assert!(serde_yaml::from_str::<TransitionMode>("sparkle").is_err());
        assert_eq!(
            serde_yaml::from_str::<TransitionMode>("''").unwrap(),
            TransitionMode::default()
        );
        assert_eq!(
            serde_yaml::from_str::<TransitionMode>("~").unwrap(),
            TransitionMode::default()
        );
    }
}
