//! Game variants: Classic, Fever, Hold

use crate::randomizer::RandomizerKind;
use crate::score::{ClassicScorer, FeverScorer, Scorer};
use crate::tetromino::SkinStyle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default gravity interval
pub const BASE_DELAY: Duration = Duration::from_millis(400);
/// Soft drop divides the fall delay by this
pub const SOFT_DROP_DIVISOR: u32 = 5;

/// Available game variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Classic, // Uniform pieces, photo blocks
    #[default]
    Fever, // 7-bag, fever meter
    Hold,    // Fever plus hold piece
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Fever => "Fever",
            Variant::Hold => "Fever+Hold",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Variant::Classic => "Random pieces, photo blocks, plain scoring, no hard drop",
            Variant::Fever => "7-bag pieces, fill the fever meter for double points",
            Variant::Hold => "Fever rules with a hold slot",
        }
    }

    /// Feature set for this variant with default timing
    pub fn rules(&self) -> Rules {
        let base = Rules {
            variant: *self,
            fever: true,
            hold: false,
            hard_drop: true,
            randomizer: RandomizerKind::SevenBag,
            skins: SkinStyle::Colored,
            base_delay: BASE_DELAY,
            soft_drop_divisor: SOFT_DROP_DIVISOR,
        };
        match self {
            Variant::Classic => Rules {
                fever: false,
                hard_drop: false,
                randomizer: RandomizerKind::Uniform,
                skins: SkinStyle::Photo,
                ..base
            },
            Variant::Fever => base,
            Variant::Hold => Rules { hold: true, ..base },
        }
    }
}

/// Feature flags and strategies a session runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub variant: Variant,
    /// Fever meter scoring instead of plain scoring
    pub fever: bool,
    pub hold: bool,
    pub hard_drop: bool,
    pub randomizer: RandomizerKind,
    pub skins: SkinStyle,
    pub base_delay: Duration,
    pub soft_drop_divisor: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Variant::default().rules()
    }
}

impl Rules {
    pub fn scorer(&self) -> Box<dyn Scorer> {
        if self.fever {
            Box::new(FeverScorer)
        } else {
            Box::new(ClassicScorer)
        }
    }

    /// Fall delay while soft drop is held
    pub fn soft_drop_delay(&self) -> Duration {
        self.base_delay / self.soft_drop_divisor.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_features() {
        let classic = Variant::Classic.rules();
        assert!(!classic.fever);
        assert!(!classic.hold);
        assert!(!classic.hard_drop);
        assert_eq!(classic.randomizer, RandomizerKind::Uniform);
        assert_eq!(classic.skins, SkinStyle::Photo);

        let fever = Variant::Fever.rules();
        assert!(fever.fever);
        assert!(!fever.hold);
        assert!(fever.hard_drop);
        assert_eq!(fever.randomizer, RandomizerKind::SevenBag);

        assert!(Variant::Hold.rules().hold);
    }

    #[test]
    fn test_soft_drop_delay() {
        let rules = Rules::default();
        assert_eq!(rules.soft_drop_delay(), Duration::from_millis(80));

        let odd = Rules {
            soft_drop_divisor: 0,
            ..rules
        };
        assert_eq!(odd.soft_drop_delay(), BASE_DELAY);
    }
}
