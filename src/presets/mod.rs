//! Built-in wizard presets.
//!
//! Every product flow ships as a plain `WizardDefinition` built in Rust, so a
//! broken reference (unknown slot, undeclared metric) fails the preset tests
//! instead of surfacing at runtime.
//!
//! | Preset              | Flow                                         | Duration |
//! |---------------------|----------------------------------------------|----------|
//! | `performance`       | Tuning parts, specialist booking, financing  | hours    |
//! | `rental`            | Vehicle, rental period, protection, extras   | days     |
//! | `driver-onboarding` | Personal data, license, vehicle class        | days     |

mod onboarding;
mod performance;
mod rental;

use strum::{Display, EnumIter, EnumString};

use crate::definition::WizardDefinition;

/// Built-in wizard selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Preset {
    /// Performance parts with a dyno-calibration surcharge and simulated metrics
    #[default]
    Performance,

    /// Per-day vehicle rental
    Rental,

    /// Driver onboarding with license validation
    DriverOnboarding,
}

impl Preset {
    /// Build the preset's definition
    pub fn definition(&self) -> WizardDefinition {
        match self {
            Preset::Performance => performance::definition(),
            Preset::Rental => rental::definition(),
            Preset::DriverOnboarding => onboarding::definition(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Performance => "Performance upgrades with specialist booking and financing",
            Preset::Rental => "Vehicle rental priced per day",
            Preset::DriverOnboarding => "Driver onboarding with license checks",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_preset_validates() {
        for preset in Preset::iter() {
            preset
                .definition()
                .validate()
                .unwrap_or_else(|e| panic!("{preset} is invalid: {e}"));
        }
    }

    #[test]
    fn test_preset_names_parse() {
        for preset in Preset::iter() {
            assert_eq!(Preset::from_str(&preset.to_string()).unwrap(), preset);
        }
        assert_eq!(Preset::from_str("driver-onboarding").unwrap(), Preset::DriverOnboarding);
    }

    #[test]
    fn test_definition_names_match_presets() {
        for preset in Preset::iter() {
            assert_eq!(preset.definition().name, preset.to_string());
        }
    }
}
