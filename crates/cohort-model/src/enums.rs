//! Type-safe enumerations for demographic classification.
//!
//! Both mappings are total: every input either maps to a variant or is
//! rejected with a [`ModelError`].

use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// Subject gender as recorded in the Demographics sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Returns the letter used in the source workbook.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
        }
    }

    /// Returns the study coding (`F` = 1, `M` = 2).
    pub fn code(&self) -> i64 {
        match self {
            Gender::Female => 1,
            Gender::Male => 2,
        }
    }
}

impl FromStr for Gender {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "F" => Ok(Gender::Female),
            "M" => Ok(Gender::Male),
            _ => Err(ModelError::UnrecognizedGender {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ten-year age bucket.
///
/// Buckets are numbered from the youngest: ages 0-9 are `G1`, 10-19 are `G2`
/// and so on up to 80-89 as `G9`. Everyone aged 90 or over shares `G0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeCohort {
    G1,
    G2,
    G3,
    G4,
    G5,
    G6,
    G7,
    G8,
    G9,
    G0,
}

impl AgeCohort {
    /// All cohorts in bucket order (index 0 through 9).
    pub const ALL: [AgeCohort; 10] = [
        AgeCohort::G1,
        AgeCohort::G2,
        AgeCohort::G3,
        AgeCohort::G4,
        AgeCohort::G5,
        AgeCohort::G6,
        AgeCohort::G7,
        AgeCohort::G8,
        AgeCohort::G9,
        AgeCohort::G0,
    ];

    /// Highest bucket index; older ages are clamped into it.
    pub const MAX_INDEX: usize = 9;

    /// Classifies an age in whole years.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidAge`] for negative ages.
    pub fn from_age(age: i64) -> Result<Self> {
        if age < 0 {
            return Err(ModelError::InvalidAge {
                value: age.to_string(),
            });
        }
        let index = usize::try_from(age / 10).unwrap_or(Self::MAX_INDEX);
        Ok(Self::from_index(index))
    }

    /// Maps a bucket index to its cohort, clamping at [`Self::MAX_INDEX`].
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::MAX_INDEX)]
    }

    /// Position of the cohort in [`Self::ALL`].
    pub fn index(&self) -> usize {
        match self {
            AgeCohort::G1 => 0,
            AgeCohort::G2 => 1,
            AgeCohort::G3 => 2,
            AgeCohort::G4 => 3,
            AgeCohort::G5 => 4,
            AgeCohort::G6 => 5,
            AgeCohort::G7 => 6,
            AgeCohort::G8 => 7,
            AgeCohort::G9 => 8,
            AgeCohort::G0 => 9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeCohort::G1 => "G1",
            AgeCohort::G2 => "G2",
            AgeCohort::G3 => "G3",
            AgeCohort::G4 => "G4",
            AgeCohort::G5 => "G5",
            AgeCohort::G6 => "G6",
            AgeCohort::G7 => "G7",
            AgeCohort::G8 => "G8",
            AgeCohort::G9 => "G9",
            AgeCohort::G0 => "G0",
        }
    }

    /// Human-readable age span, e.g. `"20-29"` or `"90+"`.
    pub fn age_range(&self) -> String {
        let lower = self.index() * 10;
        if self.index() == Self::MAX_INDEX {
            format!("{lower}+")
        } else {
            format!("{lower}-{}", lower + 9)
        }
    }
}

impl fmt::Display for AgeCohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn gender_codes() {
        assert_eq!("F".parse::<Gender>().unwrap().code(), 1);
        assert_eq!("M".parse::<Gender>().unwrap().code(), 2);
        assert_eq!("f".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(" m ".parse::<Gender>().unwrap(), Gender::Male);
    }

    #[test]
    fn gender_rejects_other_letters() {
        let err = "X".parse::<Gender>().unwrap_err();
        assert_eq!(
            err,
            ModelError::UnrecognizedGender {
                value: "X".to_string()
            }
        );
        assert!("".parse::<Gender>().is_err());
        assert!("Female".parse::<Gender>().is_err());
    }

    #[test]
    fn cohort_boundaries() {
        assert_eq!(AgeCohort::from_age(0).unwrap(), AgeCohort::G1);
        assert_eq!(AgeCohort::from_age(5).unwrap(), AgeCohort::G1);
        assert_eq!(AgeCohort::from_age(10).unwrap(), AgeCohort::G2);
        assert_eq!(AgeCohort::from_age(25).unwrap(), AgeCohort::G3);
        assert_eq!(AgeCohort::from_age(89).unwrap(), AgeCohort::G9);
        assert_eq!(AgeCohort::from_age(90).unwrap(), AgeCohort::G0);
        assert_eq!(AgeCohort::from_age(95).unwrap(), AgeCohort::G0);
        assert_eq!(AgeCohort::from_age(105).unwrap(), AgeCohort::G0);
        assert_eq!(AgeCohort::from_age(i64::MAX).unwrap(), AgeCohort::G0);
    }

    #[test]
    fn cohort_rejects_negative_age() {
        assert!(matches!(
            AgeCohort::from_age(-1),
            Err(ModelError::InvalidAge { .. })
        ));
    }

    #[test]
    fn cohort_labels_and_ranges() {
        let labels: Vec<&str> = AgeCohort::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec!["G1", "G2", "G3", "G4", "G5", "G6", "G7", "G8", "G9", "G0"]
        );
        assert_eq!(AgeCohort::G3.age_range(), "20-29");
        assert_eq!(AgeCohort::G0.age_range(), "90+");
        for (idx, cohort) in AgeCohort::ALL.iter().enumerate() {
            assert_eq!(cohort.index(), idx);
        }
    }

    proptest! {
        #[test]
        fn cohort_matches_clamped_bucket(age in 0i64..500) {
            let expected = AgeCohort::ALL[usize::try_from((age / 10).min(9)).unwrap()];
            prop_assert_eq!(AgeCohort::from_age(age).unwrap(), expected);
        }
    }
}
