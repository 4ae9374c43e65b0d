//! Filter selection
//!
//! A `FilterSelection` is the immutable value built from the input surface on
//! every interaction. Each field group is independently optional, and every
//! band has an `Anything` variant meaning "no filter".

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::catalog::CatalogBounds;
use super::error::FilterError;
use crate::core::constants::{ANYTHING, STAR_RATING_MAX, STAR_RATING_MIN};

// =============================================================================
// Categorical choice
// =============================================================================

/// Multi-select over categorical values (bus types, route names)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum Choice {
    #[default]
    Anything,
    OneOf(BTreeSet<String>),
}

impl Choice {
    /// Build from the raw multiselect values.
    ///
    /// An empty selection, or one that includes the `Anything` sentinel,
    /// leaves the field unconstrained.
    pub fn from_selected<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = selected.into_iter().map(Into::into).collect();
        if values.is_empty() || values.contains(ANYTHING) {
            Self::Anything
        } else {
            Self::OneOf(values)
        }
    }

    pub fn is_anything(&self) -> bool {
        matches!(self, Self::Anything)
    }
}

impl From<Vec<String>> for Choice {
    fn from(values: Vec<String>) -> Self {
        Self::from_selected(values)
    }
}

impl From<Choice> for Vec<String> {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Anything => vec![ANYTHING.to_string()],
            Choice::OneOf(values) => values.into_iter().collect(),
        }
    }
}

// =============================================================================
// Bands
// =============================================================================

/// Fixed band table shared by the band selectors
pub trait Band: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn is_anything(&self) -> bool;
}

fn parse_band<B: Band>(s: &str, field: &str) -> Result<B, FilterError> {
    B::ALL
        .iter()
        .copied()
        .find(|band| band.label() == s.trim())
        .ok_or_else(|| {
            let labels: Vec<&str> = B::ALL.iter().map(|b| b.label()).collect();
            FilterError::InvalidSelection(format!(
                "unknown {} band '{}'. Valid options: {}",
                field,
                s,
                labels.join(", ")
            ))
        })
}

/// Price band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PriceBand {
    #[default]
    Anything,
    #[serde(rename = "0-250")]
    UpTo250,
    #[serde(rename = "250-500")]
    From250To500,
    #[serde(rename = "500-1000")]
    From500To1000,
    #[serde(rename = "1000-1500")]
    From1000To1500,
    #[serde(rename = "1500+")]
    Over1500,
}

impl Band for PriceBand {
    const ALL: &'static [Self] = &[
        Self::Anything,
        Self::UpTo250,
        Self::From250To500,
        Self::From500To1000,
        Self::From1000To1500,
        Self::Over1500,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Anything => ANYTHING,
            Self::UpTo250 => "0-250",
            Self::From250To500 => "250-500",
            Self::From500To1000 => "500-1000",
            Self::From1000To1500 => "1000-1500",
            Self::Over1500 => "1500+",
        }
    }

    fn is_anything(&self) -> bool {
        matches!(self, Self::Anything)
    }
}

impl PriceBand {
    /// Closed price interval for this band.
    ///
    /// `Anything` spans the catalog's observed range and the open band ends
    /// at the catalog maximum.
    pub fn resolve(&self, bounds: &CatalogBounds) -> (f64, f64) {
        match self {
            Self::Anything => (bounds.price_min, bounds.price_max),
            Self::UpTo250 => (0.0, 250.0),
            Self::From250To500 => (250.0, 500.0),
            Self::From500To1000 => (500.0, 1000.0),
            Self::From1000To1500 => (1000.0, 1500.0),
            Self::Over1500 => (1500.0, bounds.price_max),
        }
    }
}

/// Hour-of-day band, used for departure and arrival
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TimeBand {
    #[default]
    Anything,
    #[serde(rename = "0-6")]
    Night,
    #[serde(rename = "6-12")]
    Morning,
    #[serde(rename = "12-18")]
    Afternoon,
    #[serde(rename = "18-24")]
    Evening,
}

impl Band for TimeBand {
    const ALL: &'static [Self] = &[
        Self::Anything,
        Self::Night,
        Self::Morning,
        Self::Afternoon,
        Self::Evening,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Anything => ANYTHING,
            Self::Night => "0-6",
            Self::Morning => "6-12",
            Self::Afternoon => "12-18",
            Self::Evening => "18-24",
        }
    }

    fn is_anything(&self) -> bool {
        matches!(self, Self::Anything)
    }
}

impl TimeBand {
    /// Closed hour interval; `Anything` is the whole day
    pub fn resolve(&self) -> (i64, i64) {
        match self {
            Self::Anything => (0, 24),
            Self::Night => (0, 6),
            Self::Morning => (6, 12),
            Self::Afternoon => (12, 18),
            Self::Evening => (18, 24),
        }
    }
}

/// Trip duration band in hours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum DurationBand {
    #[default]
    Anything,
    #[serde(rename = "0-2")]
    UpTo2,
    #[serde(rename = "2-4")]
    From2To4,
    #[serde(rename = "4-6")]
    From4To6,
    #[serde(rename = "6+")]
    Over6,
}

impl Band for DurationBand {
    const ALL: &'static [Self] = &[
        Self::Anything,
        Self::UpTo2,
        Self::From2To4,
        Self::From4To6,
        Self::Over6,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Anything => ANYTHING,
            Self::UpTo2 => "0-2",
            Self::From2To4 => "2-4",
            Self::From4To6 => "4-6",
            Self::Over6 => "6+",
        }
    }

    fn is_anything(&self) -> bool {
        matches!(self, Self::Anything)
    }
}

impl DurationBand {
    /// Closed interval in whole hours, bounded above by the catalog maximum
    /// for `Anything` and the open band.
    pub fn resolve(&self, bounds: &CatalogBounds) -> (i64, i64) {
        match self {
            Self::Anything => (0, bounds.max_duration),
            Self::UpTo2 => (0, 2),
            Self::From2To4 => (2, 4),
            Self::From4To6 => (4, 6),
            Self::Over6 => (6, bounds.max_duration),
        }
    }
}

macro_rules! band_str_impls {
    ($ty:ty, $field:literal) => {
        impl FromStr for $ty {
            type Err = FilterError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_band(s, $field)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

band_str_impls!(PriceBand, "price");
band_str_impls!(TimeBand, "time");
band_str_impls!(DurationBand, "duration");

// =============================================================================
// Star rating
// =============================================================================

/// Inclusive star rating interval, serialized as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarRange(pub f64, pub f64);

impl Default for StarRange {
    fn default() -> Self {
        Self(STAR_RATING_MIN, STAR_RATING_MAX)
    }
}

impl StarRange {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }

    /// The full slider range filters nothing
    pub fn is_full(&self) -> bool {
        self.0 <= STAR_RATING_MIN && self.1 >= STAR_RATING_MAX
    }

    /// Check the slider contract: finite, ordered, within `[0.0, 5.0]`
    pub fn check(&self) -> Result<(), FilterError> {
        let (min, max) = (self.0, self.1);
        if !min.is_finite() || !max.is_finite() {
            return Err(FilterError::InvalidSelection(
                "star rating bounds must be finite numbers".to_string(),
            ));
        }
        if min < STAR_RATING_MIN || max > STAR_RATING_MAX {
            return Err(FilterError::InvalidSelection(format!(
                "star rating [{}, {}] is outside [{}, {}]",
                min, max, STAR_RATING_MIN, STAR_RATING_MAX
            )));
        }
        if min > max {
            return Err(FilterError::InvalidSelection(format!(
                "star rating minimum {} is above maximum {}",
                min, max
            )));
        }
        Ok(())
    }
}

fn validate_star_range(range: &StarRange) -> Result<(), ValidationError> {
    range.check().map_err(|e| {
        ValidationError::new("star_rating_range").with_message(e.to_string().into())
    })
}

// =============================================================================
// Seat availability
// =============================================================================

/// Minimum seats available; `Anything` adds no constraint at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SeatThresholdRepr", into = "SeatThresholdRepr")]
pub enum SeatThreshold {
    #[default]
    Anything,
    AtLeast(u32),
}

/// Wire form: a count, or a label (`"Anything"` or a numeric string)
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SeatThresholdRepr {
    Count(u32),
    Label(String),
}

impl TryFrom<SeatThresholdRepr> for SeatThreshold {
    type Error = FilterError;

    fn try_from(repr: SeatThresholdRepr) -> Result<Self, Self::Error> {
        match repr {
            SeatThresholdRepr::Count(n) => Ok(Self::AtLeast(n)),
            SeatThresholdRepr::Label(s) => s.parse(),
        }
    }
}

impl From<SeatThreshold> for SeatThresholdRepr {
    fn from(threshold: SeatThreshold) -> Self {
        match threshold {
            SeatThreshold::Anything => Self::Label(ANYTHING.to_string()),
            SeatThreshold::AtLeast(n) => Self::Count(n),
        }
    }
}

impl FromStr for SeatThreshold {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == ANYTHING {
            return Ok(Self::Anything);
        }
        s.parse::<u32>().map(Self::AtLeast).map_err(|_| {
            FilterError::InvalidSelection(format!(
                "seat threshold must be '{}' or a non-negative integer, got '{}'",
                ANYTHING, s
            ))
        })
    }
}

impl fmt::Display for SeatThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anything => f.write_str(ANYTHING),
            Self::AtLeast(n) => write!(f, "{}", n),
        }
    }
}

// =============================================================================
// Filter selection
// =============================================================================

/// Everything the user selected in one interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct FilterSelection {
    /// Selected bus types (empty or containing "Anything" = all)
    #[schema(value_type = Vec<String>)]
    pub bustypes: Choice,
    /// Selected route names (empty or containing "Anything" = all)
    #[schema(value_type = Vec<String>)]
    pub routes: Choice,
    pub price: PriceBand,
    /// `[min, max]` star rating, default `[0.0, 5.0]`
    #[validate(custom(function = "validate_star_range"))]
    #[schema(value_type = Vec<f64>)]
    pub star_rating: StarRange,
    /// "Anything" or a minimum seat count
    #[schema(value_type = String, example = "Anything")]
    pub seats: SeatThreshold,
    pub departure: TimeBand,
    pub arrival: TimeBand,
    pub duration: DurationBand,
}

impl FilterSelection {
    /// True when no field constrains the result
    pub fn is_unconstrained(&self) -> bool {
        self.bustypes.is_anything()
            && self.routes.is_anything()
            && self.price.is_anything()
            && self.star_rating.is_full()
            && self.seats == SeatThreshold::Anything
            && self.departure.is_anything()
            && self.arrival.is_anything()
            && self.duration.is_anything()
    }
}
