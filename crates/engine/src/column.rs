use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which fiscal year a month column belongs to: `y0` is the selected
/// year, `y1` the one after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YearBucket {
    Y0,
    Y1,
}

impl YearBucket {
    pub fn prefix(&self) -> &'static str {
        match self {
            YearBucket::Y0 => "y0",
            YearBucket::Y1 => "y1",
        }
    }
}

/// A validated month column: one of the 24 cells `y0_m01`..`y1_m12`.
///
/// The persisted column naming is a frozen contract — `name()` renders
/// it back bit-exact, and `parse()` is the only way user-supplied text
/// becomes a column. SQL never sees a raw column string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthColumn {
    bucket: YearBucket,
    month: u8, // 1..=12
}

impl MonthColumn {
    pub fn new(bucket: YearBucket, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { bucket, month })
    }

    /// Parse a column name of the form `y0_m01`..`y1_m12`.
    /// Anything else (wrong prefix, unpadded month, out of range) is rejected.
    pub fn parse(name: &str) -> Option<Self> {
        let rest = if let Some(rest) = name.strip_prefix("y0_m") {
            rest
        } else if let Some(rest) = name.strip_prefix("y1_m") {
            rest
        } else {
            return None;
        };
        if rest.len() != 2 || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let bucket = if name.starts_with("y0") { YearBucket::Y0 } else { YearBucket::Y1 };
        let month: u8 = rest.parse().ok()?;
        Self::new(bucket, month)
    }

    /// Canonical column name, e.g. `y1_m03`.
    pub fn name(&self) -> String {
        format!("{}_m{:02}", self.bucket.prefix(), self.month)
    }

    pub fn bucket(&self) -> YearBucket {
        self.bucket
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// Position in grid order: y0 months first, then y1, months ascending.
    pub fn grid_index(&self) -> usize {
        let base = match self.bucket {
            YearBucket::Y0 => 0,
            YearBucket::Y1 => 12,
        };
        base + (self.month as usize - 1)
    }

    /// All 24 columns in grid order.
    pub fn all() -> impl Iterator<Item = MonthColumn> {
        [YearBucket::Y0, YearBucket::Y1]
            .into_iter()
            .flat_map(|bucket| (1..=12u8).map(move |month| MonthColumn { bucket, month }))
    }
}

impl fmt::Display for MonthColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for MonthColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for MonthColumn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MonthColumn::parse(&s).ok_or_else(|| D::Error::custom(format!("invalid month column '{s}'")))
    }
}
