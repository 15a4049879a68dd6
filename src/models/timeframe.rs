use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chart granularity. Doubles as the external query period selector and the
/// storage partition key next to the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "chart_timeframe")]
pub enum Timeframe {
    #[serde(rename = "1D")]
    #[sqlx(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    #[sqlx(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    #[sqlx(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    #[sqlx(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    #[sqlx(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    #[sqlx(rename = "ALL")]
    All,
}

impl Timeframe {
    /// Every timeframe, in the order a full sync walks them.
    pub const ALL: [Timeframe; 6] = [
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::OneYear,
        Timeframe::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
            Timeframe::ThreeMonths => "3M",
            Timeframe::OneYear => "1Y",
            Timeframe::All => "ALL",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .iter()
            .copied()
            .find(|tf| tf.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown timeframe '{}'. Expected one of 1D, 1W, 1M, 3M, 1Y, ALL", s))
    }
}
