use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// The twelve Beijing monitoring stations.
///
/// Variants are declared alphabetically; the derived `Ord` is the group
/// iteration order used by every per-station aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Station {
    Aotizhongxin,
    Changping,
    Dingling,
    Dongsi,
    Guanyuan,
    Gucheng,
    Huairou,
    Nongzhanguan,
    Shunyi,
    Tiantan,
    Wanliu,
    Wanshouxigong,
}

impl Station {
    pub const ALL: [Station; 12] = [
        Station::Aotizhongxin,
        Station::Changping,
        Station::Dingling,
        Station::Dongsi,
        Station::Guanyuan,
        Station::Gucheng,
        Station::Huairou,
        Station::Nongzhanguan,
        Station::Shunyi,
        Station::Tiantan,
        Station::Wanliu,
        Station::Wanshouxigong,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Station::Aotizhongxin => "Aotizhongxin",
            Station::Changping => "Changping",
            Station::Dingling => "Dingling",
            Station::Dongsi => "Dongsi",
            Station::Guanyuan => "Guanyuan",
            Station::Gucheng => "Gucheng",
            Station::Huairou => "Huairou",
            Station::Nongzhanguan => "Nongzhanguan",
            Station::Shunyi => "Shunyi",
            Station::Tiantan => "Tiantan",
            Station::Wanliu => "Wanliu",
            Station::Wanshouxigong => "Wanshouxigong",
        }
    }
}

impl FromStr for Station {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Station::ALL
            .iter()
            .copied()
            .find(|station| station.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DashboardError::UnknownStation {
                name: trimmed.to_string(),
            })
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
