//! Built-in community tables.
//!
//! Populations for the Vancouver tables are neighbourhood counts; the
//! `Vancouver` table drops the last two digits so a run finishes in seconds.
//! The BC table lists municipalities at a reduced scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::community::Community;
use crate::error::ConfigError;

/// Bridge edges per adjacent community pair for the BC table.
pub const BC_INTER_REGION_EDGES: usize = 1145;
/// Bridge edges per adjacent community pair for both Vancouver tables.
pub const VANCOUVER_INTER_REGION_EDGES: usize = 55;

type Row = (&'static str, usize, usize);

const BC: &[Row] = &[
    ("Abbotsford", 15352, 2),
    ("Armstrong", 532, 3),
    ("Burnaby", 24912, 6),
    ("Campbell River", 3551, 1),
    ("Castlegar", 833, 2),
    ("Chilliwack", 9320, 2),
    ("Colwood", 1896, 3),
    ("Coquitlam", 14862, 3),
    ("Courtenay", 2842, 2),
    ("Cranbrook", 2049, 2),
    ("Dawson Creek", 1232, 2),
    ("Delta", 10845, 2),
    ("Duncan", 504, 5),
    ("Enderby", 302, 2),
    ("Fernie", 632, 2),
    ("Fort St. John", 2146, 2),
    ("Grand Forks", 411, 2),
    ("Greenwood", 70, 1),
    ("Kamloops", 9790, 2),
    ("Kelowna", 14457, 2),
    ("Kimberley", 811, 1),
    ("Langford", 4658, 3),
    ("Langley", 2896, 6),
    ("Maple Ridge", 9099, 2),
    ("Merritt", 705, 1),
    ("Mission", 4151, 1),
    ("Nanaimo", 9986, 3),
    ("Nelson", 1110, 3),
    ("New Westminster", 7891, 9),
    ("North Vancouver", 5812, 9),
    ("Parksville", 1364, 3),
    ("Penticton", 3688, 2),
    ("Pitt Meadows", 1914, 1),
    ("Port Alberni", 1825, 3),
    ("Port Coquitlam", 6149, 4),
    ("Port Moody", 3353, 3),
    ("Powell River", 1394, 2),
    ("Prince George", 7670, 1),
    ("Prince Rupert", 1230, 1),
    ("Quesnel", 988, 1),
    ("Revelstoke", 827, 1),
    ("Richmond", 20993, 4),
    ("Rossland", 414, 1),
    ("Salmon Arm", 1943, 1),
    ("Surrey", 56832, 4),
    ("Terrace", 1201, 1),
    ("Trail", 792, 1),
    ("Vancouver", 66224, 11),
    ("Vernon", 4451, 2),
    ("Victoria", 9186, 9),
    ("West Kelowna", 3607, 1),
    ("White Rock", 2193, 8),
    ("Williams Lake", 1094, 2),
];

const VANCOUVER_REDUCED: &[Row] = &[
    ("Arbutus-Ridge", 161, 3),
    ("Downtown", 653, 12),
    ("Dunbar-Southlands", 225, 2),
    ("Fairview", 354, 7),
    ("Grandview-Woodland", 307, 5),
    ("Hastings-Sunrise", 364, 3),
    ("Kensington-Cedar Cottage", 519, 5),
    ("Kerrisdale", 147, 2),
    ("Killarney", 309, 3),
    ("Kitsilano", 453, 6),
    ("Marpole", 244, 3),
    ("Mount Pleasant", 347, 6),
    ("Oakridge", 137, 2),
    ("Renfrew-Collingwood", 543, 5),
    ("Riley Park", 237, 3),
    ("Shaughnessy", 88, 1),
    ("South Cambie", 84, 3),
    ("Strathcona", 132, 2),
    ("Sunset", 384, 4),
    ("Victoria-Fraserview", 327, 4),
    ("West End", 497, 17),
    ("West Point Grey", 137, 2),
];

const VANCOUVER_FULL: &[Row] = &[
    ("Arbutus-Ridge", 16121, 3),
    ("Downtown", 65380, 12),
    ("Dunbar-Southlands", 22582, 2),
    ("Fairview", 35435, 7),
    ("Grandview-Woodland", 30750, 5),
    ("Hastings-Sunrise", 36442, 3),
    ("Kensington-Cedar Cottage", 51989, 5),
    ("Kerrisdale", 14730, 2),
    ("Killarney", 30909, 3),
    ("Kitsilano", 45369, 6),
    ("Marpole", 24460, 3),
    ("Mount Pleasant", 34735, 6),
    ("Oakridge", 13734, 2),
    ("Renfrew-Collingwood", 54313, 5),
    ("Riley Park", 23773, 3),
    ("Shaughnessy", 8885, 1),
    ("South Cambie", 8400, 3),
    ("Strathcona", 13265, 2),
    ("Sunset", 38471, 4),
    ("Victoria-Fraserview", 32743, 4),
    ("West End", 49749, 17),
    ("West Point Grey", 13771, 2),
];

/// Named preset community table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// British Columbia municipalities.
    Bc,
    /// Vancouver neighbourhoods, populations divided by 100.
    Vancouver,
    /// Vancouver neighbourhoods at full population.
    VancouverFull,
}

impl Region {
    pub const ALL: [Self; 3] = [Self::Bc, Self::Vancouver, Self::VancouverFull];

    /// Stable identifier used in config files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bc => "bc",
            Self::Vancouver => "vancouver",
            Self::VancouverFull => "vancouver-full",
        }
    }

    const fn rows(self) -> &'static [Row] {
        match self {
            Self::Bc => BC,
            Self::Vancouver => VANCOUVER_REDUCED,
            Self::VancouverFull => VANCOUVER_FULL,
        }
    }

    /// The community table, in the order communities are chained.
    #[must_use]
    pub fn communities(self) -> Vec<Community> {
        self.rows()
            .iter()
            .map(|&(name, population, density)| Community::new(name, population, density))
            .collect()
    }

    /// Number of communities in the table.
    #[must_use]
    pub const fn community_count(self) -> usize {
        self.rows().len()
    }

    /// Total node count the table produces.
    #[must_use]
    pub fn population(self) -> usize {
        self.rows().iter().map(|&(_, population, _)| population).sum()
    }

    /// Bridge edges per adjacent pair used with this table.
    #[must_use]
    pub const fn inter_region_edge_count(self) -> usize {
        match self {
            Self::Bc => BC_INTER_REGION_EDGES,
            Self::Vancouver | Self::VancouverFull => VANCOUVER_INTER_REGION_EDGES,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "bc" => Ok(Self::Bc),
            "vancouver" | "van" => Ok(Self::Vancouver),
            "vancouver-full" => Ok(Self::VancouverFull),
            _ => Err(ConfigError::UnknownRegion(s.to_string())),
        }
    }
}
