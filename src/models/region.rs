//! Region identifiers used to batch forecast requests

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ForecastError;

/// Whether a region is a state/province or a smaller subregion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionKind {
    State,
    Subregion,
}

/// Every region the service knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Washington,
    Oregon,
    Idaho,
    BritishColumbia,
    Utah,
    Colorado,
    California,
    Wyoming,
    Montana,
    Vermont,
    NewMexico,
    Alaska,
    PnwNorth,
    PnwSouth,
    InlandNw,
    CentralOregon,
    InteriorBc,
    Wasatch,
    ColoradoI70,
    Tahoe,
}

impl Region {
    /// All regions in presentation order, states first
    pub const ALL: [Region; 20] = [
        Region::Washington,
        Region::Oregon,
        Region::Idaho,
        Region::BritishColumbia,
        Region::Utah,
        Region::Colorado,
        Region::California,
        Region::Wyoming,
        Region::Montana,
        Region::Vermont,
        Region::NewMexico,
        Region::Alaska,
        Region::PnwNorth,
        Region::PnwSouth,
        Region::InlandNw,
        Region::CentralOregon,
        Region::InteriorBc,
        Region::Wasatch,
        Region::ColoradoI70,
        Region::Tahoe,
    ];

    /// Identifier used in URLs and JSON
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Region::Washington => "washington",
            Region::Oregon => "oregon",
            Region::Idaho => "idaho",
            Region::BritishColumbia => "british-columbia",
            Region::Utah => "utah",
            Region::Colorado => "colorado",
            Region::California => "california",
            Region::Wyoming => "wyoming",
            Region::Montana => "montana",
            Region::Vermont => "vermont",
            Region::NewMexico => "new-mexico",
            Region::Alaska => "alaska",
            Region::PnwNorth => "pnw-north",
            Region::PnwSouth => "pnw-south",
            Region::InlandNw => "inland-nw",
            Region::CentralOregon => "central-oregon",
            Region::InteriorBc => "interior-bc",
            Region::Wasatch => "wasatch",
            Region::ColoradoI70 => "colorado-i70",
            Region::Tahoe => "tahoe",
        }
    }

    /// Human-readable name
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Washington => "Washington",
            Region::Oregon => "Oregon",
            Region::Idaho => "Idaho",
            Region::BritishColumbia => "British Columbia",
            Region::Utah => "Utah",
            Region::Colorado => "Colorado",
            Region::California => "California",
            Region::Wyoming => "Wyoming",
            Region::Montana => "Montana",
            Region::Vermont => "Vermont",
            Region::NewMexico => "New Mexico",
            Region::Alaska => "Alaska",
            Region::PnwNorth => "North Cascades & Coast Mountains",
            Region::PnwSouth => "South Cascades & Mt. Hood",
            Region::InlandNw => "Inland Northwest",
            Region::CentralOregon => "Central Oregon",
            Region::InteriorBc => "Interior British Columbia",
            Region::Wasatch => "Wasatch Range",
            Region::ColoradoI70 => "Colorado I-70 Corridor",
            Region::Tahoe => "Lake Tahoe",
        }
    }

    #[must_use]
    pub fn kind(&self) -> RegionKind {
        match self {
            Region::PnwNorth
            | Region::PnwSouth
            | Region::InlandNw
            | Region::CentralOregon
            | Region::InteriorBc
            | Region::Wasatch
            | Region::ColoradoI70
            | Region::Tahoe => RegionKind::Subregion,
            _ => RegionKind::State,
        }
    }

    /// Identifiers of every known region
    #[must_use]
    pub fn valid_ids() -> Vec<&'static str> {
        Self::ALL.iter().map(Region::id).collect()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Region {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|region| region.id() == normalized)
            .ok_or_else(|| ForecastError::UnknownRegion {
                region: s.to_string(),
            })
    }
}
