use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Catalog identity of a beer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeerId(pub u64);

impl fmt::Display for BeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BeerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(BeerId)
    }
}

impl From<u64> for BeerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Volume {
    pub value: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MashTemp {
    #[serde(deserialize_with = "null_as_default")]
    pub temp: Volume,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fermentation {
    #[serde(deserialize_with = "null_as_default")]
    pub temp: Volume,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Method {
    #[serde(deserialize_with = "null_as_default")]
    pub mash_temp: Vec<MashTemp>,
    #[serde(deserialize_with = "null_as_default")]
    pub fermentation: Fermentation,
    pub twist: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Malt {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: Volume,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hop {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: Volume,
    #[serde(deserialize_with = "null_as_default")]
    pub add: String,
    #[serde(deserialize_with = "null_as_default")]
    pub attribute: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredients {
    #[serde(deserialize_with = "null_as_default")]
    pub malt: Vec<Malt>,
    #[serde(deserialize_with = "null_as_default")]
    pub hops: Vec<Hop>,
    pub yeast: Option<String>,
}

/// Decodes a JSON `null` as the field's default. The catalog sends `null`
/// for text and nested values it does not have.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single catalog entry as served by the remote API.
///
/// Measurements are `None` when the catalog has no value for them; a zero is
/// a real measurement. Missing nested structures decode to their empty
/// defaults and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub id: BeerId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tagline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_brewed: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub abv: Option<f64>,
    #[serde(default)]
    pub ibu: Option<f64>,
    #[serde(default)]
    pub target_fg: Option<f64>,
    #[serde(default)]
    pub target_og: Option<f64>,
    #[serde(default)]
    pub ebc: Option<f64>,
    #[serde(default)]
    pub srm: Option<f64>,
    #[serde(default)]
    pub ph: Option<f64>,
    #[serde(default)]
    pub attenuation_level: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volume: Volume,
    #[serde(default, deserialize_with = "null_as_default")]
    pub boil_volume: Volume,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: Method,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Ingredients,
    #[serde(default, deserialize_with = "null_as_default")]
    pub food_pairing: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brewers_tips: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contributed_by: String,
}

impl Beer {
    /// Minimal entry with only identity and name set.
    pub fn new(id: impl Into<BeerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tagline: String::new(),
            first_brewed: String::new(),
            description: String::new(),
            image: None,
            image_url: None,
            abv: None,
            ibu: None,
            target_fg: None,
            target_og: None,
            ebc: None,
            srm: None,
            ph: None,
            attenuation_level: None,
            volume: Volume::default(),
            boil_volume: Volume::default(),
            method: Method::default(),
            ingredients: Ingredients::default(),
            food_pairing: Vec::new(),
            brewers_tips: String::new(),
            contributed_by: String::new(),
        }
    }

    /// Resolves the image to show for this beer.
    ///
    /// An absolute `image_url` wins; otherwise a bare `image` file name is
    /// served from `{api_base}/images/`.
    pub fn image_source(&self, api_base: &str) -> Option<String> {
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Some(url.to_string());
        }
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| format!("{}/images/{}", api_base.trim_end_matches('/'), name))
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{} {}", value, self.unit),
            None => write!(f, "? {}", self.unit),
        }
    }
}
