use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
pub enum WaterRequirement {
    #[strum(serialize = "Faible")]
    #[serde(rename = "Faible")]
    Low,
    #[strum(serialize = "Moyen")]
    #[serde(rename = "Moyen")]
    Medium,
    #[strum(serialize = "Élevé")]
    #[serde(rename = "Élevé")]
    High,
}

/// Agronomic reference data for one crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub name_fr: String,
    pub name_en: String,
    pub scientific_name: String,
    pub category: String,
    pub growing_season_days: u32,
    pub water_requirement: WaterRequirement,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub optimal_ph_min: f64,
    pub optimal_ph_max: f64,
    pub description_fr: String,
    pub description_en: String,
}

impl Crop {
    #[allow(clippy::too_many_arguments)]
    fn entry(
        name_fr: &str,
        name_en: &str,
        scientific_name: &str,
        category: &str,
        growing_season_days: u32,
        water_requirement: WaterRequirement,
        temperature: (f64, f64),
        ph: (f64, f64),
        description: (&str, &str),
    ) -> Self {
        Self {
            name_fr: name_fr.to_string(),
            name_en: name_en.to_string(),
            scientific_name: scientific_name.to_string(),
            category: category.to_string(),
            growing_season_days,
            water_requirement,
            temperature_min: temperature.0,
            temperature_max: temperature.1,
            optimal_ph_min: ph.0,
            optimal_ph_max: ph.1,
            description_fr: description.0.to_string(),
            description_en: description.1.to_string(),
        }
    }

    /// Whether both temperature and pH fall in the crop's optimal ranges
    pub fn suits(&self, temperature: f64, soil_ph: f64) -> bool {
        (self.temperature_min..=self.temperature_max).contains(&temperature)
            && (self.optimal_ph_min..=self.optimal_ph_max).contains(&soil_ph)
    }

    /// Name in the requested language; French unless "en"
    pub fn name(&self, language: &str) -> &str {
        if language == "en" {
            &self.name_en
        } else {
            &self.name_fr
        }
    }
}

static CATALOGUE: Lazy<Vec<Crop>> = Lazy::new(|| {
    use WaterRequirement::*;
    vec![
        Crop::entry(
            "Maïs",
            "Maize",
            "Zea mays",
            "Céréale",
            120,
            Medium,
            (20.0, 30.0),
            (5.5, 7.5),
            (
                "Céréale cultivée pour ses grains riches en amidon",
                "Cereal grown for its starch-rich grains",
            ),
        ),
        Crop::entry(
            "Riz",
            "Rice",
            "Oryza sativa",
            "Céréale",
            140,
            High,
            (20.0, 35.0),
            (5.0, 7.0),
            (
                "Céréale la plus consommée au monde",
                "Most consumed cereal in the world",
            ),
        ),
        Crop::entry(
            "Tomate",
            "Tomato",
            "Solanum lycopersicum",
            "Légume-fruit",
            90,
            Medium,
            (18.0, 27.0),
            (6.0, 7.0),
            (
                "Fruit-légume cultivé pour sa consommation",
                "Fruit-vegetable grown for consumption",
            ),
        ),
        Crop::entry(
            "Manioc",
            "Cassava",
            "Manihot esculenta",
            "Tubercule",
            300,
            Low,
            (20.0, 35.0),
            (5.0, 7.5),
            ("Tubercule de base en Afrique", "Staple tuber in Africa"),
        ),
        Crop::entry(
            "Oignon",
            "Onion",
            "Allium cepa",
            "Légume-bulbe",
            110,
            Medium,
            (13.0, 24.0),
            (6.0, 7.5),
            ("Bulbe cultivé pour son goût", "Bulb grown for its taste"),
        ),
        Crop::entry(
            "Arachide",
            "Peanut",
            "Arachis hypogaea",
            "Légumineuse",
            120,
            Medium,
            (20.0, 30.0),
            (5.5, 7.0),
            ("Légumineuse oléagineuse", "Oilseed legume"),
        ),
        Crop::entry(
            "Coton",
            "Cotton",
            "Gossypium",
            "Culture industrielle",
            180,
            Medium,
            (20.0, 35.0),
            (5.5, 8.0),
            ("Plante cultivée pour ses fibres", "Plant grown for its fibers"),
        ),
        Crop::entry(
            "Soja",
            "Soybean",
            "Glycine max",
            "Légumineuse",
            110,
            Medium,
            (20.0, 30.0),
            (6.0, 7.5),
            ("Légumineuse riche en protéines", "Protein-rich legume"),
        ),
    ]
});

/// The crops known to the service
pub fn crop_catalogue() -> &'static [Crop] {
    &CATALOGUE
}

/// Look up a crop by its French or English name, ignoring case
pub fn find_crop(name: &str) -> Option<&'static Crop> {
    let needle = name.trim().to_lowercase();
    CATALOGUE
        .iter()
        .find(|c| c.name_fr.to_lowercase() == needle || c.name_en.to_lowercase() == needle)
}
