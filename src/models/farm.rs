use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SoilType {
    Sandy,
    Clay,
    Loam,
    SiltLoam,
    SandyLoam,
}

impl SoilType {
    pub fn label_fr(&self) -> &'static str {
        match self {
            SoilType::Sandy => "Sableux",
            SoilType::Clay => "Argileux",
            SoilType::Loam => "Limoneux",
            SoilType::SiltLoam => "Argilo-limoneux",
            SoilType::SandyLoam => "Sablo-limoneux",
        }
    }
}

/// Administrative regions of Cameroon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    North,
    FarNorth,
    Adamawa,
    Center,
    South,
    East,
    West,
    Littoral,
    Northwest,
    Southwest,
}

impl Region {
    pub fn label_fr(&self) -> &'static str {
        match self {
            Region::North => "Nord",
            Region::FarNorth => "Extrême-Nord",
            Region::Adamawa => "Adamaoua",
            Region::Center => "Centre",
            Region::South => "Sud",
            Region::East => "Est",
            Region::West => "Ouest",
            Region::Littoral => "Littoral",
            Region::Northwest => "Nord-Ouest",
            Region::Southwest => "Sud-Ouest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonType {
    Dry,
    Rainy,
    Transition,
}

/// A farm registered by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub region: Region,
    pub latitude: f64,
    pub longitude: f64,
    pub area_hectares: f64,
    pub soil_type: SoilType,
    pub soil_ph: Option<f64>,
    pub organic_matter: Option<f64>,
    pub irrigation_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or replacing a farm
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewFarm {
    #[validate(length(min = 1, max = 150))]
    pub owner: String,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    pub region: Region,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(range(min = 0.0))]
    pub area_hectares: f64,

    pub soil_type: SoilType,

    #[validate(range(min = 0.0, max = 14.0))]
    pub soil_ph: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub organic_matter: Option<f64>,

    #[serde(default)]
    pub irrigation_available: bool,
}

impl NewFarm {
    pub fn into_farm(self) -> Farm {
        let now = Utc::now();
        Farm {
            id: Uuid::new_v4(),
            owner: self.owner,
            name: self.name,
            region: self.region,
            latitude: self.latitude,
            longitude: self.longitude,
            area_hectares: self.area_hectares,
            soil_type: self.soil_type,
            soil_ph: self.soil_ph,
            organic_matter: self.organic_matter,
            irrigation_available: self.irrigation_available,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One crop grown on one farm during one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropSeason {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub crop: String,
    pub season_type: SeasonType,
    pub planting_date: NaiveDate,
    pub expected_harvest_date: NaiveDate,
    pub actual_harvest_date: Option<NaiveDate>,
    pub area_planted: f64,
    pub npk_amount: Option<f64>,
    pub yield_kg_per_ha: Option<f64>,
    pub total_production_kg: Option<f64>,
    pub production_cost: Option<f64>,
    pub market_price_per_kg: Option<f64>,
    pub total_revenue: Option<f64>,
    pub profit_margin: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl CropSeason {
    /// Recompute production, revenue and margin from the recorded values.
    /// A derived field is only updated when all of its inputs are present
    /// and non-zero.
    pub fn recompute_derived(&mut self) {
        if let Some(y) = self.yield_kg_per_ha.filter(|v| *v != 0.0) {
            if self.area_planted != 0.0 {
                self.total_production_kg = Some(y * self.area_planted);
            }
        }

        if let (Some(total), Some(price)) = (
            self.total_production_kg.filter(|v| *v != 0.0),
            self.market_price_per_kg.filter(|v| *v != 0.0),
        ) {
            self.total_revenue = Some(total * price);
        }

        if let (Some(revenue), Some(cost)) = (
            self.total_revenue.filter(|v| *v != 0.0),
            self.production_cost.filter(|v| *v != 0.0),
        ) {
            self.profit_margin = Some((revenue - cost) / revenue * 100.0);
        }
    }

    pub fn is_completed(&self) -> bool {
        self.actual_harvest_date.is_some()
    }
}

/// Payload for recording a crop season
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCropSeason {
    #[validate(length(min = 1, max = 100))]
    pub crop: String,

    pub season_type: SeasonType,
    pub planting_date: NaiveDate,
    pub expected_harvest_date: NaiveDate,
    pub actual_harvest_date: Option<NaiveDate>,

    #[validate(range(min = 0.0))]
    pub area_planted: f64,

    #[validate(range(min = 0.0))]
    pub npk_amount: Option<f64>,

    #[validate(range(min = 0.0))]
    pub yield_kg_per_ha: Option<f64>,

    #[validate(range(min = 0.0))]
    pub production_cost: Option<f64>,

    #[validate(range(min = 0.0))]
    pub market_price_per_kg: Option<f64>,
}

impl NewCropSeason {
    pub fn into_season(self, farm_id: Uuid) -> CropSeason {
        let mut season = CropSeason {
            id: Uuid::new_v4(),
            farm_id,
            crop: self.crop,
            season_type: self.season_type,
            planting_date: self.planting_date,
            expected_harvest_date: self.expected_harvest_date,
            actual_harvest_date: self.actual_harvest_date,
            area_planted: self.area_planted,
            npk_amount: self.npk_amount,
            yield_kg_per_ha: self.yield_kg_per_ha,
            total_production_kg: None,
            production_cost: self.production_cost,
            market_price_per_kg: self.market_price_per_kg,
            total_revenue: None,
            profit_margin: None,
            created_at: Utc::now(),
        };
        season.recompute_derived();
        season
    }
}

/// Aggregates over a user's farms and seasons
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_farms: usize,
    pub total_area: f64,
    pub active_seasons: usize,
    pub completed_seasons: usize,
    pub total_production: f64,
    pub average_yield: f64,
    /// Advisory answers kept in the user's history; filled in from the prediction store
    pub total_predictions: usize,
}

impl UserStats {
    pub fn compute(farms: &[Farm], seasons: &[CropSeason]) -> Self {
        let yields: Vec<f64> = seasons.iter().filter_map(|s| s.yield_kg_per_ha).collect();
        let average_yield = if yields.is_empty() {
            0.0
        } else {
            yields.iter().sum::<f64>() / yields.len() as f64
        };

        Self {
            total_farms: farms.len(),
            total_area: farms.iter().map(|f| f.area_hectares).sum(),
            active_seasons: seasons.iter().filter(|s| !s.is_completed()).count(),
            completed_seasons: seasons.iter().filter(|s| s.is_completed()).count(),
            total_production: seasons.iter().filter_map(|s| s.total_production_kg).sum(),
            average_yield,
            total_predictions: 0,
        }
    }
}
