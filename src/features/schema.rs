use serde::{Deserialize, Serialize};

use super::RawInput;

/// 모델 입력 특성의 고정 순서
///
/// Training and serving must agree on it position by position.
pub const FEATURE_NAMES: [&str; 10] = [
    "OverallQual",
    "GrLivArea",
    "GarageCars",
    "GarageArea",
    "TotalBsmtSF",
    "FirstFlrSF",
    "FullBath",
    "TotRmsAbvGrd",
    "YearBuilt",
    "YearRemodAdd",
];

pub const DEFAULT_OVERALL_QUAL: f64 = 5.0;
pub const DEFAULT_AREA: f64 = 1500.0;
pub const DEFAULT_PARKING: f64 = 1.0;
pub const DEFAULT_BATHROOMS: f64 = 2.0;
pub const DEFAULT_BEDROOMS: f64 = 3.0;
pub const DEFAULT_YEAR_BUILT: f64 = 2010.0;

/// Square feet of garage per parking space
pub const GARAGE_AREA_PER_CAR: f64 = 300.0;
/// Basement and first floor are each taken as half of the living area
pub const FLOOR_AREA_SHARE: f64 = 0.5;
pub const REMODEL_OFFSET_YEARS: f64 = 5.0;

/// 추출된 특성 벡터
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// 전반적 품질 (1~10)
    #[serde(rename = "OverallQual")]
    pub overall_qual: f64,
    /// 지상 거주 면적
    #[serde(rename = "GrLivArea")]
    pub gr_liv_area: f64,
    /// 차고 수용 대수
    #[serde(rename = "GarageCars")]
    pub garage_cars: f64,
    #[serde(rename = "GarageArea")]
    pub garage_area: f64,
    #[serde(rename = "TotalBsmtSF")]
    pub total_bsmt_sf: f64,
    #[serde(rename = "FirstFlrSF")]
    pub first_flr_sf: f64,
    #[serde(rename = "FullBath")]
    pub full_bath: f64,
    #[serde(rename = "TotRmsAbvGrd")]
    pub tot_rms_abv_grd: f64,
    #[serde(rename = "YearBuilt")]
    pub year_built: f64,
    #[serde(rename = "YearRemodAdd")]
    pub year_remod_add: f64,
}

impl FeatureVector {
    /// Build the full vector from sparse user input. Never fails: every
    /// missing attribute falls back to its default before derivation.
    pub fn derive(input: &RawInput) -> Self {
        let overall_qual = input.overall_qual.unwrap_or(DEFAULT_OVERALL_QUAL);
        let area = input.area.unwrap_or(DEFAULT_AREA);
        let parking = input.parking.unwrap_or(DEFAULT_PARKING);
        let bathrooms = input.bathrooms.unwrap_or(DEFAULT_BATHROOMS);
        let bedrooms = input.bedrooms.unwrap_or(DEFAULT_BEDROOMS);
        let year_built = input.year_built.unwrap_or(DEFAULT_YEAR_BUILT);

        Self {
            overall_qual,
            gr_liv_area: area,
            garage_cars: parking,
            garage_area: parking * GARAGE_AREA_PER_CAR,
            total_bsmt_sf: area * FLOOR_AREA_SHARE,
            first_flr_sf: area * FLOOR_AREA_SHARE,
            full_bath: bathrooms,
            tot_rms_abv_grd: bedrooms + bathrooms,
            year_built,
            year_remod_add: year_built + REMODEL_OFFSET_YEARS,
        }
    }

    /// 특성 벡터를 f64 배열로 변환 (모델 입력용)
    ///
    /// Values follow `FEATURE_NAMES` order.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.overall_qual,
            self.gr_liv_area,
            self.garage_cars,
            self.garage_area,
            self.total_bsmt_sf,
            self.first_flr_sf,
            self.full_bath,
            self.tot_rms_abv_grd,
            self.year_built,
            self.year_remod_add,
        ]
    }

    /// Value of one field by its canonical schema name
    pub fn get(&self, name: &str) -> Option<f64> {
        let idx = FEATURE_NAMES.iter().position(|n| *n == name)?;
        Some(self.to_vec()[idx])
    }

    /// Values for an ordered subset of schema names, in that order.
    /// Returns the first unknown name as the error.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<f64>, String> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).ok_or_else(|| name.to_string())
            })
            .collect()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::derive(&RawInput::default())
    }
}

/// Canonical schema name for a dataset column header, if it is one.
///
/// The public house-prices table names the first floor column `1stFlrSF`.
pub fn canonical_feature_name(column: &str) -> Option<&'static str> {
    let column = column.trim();
    if column == "1stFlrSF" {
        return Some("FirstFlrSF");
    }
    FEATURE_NAMES.iter().copied().find(|n| *n == column)
}
