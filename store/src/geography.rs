//! Geography storage trait and records.
//!
//! The geography is a strict tree: Ward → Constituency → District →
//! Province. Every ward carries exactly one constituency code; lookups up
//! the chain must be unambiguous (an orphan ward is a data fault surfaced
//! as [`StoreError::NotFound`]).

use crate::StoreError;
use serde::{Deserialize, Serialize};
use votechain_types::{ConstituencyCode, DistrictCode, ProvinceCode, WardCode};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ward {
    pub code: WardCode,
    pub name: String,
    pub constituency: ConstituencyCode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituency {
    pub code: ConstituencyCode,
    pub name: String,
    pub district: DistrictCode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub code: DistrictCode,
    pub name: String,
    pub province: ProvinceCode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub code: ProvinceCode,
    pub name: String,
}

/// Trait for geography tree storage.
pub trait GeographyStore {
    fn get_ward(&self, code: &WardCode) -> Result<Ward, StoreError>;
    fn get_constituency(&self, code: &ConstituencyCode) -> Result<Constituency, StoreError>;
    fn get_district(&self, code: &DistrictCode) -> Result<District, StoreError>;
    fn get_province(&self, code: &ProvinceCode) -> Result<Province, StoreError>;

    fn put_ward(&self, ward: &Ward) -> Result<(), StoreError>;
    fn put_constituency(&self, constituency: &Constituency) -> Result<(), StoreError>;
    fn put_district(&self, district: &District) -> Result<(), StoreError>;
    fn put_province(&self, province: &Province) -> Result<(), StoreError>;
}
