//! Identifier newtypes for voters, elections, candidates, and geography.
//!
//! Numeric ids mirror the relational store's primary keys; geographic codes
//! are the short alphanumeric codes assigned by the electoral commission
//! (e.g. ward code `"W-0132"`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A voter's registration identifier (opaque string, assigned at registration).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoterId(String);

impl VoterId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VoterId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

numeric_id!(
    /// Primary key of an election.
    ElectionId
);
numeric_id!(
    /// Primary key of a candidate.
    CandidateId
);
numeric_id!(
    /// Primary key of an elected position (President, Mayor, Councillor, ...).
    PositionId
);
numeric_id!(
    /// Primary key of a political party.
    PartyId
);

macro_rules! code_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

code_id!(
    /// Electoral-commission code for a ward (leaf of the geography tree).
    WardCode
);
code_id!(
    /// Electoral-commission code for a constituency.
    ConstituencyCode
);
code_id!(
    /// Electoral-commission code for a district.
    DistrictCode
);
code_id!(
    /// Electoral-commission code for a province (root of the geography tree).
    ProvinceCode
);
