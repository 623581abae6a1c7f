//! Parking spot domain entity

use std::str::FromStr;

use crate::shared::errors::FareError;

/// Vehicle category a spot is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParkingType {
    Car,
    Bike,
}

impl ParkingType {
    pub const ALL: [ParkingType; 2] = [ParkingType::Car, ParkingType::Bike];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "CAR",
            Self::Bike => "BIKE",
        }
    }
}

impl std::fmt::Display for ParkingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ParkingType {
    type Err = FareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CAR" => Ok(Self::Car),
            "BIKE" => Ok(Self::Bike),
            _ => Err(FareError::UnsupportedCategory(s.to_string())),
        }
    }
}

/// A physical parking spot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingSpot {
    /// Stable spot number, always positive
    pub id: i32,
    /// Category is fixed once the spot exists
    pub category: ParkingType,
    pub is_available: bool,
}

impl ParkingSpot {
    pub fn new(id: i32, category: ParkingType, is_available: bool) -> Self {
        Self {
            id,
            category,
            is_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_categories_case_insensitively() {
        assert_eq!("car".parse::<ParkingType>(), Ok(ParkingType::Car));
        assert_eq!("BIKE".parse::<ParkingType>(), Ok(ParkingType::Bike));
        assert_eq!(" Bike ".parse::<ParkingType>(), Ok(ParkingType::Bike));
    }

    #[test]
    fn unknown_category_is_unsupported() {
        assert_eq!(
            "truck".parse::<ParkingType>(),
            Err(FareError::UnsupportedCategory("truck".to_string()))
        );
    }

    #[test]
    fn display_matches_stored_form() {
        for category in ParkingType::ALL {
            assert_eq!(category.to_string().parse::<ParkingType>(), Ok(category));
        }
        assert_eq!(ParkingType::Car.to_string(), "CAR");
    }
}
