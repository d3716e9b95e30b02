//! Service requests posted by customers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::{CarType, CategoryKind};
use crate::domain::foundation::{
    CustomerId, ProviderId, RequestId, ReviewId, Timestamp, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestState {
    InProgress,
    Done,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::InProgress => "in-progress",
            RequestState::Done => "done",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "in-progress" => Some(RequestState::InProgress),
            "done" => Some(RequestState::Done),
            _ => None,
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::out_of_range("latitude", -90.0, 90.0, latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::out_of_range(
                "longitude",
                -180.0,
                180.0,
                longitude,
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaundryItems {
    pub shirts: u32,
    pub pants: u32,
    pub bedsheets: u32,
    pub pillow_covers: u32,
}

/// Category-specific attributes stored alongside a request.
///
/// Serialized without a tag; variants are told apart by their required fields,
/// so the more specific shapes come first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestDetails {
    #[serde(rename_all = "camelCase")]
    Automotive {
        car_type: CarType,
        service_type: String,
    },
    #[serde(rename_all = "camelCase")]
    HomeCleaning {
        home_type: String,
        bedroom_count: u32,
        bathroom_count: u32,
        cleaning_type: String,
    },
    #[serde(rename_all = "camelCase")]
    Painting {
        home_type: String,
        bedroom_count: u32,
        painting_area: String,
    },
    #[serde(rename_all = "camelCase")]
    Plumbing {
        home_type: String,
        plumbing_type: String,
    },
    #[serde(rename_all = "camelCase")]
    Laundry {
        laundry_type: String,
        preferences: Vec<String>,
        items: LaundryItems,
    },
    #[serde(rename_all = "camelCase")]
    General { service_type: String },
}

const DEFAULT_HOME_TYPE: &str = "Apartment";

impl RequestDetails {
    /// Details for a request booked through chat. Home size, laundry items and
    /// preferences are not asked for, so they take fixed defaults.
    pub fn for_category(category: &str, car_type: Option<CarType>, service: &str) -> Self {
        let service = service.to_string();
        match CategoryKind::of(category) {
            CategoryKind::Automotive => RequestDetails::Automotive {
                car_type: car_type.unwrap_or(CarType::Sedan),
                service_type: service,
            },
            CategoryKind::HomeCleaning => RequestDetails::HomeCleaning {
                home_type: DEFAULT_HOME_TYPE.to_string(),
                bedroom_count: 2,
                bathroom_count: 1,
                cleaning_type: service,
            },
            CategoryKind::Plumbing => RequestDetails::Plumbing {
                home_type: DEFAULT_HOME_TYPE.to_string(),
                plumbing_type: service,
            },
            CategoryKind::Painting => RequestDetails::Painting {
                home_type: DEFAULT_HOME_TYPE.to_string(),
                bedroom_count: 2,
                painting_area: service,
            },
            CategoryKind::Laundry => RequestDetails::Laundry {
                laundry_type: service,
                preferences: vec!["Folding".to_string(), "Pickup/Drop-off".to_string()],
                items: LaundryItems {
                    shirts: 2,
                    pants: 2,
                    bedsheets: 1,
                    pillow_covers: 2,
                },
            },
            CategoryKind::Other => RequestDetails::General {
                service_type: service,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: RequestId,
    pub customer_id: CustomerId,
    pub provider_id: Option<ProviderId>,
    pub category: String,
    /// Name of the booked service
    pub service: String,
    pub description: String,
    pub budget: f64,
    /// Agreed price once a bid is accepted
    pub price: Option<f64>,
    pub date: NaiveDate,
    pub location: Option<GeoPoint>,
    pub state: RequestState,
    pub paid: bool,
    pub review_id: Option<ReviewId>,
    pub details: RequestDetails,
    pub created_at: Timestamp,
}

impl ServiceRequest {
    pub fn is_open_for_bids(&self) -> bool {
        self.state == RequestState::InProgress && self.provider_id.is_none()
    }
}

/// Everything collected by the booking conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewServiceRequest {
    pub customer_id: CustomerId,
    pub category: String,
    pub car_type: Option<CarType>,
    pub service: String,
    pub description: String,
    pub budget: f64,
    pub date: NaiveDate,
    pub location: GeoPoint,
}

impl NewServiceRequest {
    /// Open, unpaid and unassigned.
    pub fn into_request(self, created_at: Timestamp) -> ServiceRequest {
        let details = RequestDetails::for_category(&self.category, self.car_type, &self.service);
        ServiceRequest {
            id: RequestId::new(),
            customer_id: self.customer_id,
            provider_id: None,
            category: self.category,
            service: self.service,
            description: self.description,
            budget: self.budget,
            price: None,
            date: self.date,
            location: Some(self.location),
            state: RequestState::InProgress,
            paid: false,
            review_id: None,
            details,
            created_at,
        }
    }
}
