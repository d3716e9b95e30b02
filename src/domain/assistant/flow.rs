//! Multi-turn flow state and its transition table.
//!
//! A [`FlowStep`] carries exactly the slots collected so far. [`transition`]
//! is pure: given the current step and the value extracted from the latest
//! message (or `None` when extraction failed) it says whether to re-prompt,
//! move to the next step, or finish with a side effect.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::intent::ProfileField;
use crate::domain::foundation::{CustomerId, ProviderId, RequestId, Timestamp};
use crate::domain::marketplace::{CarType, CategoryKind, GeoPoint};

/// Service picked during booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceChoice {
    pub category: String,
    pub car_type: Option<CarType>,
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCandidate {
    pub id: ProviderId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCandidate {
    pub id: CustomerId,
    pub name: String,
    /// Services this customer booked with the provider; also matchable.
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum FlowStep {
    AwaitingCategory,
    AwaitingCarType {
        category: String,
    },
    AwaitingService {
        category: String,
        car_type: Option<CarType>,
    },
    AwaitingDate {
        choice: ServiceChoice,
    },
    AwaitingBudget {
        choice: ServiceChoice,
        date: NaiveDate,
    },
    AwaitingDescription {
        choice: ServiceChoice,
        date: NaiveDate,
        budget: f64,
    },
    AwaitingLocation {
        choice: ServiceChoice,
        date: NaiveDate,
        budget: f64,
        description: String,
    },
    AwaitingBidAmount {
        request_id: RequestId,
    },
    AwaitingProviderChoice {
        candidates: Vec<ProviderCandidate>,
    },
    AwaitingCustomerSelection {
        candidates: Vec<CustomerCandidate>,
    },
    AwaitingProfileValue {
        field: ProfileField,
    },
}

/// What the current step needs from the next message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Category,
    CarType,
    Service,
    Date,
    Budget,
    Description,
    Location,
    BidAmount,
    Provider,
    Customer,
    ProfileValue,
}

impl FlowStep {
    /// First step of the booking flow, skipping category selection when the
    /// opening message already named one.
    pub fn start_booking(category: Option<String>) -> Self {
        match category {
            Some(category) => Self::after_category(category),
            None => FlowStep::AwaitingCategory,
        }
    }

    fn after_category(category: String) -> Self {
        if CategoryKind::of(&category) == CategoryKind::Automotive {
            FlowStep::AwaitingCarType { category }
        } else {
            FlowStep::AwaitingService {
                category,
                car_type: None,
            }
        }
    }

    pub fn expects(&self) -> SlotKind {
        match self {
            FlowStep::AwaitingCategory => SlotKind::Category,
            FlowStep::AwaitingCarType { .. } => SlotKind::CarType,
            FlowStep::AwaitingService { .. } => SlotKind::Service,
            FlowStep::AwaitingDate { .. } => SlotKind::Date,
            FlowStep::AwaitingBudget { .. } => SlotKind::Budget,
            FlowStep::AwaitingDescription { .. } => SlotKind::Description,
            FlowStep::AwaitingLocation { .. } => SlotKind::Location,
            FlowStep::AwaitingBidAmount { .. } => SlotKind::BidAmount,
            FlowStep::AwaitingProviderChoice { .. } => SlotKind::Provider,
            FlowStep::AwaitingCustomerSelection { .. } => SlotKind::Customer,
            FlowStep::AwaitingProfileValue { .. } => SlotKind::ProfileValue,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlowStep::AwaitingCategory => "awaiting_category",
            FlowStep::AwaitingCarType { .. } => "awaiting_car_type",
            FlowStep::AwaitingService { .. } => "awaiting_service",
            FlowStep::AwaitingDate { .. } => "awaiting_date",
            FlowStep::AwaitingBudget { .. } => "awaiting_budget",
            FlowStep::AwaitingDescription { .. } => "awaiting_description",
            FlowStep::AwaitingLocation { .. } => "awaiting_location",
            FlowStep::AwaitingBidAmount { .. } => "awaiting_bid_amount",
            FlowStep::AwaitingProviderChoice { .. } => "awaiting_provider_choice",
            FlowStep::AwaitingCustomerSelection { .. } => "awaiting_customer_selection",
            FlowStep::AwaitingProfileValue { field } => field.step_name(),
        }
    }
}

/// A value pulled out of a user message for the current step.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Category(String),
    CarType(CarType),
    Service(String),
    Date(NaiveDate),
    Amount(f64),
    Text(String),
    Location(GeoPoint),
    Provider(ProviderCandidate),
    Customer(CustomerCandidate),
}

/// Collected booking ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub choice: ServiceChoice,
    pub date: NaiveDate,
    pub budget: f64,
    pub description: String,
    pub location: GeoPoint,
}

/// Side effect that ends a flow.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEffect {
    CreateRequest(BookingDraft),
    PlaceBid { request_id: RequestId, amount: f64 },
    MessageProvider(ProviderCandidate),
    MessageCustomer(CustomerCandidate),
    UpdateProfile { field: ProfileField, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Extraction failed or the value was invalid; stay on the same step.
    Reprompt,
    Advance(FlowStep),
    Complete(FlowEffect),
}

pub fn transition(step: &FlowStep, slot: Option<SlotValue>) -> Transition {
    let Some(slot) = slot else {
        return Transition::Reprompt;
    };

    match (step, slot) {
        (FlowStep::AwaitingCategory, SlotValue::Category(category)) => {
            Transition::Advance(FlowStep::after_category(category))
        }
        (FlowStep::AwaitingCarType { category }, SlotValue::CarType(car_type)) => {
            Transition::Advance(FlowStep::AwaitingService {
                category: category.clone(),
                car_type: Some(car_type),
            })
        }
        (FlowStep::AwaitingService { category, car_type }, SlotValue::Service(service)) => {
            Transition::Advance(FlowStep::AwaitingDate {
                choice: ServiceChoice {
                    category: category.clone(),
                    car_type: *car_type,
                    service,
                },
            })
        }
        (FlowStep::AwaitingDate { choice }, SlotValue::Date(date)) => {
            Transition::Advance(FlowStep::AwaitingBudget {
                choice: choice.clone(),
                date,
            })
        }
        (FlowStep::AwaitingBudget { choice, date }, SlotValue::Amount(budget))
            if is_positive(budget) =>
        {
            Transition::Advance(FlowStep::AwaitingDescription {
                choice: choice.clone(),
                date: *date,
                budget,
            })
        }
        (
            FlowStep::AwaitingDescription {
                choice,
                date,
                budget,
            },
            SlotValue::Text(description),
        ) => Transition::Advance(FlowStep::AwaitingLocation {
            choice: choice.clone(),
            date: *date,
            budget: *budget,
            description,
        }),
        (
            FlowStep::AwaitingLocation {
                choice,
                date,
                budget,
                description,
            },
            SlotValue::Location(location),
        ) => Transition::Complete(FlowEffect::CreateRequest(BookingDraft {
            choice: choice.clone(),
            date: *date,
            budget: *budget,
            description: description.clone(),
            location,
        })),
        (FlowStep::AwaitingBidAmount { request_id }, SlotValue::Amount(amount))
            if is_positive(amount) =>
        {
            Transition::Complete(FlowEffect::PlaceBid {
                request_id: *request_id,
                amount,
            })
        }
        (FlowStep::AwaitingProviderChoice { .. }, SlotValue::Provider(provider)) => {
            Transition::Complete(FlowEffect::MessageProvider(provider))
        }
        (FlowStep::AwaitingCustomerSelection { .. }, SlotValue::Customer(customer)) => {
            Transition::Complete(FlowEffect::MessageCustomer(customer))
        }
        (FlowStep::AwaitingProfileValue { field }, SlotValue::Text(value))
            if !value.trim().is_empty() =>
        {
            Transition::Complete(FlowEffect::UpdateProfile {
                field: *field,
                value: value.trim().to_string(),
            })
        }
        _ => Transition::Reprompt,
    }
}

fn is_positive(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

/// Per-user dialogue progress kept between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub flow: FlowStep,
    pub updated_at: Timestamp,
}

impl ConversationState {
    pub fn new(flow: FlowStep, updated_at: Timestamp) -> Self {
        Self { flow, updated_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plumbing_choice() -> ServiceChoice {
        ServiceChoice {
            category: "Plumbing".to_string(),
            car_type: None,
            service: "Leak Detection & Repair".to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 20).unwrap()
    }

    fn advance(step: &FlowStep, slot: SlotValue) -> FlowStep {
        match transition(step, Some(slot)) {
            Transition::Advance(next) => next,
            other => panic!("expected advance from {}, got {:?}", step.name(), other),
        }
    }

    #[test]
    fn booking_skips_category_when_known() {
        assert_eq!(FlowStep::start_booking(None), FlowStep::AwaitingCategory);
        assert_eq!(
            FlowStep::start_booking(Some("Plumbing".to_string())).name(),
            "awaiting_service"
        );
        assert_eq!(
            FlowStep::start_booking(Some("Automotive".to_string())).name(),
            "awaiting_car_type"
        );
    }

    #[test]
    fn full_booking_walk() {
        let step = FlowStep::AwaitingCategory;
        let step = advance(&step, SlotValue::Category("Automotive".to_string()));
        assert_eq!(step.expects(), SlotKind::CarType);
        let step = advance(&step, SlotValue::CarType(CarType::Suv));
        let step = advance(&step, SlotValue::Service("Wiring Check".to_string()));
        let step = advance(&step, SlotValue::Date(date()));
        let step = advance(&step, SlotValue::Amount(150.0));
        let step = advance(&step, SlotValue::Text("noisy".to_string()));
        assert_eq!(step.name(), "awaiting_location");

        let location = GeoPoint::new(24.4539, 54.3773).unwrap();
        match transition(&step, Some(SlotValue::Location(location))) {
            Transition::Complete(FlowEffect::CreateRequest(draft)) => {
                assert_eq!(draft.choice.car_type, Some(CarType::Suv));
                assert_eq!(draft.choice.service, "Wiring Check");
                assert_eq!(draft.budget, 150.0);
                assert_eq!(draft.description, "noisy");
                assert_eq!(draft.location, location);
            }
            other => panic!("expected request creation, got {:?}", other),
        }
    }

    #[test]
    fn failed_extraction_reprompts() {
        let step = FlowStep::AwaitingBudget {
            choice: plumbing_choice(),
            date: date(),
        };
        assert_eq!(transition(&step, None), Transition::Reprompt);
        assert_eq!(transition(&step, Some(SlotValue::Amount(-5.0))), Transition::Reprompt);
        assert_eq!(transition(&step, Some(SlotValue::Amount(0.0))), Transition::Reprompt);
        assert_eq!(
            transition(&step, Some(SlotValue::Amount(f64::NAN))),
            Transition::Reprompt
        );
    }

    #[test]
    fn mismatched_slot_kind_reprompts() {
        let step = FlowStep::AwaitingDate {
            choice: plumbing_choice(),
        };
        assert_eq!(
            transition(&step, Some(SlotValue::Text("tomorrow".to_string()))),
            Transition::Reprompt
        );
    }

    #[test]
    fn bid_amount_completes() {
        let request_id = RequestId::new();
        let step = FlowStep::AwaitingBidAmount { request_id };
        assert_eq!(
            transition(&step, Some(SlotValue::Amount(180.0))),
            Transition::Complete(FlowEffect::PlaceBid {
                request_id,
                amount: 180.0
            })
        );
        assert_eq!(transition(&step, Some(SlotValue::Amount(-1.0))), Transition::Reprompt);
    }

    #[test]
    fn blank_profile_value_reprompts() {
        let step = FlowStep::AwaitingProfileValue {
            field: ProfileField::FirstName,
        };
        assert_eq!(
            transition(&step, Some(SlotValue::Text("   ".to_string()))),
            Transition::Reprompt
        );
        assert_eq!(
            transition(&step, Some(SlotValue::Text(" Mona ".to_string()))),
            Transition::Complete(FlowEffect::UpdateProfile {
                field: ProfileField::FirstName,
                value: "Mona".to_string()
            })
        );
        assert_eq!(step.name(), "awaiting_first_name");
    }

    #[test]
    fn state_serializes_with_step_tag() {
        let state = ConversationState::new(
            FlowStep::AwaitingBudget {
                choice: plumbing_choice(),
                date: date(),
            },
            Timestamp::now(),
        );
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["flow"]["step"], "awaiting_budget");
        assert_eq!(json["flow"]["date"], "2025-04-20");

        let back: ConversationState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
