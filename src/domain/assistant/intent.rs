//! Intents the assistant recognises and the phrase rules that trigger them.
//!
//! Rules run over the lower-cased, trimmed message and are checked in table
//! order before the language model is consulted. Each rule is scoped to the
//! roles allowed to perform the action.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::marketplace::Role;

/// Customer profile fields editable through chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    FullName,
    FirstName,
    LastName,
    Location,
}

impl ProfileField {
    pub fn step_name(&self) -> &'static str {
        match self {
            ProfileField::FullName => "awaiting_full_name",
            ProfileField::FirstName => "awaiting_first_name",
            ProfileField::LastName => "awaiting_last_name",
            ProfileField::Location => "awaiting_location",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    CreateRequest,
    SubmitBid,
    MessageProvider,
    MessageCustomer,
    UpdateProfile(ProfileField),
    MarkDone,
    MarkMessagesSeen,
    CompletePayment,
    CancelRequest,
    DeleteReview,
    ViewRequests,
    ProviderInfo,
}

impl Intent {
    pub fn allowed_for(&self, role: Role) -> bool {
        match self {
            Intent::CreateRequest
            | Intent::MessageProvider
            | Intent::UpdateProfile(_)
            | Intent::CompletePayment
            | Intent::CancelRequest
            | Intent::DeleteReview
            | Intent::ViewRequests
            | Intent::ProviderInfo => role == Role::Customer,
            Intent::SubmitBid | Intent::MessageCustomer | Intent::MarkDone => {
                role == Role::Provider
            }
            Intent::MarkMessagesSeen => true,
        }
    }

    /// True for intents that open a multi-turn flow.
    pub fn starts_flow(&self) -> bool {
        matches!(
            self,
            Intent::CreateRequest
                | Intent::SubmitBid
                | Intent::MessageProvider
                | Intent::MessageCustomer
                | Intent::UpdateProfile(_)
        )
    }
}

const CREATE_REQUEST: &[&str] = &["create request", "new request", "book a service"];
const SUBMIT_BID: &[&str] = &["submit a bid", "place a bid", "make a bid", "submit bid", "place bid"];
const MARK_DONE: &[&str] = &[
    "mark done",
    "complete the job",
    "job is finished",
    "finished the service",
];
const MARK_SEEN: &[&str] = &[
    "mark message seen",
    "mark messages as seen",
    "mark all message seen",
    "mark all messages as seen",
    "mark messages seen",
    "read my messages",
    "seen all messages",
    "clear unread messages",
    "mark as read",
    "mark seen",
];
const COMPLETE_PAYMENT: &[&str] = &[
    "complete payment",
    "mark payment done",
    "finish payment",
    "confirm payment",
];
const CANCEL_REQUEST: &[&str] = &[
    "cancel request",
    "delete my request",
    "remove latest request",
    "cancel the job",
];
const DELETE_REVIEW: &[&str] = &[
    "delete review",
    "remove my review",
    "undo review",
    "erase review",
];
const MESSAGE_CUSTOMER: &[&str] = &[
    "send message to customer",
    "message my customer",
    "chat with customer",
    "talk to customer",
];
const MESSAGE_PROVIDER: &[&str] = &[
    "send message to provider",
    "message my provider",
    "chat with provider",
    "send message",
    "talk to provider",
];
const UPDATE_FULL_NAME: &[&str] = &["change my name", "update my name", "edit my name"];
const UPDATE_FIRST_NAME: &[&str] = &[
    "change my first name",
    "update first name",
    "update my first name",
    "edit my first name",
];
const UPDATE_LAST_NAME: &[&str] = &[
    "change my last name",
    "update last name",
    "update my last name",
    "edit my last name",
];
const UPDATE_LOCATION: &[&str] = &[
    "change my location",
    "update my location",
    "edit my location",
];

/// Phrase table in precedence order.
const RULES: &[(Intent, &[&str])] = &[
    (Intent::CreateRequest, CREATE_REQUEST),
    (Intent::SubmitBid, SUBMIT_BID),
    (Intent::MarkDone, MARK_DONE),
    (Intent::MarkMessagesSeen, MARK_SEEN),
    (Intent::CompletePayment, COMPLETE_PAYMENT),
    (Intent::CancelRequest, CANCEL_REQUEST),
    (Intent::DeleteReview, DELETE_REVIEW),
    (Intent::MessageCustomer, MESSAGE_CUSTOMER),
    (Intent::MessageProvider, MESSAGE_PROVIDER),
    (Intent::UpdateProfile(ProfileField::FullName), UPDATE_FULL_NAME),
    (Intent::UpdateProfile(ProfileField::FirstName), UPDATE_FIRST_NAME),
    (Intent::UpdateProfile(ProfileField::LastName), UPDATE_LAST_NAME),
    (Intent::UpdateProfile(ProfileField::Location), UPDATE_LOCATION),
];

/// First rule whose phrase occurs in `message` and whose intent `role` may use.
pub fn match_rule(message: &str, role: Role) -> Option<Intent> {
    let msg = message.trim().to_lowercase();
    RULES
        .iter()
        .filter(|(intent, _)| intent.allowed_for(role))
        .find(|(_, phrases)| phrases.iter().any(|p| msg.contains(p)))
        .map(|(intent, _)| *intent)
}

/// Labels the language model may answer with when classifying a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentLabel {
    CreateRequest,
    ViewRequests,
    AskProviderInfo,
    UpdateName,
    SendMessage,
    CancelRequest,
    CompletePayment,
    SubmitBid,
    MarkDone,
    AskGeneralQuestion,
}

impl IntentLabel {
    pub const ALL: [IntentLabel; 10] = [
        IntentLabel::CreateRequest,
        IntentLabel::ViewRequests,
        IntentLabel::AskProviderInfo,
        IntentLabel::UpdateName,
        IntentLabel::SendMessage,
        IntentLabel::CancelRequest,
        IntentLabel::CompletePayment,
        IntentLabel::SubmitBid,
        IntentLabel::MarkDone,
        IntentLabel::AskGeneralQuestion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::CreateRequest => "create_request",
            IntentLabel::ViewRequests => "view_requests",
            IntentLabel::AskProviderInfo => "ask_provider_info",
            IntentLabel::UpdateName => "update_name",
            IntentLabel::SendMessage => "send_message",
            IntentLabel::CancelRequest => "cancel_request",
            IntentLabel::CompletePayment => "complete_payment",
            IntentLabel::SubmitBid => "submit_bid",
            IntentLabel::MarkDone => "mark_done",
            IntentLabel::AskGeneralQuestion => "ask_general_question",
        }
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|l| l.as_str().to_string()).collect()
    }

    /// Case-insensitive exact match after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(raw))
    }

    /// The action this label asks for on behalf of `role`, if it is one the
    /// role may perform. General questions map to nothing.
    pub fn to_intent(&self, role: Role) -> Option<Intent> {
        let intent = match self {
            IntentLabel::CreateRequest => Intent::CreateRequest,
            IntentLabel::ViewRequests => Intent::ViewRequests,
            IntentLabel::AskProviderInfo => Intent::ProviderInfo,
            IntentLabel::UpdateName => Intent::UpdateProfile(ProfileField::FullName),
            IntentLabel::SendMessage => match role {
                Role::Customer => Intent::MessageProvider,
                Role::Provider => Intent::MessageCustomer,
            },
            IntentLabel::CancelRequest => Intent::CancelRequest,
            IntentLabel::CompletePayment => Intent::CompletePayment,
            IntentLabel::SubmitBid => Intent::SubmitBid,
            IntentLabel::MarkDone => Intent::MarkDone,
            IntentLabel::AskGeneralQuestion => return None,
        };
        intent.allowed_for(role).then_some(intent)
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_phrases() {
        for msg in ["Create request for plumbing", "I want a NEW REQUEST", "book a service please"] {
            assert_eq!(match_rule(msg, Role::Customer), Some(Intent::CreateRequest));
        }
    }

    #[test]
    fn rules_respect_role() {
        assert_eq!(match_rule("create request", Role::Provider), None);
        assert_eq!(match_rule("mark done", Role::Customer), None);
        assert_eq!(match_rule("mark done", Role::Provider), Some(Intent::MarkDone));
        assert_eq!(
            match_rule("please mark as read", Role::Customer),
            Some(Intent::MarkMessagesSeen)
        );
        assert_eq!(
            match_rule("please mark as read", Role::Provider),
            Some(Intent::MarkMessagesSeen)
        );
    }

    #[test]
    fn messaging_direction_follows_role() {
        assert_eq!(
            match_rule("send message to customer", Role::Provider),
            Some(Intent::MessageCustomer)
        );
        assert_eq!(
            match_rule("send message", Role::Customer),
            Some(Intent::MessageProvider)
        );
        assert_eq!(match_rule("send message", Role::Provider), None);
    }

    #[test]
    fn profile_phrases_pick_the_right_field() {
        assert_eq!(
            match_rule("change my first name", Role::Customer),
            Some(Intent::UpdateProfile(ProfileField::FirstName))
        );
        assert_eq!(
            match_rule("update my name", Role::Customer),
            Some(Intent::UpdateProfile(ProfileField::FullName))
        );
        assert_eq!(
            match_rule("edit my location", Role::Customer),
            Some(Intent::UpdateProfile(ProfileField::Location))
        );
    }

    #[test]
    fn plain_questions_match_nothing() {
        assert_eq!(match_rule("how does bidding work?", Role::Customer), None);
    }

    #[test]
    fn labels_parse_exactly() {
        assert_eq!(IntentLabel::parse(" Create_Request \n"), Some(IntentLabel::CreateRequest));
        assert_eq!(IntentLabel::parse("create request"), None);
        assert_eq!(IntentLabel::parse("The intent is create_request"), None);
        assert_eq!(IntentLabel::labels().len(), 10);
    }

    #[test]
    fn labels_map_to_role_intents() {
        assert_eq!(
            IntentLabel::SendMessage.to_intent(Role::Provider),
            Some(Intent::MessageCustomer)
        );
        assert_eq!(IntentLabel::SubmitBid.to_intent(Role::Customer), None);
        assert_eq!(IntentLabel::AskGeneralQuestion.to_intent(Role::Customer), None);
        assert_eq!(
            IntentLabel::UpdateName.to_intent(Role::Customer),
            Some(Intent::UpdateProfile(ProfileField::FullName))
        );
    }
}
