//! Reply text shown to users.
//!
//! Some replies come in equivalent variants; a [`VariantPicker`] decides which
//! one is used so tests can pin the wording.

use chrono::NaiveDate;
use rand::Rng;
use std::sync::Arc;

use super::flow::{CustomerCandidate, ProviderCandidate};
use super::intent::ProfileField;
use crate::domain::marketplace::{CarType, Customer, GeoPoint, ServiceRequest};

/// Shown when the model returns nothing usable for a general question.
pub const FALLBACK_REPLY: &str = "I wasn't able to process that.";

pub trait VariantPicker: Send + Sync {
    /// Index in `0..len`; `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniformly random choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl VariantPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        if len <= 1 {
            0
        } else {
            rand::rng().random_range(0..len)
        }
    }
}

/// Always the first variant.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPicker;

impl VariantPicker for FirstPicker {
    fn pick(&self, _len: usize) -> usize {
        0
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `AED 200` or `AED 150.5`.
pub fn format_amount(amount: f64) -> String {
    format!("AED {}", amount)
}

/// Two decimals, for totals and averages.
pub fn format_total(amount: f64) -> String {
    format!("AED {:.2}", amount)
}

fn bullets<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("• {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

#[derive(Clone)]
pub struct ReplyFormatter {
    picker: Arc<dyn VariantPicker>,
}

impl ReplyFormatter {
    pub fn new(picker: Arc<dyn VariantPicker>) -> Self {
        Self { picker }
    }

    pub fn random() -> Self {
        Self::new(Arc::new(RandomPicker))
    }

    pub fn fixed() -> Self {
        Self::new(Arc::new(FirstPicker))
    }

    pub fn choose(&self, variants: Vec<String>) -> String {
        if variants.is_empty() {
            return String::new();
        }
        let index = self.picker.pick(variants.len()).min(variants.len() - 1);
        variants.into_iter().nth(index).unwrap_or_default()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Booking
    // ════════════════════════════════════════════════════════════════════════

    pub fn category_prompt(&self, categories: &[String]) -> String {
        format!(
            "Great! Let's get started. Please choose a category:\n\n{}",
            bullets(categories)
        )
    }

    pub fn category_reprompt(&self, categories: &[String]) -> String {
        format!(
            "Sorry, I couldn't detect the category. Please choose one:\n\n{}",
            bullets(categories)
        )
    }

    pub fn car_type_prompt(&self) -> String {
        format!(
            "🚗 What kind of car do you have?\n\n{}",
            bullets(&CarType::labels())
        )
    }

    pub fn car_type_reprompt(&self) -> String {
        format!(
            "Hmm, I didn't quite get your car type. Can you rephrase or choose one of these?\n\n{}",
            bullets(&CarType::labels())
        )
    }

    pub fn service_prompt(
        &self,
        category: &str,
        car_type: Option<CarType>,
        services: &[String],
    ) -> String {
        match car_type {
            Some(car) => format!(
                "Got it! A {}. Now, what service do you need?\n\n{}",
                car,
                bullets(services)
            ),
            None => format!(
                "Perfect! Please select a service under \"{}\":\n\n{}",
                category,
                bullets(services)
            ),
        }
    }

    pub fn service_reprompt(&self, category: &str, services: &[String]) -> String {
        format!(
            "Hmm, I couldn't find a match in \"{}\". Can you pick one of these?\n\n{}",
            category,
            bullets(services)
        )
    }

    pub fn date_prompt(&self, service: &str) -> String {
        format!(
            "Awesome! When would you like the \"{}\" service? (e.g., 2025-04-20)",
            service
        )
    }

    pub fn date_reprompt(&self) -> String {
        "I couldn't understand the date. Please enter a valid future date (e.g., 2025-04-20)."
            .to_string()
    }

    pub fn budget_prompt(&self) -> String {
        "Got it! What's your budget for this service? (in AED)".to_string()
    }

    pub fn budget_reprompt(&self) -> String {
        "I couldn't understand your budget. Please enter a valid amount in AED (e.g., 150)."
            .to_string()
    }

    pub fn description_prompt(&self) -> String {
        "Almost done! Please add a short note or description for the provider.".to_string()
    }

    pub fn location_prompt(&self) -> String {
        "📍 Almost there! Please share your location coordinates so the provider can reach you.\n\n\
         Format:\nlatitude, longitude\n\nExample: 24.4539, 54.3773"
            .to_string()
    }

    pub fn location_reprompt(&self) -> String {
        "❌ Invalid location. Please enter it as:\n24.4539, 54.3773".to_string()
    }

    pub fn request_created(&self, request: &ServiceRequest, location: GeoPoint) -> String {
        format!(
            "✅ Your request for \"{}\" on {} has been created with location: {}.",
            request.service,
            format_date(request.date),
            location
        )
    }

    // ════════════════════════════════════════════════════════════════════════
    // Bidding
    // ════════════════════════════════════════════════════════════════════════

    pub fn no_open_requests(&self) -> String {
        "🚫 No service requests are currently open for bidding. Please check again later."
            .to_string()
    }

    pub fn bid_prompt(&self, request: &ServiceRequest) -> String {
        let note = if request.description.trim().is_empty() {
            "No note provided."
        } else {
            request.description.as_str()
        };
        format!(
            "📝 Request Details:\n• Service: {}\n• Date: {}\n• Customer Budget: {}\n• Note: {}\n\n\
             💰 Please enter the amount you'd like to bid (in AED).",
            request.service,
            format_date(request.date),
            format_amount(request.budget),
            note
        )
    }

    pub fn bid_reprompt(&self) -> String {
        "❌ Please enter a valid bid amount in AED.".to_string()
    }

    pub fn request_unavailable(&self) -> String {
        "🚫 That request is no longer available.".to_string()
    }

    pub fn bid_placed(&self, amount: f64, request: &ServiceRequest) -> String {
        let amount = format_amount(amount);
        self.choose(vec![
            format!(
                "📨 Your {} bid on \"{}\" (for {}) is in! Let's hope they pick you 🔧",
                amount,
                request.service,
                format_date(request.date)
            ),
            format!("🚀 Bid placed: {} for {}. Fingers crossed!", amount, request.service),
            format!(
                "✅ Nice! You've submitted a bid of {}. We'll let you know if it's accepted.",
                amount
            ),
        ])
    }

    // ════════════════════════════════════════════════════════════════════════
    // Messaging
    // ════════════════════════════════════════════════════════════════════════

    pub fn no_providers_to_message(&self) -> String {
        "You have no assigned providers to message.".to_string()
    }

    pub fn provider_choice_prompt(&self, candidates: &[ProviderCandidate]) -> String {
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        format!("Who would you like to message?\n\n{}", bullets(&names))
    }

    pub fn provider_choice_reprompt(&self, candidates: &[ProviderCandidate]) -> String {
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        format!(
            "Couldn't find that provider. Please choose from:\n\n{}",
            bullets(&names)
        )
    }

    pub fn message_sent_to_provider(&self, name: &str) -> String {
        format!("Message sent to {} ✅.", name)
    }

    pub fn no_customers_to_message(&self) -> String {
        "❌ No customers found to message.".to_string()
    }

    fn customer_options(candidates: &[CustomerCandidate]) -> String {
        let options: Vec<String> = candidates
            .iter()
            .map(|c| format!("{} - {}", c.name, c.services.join(", ")))
            .collect();
        bullets(&options)
    }

    pub fn customer_choice_prompt(&self, candidates: &[CustomerCandidate]) -> String {
        format!(
            "📨 Please choose a customer to message:\n\n{}",
            Self::customer_options(candidates)
        )
    }

    pub fn customer_choice_reprompt(&self, candidates: &[CustomerCandidate]) -> String {
        format!(
            "❌ Couldn't match that input. Please reply with a valid customer name or service:\n\n{}",
            Self::customer_options(candidates)
        )
    }

    pub fn message_sent_to_customer(&self, name: &str) -> String {
        format!("✅ Message sent to {} successfully.", name)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Profile
    // ════════════════════════════════════════════════════════════════════════

    pub fn profile_prompt(&self, field: ProfileField) -> String {
        match field {
            ProfileField::FullName => "Sure! What's your new first and last name?",
            ProfileField::FirstName => "What would you like your first name to be?",
            ProfileField::LastName => "Alright, what's your new last name?",
            ProfileField::Location => "Where should I update your location to?",
        }
        .to_string()
    }

    pub fn profile_reprompt(&self, field: ProfileField) -> String {
        format!("That looks empty. {}", self.profile_prompt(field))
    }

    pub fn profile_updated(&self, field: ProfileField, customer: &Customer) -> String {
        match field {
            ProfileField::FullName => format!("Name updated to {}", customer.full_name()),
            ProfileField::FirstName => format!("First name updated to {}", customer.first_name),
            ProfileField::LastName => format!("Last name updated to {}", customer.last_name),
            ProfileField::Location => format!(
                "Location updated to {}",
                customer.location.as_deref().unwrap_or_default()
            ),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // One-shot actions
    // ════════════════════════════════════════════════════════════════════════

    pub fn nothing_to_mark_done(&self) -> String {
        "No in-progress jobs to mark as done.".to_string()
    }

    pub fn marked_done(&self, service: &str) -> String {
        format!("Marked request for {} as done ✅.", service)
    }

    pub fn messages_already_seen(&self) -> String {
        "✅ All your messages are already marked as seen.".to_string()
    }

    pub fn messages_marked_seen(&self, count: u64) -> String {
        format!("✅ Marked {} as seen.", plural(count as usize, "message"))
    }

    pub fn no_transaction(&self) -> String {
        "No transaction found.".to_string()
    }

    pub fn payment_completed(&self, amount: f64) -> String {
        let amount = format_amount(amount);
        self.choose(vec![
            format!("✅ Payment of {} confirmed. Thanks for using ServiBid!", amount),
            format!("💳 Got it! {} payment marked as done.", amount),
            format!("🎉 Payment completed. {} is all set!", amount),
        ])
    }

    pub fn nothing_to_cancel(&self) -> String {
        "No request to cancel.".to_string()
    }

    pub fn request_cancelled(&self, service: &str) -> String {
        format!("Canceled your latest request for {}.", service)
    }

    pub fn no_review_to_delete(&self) -> String {
        "No review to delete.".to_string()
    }

    pub fn review_deleted(&self) -> String {
        "Deleted your latest review.".to_string()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Analytics
    // ════════════════════════════════════════════════════════════════════════

    pub fn completed_jobs(&self, count: usize) -> String {
        let jobs = plural(count, "job");
        self.choose(vec![
            format!("🎉 Nice! You've completed {} so far.", jobs),
            format!("💼 That's {} in the bag. Keep it up!", jobs),
            format!("👏 Impressive: {} completed and counting!", count),
        ])
    }

    pub fn total_revenue(&self, total: f64) -> String {
        let total = format_total(total);
        self.choose(vec![
            format!("💰 You've earned a total of {}. Great job!", total),
            format!("🔥 {} in revenue! Keep the momentum going.", total),
            format!("💸 That's {} you've made. Hustle pays off!", total),
        ])
    }

    pub fn service_list(&self, heading: &str, lines: &[String]) -> String {
        format!("{}\n{}", heading, bullets(lines))
    }
}

impl std::fmt::Debug for ReplyFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyFormatter").finish_non_exhaustive()
    }
}
