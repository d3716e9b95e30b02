//! One-shot questions about a user's own history.
//!
//! Each query is keyed by an ordered phrase predicate; the first predicate
//! that holds for the lower-cased message wins. The aggregations here are pure
//! and operate on records already scoped to the caller.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::domain::marketplace::ServiceRequest;

/// Substring predicate over a lower-cased message.
#[derive(Debug, Clone, Copy)]
pub enum PhraseRule {
    /// Every word must occur.
    All(&'static [&'static str]),
    /// Any phrase may occur.
    Any(&'static [&'static str]),
}

impl PhraseRule {
    pub fn matches(&self, msg: &str) -> bool {
        match self {
            PhraseRule::All(words) => words.iter().all(|w| msg.contains(w)),
            PhraseRule::Any(phrases) => phrases.iter().any(|p| msg.contains(p)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerQuery {
    ProviderPhone,
    ProviderName,
    PastRequests,
    ServicesUsed,
    ServiceCategory,
    LastService,
    NextService,
    RequestStatus,
    LastReviewed,
    TotalSpent,
    LastPayment,
    PaymentStatus,
    ProviderRating,
    ProvidersWorkedWith,
    UnreadMessages,
    LastMessageSender,
    HighestBid,
    BidCount,
    PaidForAll,
    BookedThisMonth,
    LatestBudget,
    HighestBudget,
    AverageSpend,
    NotReviewed,
    MostFrequentService,
    AcceptedBids,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderQuery {
    CompletedJobs,
    TotalRevenue,
    AverageRating,
    NextJob,
    MostRequestedService,
    EarnedThisMonth,
    HighestEarning,
    MostFrequentCustomer,
    JobsThisWeek,
    ReviewsThisMonth,
    MessagesSent,
    LastFileShared,
}

const CUSTOMER_QUERIES: &[(PhraseRule, CustomerQuery)] = &[
    (PhraseRule::All(&["provider", "phone"]), CustomerQuery::ProviderPhone),
    (PhraseRule::All(&["provider", "name"]), CustomerQuery::ProviderName),
    (PhraseRule::All(&["past", "request"]), CustomerQuery::PastRequests),
    (PhraseRule::Any(&["services used", "what services"]), CustomerQuery::ServicesUsed),
    (PhraseRule::All(&["category", "service"]), CustomerQuery::ServiceCategory),
    (PhraseRule::Any(&["last service"]), CustomerQuery::LastService),
    (PhraseRule::Any(&["next service", "service date"]), CustomerQuery::NextService),
    (PhraseRule::All(&["status", "request"]), CustomerQuery::RequestStatus),
    (PhraseRule::All(&["review", "last"]), CustomerQuery::LastReviewed),
    (PhraseRule::All(&["how much", "spent"]), CustomerQuery::TotalSpent),
    (PhraseRule::Any(&["last payment"]), CustomerQuery::LastPayment),
    (PhraseRule::Any(&["payment status"]), CustomerQuery::PaymentStatus),
    (PhraseRule::All(&["provider", "rating"]), CustomerQuery::ProviderRating),
    (PhraseRule::All(&["providers", "worked"]), CustomerQuery::ProvidersWorkedWith),
    (PhraseRule::Any(&["unread messages"]), CustomerQuery::UnreadMessages),
    (PhraseRule::All(&["last message", "who"]), CustomerQuery::LastMessageSender),
    (PhraseRule::Any(&["highest bid"]), CustomerQuery::HighestBid),
    (PhraseRule::Any(&["how many bids", "number of bids"]), CustomerQuery::BidCount),
    (PhraseRule::Any(&["paid for all"]), CustomerQuery::PaidForAll),
    (PhraseRule::All(&["booked", "month"]), CustomerQuery::BookedThisMonth),
    (PhraseRule::All(&["budget", "latest"]), CustomerQuery::LatestBudget),
    (PhraseRule::All(&["highest", "budget"]), CustomerQuery::HighestBudget),
    (PhraseRule::All(&["average", "spend"]), CustomerQuery::AverageSpend),
    (PhraseRule::Any(&["not reviewed", "haven't reviewed"]), CustomerQuery::NotReviewed),
    (PhraseRule::Any(&["most frequent", "most used"]), CustomerQuery::MostFrequentService),
    (PhraseRule::Any(&["accepted bids"]), CustomerQuery::AcceptedBids),
];

const PROVIDER_QUERIES: &[(PhraseRule, ProviderQuery)] = &[
    (PhraseRule::All(&["how many", "jobs"]), ProviderQuery::CompletedJobs),
    (PhraseRule::Any(&["total revenue"]), ProviderQuery::TotalRevenue),
    (PhraseRule::Any(&["average rating"]), ProviderQuery::AverageRating),
    (PhraseRule::Any(&["next job", "assigned job"]), ProviderQuery::NextJob),
    (
        PhraseRule::Any(&["most requested", "most frequent service"]),
        ProviderQuery::MostRequestedService,
    ),
    (
        PhraseRule::Any(&["earned this month", "revenue this month"]),
        ProviderQuery::EarnedThisMonth,
    ),
    (PhraseRule::Any(&["highest earning"]), ProviderQuery::HighestEarning),
    (PhraseRule::Any(&["most frequent customer"]), ProviderQuery::MostFrequentCustomer),
    (PhraseRule::All(&["jobs", "this week"]), ProviderQuery::JobsThisWeek),
    (PhraseRule::All(&["reviews", "this month"]), ProviderQuery::ReviewsThisMonth),
    (PhraseRule::Any(&["messages sent"]), ProviderQuery::MessagesSent),
    (PhraseRule::Any(&["last file", "last shared"]), ProviderQuery::LastFileShared),
];

pub fn match_customer_query(message: &str) -> Option<CustomerQuery> {
    let msg = message.trim().to_lowercase();
    CUSTOMER_QUERIES
        .iter()
        .find(|(rule, _)| rule.matches(&msg))
        .map(|(_, query)| *query)
}

pub fn match_provider_query(message: &str) -> Option<ProviderQuery> {
    let msg = message.trim().to_lowercase();
    PROVIDER_QUERIES
        .iter()
        .find(|(rule, _)| rule.matches(&msg))
        .map(|(_, query)| *query)
}

// ════════════════════════════════════════════════════════════════════════════
// Aggregations
// ════════════════════════════════════════════════════════════════════════════

/// Sum of agreed prices over paid requests.
pub fn total_paid(requests: &[ServiceRequest]) -> f64 {
    requests
        .iter()
        .filter(|r| r.paid)
        .map(|r| r.price.unwrap_or(0.0))
        .sum()
}

/// Mean agreed price over paid requests, zero when nothing is paid.
pub fn average_paid(requests: &[ServiceRequest]) -> f64 {
    let paid = requests.iter().filter(|r| r.paid).count();
    if paid == 0 {
        0.0
    } else {
        total_paid(requests) / paid as f64
    }
}

/// Most frequent key with its count. Ties go to the key seen first.
pub fn most_frequent<K, I>(keys: I) -> Option<(K, usize)>
where
    K: Eq + std::hash::Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut order: Vec<K> = Vec::new();
    let mut counts: HashMap<K, usize> = HashMap::new();
    for key in keys {
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }
    let mut best: Option<(K, usize)> = None;
    for key in order {
        let count = counts[&key];
        if best.as_ref().map_or(true, |(_, top)| count > *top) {
            best = Some((key, count));
        }
    }
    best
}

/// Distinct values in first-seen order.
pub fn distinct<T: PartialEq + Clone>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// First and last day of the month containing `today`.
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let (year, month) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(today);
    (start, end)
}

/// Latest request by `key`; ties keep the earliest in slice order.
pub fn latest_by<K: Ord>(
    requests: &[ServiceRequest],
    key: impl Fn(&ServiceRequest) -> K,
) -> Option<&ServiceRequest> {
    requests.iter().fold(None, |best, r| match best {
        Some(b) if key(b) >= key(r) => Some(b),
        _ => Some(r),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CustomerId, RequestId, Timestamp};
    use crate::domain::marketplace::{RequestDetails, RequestState};

    fn request(service: &str, price: Option<f64>, paid: bool, day: u32) -> ServiceRequest {
        ServiceRequest {
            id: RequestId::new(),
            customer_id: CustomerId::new(),
            provider_id: None,
            category: "Plumbing".to_string(),
            service: service.to_string(),
            description: String::new(),
            budget: 100.0,
            price,
            date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            location: None,
            state: RequestState::InProgress,
            paid,
            review_id: None,
            details: RequestDetails::for_category("Plumbing", None, service),
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn customer_queries_first_match_wins() {
        assert_eq!(
            match_customer_query("What is my provider's phone number?"),
            Some(CustomerQuery::ProviderPhone)
        );
        // contains both "provider"+"name" and "providers"+"worked"; table order decides
        assert_eq!(
            match_customer_query("name the providers I worked with"),
            Some(CustomerQuery::ProviderName)
        );
        assert_eq!(
            match_customer_query("how much have I spent so far"),
            Some(CustomerQuery::TotalSpent)
        );
        assert_eq!(match_customer_query("create request"), None);
    }

    #[test]
    fn provider_queries() {
        assert_eq!(
            match_provider_query("How many jobs have I done?"),
            Some(ProviderQuery::CompletedJobs)
        );
        assert_eq!(
            match_provider_query("any jobs this week?"),
            Some(ProviderQuery::JobsThisWeek)
        );
        assert_eq!(match_provider_query("submit a bid"), None);
    }

    #[test]
    fn money_aggregations() {
        let requests = vec![
            request("Drain Cleaning", Some(100.0), true, 1),
            request("Drain Cleaning", Some(50.0), true, 2),
            request("Toilet Repair", Some(400.0), false, 3),
            request("Toilet Repair", None, true, 4),
        ];
        assert_eq!(total_paid(&requests), 150.0);
        assert_eq!(average_paid(&requests), 50.0);
        assert_eq!(average_paid(&[]), 0.0);
    }

    #[test]
    fn most_frequent_breaks_ties_by_first_seen() {
        assert_eq!(most_frequent(vec!["a", "b", "b", "a"]), Some(("a", 2)));
        assert_eq!(most_frequent(vec!["a", "b", "b"]), Some(("b", 2)));
        assert_eq!(most_frequent(Vec::<&str>::new()), None);
    }

    #[test]
    fn month_bounds_handle_december_and_leap_years() {
        let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(month_bounds(d(2025, 12, 15)), (d(2025, 12, 1), d(2025, 12, 31)));
        assert_eq!(month_bounds(d(2024, 2, 10)), (d(2024, 2, 1), d(2024, 2, 29)));
    }

    #[test]
    fn latest_by_date() {
        let requests = vec![
            request("Drain Cleaning", None, false, 5),
            request("Toilet Repair", None, false, 9),
            request("Pipe Rerouting", None, false, 9),
        ];
        let latest = latest_by(&requests, |r| r.date).unwrap();
        assert_eq!(latest.service, "Toilet Repair");
        assert!(latest_by(&[], |r: &ServiceRequest| r.date).is_none());
    }

    #[test]
    fn distinct_keeps_order() {
        assert_eq!(distinct(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
