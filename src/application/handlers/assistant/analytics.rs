//! Answers one-shot questions about the caller's own history.
//!
//! Every query reads only records owned by, assigned to, or addressed to the
//! resolved identity.

use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::debug;

use super::deps::{AssistantDeps, MarketplacePorts};
use super::error::AssistantError;
use crate::domain::assistant::analytics::{
    average_paid, distinct, latest_by, match_customer_query, match_provider_query,
    month_bounds, most_frequent, total_paid, CustomerQuery, ProviderQuery,
};
use crate::domain::assistant::replies::{format_amount, format_date, format_total};
use crate::domain::assistant::ReplyFormatter;
use crate::domain::foundation::{CustomerId, DomainError, ParticipantId, ProviderId, Timestamp};
use crate::domain::marketplace::{
    Customer, Identity, Provider, RequestState, ServiceRequest,
};
use crate::ports::Clock;

const NO_PROVIDER: &str = "No provider assigned yet.";
const NO_REQUEST: &str = "No request found.";
const NO_HISTORY: &str = "No service history found.";

pub struct AnalyticsResponder {
    marketplace: MarketplacePorts,
    clock: Arc<dyn Clock>,
    replies: ReplyFormatter,
}

impl AnalyticsResponder {
    pub fn new(deps: &AssistantDeps) -> Self {
        Self {
            marketplace: deps.marketplace.clone(),
            clock: deps.clock.clone(),
            replies: deps.replies.clone(),
        }
    }

    /// The answer when `message` matches a query for the caller's role.
    pub async fn answer(
        &self,
        identity: &Identity,
        message: &str,
    ) -> Result<Option<String>, AssistantError> {
        let reply = match identity {
            Identity::Customer(customer) => match match_customer_query(message) {
                Some(query) => {
                    debug!(?query, "customer analytics query");
                    self.customer_answer(customer, query).await?
                }
                None => return Ok(None),
            },
            Identity::Provider(provider) => match match_provider_query(message) {
                Some(query) => {
                    debug!(?query, "provider analytics query");
                    self.provider_answer(provider, query).await?
                }
                None => return Ok(None),
            },
        };
        Ok(Some(reply))
    }

    /// Every request of the customer with its date and state.
    pub async fn view_requests(&self, customer: &Customer) -> Result<String, AssistantError> {
        let requests = self.customer_requests(customer).await?;
        if requests.is_empty() {
            return Ok("You don't have any requests yet.".to_string());
        }
        let lines: Vec<String> = requests
            .iter()
            .map(|r| format!("{} on {} ({})", r.service, format_date(r.date), r.state))
            .collect();
        Ok(self.replies.service_list("Here are your requests:", &lines))
    }

    /// Name and phone of the provider on the customer's latest assigned request.
    pub async fn provider_info(&self, customer: &Customer) -> Result<String, AssistantError> {
        let requests = self.customer_requests(customer).await?;
        Ok(match self.assigned_provider(&requests).await? {
            Some(provider) => format!(
                "Your provider is {}, phone {}.",
                provider.name,
                provider.phone.as_deref().unwrap_or("not available")
            ),
            None => NO_PROVIDER.to_string(),
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // Customer queries
    // ════════════════════════════════════════════════════════════════════════

    async fn customer_answer(
        &self,
        customer: &Customer,
        query: CustomerQuery,
    ) -> Result<String, AssistantError> {
        let today = self.clock.today();
        let participant = ParticipantId::from(customer.id);
        let requests = self.customer_requests(customer).await?;
        let latest_dated = latest_by(&requests, |r| r.date);
        let latest_created = latest_by(&requests, |r| r.created_at);

        let reply = match query {
            CustomerQuery::ProviderPhone => match self.assigned_provider(&requests).await? {
                Some(provider) => format!(
                    "Your provider's phone number is {}.",
                    provider.phone.as_deref().unwrap_or("not available")
                ),
                None => NO_PROVIDER.to_string(),
            },
            CustomerQuery::ProviderName => match self.assigned_provider(&requests).await? {
                Some(provider) => format!("Your provider's name is {}.", provider.name),
                None => NO_PROVIDER.to_string(),
            },
            CustomerQuery::PastRequests => {
                let past: Vec<String> = requests
                    .iter()
                    .filter(|r| r.date < today)
                    .map(|r| format!("{} on {}", r.service, format_date(r.date)))
                    .collect();
                if past.is_empty() {
                    "No past requests found.".to_string()
                } else {
                    self.replies.service_list("Here are your past services:", &past)
                }
            }
            CustomerQuery::ServicesUsed => {
                let services = distinct(requests.iter().map(|r| r.service.clone()));
                if services.is_empty() {
                    "You haven't used any services yet.".to_string()
                } else {
                    format!("You've used: {}", services.join(", "))
                }
            }
            CustomerQuery::ServiceCategory => match latest_dated {
                Some(r) => format!("{} falls under the \"{}\" category.", r.service, r.category),
                None => "No service found.".to_string(),
            },
            CustomerQuery::LastService => match latest_dated {
                Some(r) => format!(
                    "Your last service was {} on {}.",
                    r.service,
                    format_date(r.date)
                ),
                None => NO_HISTORY.to_string(),
            },
            CustomerQuery::NextService => match next_on_or_after(&requests, today) {
                Some(r) => format!(
                    "Your next service is {} on {}.",
                    r.service,
                    format_date(r.date)
                ),
                None => "You have no upcoming services.".to_string(),
            },
            CustomerQuery::RequestStatus => match latest_created {
                Some(r) => format!("Your latest request is currently \"{}\".", r.state),
                None => NO_REQUEST.to_string(),
            },
            CustomerQuery::LastReviewed => match latest_dated {
                Some(r) if r.review_id.is_some() => "You left a review.".to_string(),
                Some(_) => "You haven't left a review yet.".to_string(),
                None => NO_HISTORY.to_string(),
            },
            CustomerQuery::TotalSpent => format!(
                "You've spent a total of {}.",
                format_total(total_paid(&requests))
            ),
            CustomerQuery::LastPayment => match latest_dated {
                Some(r) if r.paid => "Yes ✅".to_string(),
                Some(_) => "Not yet ❌".to_string(),
                None => NO_HISTORY.to_string(),
            },
            CustomerQuery::PaymentStatus => match latest_created {
                Some(r) if r.paid => "Paid ✅".to_string(),
                Some(_) => "Unpaid ❌".to_string(),
                None => NO_REQUEST.to_string(),
            },
            CustomerQuery::ProviderRating => match self.assigned_provider(&requests).await? {
                Some(provider) => match provider.rating {
                    Some(rating) => format!("Their rating is {}/5.", rating),
                    None => "Their rating is unavailable.".to_string(),
                },
                None => NO_PROVIDER.to_string(),
            },
            CustomerQuery::ProvidersWorkedWith => {
                let mut names = Vec::new();
                for id in distinct(requests.iter().filter_map(|r| r.provider_id)) {
                    if let Some(provider) = self.marketplace.accounts.find_provider(&id).await? {
                        names.push(provider.name);
                    }
                }
                if names.is_empty() {
                    "You haven't worked with any providers yet.".to_string()
                } else {
                    format!("You've worked with: {}", names.join(", "))
                }
            }
            CustomerQuery::UnreadMessages => {
                let unread = self.marketplace.messaging.count_unseen(&participant).await?;
                format!("You have {} unread message(s).", unread)
            }
            CustomerQuery::LastMessageSender => {
                let name = match self.marketplace.messaging.latest_received(&participant).await? {
                    Some(message) => self.participant_name(&message.sender_id).await?,
                    None => None,
                };
                format!("Last message was from {}.", name.as_deref().unwrap_or("Unknown"))
            }
            CustomerQuery::HighestBid => match latest_created {
                Some(request) => {
                    let bids = self.marketplace.bids.list_for_request(&request.id).await?;
                    match bids.iter().max_by(|a, b| a.price.total_cmp(&b.price)) {
                        Some(bid) => {
                            let name = self
                                .marketplace
                                .accounts
                                .find_provider(&bid.provider_id)
                                .await?
                                .map(|p| p.name)
                                .unwrap_or_else(|| "A provider".to_string());
                            format!(
                                "{} placed the highest bid of {}.",
                                name,
                                format_amount(bid.price)
                            )
                        }
                        None => "No bids on your latest request yet.".to_string(),
                    }
                }
                None => NO_REQUEST.to_string(),
            },
            CustomerQuery::BidCount => match latest_created {
                Some(request) => {
                    let bids = self.marketplace.bids.list_for_request(&request.id).await?;
                    format!("You have {} bid(s) on your latest request.", bids.len())
                }
                None => NO_REQUEST.to_string(),
            },
            CustomerQuery::PaidForAll => {
                let paid = requests.iter().filter(|r| r.paid).count();
                if paid == requests.len() {
                    "Yes, all are paid ✅".to_string()
                } else {
                    format!("No, only {}/{} paid.", paid, requests.len())
                }
            }
            CustomerQuery::BookedThisMonth => {
                let (start, end) = month_bounds(today);
                let booked = requests
                    .iter()
                    .filter(|r| r.date >= start && r.date <= end)
                    .count();
                format!("You've booked {} service(s) this month.", booked)
            }
            CustomerQuery::LatestBudget => match latest_created {
                Some(r) => format!(
                    "Budget for your latest request is {}.",
                    format_amount(r.budget)
                ),
                None => NO_REQUEST.to_string(),
            },
            CustomerQuery::HighestBudget => match max_by_amount(&requests, |r| r.budget) {
                Some(r) => format!(
                    "Your highest budget was {} for {}.",
                    format_amount(r.budget),
                    r.service
                ),
                None => NO_REQUEST.to_string(),
            },
            CustomerQuery::AverageSpend => format!(
                "You spend {} on average.",
                format_total(average_paid(&requests))
            ),
            CustomerQuery::NotReviewed => {
                let pending = distinct(
                    requests
                        .iter()
                        .filter(|r| r.review_id.is_none())
                        .map(|r| r.service.clone()),
                );
                if pending.is_empty() {
                    "You've reviewed all your services.".to_string()
                } else {
                    format!("Services not reviewed yet: {}", pending.join(", "))
                }
            }
            CustomerQuery::MostFrequentService => {
                match most_frequent(requests.iter().map(|r| r.service.clone())) {
                    Some((service, count)) => {
                        format!("Most frequent service: {} ({} times)", service, count)
                    }
                    None => NO_HISTORY.to_string(),
                }
            }
            CustomerQuery::AcceptedBids => {
                let accepted = requests.iter().filter(|r| r.provider_id.is_some()).count();
                format!("You accepted {} bid(s).", accepted)
            }
        };
        Ok(reply)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Provider queries
    // ════════════════════════════════════════════════════════════════════════

    async fn provider_answer(
        &self,
        provider: &Provider,
        query: ProviderQuery,
    ) -> Result<String, AssistantError> {
        let today = self.clock.today();
        let participant = ParticipantId::from(provider.id);
        let jobs = self
            .marketplace
            .requests
            .list_for_provider(&provider.id)
            .await?;

        let reply = match query {
            ProviderQuery::CompletedJobs => {
                let done = jobs.iter().filter(|r| r.state == RequestState::Done).count();
                self.replies.completed_jobs(done)
            }
            ProviderQuery::TotalRevenue => self.replies.total_revenue(total_paid(&jobs)),
            ProviderQuery::AverageRating => match provider.rating {
                Some(rating) => format!("Your average rating is {}/5.", rating),
                None => "You don't have a rating yet.".to_string(),
            },
            ProviderQuery::NextJob => {
                let open: Vec<ServiceRequest> = jobs
                    .iter()
                    .filter(|r| r.state == RequestState::InProgress)
                    .cloned()
                    .collect();
                match next_on_or_after(&open, today) {
                    Some(r) => format!(
                        "Your next job is {} on {}.",
                        r.service,
                        format_date(r.date)
                    ),
                    None => "You have no upcoming jobs.".to_string(),
                }
            }
            ProviderQuery::MostRequestedService => {
                match most_frequent(jobs.iter().map(|r| r.service.clone())) {
                    Some((service, count)) => format!(
                        "Your most requested service is {} ({} times).",
                        service, count
                    ),
                    None => "No jobs found.".to_string(),
                }
            }
            ProviderQuery::EarnedThisMonth => {
                let (start, end) = month_bounds(today);
                let this_month: Vec<ServiceRequest> = jobs
                    .iter()
                    .filter(|r| r.date >= start && r.date <= end)
                    .cloned()
                    .collect();
                format!(
                    "You earned {} this month.",
                    format_total(total_paid(&this_month))
                )
            }
            ProviderQuery::HighestEarning => {
                match max_by_amount(&jobs, |r| r.price.unwrap_or(0.0)) {
                    Some(r) => format!(
                        "Your highest earning was {} at {}.",
                        r.service,
                        format_amount(r.price.unwrap_or(0.0))
                    ),
                    None => "No requests found.".to_string(),
                }
            }
            ProviderQuery::MostFrequentCustomer => {
                match most_frequent(jobs.iter().map(|r| r.customer_id)) {
                    Some((id, count)) => {
                        let name = self.customer_name(&id).await?;
                        format!(
                            "Most frequent customer is {} ({} times).",
                            name.as_deref().unwrap_or("Unknown"),
                            count
                        )
                    }
                    None => "No jobs found.".to_string(),
                }
            }
            ProviderQuery::JobsThisWeek => {
                let horizon = today.checked_add_days(Days::new(7)).unwrap_or(today);
                let lines: Vec<String> = jobs
                    .iter()
                    .filter(|r| r.state == RequestState::InProgress)
                    .filter(|r| r.date >= today && r.date <= horizon)
                    .map(|r| format!("{} on {}", r.service, format_date(r.date)))
                    .collect();
                if lines.is_empty() {
                    "No jobs this week.".to_string()
                } else {
                    self.replies.service_list("Jobs this week:", &lines)
                }
            }
            ProviderQuery::ReviewsThisMonth => {
                let (start, end) = month_bounds(today);
                let until = end.succ_opt().unwrap_or(end);
                let count = self
                    .marketplace
                    .reviews
                    .count_for_provider_between(&provider.id, midnight(start), midnight(until))
                    .await?;
                format!("You've received {} review(s) this month.", count)
            }
            ProviderQuery::MessagesSent => {
                let sent = self.marketplace.messaging.count_sent(&participant).await?;
                format!("You've sent {} message(s).", sent)
            }
            ProviderQuery::LastFileShared => {
                match self.marketplace.messaging.latest_file_sent(&participant).await? {
                    Some(message) => format!(
                        "Last shared: {}",
                        message.file_name.as_deref().unwrap_or("unnamed file")
                    ),
                    None => "You haven't shared any files yet.".to_string(),
                }
            }
        };
        Ok(reply)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Lookups
    // ════════════════════════════════════════════════════════════════════════

    async fn customer_requests(
        &self,
        customer: &Customer,
    ) -> Result<Vec<ServiceRequest>, DomainError> {
        self.marketplace
            .requests
            .list_for_customer(&customer.id)
            .await
    }

    /// Provider on the latest-dated request that has one.
    async fn assigned_provider(
        &self,
        requests: &[ServiceRequest],
    ) -> Result<Option<Provider>, DomainError> {
        let assigned: Vec<ServiceRequest> = requests
            .iter()
            .filter(|r| r.provider_id.is_some())
            .cloned()
            .collect();
        match latest_by(&assigned, |r| r.date).and_then(|r| r.provider_id) {
            Some(id) => self.marketplace.accounts.find_provider(&id).await,
            None => Ok(None),
        }
    }

    async fn customer_name(&self, id: &CustomerId) -> Result<Option<String>, DomainError> {
        Ok(self
            .marketplace
            .accounts
            .find_customer(id)
            .await?
            .map(|c| c.display_name()))
    }

    /// Display name of a message sender, whichever role it has.
    async fn participant_name(&self, id: &ParticipantId) -> Result<Option<String>, DomainError> {
        let provider_id = ProviderId::from_uuid(*id.as_uuid());
        if let Some(provider) = self.marketplace.accounts.find_provider(&provider_id).await? {
            return Ok(Some(provider.name));
        }
        self.customer_name(&CustomerId::from_uuid(*id.as_uuid()))
            .await
    }
}

/// Earliest request dated `today` or later.
fn next_on_or_after(requests: &[ServiceRequest], today: NaiveDate) -> Option<&ServiceRequest> {
    requests
        .iter()
        .filter(|r| r.date >= today)
        .min_by_key(|r| r.date)
}

/// Request with the largest amount; ties keep the first.
fn max_by_amount(
    requests: &[ServiceRequest],
    amount: impl Fn(&ServiceRequest) -> f64,
) -> Option<&ServiceRequest> {
    requests.iter().fold(None, |best, r| match best {
        Some(b) if amount(b) >= amount(r) => Some(b),
        _ => Some(r),
    })
}

fn midnight(date: NaiveDate) -> Timestamp {
    Timestamp::from_datetime(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}
