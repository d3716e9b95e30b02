//! One-shot account actions that need no follow-up question.
//!
//! Two of them write twice without a transaction. When the second write fails
//! the first is undone on a best-effort basis and the original error returned.

use tracing::{error, info, warn};

use super::deps::{AssistantDeps, MarketplacePorts};
use super::error::AssistantError;
use crate::domain::assistant::analytics::latest_by;
use crate::domain::assistant::{Intent, ReplyFormatter, FALLBACK_REPLY};
use crate::domain::marketplace::{Customer, Identity, Provider, RequestState, TransactionStatus};

pub struct AccountActions {
    marketplace: MarketplacePorts,
    replies: ReplyFormatter,
}

impl AccountActions {
    pub fn new(deps: &AssistantDeps) -> Self {
        Self {
            marketplace: deps.marketplace.clone(),
            replies: deps.replies.clone(),
        }
    }

    /// Runs a one-shot `intent`. Returns `None` for intents this type does
    /// not handle.
    pub async fn perform(
        &self,
        identity: &Identity,
        intent: Intent,
    ) -> Result<Option<String>, AssistantError> {
        let reply = match (intent, identity) {
            (Intent::MarkMessagesSeen, identity) => self.mark_messages_seen(identity).await?,
            (Intent::MarkDone, Identity::Provider(provider)) => self.mark_done(provider).await?,
            (Intent::CompletePayment, Identity::Customer(customer)) => {
                self.complete_payment(customer).await?
            }
            (Intent::CancelRequest, Identity::Customer(customer)) => {
                self.cancel_request(customer).await?
            }
            (Intent::DeleteReview, Identity::Customer(customer)) => {
                self.delete_review(customer).await?
            }
            (Intent::MarkDone, _)
            | (Intent::CompletePayment, _)
            | (Intent::CancelRequest, _)
            | (Intent::DeleteReview, _) => {
                warn!(?intent, role = ?identity.role(), "action not available for role");
                FALLBACK_REPLY.to_string()
            }
            _ => return Ok(None),
        };
        Ok(Some(reply))
    }

    async fn mark_messages_seen(&self, identity: &Identity) -> Result<String, AssistantError> {
        let changed = self
            .marketplace
            .messaging
            .mark_all_seen(&identity.participant_id())
            .await?;
        if changed == 0 {
            return Ok(self.replies.messages_already_seen());
        }
        info!(count = changed, "messages marked seen");
        Ok(self.replies.messages_marked_seen(changed))
    }

    async fn mark_done(&self, provider: &Provider) -> Result<String, AssistantError> {
        let jobs = self
            .marketplace
            .requests
            .list_for_provider(&provider.id)
            .await?;
        let open: Vec<_> = jobs
            .into_iter()
            .filter(|r| r.state != RequestState::Done)
            .collect();
        let Some(job) = latest_by(&open, |r| r.date) else {
            return Ok(self.replies.nothing_to_mark_done());
        };

        let mut job = job.clone();
        job.state = RequestState::Done;
        self.marketplace.requests.update(&job).await?;
        info!(request_id = %job.id, provider_id = %provider.id, "request marked done");
        Ok(self.replies.marked_done(&job.service))
    }

    async fn complete_payment(&self, customer: &Customer) -> Result<String, AssistantError> {
        let Some(previous) = self
            .marketplace
            .transactions
            .latest_for_customer(&customer.id)
            .await?
        else {
            return Ok(self.replies.no_transaction());
        };

        let request = self
            .marketplace
            .requests
            .find_by_id(&previous.request_id)
            .await?;

        let mut transaction = previous.clone();
        transaction.status = TransactionStatus::Complete;
        self.marketplace.transactions.update(&transaction).await?;

        match request {
            Some(mut request) => {
                request.paid = true;
                if let Err(err) = self.marketplace.requests.update(&request).await {
                    if let Err(undo) = self.marketplace.transactions.update(&previous).await {
                        error!(
                            transaction_id = %previous.id,
                            error = %undo,
                            "failed to restore transaction status"
                        );
                    }
                    return Err(err.into());
                }
            }
            None => warn!(
                transaction_id = %transaction.id,
                request_id = %transaction.request_id,
                "paid transaction has no request"
            ),
        }

        info!(transaction_id = %transaction.id, amount = transaction.amount, "payment completed");
        Ok(self.replies.payment_completed(transaction.amount))
    }

    async fn cancel_request(&self, customer: &Customer) -> Result<String, AssistantError> {
        let requests = self
            .marketplace
            .requests
            .list_for_customer(&customer.id)
            .await?;
        let Some(latest) = latest_by(&requests, |r| r.created_at) else {
            return Ok(self.replies.nothing_to_cancel());
        };

        self.marketplace.requests.delete(&latest.id).await?;
        info!(request_id = %latest.id, customer_id = %customer.id, "request cancelled");
        Ok(self.replies.request_cancelled(&latest.service))
    }

    async fn delete_review(&self, customer: &Customer) -> Result<String, AssistantError> {
        let requests = self
            .marketplace
            .requests
            .list_for_customer(&customer.id)
            .await?;
        let reviewed: Vec<_> = requests
            .into_iter()
            .filter(|r| r.review_id.is_some())
            .collect();
        let Some(original) = latest_by(&reviewed, |r| r.created_at) else {
            return Ok(self.replies.no_review_to_delete());
        };
        let Some(review_id) = original.review_id else {
            return Ok(self.replies.no_review_to_delete());
        };

        let mut unlinked = original.clone();
        unlinked.review_id = None;
        self.marketplace.requests.update(&unlinked).await?;

        match self.marketplace.reviews.delete(&review_id).await {
            Ok(()) => {}
            // Already gone; dropping the dangling link is all that was needed.
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                if let Err(undo) = self.marketplace.requests.update(original).await {
                    error!(
                        request_id = %original.id,
                        error = %undo,
                        "failed to restore review link"
                    );
                }
                return Err(err.into());
            }
        }

        info!(review_id = %review_id, request_id = %original.id, "review deleted");
        Ok(self.replies.review_deleted())
    }
}
