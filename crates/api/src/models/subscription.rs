use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Free,
    Basic,
    Premium,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Succeeded,
    Pending,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "_id")]
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    #[serde(alias = "createdAt")]
    pub date: DateTime<Utc>,
}

/// Read-only snapshot of the caller's plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionData {
    pub plan_type: PlanType,
    pub billing_cycle: BillingCycle,
    #[serde(alias = "isActive")]
    pub active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_history: Vec<Transaction>,
}

impl SubscriptionData {
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.active && self.end_date.map(|end| end > now).unwrap_or(true)
    }

    pub fn total_paid(&self) -> f64 {
        self.payment_history
            .iter()
            .filter(|transaction| transaction.status == TransactionStatus::Succeeded)
            .map(|transaction| transaction.amount)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanRequest {
    pub plan_type: PlanType,
    pub billing_cycle: BillingCycle,
}
