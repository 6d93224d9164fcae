use serde::Serialize;

/// A purchasable membership plan.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipType {
    pub id: i64,
    pub name: String,
    pub duration_days: i64,
    pub visits_limit: i64,
    pub price_cents: i64,
    pub has_pool: bool,
    pub has_sauna: bool,
}
