use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub description: String,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl Payment {
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}
