use uuid::Uuid;

use crate::context::preferences::Language;
use crate::models::donation::{Donation, DonationCategory};
use crate::views::currency::format_inr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Partial,
    Received,
}

impl PaymentStatus {
    pub fn of(amount: f64, received: f64) -> Self {
        if received <= 0.0 {
            PaymentStatus::Pending
        } else if received >= amount {
            PaymentStatus::Received
        } else {
            PaymentStatus::Partial
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Received => "Received",
        }
    }
}

/// What a donation card shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationCard {
    pub id: Uuid,
    pub name: String,
    pub name_telugu: Option<String>,
    pub category: DonationCategory,
    pub donation_type: String,
    pub amount: f64,
    pub received: f64,
    pub status: PaymentStatus,
    /// Absent once the donation is fully received.
    pub pending_amount: Option<f64>,
}

impl DonationCard {
    pub fn from_donation(donation: &Donation) -> Self {
        let received = donation.received();
        let status = PaymentStatus::of(donation.amount, received);
        let pending_amount = match status {
            PaymentStatus::Received => None,
            _ => Some((donation.amount - received).max(0.0)),
        };
        Self {
            id: donation.id,
            name: donation.name.clone(),
            name_telugu: donation.name_telugu.clone(),
            category: donation.category,
            donation_type: donation.donation_type.clone(),
            amount: donation.amount,
            received,
            status,
            pending_amount,
        }
    }

    /// Telugu name when the UI is in Telugu and one exists.
    pub fn display_name(&self, language: Language) -> &str {
        match (language, &self.name_telugu) {
            (Language::Telugu, Some(telugu)) if !telugu.is_empty() => telugu,
            _ => &self.name,
        }
    }

    pub fn amount_label(&self) -> String {
        format_inr(self.amount)
    }

    pub fn pending_label(&self) -> Option<String> {
        self.pending_amount.map(format_inr)
    }
}
