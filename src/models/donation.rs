use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationCategory {
    /// Monetary contribution.
    Chanda,
    /// In-kind or named sponsorship.
    Sponsorship,
}

impl DonationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationCategory::Chanda => "chanda",
            DonationCategory::Sponsorship => "sponsorship",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub festival_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub name_telugu: Option<String>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub donation_type: String,
    pub category: DonationCategory,
    #[serde(default)]
    pub received_amount: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Donation {
    pub fn received(&self) -> f64 {
        self.received_amount.unwrap_or(0.0).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewDonation {
    pub organization_id: Uuid,
    pub festival_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_telugu: Option<String>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub donation_type: String,
    pub category: DonationCategory,
    pub received_amount: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DonationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_telugu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub donation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DonationCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_amount: Option<f64>,
}

#[cfg(test)]
pub(crate) fn sample_donation(name: &str, amount: f64, received: Option<f64>) -> Donation {
    Donation {
        id: Uuid::new_v4(),
        organization_id: None,
        festival_id: None,
        name: name.to_string(),
        name_telugu: None,
        amount,
        donation_type: "cash".into(),
        category: DonationCategory::Chanda,
        received_amount: received,
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_column_maps_to_donation_type() {
        let row = json!({
            "id": Uuid::new_v4(),
            "name": "Ravi",
            "amount": 5000,
            "type": "cash",
            "category": "chanda",
            "received_amount": null
        });
        let donation: Donation = serde_json::from_value(row).unwrap();
        assert_eq!(donation.donation_type, "cash");
        assert_eq!(donation.category, DonationCategory::Chanda);
        assert_eq!(donation.received(), 0.0);
    }

    #[test]
    fn update_only_serializes_changed_fields() {
        let patch = DonationUpdate {
            received_amount: Some(2500.0),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"received_amount": 2500.0})
        );
    }
}
