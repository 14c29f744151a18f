use crate::db::Repositories;
use crate::errors::AppError;
use crate::models::donation::{Donation, DonationCategory};
use crate::models::expense::Expense;
use crate::models::festival::Festival;
use crate::models::organization::Organization;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryTotals {
    pub count: usize,
    pub pledged: f64,
    pub received: f64,
}

impl CategoryTotals {
    pub fn pending(&self) -> f64 {
        (self.pledged - self.received).max(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardTotals {
    pub chanda: CategoryTotals,
    pub sponsorship: CategoryTotals,
    pub total_received: f64,
    pub total_pending: f64,
    pub total_expenses: f64,
    /// Money in hand: received minus spent.
    pub balance: f64,
}

impl DashboardTotals {
    pub fn summarize(donations: &[Donation], expenses: &[Expense]) -> Self {
        let mut totals = DashboardTotals::default();
        for donation in donations {
            let bucket = match donation.category {
                DonationCategory::Chanda => &mut totals.chanda,
                DonationCategory::Sponsorship => &mut totals.sponsorship,
            };
            bucket.count += 1;
            bucket.pledged += donation.amount;
            // Overpayment is not counted as pending credit for other donors.
            bucket.received += donation.received().min(donation.amount.max(0.0));
        }
        totals.total_received = totals.chanda.received + totals.sponsorship.received;
        totals.total_pending = totals.chanda.pending() + totals.sponsorship.pending();
        totals.total_expenses = expenses.iter().map(|e| e.amount).sum();
        totals.balance = totals.total_received - totals.total_expenses;
        totals
    }

    /// Donations are scoped by festival id, expenses by festival name and
    /// year. A festival without an id yields no donations.
    pub async fn load(
        repos: &Repositories,
        organization: &Organization,
        festival: &Festival,
    ) -> Result<Self, AppError> {
        let donations = match festival.id {
            Some(id) => repos.donations.list_donations(id, None).await?,
            None => Vec::new(),
        };
        let expenses = repos
            .expenses
            .list_expenses(organization.id, &festival.name, festival.year)
            .await?;
        Ok(Self::summarize(&donations, &expenses))
    }
}
