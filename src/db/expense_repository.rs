use async_trait::async_trait;
use uuid::Uuid;

use crate::db::rest_client::BackendError;
use crate::models::expense::{Expense, ExpenseUpdate, NewExpense};

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn list_expenses(
        &self,
        organization_id: Uuid,
        festival_name: &str,
        festival_year: i32,
    ) -> Result<Vec<Expense>, BackendError>;

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, BackendError>;

    async fn update_expense(
        &self,
        expense_id: Uuid,
        update: &ExpenseUpdate,
    ) -> Result<Expense, BackendError>;

    async fn delete_expense(&self, expense_id: Uuid) -> Result<(), BackendError>;
}
