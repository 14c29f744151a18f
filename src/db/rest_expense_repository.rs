use async_trait::async_trait;
use uuid::Uuid;

use crate::db::expense_repository::ExpenseRepository;
use crate::db::rest_client::{BackendClient, BackendError};
use crate::models::expense::{Expense, ExpenseUpdate, NewExpense};

pub struct RestExpenseRepository {
    pub client: BackendClient,
}

#[async_trait]
impl ExpenseRepository for RestExpenseRepository {
    async fn list_expenses(
        &self,
        organization_id: Uuid,
        festival_name: &str,
        festival_year: i32,
    ) -> Result<Vec<Expense>, BackendError> {
        self.client
            .from("expenses")
            .select("*")
            .eq("organization_id", organization_id)
            .eq("festival_name", festival_name)
            .eq("festival_year", festival_year)
            .order("created_at", false)
            .fetch()
            .await
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, BackendError> {
        self.client.from("expenses").insert(expense).await
    }

    async fn update_expense(
        &self,
        expense_id: Uuid,
        update: &ExpenseUpdate,
    ) -> Result<Expense, BackendError> {
        let rows: Vec<Expense> = self
            .client
            .from("expenses")
            .eq("id", expense_id)
            .update(update)
            .await?;
        rows.into_iter().next().ok_or_else(|| {
            BackendError::InvalidResponse(format!("expense {expense_id} not updated"))
        })
    }

    async fn delete_expense(&self, expense_id: Uuid) -> Result<(), BackendError> {
        self.client
            .from("expenses")
            .eq("id", expense_id)
            .delete()
            .await
    }
}
