//! # Customer Repository
//!
//! Database operations for customers.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockbook_core::{validation, CoreError, Customer};

/// Fields for creating a new customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    /// GST identification number, if the customer is registered.
    pub gstin: Option<String>,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a new customer.
    pub async fn create(&self, new: NewCustomer) -> DbResult<Customer> {
        validation::validate_name(&new.name).map_err(CoreError::from)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            gstin: new.gstin,
        };

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, phone, address, gstin)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.gstin)
        .execute(&self.pool)
        .await?;

        debug!(customer = %customer.name, "Customer created");
        Ok(customer)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, phone, address, gstin FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", id))?;

        Ok(customer)
    }

    /// Lists customers ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, phone, address, gstin FROM customers ORDER BY name LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}
