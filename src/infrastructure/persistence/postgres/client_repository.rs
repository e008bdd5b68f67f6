use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::invoice::{
  Client, ClientDetails, ClientName, errors::InvoiceError, ports::ClientRepository,
};

#[derive(Debug, FromRow)]
pub(super) struct ClientRow {
  pub(super) id: i64,
  pub(super) name: String,
  pub(super) address: Option<String>,
  pub(super) email: Option<String>,
  pub(super) phone: Option<String>,
  pub(super) category: Option<String>,
  pub(super) created_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
  type Error = InvoiceError;

  fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
    Ok(Client {
      id: row.id,
      name: ClientName::new(row.name)?,
      address: row.address,
      email: row.email,
      phone: row.phone,
      category: row.category,
      created_at: row.created_at,
    })
  }
}

pub(super) const CLIENT_COLUMNS: &str = "id, name, address, email, phone, category, created_at";

pub struct PostgresClientRepository {
  pool: PgPool,
}

impl PostgresClientRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn invoice_count(&self, client_id: i64) -> Result<usize, InvoiceError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices WHERE client_id = $1")
      .bind(client_id)
      .fetch_one(&self.pool)
      .await?;
    Ok(count as usize)
  }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
  async fn create(&self, details: ClientDetails) -> Result<Client, InvoiceError> {
    let row = sqlx::query_as::<_, ClientRow>(&format!(
      r#"
            INSERT INTO clients (name, address, email, phone, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CLIENT_COLUMNS}
            "#
    ))
    .bind(details.name.value())
    .bind(details.address)
    .bind(details.email)
    .bind(details.phone)
    .bind(details.category)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, client: Client) -> Result<Client, InvoiceError> {
    let row = sqlx::query_as::<_, ClientRow>(&format!(
      r#"
            UPDATE clients
            SET name = $2, address = $3, email = $4, phone = $5, category = $6
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
    ))
    .bind(client.id)
    .bind(client.name.value())
    .bind(&client.address)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(&client.category)
    .fetch_optional(&self.pool)
    .await?;

    row
      .ok_or(InvoiceError::ClientNotFound(client.id))?
      .try_into()
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<Client>, InvoiceError> {
    let row = sqlx::query_as::<_, ClientRow>(&format!(
      "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn list(&self) -> Result<Vec<Client>, InvoiceError> {
    let rows = sqlx::query_as::<_, ClientRow>(&format!(
      "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY name ASC, id ASC"
    ))
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn delete(&self, id: i64) -> Result<bool, InvoiceError> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await;

    match result {
      Ok(done) => Ok(done.rows_affected() > 0),
      Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
        Err(InvoiceError::ClientHasInvoices {
          client_id: id,
          invoice_count: self.invoice_count(id).await?,
        })
      }
      Err(e) => Err(e.into()),
    }
  }
}
