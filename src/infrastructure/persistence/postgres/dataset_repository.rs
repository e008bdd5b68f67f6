use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::client_repository::{CLIENT_COLUMNS, ClientRow};
use super::invoice_repository::fetch_all_invoices;
use super::settings_repository::{fetch_settings, store_settings};
use crate::domain::backup::{BackupError, Dataset, DatasetRepository, ImportSummary};
use crate::domain::invoice::Client;

pub struct PostgresDatasetRepository {
  pool: PgPool,
}

impl PostgresDatasetRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

async fn insert_dataset(conn: &mut PgConnection, dataset: &Dataset) -> Result<(), BackupError> {
  store_settings(conn, &dataset.settings).await?;

  for client in &dataset.clients {
    sqlx::query(
      r#"
            INSERT INTO clients (id, name, address, email, phone, category, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
    )
    .bind(client.id)
    .bind(client.name.value())
    .bind(&client.address)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(&client.category)
    .bind(client.created_at)
    .execute(&mut *conn)
    .await?;
  }

  for invoice in &dataset.invoices {
    sqlx::query(
      r#"
            INSERT INTO invoices (
                id, client_id, invoice_number, date_issued, due_date, status,
                vat_exempt, vat_exempt_reason, total_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
    )
    .bind(invoice.id)
    .bind(invoice.client_id)
    .bind(invoice.invoice_number.value())
    .bind(invoice.date_issued)
    .bind(invoice.due_date)
    .bind(invoice.status.as_str())
    .bind(invoice.vat_exempt)
    .bind(&invoice.vat_exempt_reason)
    .bind(invoice.total_amount)
    .execute(&mut *conn)
    .await?;

    for (position, item) in invoice.items.iter().enumerate() {
      sqlx::query(
        r#"
                INSERT INTO invoice_line_items (id, invoice_id, line_order, description, quantity, rate, amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
      )
      .bind(item.id)
      .bind(invoice.id)
      .bind(position as i32)
      .bind(item.description.value())
      .bind(item.quantity.value())
      .bind(item.rate.value())
      .bind(item.amount)
      .execute(&mut *conn)
      .await?;
    }
  }

  // New ids continue after the highest imported one.
  for table in ["clients", "invoices", "invoice_line_items"] {
    sqlx::query(&format!(
      "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
       COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)"
    ))
    .execute(&mut *conn)
    .await?;
  }

  Ok(())
}

#[async_trait]
impl DatasetRepository for PostgresDatasetRepository {
  async fn export_dataset(&self) -> Result<Dataset, BackupError> {
    let mut tx = self.pool.begin().await?;
    // One snapshot for every read below.
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
      .execute(&mut *tx)
      .await?;

    let settings = fetch_settings(&mut tx).await?;
    let clients = sqlx::query_as::<_, ClientRow>(&format!(
      "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY id"
    ))
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(Client::try_from)
    .collect::<Result<Vec<_>, _>>()?;
    let invoices = fetch_all_invoices(&mut tx, "id").await?;

    tx.commit().await?;

    Ok(Dataset {
      settings,
      clients,
      invoices,
    })
  }

  async fn replace_entire_dataset(&self, dataset: Dataset) -> Result<ImportSummary, BackupError> {
    let mut tx = self.pool.begin().await?;

    // TRUNCATE holds an exclusive lock until commit, so concurrent readers
    // see either the old dataset or the new one.
    sqlx::query("TRUNCATE invoice_line_items, invoices, clients")
      .execute(&mut *tx)
      .await?;

    // Dropping the transaction on error rolls everything back.
    insert_dataset(&mut tx, &dataset).await?;
    tx.commit().await?;

    Ok(ImportSummary {
      replaced_clients: dataset.clients.len(),
      replaced_invoices: dataset.invoices.len(),
    })
  }
}
