use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;

use crate::domain::invoice::{
  Invoice, InvoiceDraft, InvoiceNumber, InvoiceRevision, InvoiceStatus, LineItem,
  LineItemDescription, NewLineItem, Quantity, Rate, errors::InvoiceError, ports::InvoiceRepository,
};

#[derive(Debug, FromRow)]
pub(super) struct InvoiceRow {
  pub(super) id: i64,
  pub(super) client_id: i64,
  pub(super) invoice_number: String,
  pub(super) date_issued: NaiveDate,
  pub(super) due_date: NaiveDate,
  pub(super) status: String,
  pub(super) vat_exempt: bool,
  pub(super) vat_exempt_reason: Option<String>,
  pub(super) total_amount: Decimal,
}

#[derive(Debug, FromRow)]
pub(super) struct LineItemRow {
  pub(super) id: i64,
  pub(super) invoice_id: i64,
  pub(super) description: String,
  pub(super) quantity: Decimal,
  pub(super) rate: Decimal,
  pub(super) amount: Decimal,
}

impl TryFrom<LineItemRow> for LineItem {
  type Error = InvoiceError;

  fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
    Ok(LineItem {
      id: row.id,
      invoice_id: row.invoice_id,
      description: LineItemDescription::new(row.description)?,
      quantity: Quantity::new(row.quantity)?,
      rate: Rate::new(row.rate)?,
      amount: row.amount,
    })
  }
}

impl InvoiceRow {
  fn into_invoice(self, items: Vec<LineItemRow>) -> Result<Invoice, InvoiceError> {
    let status = self
      .status
      .parse::<InvoiceStatus>()
      .map_err(|e| InvoiceError::Repository(format!("Invoice {}: {}", self.id, e)))?;

    Ok(Invoice {
      id: self.id,
      client_id: self.client_id,
      invoice_number: InvoiceNumber::new(self.invoice_number)?,
      date_issued: self.date_issued,
      due_date: self.due_date,
      status,
      vat_exempt: self.vat_exempt,
      vat_exempt_reason: self.vat_exempt_reason,
      items: items
        .into_iter()
        .map(LineItem::try_from)
        .collect::<Result<_, _>>()?,
      total_amount: self.total_amount,
    })
  }
}

const INVOICE_COLUMNS: &str = "id, client_id, invoice_number, date_issued, due_date, status, \
                               vat_exempt, vat_exempt_reason, total_amount";

const LINE_ITEM_COLUMNS: &str = "id, invoice_id, description, quantity, rate, amount";

/// Attaches line items (in stored order) to the given invoice rows.
pub(super) async fn load_invoices(
  conn: &mut PgConnection,
  rows: Vec<InvoiceRow>,
) -> Result<Vec<Invoice>, InvoiceError> {
  if rows.is_empty() {
    return Ok(Vec::new());
  }

  let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
  let item_rows = sqlx::query_as::<_, LineItemRow>(&format!(
    r#"
        SELECT {LINE_ITEM_COLUMNS}
        FROM invoice_line_items
        WHERE invoice_id = ANY($1)
        ORDER BY invoice_id, line_order, id
        "#
  ))
  .bind(ids)
  .fetch_all(&mut *conn)
  .await?;

  let mut items_by_invoice: HashMap<i64, Vec<LineItemRow>> = HashMap::new();
  for item in item_rows {
    items_by_invoice.entry(item.invoice_id).or_default().push(item);
  }

  rows
    .into_iter()
    .map(|row| {
      let items = items_by_invoice.remove(&row.id).unwrap_or_default();
      row.into_invoice(items)
    })
    .collect()
}

pub(super) async fn fetch_all_invoices(
  conn: &mut PgConnection,
  order_by: &str,
) -> Result<Vec<Invoice>, InvoiceError> {
  let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
    "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY {order_by}"
  ))
  .fetch_all(&mut *conn)
  .await?;
  load_invoices(conn, rows).await
}

/// Inserts line items keeping their list order. Ids are assigned by the database.
async fn insert_items(
  conn: &mut PgConnection,
  invoice_id: i64,
  items: &[NewLineItem],
) -> Result<Vec<LineItemRow>, InvoiceError> {
  let mut rows = Vec::with_capacity(items.len());
  for (position, item) in items.iter().enumerate() {
    let row = sqlx::query_as::<_, LineItemRow>(&format!(
      r#"
            INSERT INTO invoice_line_items (invoice_id, line_order, description, quantity, rate, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LINE_ITEM_COLUMNS}
            "#
    ))
    .bind(invoice_id)
    .bind(position as i32)
    .bind(item.description.value())
    .bind(item.quantity.value())
    .bind(item.rate.value())
    .bind(item.amount)
    .fetch_one(&mut *conn)
    .await?;
    rows.push(row);
  }
  Ok(rows)
}

fn map_write_error(e: sqlx::Error, client_id: i64, invoice_number: &InvoiceNumber) -> InvoiceError {
  if let sqlx::Error::Database(db_err) = &e {
    // PostgreSQL unique violation
    if db_err.code().as_deref() == Some("23505")
      && db_err.constraint() == Some("invoices_client_number_unique")
    {
      return InvoiceError::InvoiceNumberAlreadyExists {
        client_id,
        invoice_number: invoice_number.value().to_string(),
      };
    }
    // PostgreSQL foreign key violation
    if db_err.code().as_deref() == Some("23503") {
      return InvoiceError::ClientNotFound(client_id);
    }
  }
  InvoiceError::Database(e)
}

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn create(&self, draft: InvoiceDraft) -> Result<Invoice, InvoiceError> {
    let mut tx = self.pool.begin().await?;

    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            INSERT INTO invoices (
                client_id, invoice_number, date_issued, due_date, status,
                vat_exempt, vat_exempt_reason, total_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {INVOICE_COLUMNS}
            "#
    ))
    .bind(draft.client_id)
    .bind(draft.invoice_number.value())
    .bind(draft.date_issued)
    .bind(draft.due_date)
    .bind(draft.status.as_str())
    .bind(draft.vat_exempt)
    .bind(&draft.vat_exempt_reason)
    .bind(draft.total_amount)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_write_error(e, draft.client_id, &draft.invoice_number))?;

    let items = insert_items(&mut tx, row.id, &draft.items).await?;
    tx.commit().await?;

    row.into_invoice(items)
  }

  async fn update(
    &self,
    id: i64,
    revision: InvoiceRevision,
  ) -> Result<Option<Invoice>, InvoiceError> {
    let mut tx = self.pool.begin().await?;

    // Status is only written by update_status.
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            UPDATE invoices
            SET client_id = $2, invoice_number = $3, date_issued = $4, due_date = $5,
                vat_exempt = $6, vat_exempt_reason = $7, total_amount = $8
            WHERE id = $1
            RETURNING {INVOICE_COLUMNS}
            "#
    ))
    .bind(id)
    .bind(revision.client_id)
    .bind(revision.invoice_number.value())
    .bind(revision.date_issued)
    .bind(revision.due_date)
    .bind(revision.vat_exempt)
    .bind(&revision.vat_exempt_reason)
    .bind(revision.total_amount)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| map_write_error(e, revision.client_id, &revision.invoice_number))?;

    let Some(row) = row else {
      return Ok(None);
    };

    sqlx::query("DELETE FROM invoice_line_items WHERE invoice_id = $1")
      .bind(id)
      .execute(&mut *tx)
      .await?;
    let items = insert_items(&mut tx, id, &revision.items).await?;
    tx.commit().await?;

    row.into_invoice(items).map(Some)
  }

  async fn update_status(
    &self,
    id: i64,
    status: InvoiceStatus,
  ) -> Result<Option<Invoice>, InvoiceError> {
    let mut conn = self.pool.acquire().await?;
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      "UPDATE invoices SET status = $2 WHERE id = $1 RETURNING {INVOICE_COLUMNS}"
    ))
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    match row {
      Some(row) => Ok(load_invoices(&mut conn, vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<Invoice>, InvoiceError> {
    let mut conn = self.pool.acquire().await?;
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
      Some(row) => Ok(load_invoices(&mut conn, vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn list(&self, client_id: Option<i64>) -> Result<Vec<Invoice>, InvoiceError> {
    let mut conn = self.pool.acquire().await?;
    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE $1::BIGINT IS NULL OR client_id = $1
            ORDER BY date_issued DESC, id DESC
            "#
    ))
    .bind(client_id)
    .fetch_all(&mut *conn)
    .await?;

    load_invoices(&mut conn, rows).await
  }

  async fn list_invoice_numbers_for_client(
    &self,
    client_id: i64,
  ) -> Result<Vec<String>, InvoiceError> {
    let numbers = sqlx::query_scalar::<_, String>(
      "SELECT invoice_number FROM invoices WHERE client_id = $1",
    )
    .bind(client_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(numbers)
  }

  async fn count_for_client(&self, client_id: i64) -> Result<usize, InvoiceError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices WHERE client_id = $1")
      .bind(client_id)
      .fetch_one(&self.pool)
      .await?;
    Ok(count as usize)
  }

  async fn delete(&self, id: i64) -> Result<bool, InvoiceError> {
    // Line items go with it (ON DELETE CASCADE).
    let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}
