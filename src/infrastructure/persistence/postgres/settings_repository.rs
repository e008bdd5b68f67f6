use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::domain::invoice::{Settings, errors::InvoiceError, ports::SettingsRepository};

#[derive(Debug, FromRow)]
struct SettingsRow {
  sender_name: String,
  sender_address_line1: String,
  sender_address_line2: String,
  sender_address_line3: String,
  sender_email: String,
  sender_phone: String,
  tax_id: String,
  bank_iban: String,
  bank_account_holder: String,
  bank_swift: String,
  vat_percentage: String,
  default_vat_exempt_reason: String,
  webhook_url: Option<String>,
}

impl From<SettingsRow> for Settings {
  fn from(row: SettingsRow) -> Self {
    Settings {
      sender_name: row.sender_name,
      sender_address_line1: row.sender_address_line1,
      sender_address_line2: row.sender_address_line2,
      sender_address_line3: row.sender_address_line3,
      sender_email: row.sender_email,
      sender_phone: row.sender_phone,
      tax_id: row.tax_id,
      bank_iban: row.bank_iban,
      bank_account_holder: row.bank_account_holder,
      bank_swift: row.bank_swift,
      vat_percentage: row.vat_percentage,
      default_vat_exempt_reason: row.default_vat_exempt_reason,
      webhook_url: row.webhook_url,
    }
  }
}

const SETTINGS_COLUMNS: &str = "sender_name, sender_address_line1, sender_address_line2, \
                                sender_address_line3, sender_email, sender_phone, tax_id, \
                                bank_iban, bank_account_holder, bank_swift, vat_percentage, \
                                default_vat_exempt_reason, webhook_url";

/// Reads the singleton row, falling back to defaults if it was never seeded.
pub(super) async fn fetch_settings(conn: &mut PgConnection) -> Result<Settings, sqlx::Error> {
  let row = sqlx::query_as::<_, SettingsRow>(&format!(
    "SELECT {SETTINGS_COLUMNS} FROM settings WHERE id = 1"
  ))
  .fetch_optional(&mut *conn)
  .await?;

  Ok(row.map(Settings::from).unwrap_or_default())
}

/// Upserts the singleton row.
pub(super) async fn store_settings(
  conn: &mut PgConnection,
  settings: &Settings,
) -> Result<Settings, sqlx::Error> {
  let row = sqlx::query_as::<_, SettingsRow>(&format!(
    r#"
        INSERT INTO settings (
            id, sender_name, sender_address_line1, sender_address_line2, sender_address_line3,
            sender_email, sender_phone, tax_id, bank_iban, bank_account_holder, bank_swift,
            vat_percentage, default_vat_exempt_reason, webhook_url
        )
        VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (id) DO UPDATE SET
            sender_name = EXCLUDED.sender_name,
            sender_address_line1 = EXCLUDED.sender_address_line1,
            sender_address_line2 = EXCLUDED.sender_address_line2,
            sender_address_line3 = EXCLUDED.sender_address_line3,
            sender_email = EXCLUDED.sender_email,
            sender_phone = EXCLUDED.sender_phone,
            tax_id = EXCLUDED.tax_id,
            bank_iban = EXCLUDED.bank_iban,
            bank_account_holder = EXCLUDED.bank_account_holder,
            bank_swift = EXCLUDED.bank_swift,
            vat_percentage = EXCLUDED.vat_percentage,
            default_vat_exempt_reason = EXCLUDED.default_vat_exempt_reason,
            webhook_url = EXCLUDED.webhook_url
        RETURNING {SETTINGS_COLUMNS}
        "#
  ))
  .bind(&settings.sender_name)
  .bind(&settings.sender_address_line1)
  .bind(&settings.sender_address_line2)
  .bind(&settings.sender_address_line3)
  .bind(&settings.sender_email)
  .bind(&settings.sender_phone)
  .bind(&settings.tax_id)
  .bind(&settings.bank_iban)
  .bind(&settings.bank_account_holder)
  .bind(&settings.bank_swift)
  .bind(&settings.vat_percentage)
  .bind(&settings.default_vat_exempt_reason)
  .bind(&settings.webhook_url)
  .fetch_one(&mut *conn)
  .await?;

  Ok(row.into())
}

pub struct PostgresSettingsRepository {
  pool: PgPool,
}

impl PostgresSettingsRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
  async fn get(&self) -> Result<Settings, InvoiceError> {
    let mut conn = self.pool.acquire().await?;
    Ok(fetch_settings(&mut conn).await?)
  }

  async fn update(&self, settings: Settings) -> Result<Settings, InvoiceError> {
    let mut conn = self.pool.acquire().await?;
    Ok(store_settings(&mut conn, &settings).await?)
  }
}
