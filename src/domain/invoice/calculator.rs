use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::value_objects::{Quantity, Rate, ValueObjectError, VatPercentage};

/// Currency precision used for every stored and displayed amount.
pub const CURRENCY_SCALE: u32 = 2;

/// Rounds half away from zero (half-up for the non-negative amounts used here).
pub fn round_currency(value: Decimal) -> Decimal {
  value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInput {
  pub quantity: Quantity,
  pub rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
  pub item_amounts: Vec<Decimal>,
  pub subtotal: Decimal,
  pub vat_amount: Decimal,
  pub total: Decimal,
}

pub fn line_amount(quantity: Quantity, rate: Rate) -> Result<Decimal, ValueObjectError> {
  quantity
    .value()
    .checked_mul(rate.value())
    .map(round_currency)
    .ok_or_else(|| out_of_range("line amount"))
}

/// Computes item amounts and invoice totals. An exempt invoice carries no VAT
/// whatever the percentage; an empty item list totals zero. Fails instead of
/// overflowing when an amount leaves the `Decimal` range.
pub fn compute_totals(
  items: &[LineInput],
  vat: VatPercentage,
  vat_exempt: bool,
) -> Result<InvoiceTotals, ValueObjectError> {
  let item_amounts = items
    .iter()
    .map(|item| line_amount(item.quantity, item.rate))
    .collect::<Result<Vec<_>, _>>()?;

  let subtotal = item_amounts
    .iter()
    .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount))
    .ok_or_else(|| out_of_range("subtotal"))?;

  let vat_amount = if vat_exempt {
    Decimal::ZERO
  } else {
    subtotal
      .checked_mul(vat.value())
      .map(|v| round_currency(v / Decimal::ONE_HUNDRED))
      .ok_or_else(|| out_of_range("VAT amount"))?
  };

  let total = subtotal
    .checked_add(vat_amount)
    .ok_or_else(|| out_of_range("total"))?;

  Ok(InvoiceTotals {
    item_amounts,
    subtotal,
    vat_amount,
    total,
  })
}

fn out_of_range(what: &str) -> ValueObjectError {
  ValueObjectError::AmountOutOfRange(format!("{} exceeds the supported range", what))
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;
  use rust_decimal_macros::dec;

  fn line(quantity: Decimal, rate: Decimal) -> LineInput {
    LineInput {
      quantity: Quantity::new(quantity).unwrap(),
      rate: Rate::new(rate).unwrap(),
    }
  }

  fn vat(p: Decimal) -> VatPercentage {
    VatPercentage::new(p).unwrap()
  }

  #[test]
  fn test_reference_invoice() {
    let totals = compute_totals(
      &[line(dec!(2), dec!(50.00)), line(dec!(1), dec!(25.00))],
      VatPercentage::parse("11").unwrap(),
      false,
    )
    .unwrap();

    assert_eq!(totals.item_amounts, vec![dec!(100.00), dec!(25.00)]);
    assert_eq!(totals.subtotal, dec!(125.00));
    assert_eq!(totals.vat_amount, dec!(13.75));
    assert_eq!(totals.total, dec!(138.75));
  }

  #[test]
  fn test_exempt_invoice_has_no_vat() {
    let totals =
      compute_totals(&[line(dec!(3), dec!(10))], vat(dec!(20)), true).unwrap();
    assert_eq!(totals.vat_amount, dec!(0));
    assert_eq!(totals.total, dec!(30));
  }

  #[test]
  fn test_empty_items_total_zero() {
    let totals = compute_totals(&[], vat(dec!(11)), false).unwrap();
    assert!(totals.item_amounts.is_empty());
    assert_eq!(totals.subtotal, dec!(0));
    assert_eq!(totals.total, dec!(0));
  }

  #[test]
  fn test_rounding_is_half_up() {
    let amount = |q, r| {
      line_amount(Quantity::new(q).unwrap(), Rate::new(r).unwrap()).unwrap()
    };
    // 0.5 * 0.01 = 0.005
    assert_eq!(amount(dec!(0.5), dec!(0.01)), dec!(0.01));
    // 1.5 * 0.03 = 0.045
    assert_eq!(amount(dec!(1.5), dec!(0.03)), dec!(0.05));
    // 11% of 0.50 = 0.055
    let totals =
      compute_totals(&[line(dec!(1), dec!(0.50))], vat(dec!(11)), false).unwrap();
    assert_eq!(totals.vat_amount, dec!(0.06));
  }

  #[test]
  fn test_overflowing_amounts_are_errors() {
    let huge = Decimal::from(10_000_000_000_000_000u64);
    assert!(matches!(
      compute_totals(&[line(huge, huge)], vat(dec!(11)), false),
      Err(ValueObjectError::AmountOutOfRange(_))
    ));

    // Each line fits, their sum does not.
    let big = line(Decimal::MAX, dec!(1));
    assert!(matches!(
      compute_totals(&[big, big], vat(dec!(0)), true),
      Err(ValueObjectError::AmountOutOfRange(_))
    ));

    // Subtotal fits, VAT on top of it does not.
    let near_max = line(Decimal::MAX / dec!(2), dec!(1));
    assert!(matches!(
      compute_totals(&[near_max], vat(dec!(100)), false),
      Err(ValueObjectError::AmountOutOfRange(_))
    ));
  }

  fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (0u64..1_000_000u64).prop_map(|n| Decimal::new(n as i64, 3))
  }

  fn arb_rate() -> impl Strategy<Value = Decimal> {
    (0u64..10_000_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
  }

  fn arb_vat() -> impl Strategy<Value = Decimal> {
    (0u32..=10_000u32).prop_map(|bp| Decimal::new(bp as i64, 2))
  }

  proptest! {
    #[test]
    fn prop_amounts_and_subtotal(
      pairs in prop::collection::vec((arb_quantity(), arb_rate()), 0..12),
      p in arb_vat(),
    ) {
      let items: Vec<LineInput> = pairs.iter().map(|(q, r)| line(*q, *r)).collect();
      let totals = compute_totals(&items, vat(p), false).unwrap();

      for ((q, r), amount) in pairs.iter().zip(&totals.item_amounts) {
        prop_assert_eq!(*amount, round_currency(*q * *r));
      }
      let sum: Decimal = totals.item_amounts.iter().copied().sum();
      prop_assert_eq!(totals.subtotal, sum);
      prop_assert_eq!(
        totals.total,
        totals.subtotal + round_currency(totals.subtotal * p / Decimal::ONE_HUNDRED)
      );
    }

    #[test]
    fn prop_exempt_total_equals_subtotal(
      pairs in prop::collection::vec((arb_quantity(), arb_rate()), 0..12),
      p in arb_vat(),
    ) {
      let items: Vec<LineInput> = pairs.iter().map(|(q, r)| line(*q, *r)).collect();
      let totals = compute_totals(&items, vat(p), true).unwrap();
      prop_assert_eq!(totals.total, totals.subtotal);
      prop_assert_eq!(totals.vat_amount, Decimal::ZERO);
    }
  }
}
