//! Installment quote shown next to the car step of the application.
//!
//! Interest is flat: 14% of the loan per year of the term, added once and
//! spread evenly over the months.
//!
//! | Output               | Formula                                         |
//! |----------------------|-------------------------------------------------|
//! | loan amount          | car price - down payment                        |
//! | interest percent     | 14 × months / 12                                |
//! | interest amount      | loan amount × interest percent / 100            |
//! | total to pay         | loan amount + interest amount                   |
//! | monthly installment  | total to pay / months                           |
//!
//! Money outputs are rounded half-up to two decimals.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use finance_core::calculator::{InstallmentRequest, calculate_installment};
//!
//! let quote = calculate_installment(&InstallmentRequest {
//!     car_price: dec!(300000),
//!     down_payment: dec!(50000),
//!     months: 60,
//! })
//! .unwrap();
//!
//! assert_eq!(quote.loan_amount, dec!(250000));
//! assert_eq!(quote.interest_percent, dec!(70.00));
//! assert_eq!(quote.total_to_pay, dec!(425000.00));
//! assert_eq!(quote.monthly_installment, dec!(7083.33));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::collection::parse_amount;
use crate::models::ReferencePerson;

/// 14% per year.
pub const ANNUAL_INTEREST_RATE: Decimal = Decimal::from_parts(14, 0, 0, false, 2);

/// Five years.
pub const DEFAULT_TERM_MONTHS: u32 = 60;

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentRequest {
    pub car_price: Decimal,
    pub down_payment: Decimal,
    pub months: u32,
}

impl InstallmentRequest {
    /// Prices as typed into the car section, over `months`.
    pub fn from_car_section(
        car: &ReferencePerson,
        months: u32,
    ) -> Self {
        Self {
            car_price: parse_amount(&car.total_price),
            down_payment: parse_amount(&car.down_payment),
            months,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallmentQuote {
    pub car_price: Decimal,
    pub down_payment: Decimal,
    pub loan_amount: Decimal,
    /// Interest over the whole term, as a percentage of the loan.
    pub interest_percent: Decimal,
    pub interest_amount: Decimal,
    pub total_to_pay: Decimal,
    pub monthly_installment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculatorError {
    #[error("Car price must be at least 1, got {0}")]
    CarPriceTooLow(Decimal),

    #[error("Down payment cannot be negative, got {0}")]
    NegativeDownPayment(Decimal),

    #[error("Down payment {down_payment} exceeds the car price {car_price}")]
    DownPaymentExceedsPrice {
        car_price: Decimal,
        down_payment: Decimal,
    },

    #[error("Installment term must be at least one month")]
    NoTerm,
}

fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn calculate_installment(
    request: &InstallmentRequest,
) -> Result<InstallmentQuote, CalculatorError> {
    let InstallmentRequest {
        car_price,
        down_payment,
        months,
    } = *request;

    if car_price < Decimal::ONE {
        return Err(CalculatorError::CarPriceTooLow(car_price));
    }
    if down_payment < Decimal::ZERO {
        return Err(CalculatorError::NegativeDownPayment(down_payment));
    }
    if down_payment > car_price {
        return Err(CalculatorError::DownPaymentExceedsPrice {
            car_price,
            down_payment,
        });
    }
    if months == 0 {
        return Err(CalculatorError::NoTerm);
    }

    let months = Decimal::from(months);
    let loan_amount = car_price - down_payment;
    let interest_percent = ANNUAL_INTEREST_RATE * HUNDRED * months / MONTHS_PER_YEAR;
    let interest_amount = loan_amount * interest_percent / HUNDRED;
    let total_to_pay = loan_amount + interest_amount;

    Ok(InstallmentQuote {
        car_price,
        down_payment,
        loan_amount,
        interest_percent: round_half_up(interest_percent),
        interest_amount: round_half_up(interest_amount),
        total_to_pay: round_half_up(total_to_pay),
        monthly_installment: round_half_up(total_to_pay / months),
    })
}
