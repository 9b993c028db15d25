//! Unit tests for the Money module
//!
//! Covers creation, checked arithmetic, currency parsing and display of
//! claim stakes.

use core_kernel::{CoreError, Currency, Money, MoneyError};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::USD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_converts_cents_correctly() {
        let m = Money::from_minor(1_850_000, Currency::USD);
        assert_eq!(m.amount(), dec!(18500.00));
    }

    #[test]
    fn test_zero_and_sign_predicates() {
        let zero = Money::zero(Currency::USD);
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::usd(dec!(1)).is_positive());
        assert!(Money::usd(dec!(-1)).is_negative());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_and_sub() {
        let a = Money::usd(dec!(18500));
        let b = Money::usd(dec!(4200.50));
        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(22700.50));
        assert_eq!(a.checked_sub(&b).unwrap().amount(), dec!(14299.50));
    }

    #[test]
    fn test_try_sum_rejects_mixed_currencies() {
        let items = vec![Money::usd(dec!(10)), Money::new(dec!(10), Currency::EUR)];
        let result = Money::try_sum(Currency::USD, &items);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_try_sum_empty_is_zero() {
        let items: Vec<Money> = Vec::new();
        assert!(Money::try_sum(Currency::USD, &items).unwrap().is_zero());
    }

    #[test]
    fn test_money_error_converts_into_core_error() {
        let err: CoreError = MoneyError::InvalidAmount("NaN".into()).into();
        assert!(err.to_string().contains("NaN"));
    }
}

mod currency {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(" GBP ".parse::<Currency>().unwrap(), Currency::GBP);
        assert!(matches!(
            "XYZ".parse::<Currency>(),
            Err(MoneyError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn test_display_rounds_to_minor_units() {
        let m = Money::new(dec!(99.999), Currency::EUR);
        assert_eq!(m.round_to_currency().to_string(), "€100.00");
    }
}
