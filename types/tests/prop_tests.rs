use num_bigint::BigUint;
use proptest::prelude::*;

use lattice_types::{AmountConverter, BlockHash, DecimalAmount, Denomination, RawAmount, Timestamp};

fn denomination() -> impl Strategy<Value = Denomination> {
    prop_oneof![
        Just(Denomination::Unit),
        Just(Denomination::Milli),
        Just(Denomination::Micro),
    ]
}

proptest! {
    /// Whole-unit round trip drops exactly the residual below one display unit.
    #[test]
    fn floor_round_trip_drops_residual(r in any::<u128>(), d in denomination()) {
        let raw = RawAmount::from_u128(r);
        let back = AmountConverter::to_raw(&AmountConverter::from_raw(&raw, d).floor(), d);
        let residual = &raw % &d.scale();
        prop_assert_eq!(back + residual, raw);
    }

    /// The exact display value converts back to the same raw amount.
    #[test]
    fn exact_round_trip(r in any::<u128>(), d in denomination()) {
        let raw = RawAmount::from_u128(r);
        prop_assert_eq!(AmountConverter::to_raw(&AmountConverter::from_raw(&raw, d), d), raw);
    }

    /// Amounts wider than 128 bits still convert without loss.
    #[test]
    fn wide_amounts_round_trip(hi in any::<u128>(), lo in any::<u128>(), d in denomination()) {
        let value = (BigUint::from(hi) << 128u32) + BigUint::from(lo);
        let raw = RawAmount::new(value);
        prop_assert_eq!(AmountConverter::to_raw(&AmountConverter::from_raw(&raw, d), d), raw);
    }

    /// Decimal display and parse agree.
    #[test]
    fn decimal_display_parses_back(unscaled in any::<u64>(), scale in 0u32..30) {
        let value = DecimalAmount::new(BigUint::from(unscaled), scale);
        let parsed: DecimalAmount = value.to_string().parse().unwrap();
        prop_assert_eq!(parsed, value);
    }

    /// `split` reproduces the original amount.
    #[test]
    fn split_is_lossless(r in any::<u128>(), d in denomination()) {
        let raw = RawAmount::from_u128(r);
        let (whole, residual) = AmountConverter::split(&raw, d);
        prop_assert!(residual < d.scale());
        prop_assert_eq!(AmountConverter::to_raw(&whole, d) + residual, raw);
    }

    /// BlockHash text form parses back to the same bytes.
    #[test]
    fn block_hash_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        let parsed: BlockHash = hash.to_string().parse().unwrap();
        prop_assert_eq!(parsed.as_bytes(), &bytes);
    }

    /// A cooldown is running strictly before `start + secs` and over from then on.
    #[test]
    fn cooldown_expiry_boundary(start in 0u64..1_000_000, secs in 0u64..1_000, probe in 0u64..2_000) {
        let now = Timestamp::new(start + probe);
        prop_assert_eq!(Timestamp::new(start).has_expired(secs, now), probe >= secs);
    }
}
