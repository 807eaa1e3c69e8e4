//! Property-based tests for wire round-trips, decoder robustness against
//! arbitrary bytes, and discriminator determinism.

use std::path::PathBuf;

use heck::ToSnakeCase;
use idl_codec::discriminator::{compute, to_snake_case};
use idl_codec::{load_idl_from_file, DiscriminatorKind, Program, Value};
use proptest::prelude::*;
use solana_sdk::pubkey::Pubkey;

fn pool_program() -> Program {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pool.json");
    Program::new(load_idl_from_file(path).unwrap()).unwrap()
}

fn curve() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::unit("ConstantProduct")),
        any::<u64>().prop_map(|amp| Value::variant("Stable", [("amp", Value::U64(amp))])),
        (any::<u8>(), any::<u8>()).prop_map(|(a, b)| {
            Value::variant("Weighted", [("v0", Value::U8(a)), ("v1", Value::U8(b))])
        }),
    ]
}

prop_compose! {
    fn pool()(
        authority in any::<[u8; 32]>(),
        fee_bps in any::<u16>(),
        curve in curve(),
        reserves in any::<[u64; 2]>(),
        paused in any::<bool>(),
        label in prop::option::of(".{0,24}"),
        head in any::<u8>(),
        items in any::<[i64; 3]>(),
    ) -> Value {
        Value::record([
            ("authority", Value::Pubkey(Pubkey::new_from_array(authority))),
            ("fee_bps", Value::U16(fee_bps)),
            ("curve", curve),
            ("reserves", Value::Array(reserves.iter().copied().map(Value::U64).collect())),
            ("paused", Value::Bool(paused)),
            ("label", Value::Option(label.map(|s| Box::new(Value::String(s))))),
            ("history", Value::record([
                ("head", Value::U8(head)),
                ("items", Value::Array(items.iter().copied().map(Value::I64).collect())),
            ])),
        ])
    }
}

// ---------------------------------------------------------------------------
// decode(encode(v)) == v
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn pool_account_roundtrip(value in pool()) {
        let program = pool_program();
        let data = program.encode_account("Pool", &value).unwrap();
        prop_assert_eq!(program.decode_account("Pool", &data).unwrap(), value);
    }

    #[test]
    fn swap_instruction_roundtrip(amount in any::<u64>(), min_out in prop::option::of(any::<u64>()), sell in any::<bool>()) {
        let program = pool_program();
        let args = vec![
            ("amount_in".to_string(), Value::U64(amount)),
            ("min_out".to_string(), Value::Option(min_out.map(|v| Box::new(Value::U64(v))))),
            ("side".to_string(), Value::unit(if sell { "Sell" } else { "Buy" })),
        ];
        let data = program.encode_instruction("swap", &args).unwrap();
        prop_assert_eq!(program.decode_instruction("swap", &data).unwrap(), Value::Struct(args));
    }
}

// ---------------------------------------------------------------------------
// Arbitrary bytes never cause panics
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn arbitrary_bytes_no_panic(ref bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let program = pool_program();
        let _ = program.decode_any(bytes);
        let _ = program.decode_account("Ledger", bytes);
        let _ = program.decode_event("Swapped", bytes);
    }

    #[test]
    fn arbitrary_payload_after_valid_prefix_no_panic(ref tail in prop::collection::vec(any::<u8>(), 0..256)) {
        let program = pool_program();
        let mut data = program.account("Ledger").unwrap().discriminator.to_vec();
        data.extend_from_slice(tail);
        let _ = program.decode_account("Ledger", &data);
    }
}

// ---------------------------------------------------------------------------
// Discriminators are pure and stable
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn discriminator_is_deterministic(name in "[A-Za-z_][A-Za-z0-9_]{0,31}") {
        for kind in [DiscriminatorKind::Account, DiscriminatorKind::Event, DiscriminatorKind::Instruction] {
            prop_assert_eq!(compute(kind, &name), compute(kind, &name));
        }
    }

    #[test]
    fn snake_case_is_idempotent(name in "[A-Za-z0-9_]{0,32}") {
        let once = to_snake_case(&name);
        prop_assert_eq!(to_snake_case(&once), once);
    }

    #[test]
    fn instruction_discriminator_ignores_case_style(name in "[A-Za-z][A-Za-z0-9]{0,31}") {
        prop_assert_eq!(
            compute(DiscriminatorKind::Instruction, &name),
            compute(DiscriminatorKind::Instruction, &to_snake_case(&name))
        );
    }

    #[test]
    fn snake_case_agrees_with_heck(name in "[A-Za-z0-9_ .-]{0,32}") {
        prop_assert_eq!(to_snake_case(&name), name.to_snake_case());
    }
}
