//! VestingLedger v1: Canonical Hashing
//!
//! Deterministic canonical serialization + SHA-256 hashing.
//!
//! Rules:
//!   - Accounts, allowances, grantors, pausers and uniform schedules in key
//!     order (UTF-8 bytes)
//!   - Amounts as decimal strings (u128 does not fit a JSON number)
//!   - Object fields in fixed insertion order
//!   - UTF-8 JSON, no whitespace, no float

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{
    Account, Amount, Grant, GrantorRestrictions, GrantorRole, LedgerState, VestingSchedule,
};
use crate::LEDGER_VERSION;

/// Canonical serialization of LedgerState to UTF-8 JSON bytes.
/// `ledger_version` is the first field.
pub fn canonical_serialize(state: &LedgerState) -> Vec<u8> {
    build_canonical_value(state).to_string().into_bytes()
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(state: &LedgerState) -> String {
    sha256_hex(&canonical_serialize(state))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn amount(v: Amount) -> Value {
    Value::String(v.to_string())
}

fn obj(fields: Vec<(&str, Value)>) -> Value {
    let mut map = Map::new();
    for (k, v) in fields {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

fn schedule_value(s: &VestingSchedule) -> Value {
    obj(vec![
        ("duration", s.duration.into()),
        ("cliff_duration", s.cliff_duration.into()),
        ("interval", s.interval.into()),
        ("is_revocable", s.is_revocable.into()),
    ])
}

fn restrictions_value(r: &GrantorRestrictions) -> Value {
    obj(vec![
        ("min_start_day", r.min_start_day.into()),
        ("max_start_day", r.max_start_day.into()),
        ("expiration_day", r.expiration_day.into()),
    ])
}

fn grant_value(g: &Grant) -> Value {
    obj(vec![
        ("grantor", Value::String(g.grantor.clone())),
        ("total_amount", amount(g.total_amount)),
        ("vesting_amount", amount(g.vesting_amount)),
        ("start_day", g.start_day.into()),
        ("schedule", schedule_value(&g.schedule)),
        ("is_active", g.is_active.into()),
        ("was_revoked", g.was_revoked.into()),
    ])
}

fn account_value(id: &str, a: &Account) -> Value {
    // BTreeMap is already sorted by spender
    let allowances: Vec<Value> = a
        .allowances
        .iter()
        .map(|(spender, v)| {
            obj(vec![
                ("spender", Value::String(spender.clone())),
                ("amount", amount(*v)),
            ])
        })
        .collect();

    obj(vec![
        ("id", Value::String(id.to_string())),
        ("balance", amount(a.balance)),
        ("registered", a.registered.into()),
        (
            "display_name",
            a.display_name.clone().map(Value::String).unwrap_or(Value::Null),
        ),
        ("allowances", Value::Array(allowances)),
        ("grant", a.grant.as_ref().map(grant_value).unwrap_or(Value::Null)),
    ])
}

fn grantor_value(id: &str, role: &GrantorRole) -> Value {
    match role {
        GrantorRole::Standard => obj(vec![
            ("id", Value::String(id.to_string())),
            ("kind", Value::String("standard".into())),
        ]),
        GrantorRole::Uniform(config) => obj(vec![
            ("id", Value::String(id.to_string())),
            ("kind", Value::String("uniform".into())),
            (
                "restrictions",
                config
                    .restrictions
                    .as_ref()
                    .map(restrictions_value)
                    .unwrap_or(Value::Null),
            ),
            (
                "schedule",
                config.schedule.as_ref().map(schedule_value).unwrap_or(Value::Null),
            ),
        ]),
    }
}

/// Field order: ledger_version, token, total_supply, paused, killed, roles,
/// accounts
fn build_canonical_value(state: &LedgerState) -> Value {
    let token = obj(vec![
        ("name", Value::String(state.token.name.clone())),
        ("symbol", Value::String(state.token.symbol.clone())),
        ("decimals", state.token.decimals.into()),
    ]);

    let roles = obj(vec![
        ("owner", Value::String(state.roles.owner.clone())),
        (
            "grantors",
            Value::Array(
                state
                    .roles
                    .grantors
                    .iter()
                    .map(|(id, role)| grantor_value(id, role))
                    .collect(),
            ),
        ),
        (
            "pausers",
            Value::Array(state.roles.pausers.iter().cloned().map(Value::String).collect()),
        ),
        (
            "uniform_schedules",
            Value::Array(
                state
                    .roles
                    .uniform_schedules
                    .iter()
                    .map(|(id, schedule)| {
                        obj(vec![
                            ("id", Value::String(id.clone())),
                            ("schedule", schedule_value(schedule)),
                        ])
                    })
                    .collect(),
            ),
        ),
    ]);

    let accounts: Vec<Value> = state
        .accounts
        .iter()
        .map(|(id, a)| account_value(id, a))
        .collect();

    obj(vec![
        ("ledger_version", LEDGER_VERSION.into()),
        ("token", token),
        ("total_supply", amount(state.total_supply)),
        ("paused", state.paused.into()),
        ("killed", state.killed.into()),
        ("roles", roles),
        ("accounts", Value::Array(accounts)),
    ])
}
