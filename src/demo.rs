// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Sample scopes used by the `prodwatch` binary.
//!
//! `calculator.calculate_sum` is the function the `run` command keeps calling;
//! `bank.Account` has one member of every watchable kind.

use std::sync::Arc;

use crate::error::{Result, RuntimeError};
use crate::runtime::{Binding, LoadedScopes, NativeFunction, Scope, TypeObject};
use crate::types::{CallArgs, Value};

/// Coerce a value to an integer the way `calculate_sum` accepts its inputs.
fn to_int(value: Option<&Value>, name: &str) -> Result<i64> {
    match value {
        Some(Value::Int(i)) => Ok(*i),
        Some(Value::Float(f)) => Ok(f.trunc() as i64),
        Some(Value::Bool(b)) => Ok(i64::from(*b)),
        Some(Value::Str(s)) => s.trim().parse().map_err(|_| {
            RuntimeError::InvalidArgument(format!("invalid literal for int(): '{s}'")).into()
        }),
        Some(other) => Err(RuntimeError::InvalidArgument(format!(
            "'{name}' must be a number, not {}",
            other.type_name()
        ))
        .into()),
        None => Err(RuntimeError::InvalidArgument(format!("missing argument '{name}'")).into()),
    }
}

fn calculate_sum(args: CallArgs) -> Result<Value> {
    let a = to_int(args.get(0, "a"), "a")?;
    let b = to_int(args.get(1, "b"), "b")?;
    let sum = a
        .checked_add(b)
        .ok_or_else(|| RuntimeError::InvalidArgument("integer overflow".to_string()))?;
    println!("{a} + {b} = {sum}");
    Ok(Value::Int(sum))
}

fn account_type() -> Arc<TypeObject> {
    TypeObject::new("Account")
        .with_value("currency", Value::from("EUR"))
        .with_method(
            Binding::Class,
            NativeFunction::new("bank_name", |_| Ok(Value::from("Prodwatch Savings")))
                .with_qualname("Account.bank_name")
                .shared(),
        )
        .with_method(
            Binding::Static,
            NativeFunction::new("interest_rate", |_| Ok(Value::Float(0.025)))
                .with_qualname("Account.interest_rate")
                .shared(),
        )
        .with_method(
            Binding::Instance,
            NativeFunction::new("deposit", |args: CallArgs| {
                let this = args
                    .receiver()
                    .and_then(Value::as_object)
                    .cloned()
                    .ok_or_else(|| RuntimeError::MissingReceiver("Account.deposit".to_string()))?;
                let amount = to_int(args.get(1, "amount"), "amount")?;
                if amount <= 0 {
                    return Err(RuntimeError::InvalidArgument(
                        "deposit amount must be positive".to_string(),
                    )
                    .into());
                }
                let balance = this.field("cents").and_then(|v| v.as_int()).unwrap_or(0) + amount;
                this.set_field("cents", balance);
                Ok(Value::Int(balance))
            })
            .with_qualname("Account.deposit")
            .shared(),
        )
        .with_property(
            NativeFunction::new("balance", |args: CallArgs| {
                let cents = args
                    .receiver()
                    .and_then(Value::as_object)
                    .and_then(|this| this.field("cents"))
                    .and_then(|v| v.as_int())
                    .unwrap_or(0);
                Ok(Value::Float(cents as f64 / 100.0))
            })
            .with_qualname("Account.balance")
            .shared(),
        )
        .shared()
}

/// Build the demo registry: `calculator` then `bank`.
pub fn demo_registry() -> Arc<LoadedScopes> {
    let registry = Arc::new(LoadedScopes::new());
    registry.load(
        Scope::new("calculator")
            .with_file("demo/calculator.rs")
            .with_function(NativeFunction::new("calculate_sum", calculate_sum).shared()),
    );
    registry.load(
        Scope::new("bank")
            .with_file("demo/bank.rs")
            .with_type(account_type()),
    );
    registry
}
