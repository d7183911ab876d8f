//! Native bindings installed into the global scope before a program runs.

use std::rc::Rc;

use chrono::Utc;
use log::debug;

use crate::callable::{Callable, NativeFunction};
use crate::environment::Environment;
use crate::value::Value;

/// Host time source: fractional seconds since a host-chosen epoch.
pub type Clock = Rc<dyn Fn() -> f64>;

/// Wall-clock seconds since the Unix epoch, with microsecond resolution.
pub fn system_clock() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// The zero-argument `clock` native, backed by `source`.
pub fn clock(source: Clock) -> NativeFunction {
    NativeFunction {
        name: "clock".to_string(),
        arity: 0,
        func: Box::new(move |_args: &[Value]| -> Result<Value, String> {
            let now = source();
            debug!("Native function 'clock' returned: {}", now);
            Ok(Value::Number(now))
        }),
    }
}

/// Define every native in `globals`.
pub fn install(globals: &mut Environment, clock_source: Clock) {
    globals.define(
        "clock",
        Value::Callable(Callable::Native(Rc::new(clock(clock_source)))),
    );
}
