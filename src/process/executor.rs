/*!
 * Payload Executor
 * Built-in toy commands run by the dispatcher
 */

use super::types::Payload;
use crate::core::errors::PayloadError;
use crate::core::limits::{MAX_FIB_INPUT, MAX_PRIME_INPUT, MAX_SPIN_MILLIS};
use std::time::{Duration, Instant};

/// Runs a payload to completion and returns its textual output
pub trait PayloadRunner: Send + Sync {
    fn run(&self, payload: &Payload) -> Result<String, PayloadError>;
}

/// Built-in arithmetic and message commands
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinRunner;

impl BuiltinRunner {
    pub const COMMANDS: [&'static str; 6] = ["echo", "add", "mul", "fib", "prime", "spin"];

    pub fn new() -> Self {
        Self
    }

    /// Whether a command name is known
    pub fn supports(command: &str) -> bool {
        Self::COMMANDS.contains(&command)
    }
}

impl PayloadRunner for BuiltinRunner {
    fn run(&self, payload: &Payload) -> Result<String, PayloadError> {
        let command = payload.command.as_str();
        let args = payload.args.as_slice();

        match command {
            "echo" => Ok(args.join(" ")),
            "add" => fold_numbers(command, args, 0, i64::checked_add).map(|n| n.to_string()),
            "mul" => fold_numbers(command, args, 1, i64::checked_mul).map(|n| n.to_string()),
            "fib" => {
                let n = single_bounded(command, args, MAX_FIB_INPUT)?;
                Ok(fibonacci(n).to_string())
            }
            "prime" => {
                let n = single_bounded(command, args, MAX_PRIME_INPUT)?;
                Ok(count_primes(n).to_string())
            }
            "spin" => {
                let millis = single_bounded(command, args, MAX_SPIN_MILLIS)?;
                spin(Duration::from_millis(millis));
                Ok(format!("spun {}ms", millis))
            }
            _ => Err(PayloadError::UnknownCommand(command.to_string())),
        }
    }
}

fn parse_i64(command: &str, raw: &str) -> Result<i64, PayloadError> {
    raw.parse().map_err(|_| PayloadError::InvalidArgument {
        command: command.to_string(),
        value: raw.to_string(),
    })
}

fn fold_numbers(
    command: &str,
    args: &[String],
    init: i64,
    op: fn(i64, i64) -> Option<i64>,
) -> Result<i64, PayloadError> {
    if args.is_empty() {
        return Err(PayloadError::MissingArgument {
            command: command.to_string(),
            expected: "at least one integer",
        });
    }

    args.iter().try_fold(init, |acc, raw| {
        let value = parse_i64(command, raw)?;
        op(acc, value).ok_or_else(|| PayloadError::Overflow(command.to_string()))
    })
}

fn single_bounded(command: &str, args: &[String], limit: u64) -> Result<u64, PayloadError> {
    let [raw] = args else {
        return Err(PayloadError::MissingArgument {
            command: command.to_string(),
            expected: "exactly one non-negative integer",
        });
    };

    let value: u64 = raw.parse().map_err(|_| PayloadError::InvalidArgument {
        command: command.to_string(),
        value: raw.clone(),
    })?;

    if value > limit {
        return Err(PayloadError::LimitExceeded {
            command: command.to_string(),
            value,
            limit,
        });
    }
    Ok(value)
}

fn fibonacci(n: u64) -> u64 {
    // b runs one term ahead of a; fib(94) only fits in 128 bits
    let (mut a, mut b) = (0u128, 1u128);
    for _ in 0..n {
        (a, b) = (b, a + b);
    }
    a as u64
}

fn count_primes(n: u64) -> u64 {
    if n < 2 {
        return 0;
    }
    let n = n as usize;
    let mut sieve = vec![true; n + 1];
    sieve[0] = false;
    sieve[1] = false;

    let mut i = 2;
    while i * i <= n {
        if sieve[i] {
            let mut multiple = i * i;
            while multiple <= n {
                sieve[multiple] = false;
                multiple += i;
            }
        }
        i += 1;
    }
    sieve.iter().filter(|&&prime| prime).count() as u64
}

fn spin(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
