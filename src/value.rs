use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// How many times [`Value::resolve`] follows a [`LogValue`] before giving up.
pub const MAX_LOG_VALUE_DEPTH: usize = 8;

/// Placeholder emitted when a [`LogValue`] chain does not terminate.
pub const LOG_VALUE_DEPTH_PLACEHOLDER: &str = "!ERROR:LogValue called too many times";

/// Opt-in capability for types that control their own logged form.
///
/// The returned [`Value`] replaces the original wherever it is logged, which
/// is how secrets are kept out of output:
///
/// ```
/// use structured_log_chain::value::{LogValue, Value};
///
/// struct Password(String);
///
/// impl LogValue for Password {
///     fn log_value(&self) -> Value {
///         Value::from("[SECRET]")
///     }
/// }
/// ```
///
/// `log_value` is called when the value is formatted, not when it is
/// attached to a record.
pub trait LogValue: Send + Sync {
    fn log_value(&self) -> Value;
}

/// Discriminant of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Int64,
    Uint64,
    Float64,
    Bool,
    Duration,
    Time,
    Group,
    Any,
    LogValuer,
}

/// A loggable value.
#[derive(Clone)]
pub enum Value {
    String(String),
    Int64(i64),
    Uint64(u64),
    Float64(f64),
    Bool(bool),
    Duration(Duration),
    Time(DateTime<Utc>),
    Group(Vec<Attr>),
    Any(Arc<dyn fmt::Debug + Send + Sync>),
    LogValuer(Arc<dyn LogValue>),
}

impl Value {
    pub fn any<T: fmt::Debug + Send + Sync + 'static>(value: T) -> Self {
        Value::Any(Arc::new(value))
    }

    pub fn valuer<T: LogValue + 'static>(value: T) -> Self {
        Value::LogValuer(Arc::new(value))
    }

    pub fn group(attrs: impl IntoIterator<Item = Attr>) -> Self {
        Value::Group(attrs.into_iter().collect())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::Int64(_) => Kind::Int64,
            Value::Uint64(_) => Kind::Uint64,
            Value::Float64(_) => Kind::Float64,
            Value::Bool(_) => Kind::Bool,
            Value::Duration(_) => Kind::Duration,
            Value::Time(_) => Kind::Time,
            Value::Group(_) => Kind::Group,
            Value::Any(_) => Kind::Any,
            Value::LogValuer(_) => Kind::LogValuer,
        }
    }

    /// Follows [`LogValue`] indirections until a concrete value is reached.
    ///
    /// Only the top level is resolved; members of a group are resolved when
    /// the group itself is walked. Chains longer than
    /// [`MAX_LOG_VALUE_DEPTH`] and panicking implementations degrade to a
    /// placeholder string instead of failing the record.
    pub fn resolve(&self) -> Value {
        let mut current = self.clone();
        for _ in 0..MAX_LOG_VALUE_DEPTH {
            let valuer = match &current {
                Value::LogValuer(valuer) => Arc::clone(valuer),
                _ => return current,
            };
            current = match panic::catch_unwind(AssertUnwindSafe(|| valuer.log_value())) {
                Ok(value) => value,
                Err(payload) => Value::String(format!("!PANIC: {}", panic_message(&*payload))),
            };
        }
        match current {
            Value::LogValuer(_) => Value::String(LOG_VALUE_DEPTH_PLACEHOLDER.to_string()),
            other => other,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "LogValue panicked"
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            Value::Uint64(v) => f.debug_tuple("Uint64").field(v).finish(),
            Value::Float64(v) => f.debug_tuple("Float64").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            Value::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Value::Group(attrs) => f.debug_tuple("Group").field(attrs).finish(),
            Value::Any(v) => f.debug_tuple("Any").field(v).finish(),
            Value::LogValuer(_) => f.write_str("LogValuer(..)"),
        }
    }
}

/// Renders durations in compact unit form: `42s`, `1m30s`, `1.5ms`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", with_fraction(nanos, 1_000));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", with_fraction(nanos, 1_000_000));
    }

    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = with_fraction(
        u128::from(total_secs % 60) * 1_000_000_000 + u128::from(d.subsec_nanos()),
        1_000_000_000,
    );
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

fn with_fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{:0width$}", rem, width = width);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// A key/value pair attached to a record.
///
/// Keys are not required to be unique; duplicates are kept in insertion
/// order all the way to the output.
#[derive(Debug, Clone)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Attr { key: key.into(), value: value.into() }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Attr::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Attr::new(key, Value::Int64(value))
    }

    pub fn uint(key: impl Into<String>, value: u64) -> Self {
        Attr::new(key, Value::Uint64(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Attr::new(key, Value::Float64(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Attr::new(key, Value::Bool(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Attr::new(key, Value::Duration(value))
    }

    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Attr::new(key, Value::Time(value))
    }

    pub fn group(key: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> Self {
        Attr::new(key, Value::group(attrs))
    }

    pub fn any<T: fmt::Debug + Send + Sync + 'static>(key: impl Into<String>, value: T) -> Self {
        Attr::new(key, Value::any(value))
    }

    pub fn valuer<T: LogValue + 'static>(key: impl Into<String>, value: T) -> Self {
        Attr::new(key, Value::valuer(value))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int64(v as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Uint64(v as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float64(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(attrs: Vec<Attr>) -> Self {
        Value::Group(attrs)
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(map: BTreeMap<String, V>) -> Self {
        Value::Group(map.into_iter().map(|(k, v)| Attr::new(k, v)).collect())
    }
}

impl<V: Into<Value>> From<HashMap<String, V>> for Value {
    fn from(map: HashMap<String, V>) -> Self {
        let mut entries: Vec<(String, V)> = map.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Group(entries.into_iter().map(|(k, v)| Attr::new(k, v)).collect())
    }
}

struct Nil;

impl fmt::Debug for Nil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<nil>")
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::any(Nil),
        }
    }
}
