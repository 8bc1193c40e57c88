//! Date, time and timestamp logical types.
//!
//! Timestamps count from 1970-01-01T00:00:00 UTC. A zone-less timestamp
//! is taken as already being UTC; no offset is applied. Resolution finer
//! than the declared unit is truncated.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};

use super::{unexpected, LogicalConverter, LogicalTypeRegistry, PrimitiveKind};
use crate::error::LogicalTypeError;
use crate::schema::{AvroSchema, LogicalTypeName};
use crate::value::Value;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

const MILLIS_PER_DAY: i64 = 86_400_000;
const MICROS_PER_DAY: i64 = 86_400_000_000;

#[derive(Clone, Copy)]
enum Unit {
    Millis,
    Micros,
}

impl Unit {
    fn per_second(self) -> i64 {
        match self {
            Unit::Millis => 1_000,
            Unit::Micros => 1_000_000,
        }
    }
}

pub(super) fn register(registry: &mut LogicalTypeRegistry) {
    registry.register(
        PrimitiveKind::Long,
        "timestamp-millis",
        LogicalConverter::new(is_timestamp, encode_ts_millis, decode_ts_millis),
    );
    registry.register(
        PrimitiveKind::Long,
        "timestamp-micros",
        LogicalConverter::new(is_timestamp, encode_ts_micros, decode_ts_micros),
    );
    registry.register(
        PrimitiveKind::Long,
        "local-timestamp-millis",
        LogicalConverter::new(is_timestamp, encode_ts_millis, decode_local_millis),
    );
    registry.register(
        PrimitiveKind::Long,
        "local-timestamp-micros",
        LogicalConverter::new(is_timestamp, encode_ts_micros, decode_local_micros),
    );
    registry.register(
        PrimitiveKind::Int,
        "date",
        LogicalConverter::new(is_date, encode_date, decode_date),
    );
    registry.register(
        PrimitiveKind::Int,
        "time-millis",
        LogicalConverter::new(is_time, encode_time_millis, decode_time_millis),
    );
    registry.register(
        PrimitiveKind::Long,
        "time-micros",
        LogicalConverter::new(is_time, encode_time_micros, decode_time_micros),
    );
}

fn is_timestamp(value: &Value) -> bool {
    matches!(value, Value::Timestamp(_) | Value::LocalTimestamp(_))
}

fn is_date(value: &Value) -> bool {
    matches!(value, Value::Date(_))
}

fn is_time(value: &Value) -> bool {
    matches!(value, Value::Time(_))
}

// ----------------------------------------------------------------------------
// Timestamps
// ----------------------------------------------------------------------------

fn instant(value: &Value, name: &LogicalTypeName) -> Result<DateTime<Utc>, LogicalTypeError> {
    value
        .as_utc_timestamp()
        .ok_or_else(|| unexpected(static_name(name), "timestamp", value))
}

fn encode_ts_millis(
    value: &Value,
    name: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    Ok(Value::Long(instant(value, name)?.timestamp_millis()))
}

fn encode_ts_micros(
    value: &Value,
    name: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    Ok(Value::Long(instant(value, name)?.timestamp_micros()))
}

fn epoch_count(value: Value, logical_type: &'static str) -> Result<i64, LogicalTypeError> {
    match value {
        Value::Long(v) => Ok(v),
        other => Err(unexpected(logical_type, "long", &other)),
    }
}

fn from_epoch(
    count: i64,
    unit: Unit,
    logical_type: &'static str,
) -> Result<DateTime<Utc>, LogicalTypeError> {
    let ts = match unit {
        Unit::Millis => DateTime::from_timestamp_millis(count),
        Unit::Micros => DateTime::from_timestamp_micros(count),
    };
    ts.ok_or(LogicalTypeError::OutOfRange {
        logical_type,
        value: count,
    })
}

fn decode_ts_millis(
    value: Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    let name = "timestamp-millis";
    from_epoch(epoch_count(value, name)?, Unit::Millis, name).map(Value::Timestamp)
}

fn decode_ts_micros(
    value: Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    let name = "timestamp-micros";
    from_epoch(epoch_count(value, name)?, Unit::Micros, name).map(Value::Timestamp)
}

fn decode_local_millis(
    value: Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    let name = "local-timestamp-millis";
    from_epoch(epoch_count(value, name)?, Unit::Millis, name)
        .map(|ts| Value::LocalTimestamp(ts.naive_utc()))
}

fn decode_local_micros(
    value: Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    let name = "local-timestamp-micros";
    from_epoch(epoch_count(value, name)?, Unit::Micros, name)
        .map(|ts| Value::LocalTimestamp(ts.naive_utc()))
}

fn static_name(name: &LogicalTypeName) -> &'static str {
    match name {
        LogicalTypeName::TimestampMillis => "timestamp-millis",
        LogicalTypeName::TimestampMicros => "timestamp-micros",
        LogicalTypeName::LocalTimestampMillis => "local-timestamp-millis",
        LogicalTypeName::LocalTimestampMicros => "local-timestamp-micros",
        _ => "timestamp",
    }
}

// ----------------------------------------------------------------------------
// Date
// ----------------------------------------------------------------------------

fn encode_date(
    value: &Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    match value {
        Value::Date(d) => Ok(Value::Int(d.num_days_from_ce() - EPOCH_DAYS_FROM_CE)),
        other => Err(unexpected("date", "date", other)),
    }
}

fn decode_date(
    value: Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    let days = match value {
        Value::Int(days) => days,
        other => return Err(unexpected("date", "int", &other)),
    };
    days.checked_add(EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(Value::Date)
        .ok_or(LogicalTypeError::OutOfRange {
            logical_type: "date",
            value: days as i64,
        })
}

// ----------------------------------------------------------------------------
// Time of day
// ----------------------------------------------------------------------------

fn since_midnight(time: &NaiveTime, unit: Unit) -> i64 {
    // nanosecond() exceeds 1e9 only on a leap second; clamp into the day
    let nanos = time.nanosecond().min(999_999_999) as i64;
    time.num_seconds_from_midnight() as i64 * unit.per_second()
        + nanos / (1_000_000_000 / unit.per_second())
}

fn time_from_count(
    count: i64,
    unit: Unit,
    logical_type: &'static str,
) -> Result<NaiveTime, LogicalTypeError> {
    let per_day = match unit {
        Unit::Millis => MILLIS_PER_DAY,
        Unit::Micros => MICROS_PER_DAY,
    };
    let out_of_range = LogicalTypeError::OutOfRange {
        logical_type,
        value: count,
    };
    if !(0..per_day).contains(&count) {
        return Err(out_of_range);
    }
    let secs = (count / unit.per_second()) as u32;
    let nanos = ((count % unit.per_second()) * (1_000_000_000 / unit.per_second())) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).ok_or(out_of_range)
}

fn encode_time_millis(
    value: &Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    match value {
        // Always below 86_400_000, fits an int
        Value::Time(t) => Ok(Value::Int(since_midnight(t, Unit::Millis) as i32)),
        other => Err(unexpected("time-millis", "time", other)),
    }
}

fn decode_time_millis(
    value: Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    match value {
        Value::Int(ms) => time_from_count(ms as i64, Unit::Millis, "time-millis").map(Value::Time),
        other => Err(unexpected("time-millis", "int", &other)),
    }
}

fn encode_time_micros(
    value: &Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    match value {
        Value::Time(t) => Ok(Value::Long(since_midnight(t, Unit::Micros))),
        other => Err(unexpected("time-micros", "time", other)),
    }
}

fn decode_time_micros(
    value: Value,
    _: &LogicalTypeName,
    _: &AvroSchema,
) -> Result<Value, LogicalTypeError> {
    match value {
        Value::Long(us) => time_from_count(us, Unit::Micros, "time-micros").map(Value::Time),
        other => Err(unexpected("time-micros", "long", &other)),
    }
}
