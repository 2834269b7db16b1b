//! Value comparison
//!
//! Three relations are defined over values:
//!
//! - equality (`values_equal`): same domain and value-equal. Integer and Double
//!   compare numerically, `-0.0 == 0.0`, NaN equals nothing.
//! - domain ordering (`partial_cmp_values`): defined only within one domain and
//!   never for NaN. Arrays and maps compare lexicographically and inherit any
//!   undefined element comparison.
//! - total ordering (`total_cmp_values`): every pair of values is ordered.
//!   Domains follow `TypeOrder` and NaN sorts first among numbers.
//!
//! Integer/Double comparisons are exact; no integer is ever cast to `f64`.

use std::cmp::Ordering;

use super::value::{MapValue, Value};

/// 2^63 as a double. Every double at or above it is greater than any i64.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

pub fn values_equal(a: &Value, b: &Value) -> bool {
    if a.type_order() != b.type_order() {
        return false;
    }

    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Double(x), Value::Double(y)) => x == y,
        (Value::Integer(i), Value::Double(d)) | (Value::Double(d), Value::Integer(i)) => {
            !d.is_nan() && cmp_int_double(*i, *d) == Ordering::Equal
        }
        (Value::Timestamp(x), Value::Timestamp(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Reference(x), Value::Reference(y)) => x == y,
        (Value::GeoPoint(x), Value::GeoPoint(y)) => {
            x.latitude == y.latitude && x.longitude == y.longitude
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Value::Vector(x), Value::Vector(y)) => x == y,
        _ => match (a.map_entries(), b.map_entries()) {
            (Some(x), Some(y)) => maps_equal(&x, &y),
            _ => false,
        },
    }
}

fn maps_equal(a: &MapValue, b: &MapValue) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(k, v)| b.get(k).map_or(false, |other| values_equal(v, other)))
}

pub fn partial_cmp_values(a: &Value, b: &Value) -> Option<Ordering> {
    if a.type_order() != b.type_order() {
        return None;
    }

    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
        (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
        (Value::Double(x), Value::Double(y)) => x.partial_cmp(y),
        (Value::Integer(i), Value::Double(d)) => {
            (!d.is_nan()).then(|| cmp_int_double(*i, *d))
        }
        (Value::Double(d), Value::Integer(i)) => {
            (!d.is_nan()).then(|| cmp_int_double(*i, *d).reverse())
        }
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bytes(x), Value::Bytes(y)) => Some(x.cmp(y)),
        (Value::Reference(x), Value::Reference(y)) => Some(x.cmp(y)),
        (Value::GeoPoint(x), Value::GeoPoint(y)) => {
            match x.latitude.partial_cmp(&y.latitude)? {
                Ordering::Equal => x.longitude.partial_cmp(&y.longitude),
                ord => Some(ord),
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                match partial_cmp_values(l, r)? {
                    Ordering::Equal => continue,
                    ord => return Some(ord),
                }
            }
            Some(x.len().cmp(&y.len()))
        }
        _ => {
            let x = a.map_entries()?;
            let y = b.map_entries()?;
            partial_cmp_maps(&x, &y)
        }
    }
}

fn partial_cmp_maps(a: &MapValue, b: &MapValue) -> Option<Ordering> {
    let left = sorted_entries(a);
    let right = sorted_entries(b);

    for ((lk, lv), (rk, rv)) in left.iter().zip(&right) {
        match lk.cmp(rk) {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
        match partial_cmp_values(lv, rv)? {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
    }
    Some(left.len().cmp(&right.len()))
}

pub fn total_cmp_values(a: &Value, b: &Value) -> Ordering {
    let by_type = a.type_order().cmp(&b.type_order());
    if by_type != Ordering::Equal {
        return by_type;
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Double(x), Value::Double(y)) => total_cmp_doubles(*x, *y),
        (Value::Integer(i), Value::Double(d)) => total_cmp_int_double(*i, *d),
        (Value::Double(d), Value::Integer(i)) => total_cmp_int_double(*i, *d).reverse(),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
        (Value::Reference(x), Value::Reference(y)) => x.cmp(y),
        (Value::GeoPoint(x), Value::GeoPoint(y)) => total_cmp_doubles(x.latitude, y.latitude)
            .then_with(|| total_cmp_doubles(x.longitude, y.longitude)),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(l, r)| total_cmp_values(l, r))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => match (a.map_entries(), b.map_entries()) {
            (Some(x), Some(y)) => total_cmp_maps(&x, &y),
            // unreachable for same-domain values
            _ => Ordering::Equal,
        },
    }
}

fn total_cmp_maps(a: &MapValue, b: &MapValue) -> Ordering {
    let left = sorted_entries(a);
    let right = sorted_entries(b);

    for ((lk, lv), (rk, rv)) in left.iter().zip(&right) {
        let ord = lk.cmp(rk).then_with(|| total_cmp_values(lv, rv));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len())
}

fn sorted_entries(map: &MapValue) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|l, r| l.0.cmp(r.0));
    entries
}

/// NaN first and equal to itself; -0.0 equals 0.0.
fn total_cmp_doubles(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn total_cmp_int_double(i: i64, d: f64) -> Ordering {
    if d.is_nan() {
        Ordering::Greater
    } else {
        cmp_int_double(i, d)
    }
}

/// Exact comparison of an integer against a non-NaN double.
fn cmp_int_double(i: i64, d: f64) -> Ordering {
    if d >= TWO_POW_63 {
        return Ordering::Less;
    }
    if d < -TWO_POW_63 {
        return Ordering::Greater;
    }

    // |trunc(d)| < 2^63 here, so the cast is exact
    let whole = d.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => {
            let frac = d - whole;
            if frac > 0.0 {
                Ordering::Less
            } else if frac < 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
        ord => ord,
    }
}
