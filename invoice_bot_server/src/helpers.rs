//! Signature helpers for gateway notifications.
//!
//! The gateway signs the *canonical* form of the notification rather than the bytes it sends: the JSON document with
//! object keys sorted at every level and no insignificant whitespace. The signature is the hex-encoded HMAC-SHA512 of
//! that text, keyed with the IPN secret.
use hmac::{Hmac, Mac};
use serde_json::{Number, Value};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Serialises `value` the way `JSON.stringify` does after the gateway sorts the object keys: keys sorted at every
/// nesting level, `,` and `:` as separators and no whitespace.
///
/// Two details follow the JavaScript rules rather than Rust's:
/// * Keys are ordered by UTF-16 code units, not by UTF-8 bytes. The two differ for keys containing characters above
///   U+FFFF next to characters in U+E000..U+FFFF.
/// * Floats use the JavaScript number format. `1.0` is written as `1`, `-0.0` as `0` and magnitudes of `1e21` and
///   above (or below `1e-6`) in exponent form with an explicit sign, e.g. `1e+21`.
///
/// Integers are written exactly, so ids above 2^53 keep digits that JavaScript would round away.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries = map.iter().collect::<Vec<_>>();
            entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        },
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        },
        Value::Number(n) => out.push_str(&js_number(n)),
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn js_number(n: &Number) -> String {
    match n.as_f64() {
        Some(x) if n.is_f64() => js_float(x),
        _ => n.to_string(),
    }
}

fn js_float(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&x.abs()) {
        // Display never switches to exponent form and prints the shortest digits that round-trip
        return format!("{x}");
    }
    let s = format!("{x:e}");
    if s.contains("e-") {
        s
    } else {
        s.replacen('e', "e+", 1)
    }
}

/// Hex-encoded (lower case) HMAC-SHA512 of `data` keyed with `secret`.
pub fn calculate_ipn_signature(secret: &str, data: &[u8]) -> Option<String> {
    let mac = keyed_mac(secret)?.chain_update(data);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Checks the hex signature from the notification header against the canonical form of `body`.
///
/// Returns false if the signature is not valid hex or does not match. The digest comparison is constant-time.
pub fn verify_ipn_signature(secret: &str, body: &Value, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Some(mac) = keyed_mac(secret) else {
        return false;
    };
    let canonical = canonical_json(body);
    mac.chain_update(canonical.as_bytes()).verify_slice(&expected).is_ok()
}

fn keyed_mac(secret: &str) -> Option<HmacSha512> {
    // HMAC takes keys of any length
    HmacSha512::new_from_slice(secret.as_bytes()).ok()
}
