// 📍 Location Resolver - nested coordinates → "lat,long"
//
// A record's `location` looks like:
//   { "obfuscation_required": bool,
//     "coordinates":            { "latitude": .., "longitude": .. },
//     "obfuscated_coordinates": { "latitude": .., "longitude": .. } }
//
// The flag picks which pair is published. Anything unreadable degrades to
// no location; it never fails the record.

use serde_json::{Map, Value};

use crate::coerce::{coordinate_text, is_truthy, type_name};
use crate::error::{Diagnostic, Subject};

pub const OBFUSCATION_FLAG: &str = "obfuscation_required";
pub const PLAIN_COORDINATES: &str = "coordinates";
pub const OBFUSCATED_COORDINATES: &str = "obfuscated_coordinates";

/// Outcome of resolving a location: `Ok(None)` when the record has none,
/// `Err` when one was present but could not be read.
pub type Resolution = Result<Option<String>, Diagnostic>;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocationResolver;

impl LocationResolver {
    pub fn new() -> Self {
        LocationResolver
    }

    pub fn resolve(&self, location: Option<&Value>) -> Resolution {
        let location = match location {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(Diagnostic::warning(
                    Subject::Location,
                    format!("expected an object, found {}", type_name(other)),
                ))
            }
        };

        let source_key = Self::coordinate_source(location);
        let source = match location.get(source_key) {
            Some(Value::Object(pair)) => pair,
            Some(other) => {
                return Err(Diagnostic::warning(
                    Subject::Location,
                    format!("{} is a {}, expected an object", source_key, type_name(other)),
                ))
            }
            None => {
                return Err(Diagnostic::warning(
                    Subject::Location,
                    format!("{} is missing", source_key),
                ))
            }
        };

        let latitude = source.get("latitude").and_then(coordinate_text);
        let longitude = source.get("longitude").and_then(coordinate_text);

        match (latitude, longitude) {
            (Some(lat), Some(long)) => Ok(Some(format!("{},{}", lat, long))),
            _ => Err(Diagnostic::warning(
                Subject::Location,
                format!("{} lacks a readable latitude or longitude", source_key),
            )),
        }
    }

    /// Unreadable or missing flag means plain coordinates.
    fn coordinate_source(location: &Map<String, Value>) -> &'static str {
        if is_truthy(location.get(OBFUSCATION_FLAG)) {
            OBFUSCATED_COORDINATES
        } else {
            PLAIN_COORDINATES
        }
    }
}
