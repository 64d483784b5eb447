//! [`figment::Provider`] for loaded property sources.
//!
//! Dotted keys nest: `server.port=8080` becomes `{server: {port: 8080}}`.
//! Values are parsed the way figment parses environment variables, so
//! `8080` extracts as a number and `true` as a bool.

use std::str::FromStr;

use figment::value::{Dict, Map, Value};
use figment::{Error, Metadata, Profile, Provider};

use crate::domain::models::PropertySource;

impl Provider for PropertySource {
    fn metadata(&self) -> Metadata {
        Metadata::named(format!("property source `{}`", self.name()))
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        for entry in self.entries() {
            let value = match Value::from_str(entry.value()) {
                Ok(value) => value,
                Err(never) => match never {},
            };
            if let Value::Dict(_, nested) = figment::util::nest(entry.key(), value) {
                merge_into(&mut dict, nested);
            }
        }

        Ok(Profile::Default.collect(dict))
    }
}

/// Recursively merge `incoming` into `target`; scalars in `incoming` win.
fn merge_into(target: &mut Dict, incoming: Dict) {
    for (key, value) in incoming {
        match value {
            Value::Dict(tag, nested) => match target.get_mut(&key) {
                Some(Value::Dict(_, existing)) => merge_into(existing, nested),
                _ => {
                    target.insert(key, Value::Dict(tag, nested));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}
