// Header-shape adapter
//
// Callers may describe request headers as a plain map, a list of pairs, or
// a ready-made `HeaderMap`. The client only ever needs one operation on
// them, "set the Authorization header", so that operation lives here and
// nowhere else.

use std::collections::HashMap;
use std::hash::BuildHasher;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::error::Error;

/// Anything the client can stamp an `Authorization` header onto.
///
/// Implementations replace any existing `Authorization` entry (matched
/// case-insensitively) rather than adding a second one.
pub trait AuthorizationSlot {
    fn set_authorization(&mut self, value: &str) -> Result<(), Error>;
}

impl AuthorizationSlot for HeaderMap {
    fn set_authorization(&mut self, value: &str) -> Result<(), Error> {
        let mut header = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
            name: AUTHORIZATION.to_string(),
            reason: e.to_string(),
        })?;
        header.set_sensitive(true);
        self.insert(AUTHORIZATION, header);
        Ok(())
    }
}

impl AuthorizationSlot for Vec<(String, String)> {
    fn set_authorization(&mut self, value: &str) -> Result<(), Error> {
        self.retain(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION.as_str()));
        self.push(("Authorization".to_owned(), value.to_owned()));
        Ok(())
    }
}

impl<S: BuildHasher> AuthorizationSlot for HashMap<String, String, S> {
    fn set_authorization(&mut self, value: &str) -> Result<(), Error> {
        self.retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION.as_str()));
        self.insert("Authorization".to_owned(), value.to_owned());
        Ok(())
    }
}

/// The three header container shapes a request may arrive with.
#[derive(Debug, Clone)]
pub enum RequestHeaders {
    /// Plain name -> value mapping.
    Map(HashMap<String, String>),
    /// Ordered list of `(name, value)` pairs; names may repeat.
    Pairs(Vec<(String, String)>),
    /// An HTTP header object.
    Object(HeaderMap),
}

impl Default for RequestHeaders {
    fn default() -> Self {
        Self::Object(HeaderMap::new())
    }
}

impl RequestHeaders {
    /// First value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            Self::Map(map) => map
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
            Self::Pairs(pairs) => pairs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
            Self::Object(map) => map
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
        }
    }

    /// Normalize into a `HeaderMap` for the HTTP layer.
    pub fn into_header_map(self) -> Result<HeaderMap, Error> {
        match self {
            Self::Object(map) => Ok(map),
            Self::Map(map) => collect_pairs(map),
            Self::Pairs(pairs) => collect_pairs(pairs),
        }
    }
}

impl AuthorizationSlot for RequestHeaders {
    fn set_authorization(&mut self, value: &str) -> Result<(), Error> {
        match self {
            Self::Map(map) => map.set_authorization(value),
            Self::Pairs(pairs) => pairs.set_authorization(value),
            Self::Object(map) => map.set_authorization(value),
        }
    }
}

impl From<HashMap<String, String>> for RequestHeaders {
    fn from(map: HashMap<String, String>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<(String, String)>> for RequestHeaders {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::Pairs(pairs)
    }
}

impl From<HeaderMap> for RequestHeaders {
    fn from(map: HeaderMap) -> Self {
        Self::Object(map)
    }
}

fn collect_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Result<HeaderMap, Error> {
    let mut out = HeaderMap::new();
    for (name, value) in pairs {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let mut header_value = HeaderValue::from_str(&value).map_err(|e| Error::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        if header_name == AUTHORIZATION {
            header_value.set_sensitive(true);
        }
        out.append(header_name, header_value);
    }
    Ok(out)
}
