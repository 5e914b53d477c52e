/*
 * vRelay HTTP to SMTP relay gateway
 * Copyright (C) 2023 viridIT SAS
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * this program. If not, see https://www.gnu.org/licenses/.
 *
*/

/// A validated email address, kept as the full `local-part@domain` string
/// plus the position of the separator.
#[derive(Clone, Debug, Eq, serde_with::SerializeDisplay, serde_with::DeserializeFromStr)]
pub struct Address {
    at_sign: usize,
    full: String,
}

/// Syntax sugar to build an [`Address`] from a literal.
///
/// # Panics
///
/// if the argument is not a valid address
#[macro_export]
macro_rules! addr {
    ($e:expr) => {
        <$crate::Address as core::str::FromStr>::from_str($e).unwrap()
    };
}

impl std::str::FromStr for Address {
    type Err = anyhow::Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Err(error) = addr::parse_email_address(s) {
            anyhow::bail!("'{s}' is not a valid address: {error}")
        }
        match s.find('@') {
            Some(at_sign) => Ok(Self {
                at_sign,
                full: s.to_owned(),
            }),
            None => anyhow::bail!("'{s}' is not a valid address: no '@' character"),
        }
    }
}

impl PartialEq for Address {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.full == other.full
    }
}

impl std::hash::Hash for Address {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.full.hash(state);
    }
}

impl std::fmt::Display for Address {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full)
    }
}

impl Address {
    /// get the full email address.
    #[must_use]
    #[inline]
    pub fn full(&self) -> &str {
        &self.full
    }

    /// get the user part of the address.
    #[must_use]
    #[inline]
    pub fn local_part(&self) -> &str {
        &self.full[..self.at_sign]
    }

    /// get the domain of the address.
    #[must_use]
    #[inline]
    pub fn domain(&self) -> &str {
        &self.full[self.at_sign + 1..]
    }

    /// Convert to the address type used by the SMTP envelope.
    ///
    /// # Errors
    ///
    /// * the address is refused by the transport library (stricter than
    ///   the RFC 5322 check done at parse time)
    #[inline]
    pub fn to_lettre(&self) -> anyhow::Result<lettre::Address> {
        lettre::Address::new(self.local_part(), self.domain())
            .map_err(|e| anyhow::anyhow!("'{}' rejected by the transport: {e}", self.full))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserialize() {
        let parsed = serde_json::from_str::<Address>(r#""hello@domain.com""#).unwrap();
        assert_eq!(parsed, addr!("hello@domain.com"));
        assert_eq!(parsed.local_part(), "hello");
        assert_eq!(parsed.domain(), "domain.com");
    }

    #[test]
    fn serialize() {
        assert_eq!(
            serde_json::to_string(&addr!("hello@domain.com")).unwrap(),
            r#""hello@domain.com""#
        );
    }

    #[test]
    fn invalid_is_rejected() {
        assert!("not-an-address".parse::<Address>().is_err());
        assert!("a@".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }
}
