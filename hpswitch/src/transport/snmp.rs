//! SNMP transport contract.
//!
//! The crate does not embed an SNMP engine. Callers plug one in by
//! implementing [`SnmpTransport`] for it; the reconciler only issues
//! GET, GETNEXT and SET requests through this trait.

use std::fmt;
use std::future::Future;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An SNMP object identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn from_slice(arcs: &[u32]) -> Self {
        Oid(arcs.to_vec())
    }

    /// This OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.0.clone();
        arcs.push(arc);
        Oid(arcs)
    }

    /// This OID with `arcs` appended.
    pub fn extend(&self, arcs: &[u32]) -> Oid {
        let mut out = self.0.clone();
        out.extend_from_slice(arcs);
        Oid(out)
    }

    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Arcs after `prefix`, or `None` if this OID is outside it.
    pub fn suffix(&self, prefix: &Oid) -> Option<&[u32]> {
        self.0.strip_prefix(prefix.0.as_slice())
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let arcs = s
            .trim()
            .trim_start_matches('.')
            .split('.')
            .map(|arc| arc.parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::invalid(format!("'{}' is not a numeric OID", s)))?;
        if arcs.len() < 2 {
            return Err(Error::invalid(format!("OID '{}' is too short", s)));
        }
        Ok(Oid(arcs))
    }
}

/// A value carried in an SNMP variable binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Integer(i64),
    OctetString(Vec<u8>),
    ObjectId(Oid),
    IpAddress(Ipv4Addr),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Counter64(u64),
    Null,
}

impl SnmpValue {
    /// Octet string from text.
    pub fn string(s: impl Into<String>) -> Self {
        SnmpValue::OctetString(s.into().into_bytes())
    }

    /// Numeric value of any integer-like type.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SnmpValue::Integer(v) => Some(*v),
            SnmpValue::Counter32(v) | SnmpValue::Gauge32(v) | SnmpValue::TimeTicks(v) => {
                Some(i64::from(*v))
            }
            SnmpValue::Counter64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SnmpValue::OctetString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Octet string as text, trailing NULs removed.
    pub fn as_string(&self) -> Option<String> {
        self.as_bytes()
            .map(|b| String::from_utf8_lossy(b).trim_end_matches('\0').to_string())
    }

    pub fn as_ip(&self) -> Option<Ipv4Addr> {
        match self {
            SnmpValue::IpAddress(ip) => Some(*ip),
            SnmpValue::OctetString(b) if b.len() == 4 => Some(Ipv4Addr::new(b[0], b[1], b[2], b[3])),
            _ => None,
        }
    }
}

impl fmt::Display for SnmpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnmpValue::Integer(v) => write!(f, "INTEGER {}", v),
            SnmpValue::OctetString(bytes) => {
                if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
                    write!(f, "STRING \"{}\"", String::from_utf8_lossy(bytes))
                } else {
                    f.write_str("Hex-STRING")?;
                    for b in bytes {
                        write!(f, " {:02X}", b)?;
                    }
                    Ok(())
                }
            }
            SnmpValue::ObjectId(oid) => write!(f, "OID {}", oid),
            SnmpValue::IpAddress(ip) => write!(f, "IpAddress {}", ip),
            SnmpValue::Counter32(v) => write!(f, "Counter32 {}", v),
            SnmpValue::Gauge32(v) => write!(f, "Gauge32 {}", v),
            SnmpValue::TimeTicks(v) => write!(f, "Timeticks {}", v),
            SnmpValue::Counter64(v) => write!(f, "Counter64 {}", v),
            SnmpValue::Null => f.write_str("NULL"),
        }
    }
}

/// Access to a switch's SNMP agent.
///
/// Implementations map protocol failures to [`Error::Snmp`] and request
/// timeouts to [`Error::Timeout`].
pub trait SnmpTransport: Send + Sync {
    /// GET one object. `Ok(None)` for noSuchObject/noSuchInstance.
    fn get(&self, oid: &Oid) -> impl Future<Output = Result<Option<SnmpValue>>> + Send;

    /// GETNEXT. `Ok(None)` at endOfMibView.
    fn get_next(&self, oid: &Oid) -> impl Future<Output = Result<Option<(Oid, SnmpValue)>>> + Send;

    /// SET all bindings in one PDU.
    fn set(&self, bindings: &[(Oid, SnmpValue)]) -> impl Future<Output = Result<()>> + Send;

    /// Walk the subtree under `root` with repeated GETNEXT.
    fn walk(&self, root: &Oid) -> impl Future<Output = Result<Vec<(Oid, SnmpValue)>>> + Send {
        async move {
            let mut rows = Vec::new();
            let mut cursor = root.clone();
            while let Some((oid, value)) = self.get_next(&cursor).await? {
                if !oid.starts_with(root) || oid <= cursor {
                    break;
                }
                cursor = oid.clone();
                rows.push((oid, value));
            }
            Ok(rows)
        }
    }
}

/// Placeholder SNMP type for a switch managed over CLI only.
///
/// Uninhabited: a `Reconciler<_, NoSnmp>` never holds an SNMP transport.
#[derive(Debug)]
pub enum NoSnmp {}

impl SnmpTransport for NoSnmp {
    async fn get(&self, _oid: &Oid) -> Result<Option<SnmpValue>> {
        match *self {}
    }

    async fn get_next(&self, _oid: &Oid) -> Result<Option<(Oid, SnmpValue)>> {
        match *self {}
    }

    async fn set(&self, _bindings: &[(Oid, SnmpValue)]) -> Result<()> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_parse_and_display() {
        let oid: Oid = ".1.3.6.1.2.1.17.7.1.4.3.1.1".parse().unwrap();
        assert_eq!(oid.to_string(), "1.3.6.1.2.1.17.7.1.4.3.1.1");
        assert_eq!(oid.child(10).suffix(&oid), Some(&[10u32][..]));
        assert!("1.3.x".parse::<Oid>().is_err());
        assert!("1".parse::<Oid>().is_err());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(SnmpValue::string("eng\0").as_string().as_deref(), Some("eng"));
        assert_eq!(SnmpValue::Gauge32(7).as_int(), Some(7));
        assert_eq!(
            SnmpValue::OctetString(vec![10, 0, 0, 1]).as_ip(),
            Some(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert_eq!(SnmpValue::Integer(4).to_string(), "INTEGER 4");
        assert_eq!(SnmpValue::OctetString(vec![0x80, 0x01]).to_string(), "Hex-STRING 80 01");
    }

    struct Table(Vec<(Oid, SnmpValue)>);

    impl SnmpTransport for Table {
        async fn get(&self, oid: &Oid) -> Result<Option<SnmpValue>> {
            Ok(self.0.iter().find(|(o, _)| o == oid).map(|(_, v)| v.clone()))
        }

        async fn get_next(&self, oid: &Oid) -> Result<Option<(Oid, SnmpValue)>> {
            Ok(self.0.iter().find(|(o, _)| o > oid).cloned())
        }

        async fn set(&self, _bindings: &[(Oid, SnmpValue)]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_walk_stops_at_subtree_end() {
        let oid = |s: &str| s.parse::<Oid>().unwrap();
        let table = Table(vec![
            (oid("1.3.6.1.2.1.2.2.1.2.1"), SnmpValue::string("1")),
            (oid("1.3.6.1.2.1.2.2.1.2.2"), SnmpValue::string("2")),
            (oid("1.3.6.1.2.1.2.2.1.3.1"), SnmpValue::Integer(6)),
        ]);

        let rows = tokio_test::block_on(table.walk(&oid("1.3.6.1.2.1.2.2.1.2"))).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].1.as_string().as_deref(), Some("2"));
        assert!(tokio_test::block_on(table.walk(&oid("1.3.6.1.4"))).unwrap().is_empty());
    }
}
