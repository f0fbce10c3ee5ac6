//! Engine registry.
//!
//! Maps the vendor-neutral engine names used in requests to backend driver
//! identifiers. The table is a closed, sorted static array searched with a
//! binary search.

use crate::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend driver identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Firebird,
    Mssql,
    Mysql,
    Oracle,
    Pgsql,
    Sqlite,
    Sqlite3,
    Sybase,
}

impl Backend {
    /// Returns the driver identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Firebird => "firebird",
            Self::Mssql => "mssql",
            Self::Mysql => "mysql",
            Self::Oracle => "oracle",
            Self::Pgsql => "pgsql",
            Self::Sqlite => "sqlite",
            Self::Sqlite3 => "sqlite3",
            Self::Sybase => "sybase",
        }
    }

    /// Returns the default port for network backends.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Firebird => Some(3050),
            Self::Mssql => Some(1433),
            Self::Mysql => Some(3306),
            Self::Oracle => Some(1521),
            Self::Pgsql => Some(5432),
            Self::Sybase => Some(5000),
            Self::Sqlite | Self::Sqlite3 => None,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the engine table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineMapping {
    /// Engine name as it appears in requests.
    pub object_engine: &'static str,
    /// Backend driver, or `None` for recognized but unsupported engines.
    pub backend: Option<Backend>,
}

const fn mapping(object_engine: &'static str, backend: Option<Backend>) -> EngineMapping {
    EngineMapping {
        object_engine,
        backend,
    }
}

/// Engine table, sorted by `object_engine`.
pub static ENGINE_MAP: [EngineMapping; 24] = [
    mapping("access", None),
    mapping("cache", None),
    mapping("db2", None),
    mapping("firebird", Some(Backend::Firebird)),
    mapping("firstsql", None),
    mapping("foxpro", None),
    mapping("informix", None),
    mapping("ingres", None),
    mapping("interbase", None),
    mapping("lightbase", None),
    mapping("maxdb", None),
    mapping("mimer", None),
    mapping("monetdb", None),
    mapping("mssql", Some(Backend::Mssql)),
    mapping("mysql", Some(Backend::Mysql)),
    mapping("oracle", Some(Backend::Oracle)),
    mapping("paradox", None),
    mapping("pervasive", None),
    mapping("postgre", Some(Backend::Pgsql)),
    mapping("sqlbase", None),
    mapping("sqlite", Some(Backend::Sqlite)),
    mapping("sqlite3", Some(Backend::Sqlite3)),
    mapping("sqlserver", None),
    mapping("sybase", Some(Backend::Sybase)),
];

/// Looks up the table row for an engine name. Matching is case-sensitive.
pub fn lookup(engine: &str) -> Option<&'static EngineMapping> {
    ENGINE_MAP
        .binary_search_by(|entry| entry.object_engine.cmp(engine))
        .ok()
        .map(|index| &ENGINE_MAP[index])
}

/// Resolves an engine name to its backend driver.
pub fn resolve(engine: &str) -> Result<Backend> {
    let entry = lookup(engine).ok_or_else(|| ProbeError::UnknownEngine(engine.to_string()))?;
    entry
        .backend
        .ok_or_else(|| ProbeError::UnsupportedEngine(engine.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_unique() {
        for pair in ENGINE_MAP.windows(2) {
            assert!(
                pair[0].object_engine < pair[1].object_engine,
                "{} must sort before {}",
                pair[0].object_engine,
                pair[1].object_engine
            );
        }
    }

    #[test]
    fn test_every_entry_is_reachable() {
        for entry in ENGINE_MAP.iter() {
            assert_eq!(lookup(entry.object_engine), Some(entry));
        }
    }

    #[test]
    fn test_resolve_supported() {
        assert_eq!(resolve("mysql").unwrap(), Backend::Mysql);
        assert_eq!(resolve("mysql").unwrap().as_str(), "mysql");
        assert_eq!(resolve("postgre").unwrap().as_str(), "pgsql");
        assert_eq!(resolve("sqlite3").unwrap(), Backend::Sqlite3);
    }

    #[test]
    fn test_resolve_unsupported() {
        let err = resolve("access").unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedEngine(ref name) if name == "access"));
    }

    #[test]
    fn test_resolve_unknown() {
        let err = resolve("notreal").unwrap_err();
        assert!(matches!(err, ProbeError::UnknownEngine(ref name) if name == "notreal"));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        assert!(matches!(
            resolve("MySQL").unwrap_err(),
            ProbeError::UnknownEngine(_)
        ));
        assert!(matches!(
            resolve("postgres").unwrap_err(),
            ProbeError::UnknownEngine(_)
        ));
    }

    #[test]
    fn test_supported_set() {
        let supported: Vec<&str> = ENGINE_MAP
            .iter()
            .filter(|entry| entry.backend.is_some())
            .map(|entry| entry.object_engine)
            .collect();
        assert_eq!(
            supported,
            vec!["firebird", "mssql", "mysql", "oracle", "postgre", "sqlite", "sqlite3", "sybase"]
        );
    }
}
