//! Owned package catalog.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::wdb::schema::RecordKind;

/// All packages, keyed by package id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub packages: BTreeMap<u32, CatalogPackage>,
}

/// A named package with its members keyed by sequence number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPackage {
    pub name: String,
    pub members: BTreeMap<u32, CatalogMember>,
}

/// One member of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMember {
    pub name: String,
    pub body: MemberBody,
}

/// Member payload: script source, or the id of an included package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberBody {
    Script(Vec<u8>),
    Include(u32),
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an empty package (or rename an existing one) and return it.
    pub fn package(&mut self, id: u32, name: &str) -> &mut CatalogPackage {
        let package = self.packages.entry(id).or_default();
        package.name = name.to_string();
        package
    }

    pub fn member_count(&self) -> usize {
        self.packages.values().map(|p| p.members.len()).sum()
    }

    /// Total bytes of script source across all members.
    pub fn script_bytes(&self) -> usize {
        self.packages
            .values()
            .flat_map(|p| p.members.values())
            .map(|m| match &m.body {
                MemberBody::Script(content) => content.len(),
                MemberBody::Include(_) => 0,
            })
            .sum()
    }
}

impl CatalogPackage {
    /// Add a script member at `sequence`, replacing any previous one.
    pub fn script(&mut self, sequence: u32, name: &str, content: impl Into<Vec<u8>>) -> &mut Self {
        self.members.insert(
            sequence,
            CatalogMember {
                name: name.to_string(),
                body: MemberBody::Script(content.into()),
            },
        );
        self
    }

    /// Add an include member at `sequence`, replacing any previous one.
    pub fn include(&mut self, sequence: u32, name: &str, package: u32) -> &mut Self {
        self.members.insert(
            sequence,
            CatalogMember {
                name: name.to_string(),
                body: MemberBody::Include(package),
            },
        );
        self
    }
}

/// A row that could not be placed in the catalog. The row is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Neither `script` nor `include` is set.
    AmbiguousMember { member: u32, package: u32 },
    /// The owning package id has no package row.
    OrphanMember { member: u32, package: u32 },
    /// The included package id has no package row.
    UnknownInclude {
        member: u32,
        package: u32,
        include: u32,
    },
    /// Another member of the same package already uses this sequence number.
    DuplicateSequence {
        member: u32,
        package: u32,
        sequence: u32,
    },
    /// No member's chain reaches this script row.
    OrphanScript { script: u32 },
}

impl Anomaly {
    /// Table the skipped row belongs to.
    pub fn kind(&self) -> RecordKind {
        match self {
            Anomaly::OrphanScript { .. } => RecordKind::Script,
            _ => RecordKind::PackageMember,
        }
    }

    /// Id of the skipped row.
    pub fn row(&self) -> u32 {
        match *self {
            Anomaly::AmbiguousMember { member, .. }
            | Anomaly::OrphanMember { member, .. }
            | Anomaly::UnknownInclude { member, .. }
            | Anomaly::DuplicateSequence { member, .. } => member,
            Anomaly::OrphanScript { script } => script,
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::AmbiguousMember { member, package } => write!(
                f,
                "member {} of package {}: neither script nor include",
                member, package
            ),
            Anomaly::OrphanMember { member, package } => {
                write!(f, "member {}: package {} does not exist", member, package)
            }
            Anomaly::UnknownInclude {
                member,
                package,
                include,
            } => write!(
                f,
                "member {} of package {}: included package {} does not exist",
                member, package, include
            ),
            Anomaly::DuplicateSequence {
                member,
                package,
                sequence,
            } => write!(
                f,
                "member {} of package {}: sequence {} already taken",
                member, package, sequence
            ),
            Anomaly::OrphanScript { script } => {
                write!(f, "script {}: not reachable from any member", script)
            }
        }
    }
}
