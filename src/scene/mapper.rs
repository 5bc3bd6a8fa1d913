//! Conversion between a [`Catalog`] and the three SceneScript tables.

use std::collections::{HashMap, HashSet};

use crate::scene::catalog::{Anomaly, Catalog, CatalogMember, MemberBody};
use crate::scene::chain::{split_content, ScriptIndex, MAX_FRAGMENT_LEN};
use crate::wdb::reader::read_table;
use crate::wdb::records::{MemberLink, Package, PackageMember, Script};
use crate::wdb::schema::RecordKind;
use crate::wdb::writer::write_table;
use crate::Db2Error;

/// Settings for [`build_tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackConfig {
    /// Maximum bytes of script source per `SceneScript` row.
    pub fragment_len: usize,
}

impl Default for PackConfig {
    fn default() -> Self {
        PackConfig {
            fragment_len: MAX_FRAGMENT_LEN,
        }
    }
}

/// Decoded rows of all three tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneTables {
    pub packages: Vec<Package>,
    pub members: Vec<PackageMember>,
    pub scripts: Vec<Script>,
}

/// Encoded buffers of all three tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSet {
    pub packages: Vec<u8>,
    pub members: Vec<u8>,
    pub scripts: Vec<u8>,
}

impl TableSet {
    pub fn get(&self, kind: RecordKind) -> &[u8] {
        match kind {
            RecordKind::Package => &self.packages,
            RecordKind::PackageMember => &self.members,
            RecordKind::Script => &self.scripts,
        }
    }

    pub fn get_mut(&mut self, kind: RecordKind) -> &mut Vec<u8> {
        match kind {
            RecordKind::Package => &mut self.packages,
            RecordKind::PackageMember => &mut self.members,
            RecordKind::Script => &mut self.scripts,
        }
    }
}

impl SceneTables {
    /// Encode all three tables. Fails before producing any buffer if a row
    /// does not fit its table.
    pub fn encode(&self) -> Result<TableSet, Db2Error> {
        Ok(TableSet {
            packages: write_table(&self.packages)?,
            members: write_table(&self.members)?,
            scripts: write_table(&self.scripts)?,
        })
    }

    pub fn decode(set: &TableSet) -> Result<Self, Db2Error> {
        Ok(SceneTables {
            packages: read_table(&set.packages)?,
            members: read_table(&set.members)?,
            scripts: read_table(&set.scripts)?,
        })
    }
}

/// Result of [`resolve_tables`]: the catalog plus every skipped row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub catalog: Catalog,
    pub anomalies: Vec<Anomaly>,
}

/// Flatten a catalog into table rows.
///
/// Package ids are kept. Member and script ids are assigned from 1 upwards,
/// visiting packages by id and members by sequence. Script members are split
/// into fragments of at most `config.fragment_len` bytes.
pub fn build_tables(catalog: &Catalog, config: &PackConfig) -> Result<SceneTables, Db2Error> {
    if config.fragment_len == 0 {
        return Err(Db2Error::Argument(
            "fragment length must be at least 1".to_string(),
        ));
    }

    let mut tables = SceneTables::default();
    let mut member_id = 1u32;
    let mut script_id = 1u32;

    for (&package_id, package) in &catalog.packages {
        tables.packages.push(Package {
            id: package_id,
            name: package.name.clone(),
        });

        for (&sequence, member) in &package.members {
            let (script, include) = match &member.body {
                MemberBody::Include(0) => {
                    return Err(Db2Error::Argument(format!(
                        "package {} member {} ({}) includes package 0",
                        package_id, sequence, member.name
                    )));
                }
                MemberBody::Include(target) => (0, *target),
                MemberBody::Script(content) => {
                    let fragments =
                        split_content(&member.name, content, script_id, config.fragment_len);
                    let head = script_id;
                    script_id += fragments.len() as u32;
                    tables.scripts.extend(fragments);
                    (head, 0)
                }
            };

            tables.members.push(PackageMember {
                id: member_id,
                package: package_id,
                script,
                include,
                sequence,
            });
            member_id += 1;
        }
    }

    tracing::debug!(
        packages = tables.packages.len(),
        members = tables.members.len(),
        scripts = tables.scripts.len(),
        "built scene tables"
    );
    Ok(tables)
}

fn skip(anomalies: &mut Vec<Anomaly>, anomaly: Anomaly) {
    tracing::warn!(
        table = %anomaly.kind(),
        row = anomaly.row(),
        "skipping row: {}",
        anomaly
    );
    anomalies.push(anomaly);
}

/// Rebuild the catalog from decoded rows.
///
/// Script chains are reassembled and an include member takes the name of the
/// package it includes. Members that cannot be placed, and script rows no
/// member's chain reaches, are skipped and reported as [`Anomaly`] values;
/// broken chains are errors.
pub fn resolve_tables(tables: &SceneTables) -> Result<Resolved, Db2Error> {
    let mut resolved = Resolved::default();

    let mut names: HashMap<u32, &str> = HashMap::with_capacity(tables.packages.len());
    for package in &tables.packages {
        if names.contains_key(&package.id) {
            tracing::debug!(id = package.id, "ignoring repeated package row");
            continue;
        }
        names.insert(package.id, &package.name);
        resolved.catalog.package(package.id, &package.name);
    }

    let scripts = ScriptIndex::new(&tables.scripts);
    let mut reached: HashSet<u32> = HashSet::with_capacity(tables.scripts.len());

    for row in &tables.members {
        if !names.contains_key(&row.package) {
            skip(
                &mut resolved.anomalies,
                Anomaly::OrphanMember {
                    member: row.id,
                    package: row.package,
                },
            );
            continue;
        }

        let member = match row.link() {
            MemberLink::Script(head) => {
                let chain = scripts.reassemble(row.id, head)?;
                reached.extend(&chain.fragments);
                CatalogMember {
                    name: chain.name,
                    body: MemberBody::Script(chain.content),
                }
            }
            MemberLink::Include(target) => match names.get(&target) {
                Some(name) => CatalogMember {
                    name: name.to_string(),
                    body: MemberBody::Include(target),
                },
                None => {
                    skip(
                        &mut resolved.anomalies,
                        Anomaly::UnknownInclude {
                            member: row.id,
                            package: row.package,
                            include: target,
                        },
                    );
                    continue;
                }
            },
            MemberLink::Neither => {
                skip(
                    &mut resolved.anomalies,
                    Anomaly::AmbiguousMember {
                        member: row.id,
                        package: row.package,
                    },
                );
                continue;
            }
        };

        let Some(package) = resolved.catalog.packages.get_mut(&row.package) else {
            continue;
        };
        if package.members.contains_key(&row.sequence) {
            skip(
                &mut resolved.anomalies,
                Anomaly::DuplicateSequence {
                    member: row.id,
                    package: row.package,
                    sequence: row.sequence,
                },
            );
            continue;
        }
        package.members.insert(row.sequence, member);
    }

    for script in &tables.scripts {
        if reached.insert(script.id) {
            skip(
                &mut resolved.anomalies,
                Anomaly::OrphanScript { script: script.id },
            );
        }
    }

    tracing::debug!(
        packages = resolved.catalog.packages.len(),
        members = resolved.catalog.member_count(),
        anomalies = resolved.anomalies.len(),
        "resolved scene tables"
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let intro: Vec<u8> = (0..9000u32).map(|i| b'0' + (i % 10) as u8).collect();
        catalog
            .package(7, "Intro")
            .script(0, "Intro", intro)
            .include(1, "Shared", 12);
        catalog.package(12, "Shared").script(3, "helpers", "return {}");
        catalog
    }

    fn member(id: u32, package: u32, script: u32, include: u32, sequence: u32) -> PackageMember {
        PackageMember {
            id,
            package,
            script,
            include,
            sequence,
        }
    }

    #[test]
    fn test_build_assigns_dense_ids() {
        let tables = build_tables(&sample_catalog(), &PackConfig::default()).unwrap();

        assert_eq!(
            tables.packages.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![7, 12]
        );
        assert_eq!(
            tables.members,
            vec![
                member(1, 7, 1, 0, 0),
                member(2, 7, 0, 12, 1),
                member(3, 12, 4, 0, 3),
            ]
        );
        assert_eq!(
            tables.scripts.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(tables.scripts[2].content.len(), 1000);
    }

    #[test]
    fn test_members_are_exclusive() {
        let tables = build_tables(&sample_catalog(), &PackConfig::default()).unwrap();
        for m in &tables.members {
            assert!((m.script == 0) != (m.include == 0), "member {}", m.id);
        }
    }

    #[test]
    fn test_zero_fragment_len_rejected() {
        let err = build_tables(&sample_catalog(), &PackConfig { fragment_len: 0 }).unwrap_err();
        assert!(matches!(err, Db2Error::Argument(_)));
    }

    #[test]
    fn test_include_zero_rejected() {
        let mut catalog = Catalog::new();
        catalog.package(1, "a").include(0, "nothing", 0);
        assert!(matches!(
            build_tables(&catalog, &PackConfig::default()),
            Err(Db2Error::Argument(_))
        ));
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let catalog = sample_catalog();
        let tables = build_tables(&catalog, &PackConfig::default()).unwrap();
        let set = tables.encode().unwrap();
        let decoded = SceneTables::decode(&set).unwrap();
        assert_eq!(decoded, tables);

        let resolved = resolve_tables(&decoded).unwrap();
        assert!(resolved.anomalies.is_empty());
        assert_eq!(resolved.catalog, catalog);
    }

    #[test]
    fn test_include_takes_target_name() {
        let mut catalog = Catalog::new();
        catalog.package(1, "Outer").include(0, "whatever", 2);
        catalog.package(2, "Inner");
        let tables = build_tables(&catalog, &PackConfig::default()).unwrap();
        let resolved = resolve_tables(&tables).unwrap();
        assert_eq!(resolved.catalog.packages[&1].members[&0].name, "Inner");
    }

    #[test]
    fn test_anomalies_reported_and_skipped() {
        let tables = SceneTables {
            packages: vec![Package {
                id: 1,
                name: "p".to_string(),
            }],
            members: vec![
                member(1, 1, 1, 0, 0),
                member(2, 1, 0, 0, 1),
                member(3, 9, 1, 0, 0),
                member(4, 1, 0, 5, 2),
                member(5, 1, 1, 0, 0),
            ],
            scripts: vec![Script {
                id: 1,
                name: "s".to_string(),
                content: b"x".to_vec(),
                previous: 0,
                next: 0,
            }],
        };

        let resolved = resolve_tables(&tables).unwrap();
        assert_eq!(
            resolved.anomalies,
            vec![
                Anomaly::AmbiguousMember {
                    member: 2,
                    package: 1
                },
                Anomaly::OrphanMember {
                    member: 3,
                    package: 9
                },
                Anomaly::UnknownInclude {
                    member: 4,
                    package: 1,
                    include: 5
                },
                Anomaly::DuplicateSequence {
                    member: 5,
                    package: 1,
                    sequence: 0
                },
            ]
        );
        let members = &resolved.catalog.packages[&1].members;
        assert_eq!(members.len(), 1);
        assert_eq!(members[&0].body, MemberBody::Script(b"x".to_vec()));
    }

    #[test]
    fn test_unreached_script_reported() {
        let mut catalog = Catalog::new();
        catalog.package(1, "p").script(0, "main", "print(1)");
        let mut tables = build_tables(&catalog, &PackConfig::default()).unwrap();
        tables.scripts.push(Script {
            id: 50,
            name: "lost".to_string(),
            content: b"important".to_vec(),
            previous: 0,
            next: 0,
        });

        let decoded = SceneTables::decode(&tables.encode().unwrap()).unwrap();
        assert_eq!(decoded.scripts.len(), 2);
        let resolved = resolve_tables(&decoded).unwrap();
        assert_eq!(
            resolved.anomalies,
            vec![Anomaly::OrphanScript { script: 50 }]
        );
        assert_eq!(resolved.catalog, catalog);
    }

    #[test]
    fn test_orphan_member_leaves_its_chain_unreached() {
        let tables = SceneTables {
            packages: Vec::new(),
            members: vec![member(1, 9, 1, 0, 0)],
            scripts: vec![Script {
                id: 1,
                name: "s".to_string(),
                content: b"x".to_vec(),
                previous: 0,
                next: 0,
            }],
        };
        let resolved = resolve_tables(&tables).unwrap();
        assert_eq!(
            resolved.anomalies,
            vec![
                Anomaly::OrphanMember {
                    member: 1,
                    package: 9
                },
                Anomaly::OrphanScript { script: 1 },
            ]
        );
    }

    #[test]
    fn test_script_wins_over_include() {
        let tables = SceneTables {
            packages: vec![Package {
                id: 1,
                name: "p".to_string(),
            }],
            members: vec![member(1, 1, 1, 1, 0)],
            scripts: vec![Script {
                id: 1,
                name: "s".to_string(),
                content: b"x".to_vec(),
                previous: 0,
                next: 0,
            }],
        };
        let resolved = resolve_tables(&tables).unwrap();
        assert_eq!(
            resolved.catalog.packages[&1].members[&0].body,
            MemberBody::Script(b"x".to_vec())
        );
    }

    #[test]
    fn test_broken_chain_is_error() {
        let tables = SceneTables {
            packages: vec![Package {
                id: 1,
                name: "p".to_string(),
            }],
            members: vec![member(1, 1, 3, 0, 0)],
            scripts: Vec::new(),
        };
        assert!(matches!(
            resolve_tables(&tables),
            Err(Db2Error::DanglingChainLink { link: "member", .. })
        ));
    }

    #[test]
    fn test_table_set_by_kind() {
        let mut set = TableSet::default();
        set.get_mut(RecordKind::Script).push(1);
        assert_eq!(set.get(RecordKind::Script), &[1]);
        assert!(set.get(RecordKind::Package).is_empty());
    }
}
