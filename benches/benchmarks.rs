//! Criterion benchmarks for scenescript-db2 core operations.
//!
//! Benchmarks cover:
//! - Header parsing and validation (Db2Header::parse + validate)
//! - Script table encode and decode (write_table / read_table)
//! - Copy table resolution (read_table with a populated copy table)
//! - Catalog mapping (build_tables / resolve_tables)
//! - Content chunking and chain reassembly

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use db2::scene::catalog::Catalog;
use db2::scene::chain::{split_content, ScriptIndex, MAX_FRAGMENT_LEN};
use db2::scene::mapper::{build_tables, resolve_tables, PackConfig};
use db2::wdb::constants::SIZE_COPY_ENTRY;
use db2::wdb::header::Db2Header;
use db2::wdb::reader::read_table;
use db2::wdb::records::{Package, Script};
use db2::wdb::schema::SCENE_SCRIPT;
use db2::wdb::writer::write_table;

// ---------------------------------------------------------------------------
// Synthetic data builders
// ---------------------------------------------------------------------------

fn lua_source(len: usize) -> Vec<u8> {
    b"local x = scene:GetActor(1) -- move\n"
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Catalog with `packages` packages of 8 script members each (plus one include).
fn build_catalog(packages: u32) -> Catalog {
    let mut catalog = Catalog::new();
    for id in 1..=packages {
        let package = catalog.package(id, &format!("Package {id}"));
        for seq in 0..8 {
            package.script(seq, &format!("part{seq}"), lua_source(1500 * (seq as usize + 1)));
        }
        if id > 1 {
            package.include(8, "prev", id - 1);
        }
    }
    catalog
}

fn build_scripts(count: u32) -> Vec<Script> {
    (1..=count)
        .map(|id| Script {
            id,
            name: format!("script{id}"),
            content: lua_source(2000),
            previous: 0,
            next: 0,
        })
        .collect()
}

/// Package table with `count` rows and `count` copy entries appended by hand.
fn build_package_table_with_copies(count: u32) -> Vec<u8> {
    let packages: Vec<Package> = (1..=count)
        .map(|id| Package {
            id,
            name: format!("pkg{id}"),
        })
        .collect();
    let mut data = write_table(&packages).unwrap();

    let mut header = Db2Header::parse(&data).unwrap();
    header.copy_table_size = count * SIZE_COPY_ENTRY as u32;
    header.write(&mut data);
    for id in 1..=count {
        data.extend_from_slice(&(count + id).to_le_bytes());
        data.extend_from_slice(&id.to_le_bytes());
    }
    data
}

// ---------------------------------------------------------------------------
// Benchmark: header parse + validate
// ---------------------------------------------------------------------------

fn bench_header(c: &mut Criterion) {
    let data = write_table(&build_scripts(16)).unwrap();
    c.bench_function("header_parse_validate", |b| {
        b.iter(|| {
            let header = Db2Header::parse(black_box(&data)).unwrap();
            black_box(header.validate(&SCENE_SCRIPT)).unwrap();
        })
    });
}

// ---------------------------------------------------------------------------
// Benchmark: script table codec
// ---------------------------------------------------------------------------

fn bench_script_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("script_table");

    for rows in [100u32, 1000, 10000] {
        let scripts = build_scripts(rows);
        let encoded = write_table(&scripts).unwrap();
        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("encode", format!("{rows}_rows")),
            &scripts,
            |b, scripts| b.iter(|| black_box(write_table(scripts).unwrap())),
        );
        group.bench_with_input(
            BenchmarkId::new("decode", format!("{rows}_rows")),
            &encoded,
            |b, data| b.iter(|| black_box(read_table::<Script>(data).unwrap())),
        );
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: copy table resolution (linear scan per entry)
// ---------------------------------------------------------------------------

fn bench_copy_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_table");

    for rows in [100u32, 1000] {
        let data = build_package_table_with_copies(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{rows}_copies")),
            &data,
            |b, data| b.iter(|| black_box(read_table::<Package>(data).unwrap())),
        );
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: catalog mapping
// ---------------------------------------------------------------------------

fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping");
    let catalog = build_catalog(200);
    let tables = build_tables(&catalog, &PackConfig::default()).unwrap();

    group.bench_function("build_tables", |b| {
        b.iter(|| black_box(build_tables(&catalog, &PackConfig::default()).unwrap()))
    });
    group.bench_function("resolve_tables", |b| {
        b.iter(|| black_box(resolve_tables(&tables).unwrap()))
    });
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: chunking and reassembly
// ---------------------------------------------------------------------------

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");

    for len in [4000usize, 40_000, 400_000] {
        let source = lua_source(len);
        let fragments = split_content("bench", &source, 1, MAX_FRAGMENT_LEN);
        group.throughput(Throughput::Bytes(len as u64));

        group.bench_with_input(BenchmarkId::new("split", len), &source, |b, source| {
            b.iter(|| black_box(split_content("bench", source, 1, MAX_FRAGMENT_LEN)))
        });
        group.bench_with_input(
            BenchmarkId::new("reassemble", len),
            &fragments,
            |b, fragments| {
                b.iter(|| {
                    let index = ScriptIndex::new(fragments);
                    black_box(index.reassemble(1, 1).unwrap())
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_header,
    bench_script_codec,
    bench_copy_table,
    bench_mapping,
    bench_chain,
);
criterion_main!(benches);
