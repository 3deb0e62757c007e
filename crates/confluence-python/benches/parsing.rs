use confluence_parser_api::{CodebaseScanner, LanguageStrategy, ParserConfig, ScanContext};
use confluence_python::{default_registry, PythonStrategy};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE: &str = r#"
"""Sample module."""
import os
from dataclasses import dataclass
from pkg.base import Base

@dataclass
class User(Base):
    """A user."""
    name: str = ""

    def __init__(self, name):
        self.name = name
        self.home = os.path.join("/home", name)

    def greet(self):
        return format_greeting(self.name)

def format_greeting(name):
    return f"Hello, {name}"
"#;

fn bench_extract_single_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_file");
    let strategy = PythonStrategy::new();
    let config = ParserConfig::default();

    group.bench_function("parse_and_extract", |b| {
        b.iter(|| {
            let tree = strategy
                .parse(black_box(SAMPLE), Path::new("user.py"), &config)
                .unwrap();
            strategy.extract_signature(&tree, SAMPLE, &config)
        });
    });

    group.finish();
}

fn sample_codebase(files: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..files {
        let path = dir.path().join(format!("pkg/sub{}/module_{i}.py", i % 8));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, SAMPLE).unwrap();
    }
    dir
}

fn bench_scan_codebase(c: &mut Criterion) {
    let mut group = c.benchmark_group("codebase");
    let dir = sample_codebase(64);
    let ctx = ScanContext::new(dir.path()).with_root_packages(vec![dir.path().join("pkg")]);
    let registry = default_registry();

    // Sequential scanning
    group.bench_function("sequential", |b| {
        let config = ParserConfig::default().with_parallel(false);
        b.iter(|| {
            CodebaseScanner::new(&registry, config.clone())
                .scan(black_box(&ctx))
                .unwrap()
        });
    });

    // Parallel scanning with 2 and 4 workers
    for workers in [2, 4] {
        group.bench_function(format!("parallel_{workers}"), |b| {
            let config = ParserConfig::default().with_workers(workers);
            b.iter(|| {
                CodebaseScanner::new(&registry, config.clone())
                    .scan(black_box(&ctx))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract_single_file, bench_scan_codebase);
criterion_main!(benches);
