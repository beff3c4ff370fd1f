//! Hygiene: source-level budgets for production code.
//!
//! Scans `src/` (skipping `*_test.rs`) for patterns that either crash the
//! process or drop errors on the floor. Budgets only ever go down.

use std::fs;
use std::path::Path;

struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

const BUDGETS: &[Budget] = &[
    Budget { pattern: ".unwrap()", max: 0, why: "panics" },
    Budget { pattern: ".expect(", max: 0, why: "panics" },
    Budget { pattern: "panic!(", max: 0, why: "panics" },
    Budget { pattern: "unreachable!(", max: 0, why: "panics" },
    Budget { pattern: "todo!(", max: 0, why: "stub" },
    Budget { pattern: "unimplemented!(", max: 0, why: "stub" },
    Budget { pattern: "dbg!(", max: 0, why: "debug leftover" },
    Budget { pattern: "let _ =", max: 0, why: "silent discard" },
    Budget { pattern: "#[allow(dead_code)]", max: 0, why: "dead code" },
];

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new(env!("CARGO_MANIFEST_DIR")).join("src").as_path(), &mut files);
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn source_tree_is_scanned() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("lib.rs")), "src/lib.rs not found");
}

#[test]
fn budgets_hold() {
    let files = source_files();
    let mut failures = Vec::new();

    for budget in BUDGETS {
        let found = hits(&files, budget.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            let detail = found
                .iter()
                .map(|(path, c)| format!("    {path}: {c}"))
                .collect::<Vec<_>>()
                .join("\n");
            failures.push(format!("{} ({}): found {count}, max {}\n{detail}", budget.pattern, budget.why, budget.max));
        }
    }

    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}
