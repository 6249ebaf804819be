use std::path::{Path, PathBuf};
use std::process::Command;

const MAX_LINES: usize = 750;

const CHECKED_EXTENSIONS: &[&str] = &["rs", "md", "yaml", "toml"];

const EXCLUDED_DIRS: &[&str] = &["target", ".git", "examples"];

const EXCLUDED_FILES: &[&str] = &["Cargo.lock", "SPEC_FULL.md", "spec.md"];

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/main");

    let sha = git_output(&["rev-parse", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=FACEGATE_GIT_SHA={}", sha);

    let root = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };
    let files = collect_files_to_check(&root);
    for file in &files {
        println!("cargo:rerun-if-changed={}", file.display());
    }

    let mut violations = Vec::new();
    violations.extend(line_limit_violations(&root, &files));
    if std::env::var_os("SKIP_FORMAT_CHECK").is_none() {
        let unformatted = format_violations(&root, &files);
        if std::env::var_os("FACEGATE_STRICT_FORMAT").is_some() {
            violations.extend(unformatted);
        } else {
            for file in &unformatted {
                println!("cargo:warning={} (run `cargo fmt`)", file);
            }
        }
    }
    for file in files.iter().filter(|p| is_rust_source(p)) {
        if let Ok(content) = std::fs::read_to_string(file) {
            let rel = file.strip_prefix(&root).unwrap_or(file);
            violations.extend(dead_code_allows(rel, &content));
            violations.extend(unserialized_env_mutations(rel, &content));
        }
    }

    if !violations.is_empty() {
        eprintln!("\n========================================");
        eprintln!("SOURCE CHECKS FAILED");
        eprintln!("========================================");
        for violation in &violations {
            eprintln!("  {}", violation);
        }
        eprintln!("========================================\n");
        panic!("Build failed: {} source check violation(s)", violations.len());
    }
}

/// Files `rustfmt --check` would rewrite. Empty when rustfmt is missing.
fn format_violations(root: &Path, files: &[PathBuf]) -> Vec<String> {
    let rust_files: Vec<&PathBuf> = files.iter().filter(|p| is_rust_source(p)).collect();
    if rust_files.is_empty() {
        return Vec::new();
    }

    let available = Command::new("rustfmt")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success());
    if !available {
        println!("cargo:warning=rustfmt not found, skipping format check");
        return Vec::new();
    }

    let output = match Command::new("rustfmt")
        .args(["--check", "--edition", "2021"])
        .args(&rust_files)
        .output()
    {
        Ok(o) => o,
        Err(e) => {
            println!("cargo:warning=Failed to run rustfmt: {}", e);
            return Vec::new();
        }
    };
    if output.status.success() {
        return Vec::new();
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut unformatted: Vec<String> = stdout
        .lines()
        .chain(stderr.lines())
        .filter_map(|line| line.strip_prefix("Diff in "))
        .map(|path| {
            let path = path.split(" at line").next().unwrap_or(path);
            let path = Path::new(path.trim_end_matches(':'));
            let rel = path.strip_prefix(root).unwrap_or(path);
            format!("{}: not formatted", rel.display())
        })
        .collect();
    unformatted.dedup();
    if unformatted.is_empty() {
        unformatted.push("some files are not formatted".to_string());
    }
    unformatted
}

fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn collect_files_to_check(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk_directory(root, root, &mut files);
    files
}

fn walk_directory(dir: &Path, root: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let excluded = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| EXCLUDED_DIRS.contains(&name));
            if !excluded {
                walk_directory(&path, root, files);
            }
        } else if should_check_file(&path, root) {
            files.push(path);
        }
    }
}

fn should_check_file(path: &Path, root: &Path) -> bool {
    let checked_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CHECKED_EXTENSIONS.contains(&ext));
    if !checked_ext {
        return false;
    }
    let rel = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
    !EXCLUDED_FILES.contains(&rel.as_ref())
}

fn is_rust_source(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("rs")
        && path.file_name().and_then(|n| n.to_str()) != Some("build.rs")
}

fn line_limit_violations(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .filter_map(|file| {
            let content = std::fs::read_to_string(file).ok()?;
            let lines = content.lines().filter(|l| !l.trim().is_empty()).count();
            (lines > MAX_LINES).then(|| {
                let rel = file.strip_prefix(root).unwrap_or(file);
                format!(
                    "{} - {} lines exceeds the {} line limit, split it",
                    rel.display(),
                    lines,
                    MAX_LINES
                )
            })
        })
        .collect()
}

fn dead_code_allows(rel: &Path, content: &str) -> Vec<String> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            (trimmed.starts_with("#[allow(") || trimmed.starts_with("#![allow("))
                && trimmed.contains("dead_code")
        })
        .map(|(i, _)| {
            format!(
                "{}:{} #[allow(dead_code)] is not allowed, delete the code",
                rel.display(),
                i + 1
            )
        })
        .collect()
}

/// Tests that touch process env must run under `#[serial]`.
fn unserialized_env_mutations(rel: &Path, content: &str) -> Vec<String> {
    let mut violations = Vec::new();
    let mut test_start: Option<usize> = None;
    let mut has_serial = false;
    let mut depth = 0i32;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed == "#[serial]" || trimmed == "#[serial_test::serial]" {
            has_serial = true;
        }
        if trimmed == "#[test]" || trimmed.starts_with("#[tokio::test") {
            test_start = Some(i + 1);
            depth = 0;
        }
        let Some(start) = test_start else {
            continue;
        };

        let mutates = !trimmed.starts_with("//")
            && (trimmed.contains("env::set_var") || trimmed.contains("env::remove_var"));
        if mutates && !has_serial {
            violations.push(format!(
                "{}:{} test mutates env without #[serial]",
                rel.display(),
                start
            ));
            test_start = None;
            has_serial = false;
            continue;
        }

        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        test_start = None;
                        has_serial = false;
                    }
                }
                _ => {}
            }
        }
    }
    violations
}
