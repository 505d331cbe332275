use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));

    write_out(&out_dir, "git-commit", &git_rev());
    write_out(&out_dir, "compile-date", &compile_date());
}

fn write_out(out_dir: &PathBuf, name: &str, contents: &str) {
    let dst_path = out_dir.join(name);
    if let Err(e) = fs::write(&dst_path, contents) {
        panic!("couldn't write {}: {}", dst_path.display(), e);
    }
}

/// Short hash of HEAD, prefixed with `WIP` when the working tree is dirty.
fn git_rev() -> String {
    let git = |args: &[&str]| {
        Command::new("git").args(args).output().ok()
            .filter(|out| out.status.success())
            .map(|out| out.stdout)
    };

    let (hash, status) = match (git(&["rev-parse", "--short", "HEAD"]), git(&["status", "--porcelain"])) {
        (Some(hash), Some(status)) => (hash, status),
        _ => return "unknown commit".to_string(),
    };

    let hash = String::from_utf8_lossy(&hash).trim().to_string();
    if status.is_empty() {
        hash
    } else {
        format!("WIP {}", hash)
    }
}

fn compile_date() -> String {
    let now = time::now_utc();
    time::strftime("%Y-%m-%d", &now).unwrap_or_else(|_| "unknown date".to_string())
}
