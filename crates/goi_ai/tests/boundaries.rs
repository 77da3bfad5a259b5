use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(p) = stack.pop() {
        let entries = match fs::read_dir(&p) {
            Ok(e) => e,
            Err(_) => continue,
        };
        for ent in entries.flatten() {
            let path = ent.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

#[test]
fn goi_core_performs_no_network_io() {
    let core_src = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../goi_core/src");
    let files = collect_rs_files(&core_src);
    assert!(!files.is_empty());

    for f in files {
        let text = fs::read_to_string(&f).unwrap_or_default();
        assert!(!text.contains("ureq"), "network client found in {}", f.display());
        assert!(!text.contains("std::net"), "socket use found in {}", f.display());
    }
}

#[test]
fn only_the_backend_modules_speak_http() {
    let src_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src");
    for f in collect_rs_files(&src_root) {
        let text = fs::read_to_string(&f).unwrap_or_default();
        if !text.contains("ureq::") {
            continue;
        }
        let allowed = ["ollama.rs", "ollama_embed.rs", "ollama_llm.rs"];
        let name = f.file_name().and_then(|s| s.to_str()).unwrap_or("");
        assert!(allowed.contains(&name), "HTTP call outside backend modules: {}", f.display());
    }
}
