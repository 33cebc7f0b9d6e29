use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn plagcheck_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("plagcheck");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_content = r#"[sources]
seed = 42

[ai]
providers = ["heuristic"]
api_key_env = "PLAGCHECK_CLI_TEST_KEY_NEVER_SET"

[logging]
level = "warn"
"#;
    let config_path = root.join("plagcheck.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_plagcheck(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = plagcheck_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run plagcheck binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

const FOX: &str =
    "The quick brown fox jumps over the lazy dog. This is a common phrase used in typing tests.";

#[test]
fn test_analyze_text_prints_json() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_plagcheck(&config_path, &["analyze", "--text", FOX]);
    assert!(success, "analyze failed: stdout={}, stderr={}", stdout, stderr);

    let analysis: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(analysis["wordCount"], 18);
    assert!(analysis["matches"].as_array().unwrap().len() <= 2);
    let score = analysis["overallScore"].as_u64().unwrap();
    assert!(score <= 100);
}

#[test]
fn test_analyze_is_reproducible_with_seed() {
    let (_tmp, config_path) = setup_test_env();

    let (first, _, ok1) = run_plagcheck(&config_path, &["analyze", "--text", FOX]);
    let (second, _, ok2) = run_plagcheck(&config_path, &["analyze", "--text", FOX]);
    assert!(ok1 && ok2);

    let a: serde_json::Value = serde_json::from_str(&first).unwrap();
    let b: serde_json::Value = serde_json::from_str(&second).unwrap();
    assert_eq!(a["matches"], b["matches"]);
    assert_eq!(a["overallScore"], b["overallScore"]);
}

#[test]
fn test_analyze_txt_file() {
    let (tmp, config_path) = setup_test_env();
    let file = tmp.path().join("essay.txt");
    fs::write(&file, FOX).unwrap();

    let (stdout, stderr, success) =
        run_plagcheck(&config_path, &["analyze", file.to_str().unwrap()]);
    assert!(success, "analyze failed: stdout={}, stderr={}", stdout, stderr);
    let analysis: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(analysis["wordCount"], 18);
}

#[test]
fn test_analyze_docx_report_format() {
    let (tmp, config_path) = setup_test_env();
    let file = tmp.path().join("essay.docx");
    write_docx(
        &file,
        &[
            "The quick brown fox jumps over the lazy dog.",
            "This is a common phrase used in typing tests.",
        ],
    );

    let (stdout, stderr, success) = run_plagcheck(
        &config_path,
        &["analyze", file.to_str().unwrap(), "--format", "report"],
    );
    assert!(success, "analyze failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Plagiarism Analysis Report"));
    assert!(stdout.contains("Word Count: 18"));
}

#[test]
fn test_analyze_rejects_unsupported_extension() {
    let (tmp, config_path) = setup_test_env();
    let file = tmp.path().join("tool.exe");
    fs::write(&file, b"MZ binary content").unwrap();

    let (_stdout, stderr, success) =
        run_plagcheck(&config_path, &["analyze", file.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Invalid file type"), "stderr={}", stderr);
}

#[test]
fn test_analyze_rejects_blank_text() {
    let (_tmp, config_path) = setup_test_env();

    let (_stdout, stderr, success) = run_plagcheck(&config_path, &["analyze", "--text", "   "]);
    assert!(!success);
    assert!(stderr.contains("No text content found"), "stderr={}", stderr);
}

#[test]
fn test_analyze_missing_file_fails() {
    let (tmp, config_path) = setup_test_env();
    let missing = tmp.path().join("nope.txt");

    let (_stdout, stderr, success) =
        run_plagcheck(&config_path, &["analyze", missing.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Failed to read"), "stderr={}", stderr);
}

#[test]
fn test_analyze_requires_input() {
    let (_tmp, config_path) = setup_test_env();

    let (_stdout, _stderr, success) = run_plagcheck(&config_path, &["analyze"]);
    assert!(!success);
}

#[test]
fn test_paraphrase_prints_suggestions() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_plagcheck(
        &config_path,
        &["paraphrase", "This is a sample sentence that shows the basic idea."],
    );
    assert!(success, "paraphrase failed: stdout={}, stderr={}", stdout, stderr);

    let suggestions: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert!(!suggestions.is_empty());
    for s in &suggestions {
        assert_eq!(
            s["originalText"],
            "This is a sample sentence that shows the basic idea."
        );
        assert!(s["uniquenessScore"].as_u64().unwrap() <= 100);
    }
}

#[test]
fn test_providers_lists_status() {
    let (tmp, _) = setup_test_env();
    let config_path = tmp.path().join("both.toml");
    fs::write(
        &config_path,
        "[ai]\nproviders = [\"openai\", \"heuristic\"]\napi_key_env = \"PLAGCHECK_CLI_TEST_KEY_NEVER_SET\"\n",
    )
    .unwrap();

    let (stdout, stderr, success) = run_plagcheck(&config_path, &["providers"]);
    assert!(success, "providers failed: stderr={}", stderr);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("openai"));
    assert!(lines[0].contains("missing credentials"));
    assert!(lines[1].starts_with("heuristic"));
    assert!(lines[1].contains("configured"));
}

#[test]
fn test_qa_passes_offline() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_plagcheck(&config_path, &["qa"]);
    assert!(success, "qa failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("QA TEST REPORT"));
    assert!(stdout.contains("Total Tests: 24"));
    assert!(stdout.contains("Failed: 0"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("bad.toml");
    fs::write(&config_path, "[ai]\nproviders = [\"gemini\"]\n").unwrap();

    let (_stdout, stderr, success) = run_plagcheck(&config_path, &["providers"]);
    assert!(!success);
    assert!(stderr.contains("Unknown AI provider"), "stderr={}", stderr);
}
