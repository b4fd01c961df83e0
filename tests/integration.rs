use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cdash_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("cdash");
    path
}

const COMMENTS: &str = "\
tanggal,jumlah_like,jumlah_reply,sentimen,skor_sentimen,memiliki_gambar,memiliki_video,memiliki_tautan,komentar
2024-01-03,6,0,Positif,1,1,0,0,Pengiriman cepat sekali
2024-01-01,4,0,Positif,1,0,0,1,Produk bagus
2024-01-02,2,1,Negatif,-1,0,1,0,Ongkir mahal
2024-01-05,0,0,Netral,0,1,0,1,Biasa saja
";

fn setup_test_env(csv: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("comments.csv"), csv).unwrap();

    let config_content = format!(
        r#"[source]
kind = "csv"
path = "{}/data/comments.csv"

[analysis]
sentiment_threshold = 0.05

[server]
bind = "127.0.0.1:7340"
"#,
        root.display()
    );

    let config_path = config_dir.join("cdash.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_cdash(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = cdash_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run cdash binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn run_json(config_path: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = args.to_vec();
    full.push("--json");
    let (stdout, stderr, success) = run_cdash(config_path, &full);
    assert!(success, "cdash {:?} failed: stderr={}", args, stderr);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("bad JSON ({}): {}", e, stdout))
}

#[test]
fn test_summary_text() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    let (stdout, stderr, success) = run_cdash(&config_path, &["summary"]);
    assert!(success, "summary failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Comments:        4"));
    assert!(stdout.contains("Avg likes:       3.00"));
    assert!(stdout.contains("Dominantly Positive"));
}

#[test]
fn test_summary_positive_filter() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    let json = run_json(&config_path, &["summary", "--sentiment", "positive"]);
    assert_eq!(json["count"], 2);
    assert_eq!(json["avg_sentiment_score"], 1.0);
    assert_eq!(json["avg_likes"], 5.0);
}

#[test]
fn test_summary_empty_selection_not_error() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    let json = run_json(&config_path, &["summary", "--since", "2025-01-01"]);
    assert_eq!(json["count"], 0);
    assert!(json["avg_likes"].is_null());
    assert_eq!(json["label"], "Neutral/Mixed");
}

#[test]
fn test_threshold_override() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    // average score is (1 + 1 - 1 + 0) / 4 = 0.25
    let json = run_json(&config_path, &["summary", "--threshold", "0.3"]);
    assert_eq!(json["label"], "Neutral/Mixed");
}

#[test]
fn test_trend_gaps_and_zero_fill() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    let json = run_json(&config_path, &["trend"]);
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 4);
    assert_eq!(points[0]["date"], "2024-01-01");
    assert_eq!(points[3]["date"], "2024-01-05");

    let json = run_json(&config_path, &["trend", "--zero-fill"]);
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 5);
    assert_eq!(points[3]["count"], 0);
}

#[test]
fn test_sentiment_distribution() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    let (stdout, _, success) = run_cdash(&config_path, &["sentiment"]);
    assert!(success);
    assert!(stdout.contains("Positive"));
    assert!(stdout.contains("50.0%"));

    let json = run_json(&config_path, &["sentiment", "--sentiment", "negatif,netral"]);
    assert_eq!(json["counts"]["Negative"], 1);
    assert!(json["counts"].get("Positive").is_none());
}

#[test]
fn test_correlation_symmetric() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    let json = run_json(&config_path, &["correlation"]);
    let matrix = json["matrix"].as_array().unwrap();
    assert_eq!(matrix.len(), 6);
    for i in 0..6 {
        assert_eq!(matrix[i][i], 1.0);
        for j in 0..6 {
            assert_eq!(matrix[i][j], matrix[j][i]);
        }
    }
}

#[test]
fn test_data_search() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    let (stdout, _, success) = run_cdash(&config_path, &["data", "--search", "ONGKIR"]);
    assert!(success);
    assert!(stdout.contains("Ongkir mahal"));
    assert!(!stdout.contains("Produk bagus"));

    let json = run_json(&config_path, &["data"]);
    assert_eq!(json["total"], 4);
    assert_eq!(json["records"][0]["date"], "2024-01-01");
}

#[test]
fn test_export_csv_to_file() {
    let (tmp, config_path) = setup_test_env(COMMENTS);
    let out = tmp.path().join("out/positive.csv");
    let (_, stderr, success) = run_cdash(
        &config_path,
        &[
            "export",
            "--sentiment",
            "positive",
            "--output",
            out.to_str().unwrap(),
        ],
    );
    assert!(success, "export failed: {}", stderr);
    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.lines().nth(1).unwrap().starts_with("2024-01-01,4,0,Positif,1"));
}

#[test]
fn test_sources_reports_csv() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    let (stdout, _, success) = run_cdash(&config_path, &["sources"]);
    assert!(success);
    assert!(stdout.contains("csv"));
    assert!(stdout.contains("true"));
}

#[test]
fn test_missing_column_fails_with_name() {
    let (_tmp, config_path) = setup_test_env("tanggal,like,sentimen\n2024-01-01,1,Positif\n");
    let (_, stderr, success) = run_cdash(&config_path, &["summary"]);
    assert!(!success);
    assert!(stderr.contains("reply_count"), "stderr was: {}", stderr);
}

#[test]
fn test_malformed_date_fails() {
    let (_tmp, config_path) =
        setup_test_env("tanggal,like,balasan,sentimen\nbesok,1,0,Positif\n");
    let (_, stderr, success) = run_cdash(&config_path, &["trend"]);
    assert!(!success);
    assert!(stderr.contains("malformed date"), "stderr was: {}", stderr);
}

#[test]
fn test_score_mismatch_fails() {
    let (_tmp, config_path) = setup_test_env(
        "tanggal,like,balasan,sentimen,skor_sentimen\n2024-01-01,1,0,Negatif,1\n",
    );
    let (_, stderr, success) = run_cdash(&config_path, &["summary"]);
    assert!(!success);
    assert!(stderr.contains("must have score -1"), "stderr was: {}", stderr);
}

#[test]
fn test_inverted_range_rejected() {
    let (_tmp, config_path) = setup_test_env(COMMENTS);
    let (_, stderr, success) = run_cdash(
        &config_path,
        &["summary", "--since", "2024-02-01", "--until", "2024-01-01"],
    );
    assert!(!success);
    assert!(stderr.contains("invalid filter"));
}

#[test]
fn test_missing_data_file_unavailable() {
    let (tmp, config_path) = setup_test_env(COMMENTS);
    fs::remove_file(tmp.path().join("data/comments.csv")).unwrap();
    let (_, stderr, success) = run_cdash(&config_path, &["summary"]);
    assert!(!success);
    assert!(stderr.contains("data unavailable"));
}
