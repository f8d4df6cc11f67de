use std::fs;
use tempfile::TempDir;

use serde_json::json;
use soat_core::chunker::{chunk, ChunkingConfig};
use soat_core::config::Config;
use soat_core::error::Error;
use soat_core::types::{Action, ActionKind};

fn cfg(chunk_size: usize, overlap: usize) -> ChunkingConfig { ChunkingConfig { chunk_size, overlap } }

#[test]
fn chunk_ids_are_dense_and_windows_bounded() {
    let text = "lorem ipsum dolor sit amet ".repeat(40);
    let len = text.chars().count();
    let config = cfg(100, 30);
    let chunks = chunk(&text, "manual.pdf", "/docs/manual.pdf", &config).expect("chunk");

    assert!(!chunks.is_empty());
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.chunk_id, i, "ids increase by one");
        assert!(c.text.chars().count() <= 100, "no chunk exceeds chunk_size");
        assert!(!c.text.trim().is_empty());
        assert_eq!(c.doc_id, "manual.pdf");
        assert_eq!(c.source_path, "/docs/manual.pdf");
    }

    // Start offsets advance by chunk_size - overlap and the last window reaches the end.
    let last_start = (chunks.len() - 1) * 70;
    assert!(last_start + chunks.last().map_or(0, |c| c.text.chars().count()) >= len);
}

#[test]
fn blank_windows_are_skipped_without_gaps_in_ids() {
    let text = format!("{}{}{}", "a".repeat(10), " ".repeat(20), "b".repeat(10));
    let chunks = chunk(&text, "d", "p", &cfg(10, 0)).expect("chunk");
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "a".repeat(10));
    assert_eq!(chunks[1].text, "b".repeat(10));
    assert_eq!(chunks[1].chunk_id, 1);
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = chunk("Short text", "a.txt", "a.txt", &ChunkingConfig::default()).expect("chunk");
    assert_eq!(chunks.len(), 1, "text shorter than a window becomes one chunk");
    assert_eq!(chunks[0].text, "Short text");
}

#[test]
fn whitespace_only_text_yields_nothing() {
    let chunks = chunk("   \n\n\t ", "a", "a", &cfg(4, 1)).expect("chunk");
    assert!(chunks.is_empty());
}

#[test]
fn overlap_not_smaller_than_size_is_rejected() {
    for (size, overlap) in [(10, 10), (10, 25), (0, 0)] {
        let err = chunk("some text", "a", "a", &cfg(size, overlap)).expect_err("invalid config");
        assert!(matches!(err, Error::InvalidConfig(_)), "size={size} overlap={overlap}");
    }
}

#[test]
fn action_from_loose_value_keeps_unknown_types() {
    let plate = Action::from_value(&json!({"id": "x", "type": "calc_for_plate", "params": {"placa": "ABC123"}}), 0);
    assert_eq!(plate.kind, ActionKind::CalcForPlate { placa: Some("ABC123".to_string()) });

    let missing = Action::from_value(&json!({"type": "calc_for_plate"}), 1);
    assert_eq!(missing.id, "a2");
    assert_eq!(missing.kind, ActionKind::CalcForPlate { placa: None });

    let unknown = Action::from_value(&json!({"id": "z", "type": "send_email"}), 2);
    assert_eq!(unknown.kind, ActionKind::Unknown("send_email".to_string()));
    assert_eq!(unknown.kind.as_str(), "send_email");

    let not_object = Action::from_value(&json!("load_dataset"), 3);
    assert_eq!(not_object.kind, ActionKind::Unknown(String::new()));
}

#[test]
fn config_merges_toml_over_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[rag]\nchunk_size = 500\nchunk_overlap = 50\ntop_k = 3\nstop_words = true\n",
    )
    .unwrap();

    let config = Config::load_in(tmp.path()).expect("load");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.rag.chunk_size, 500);
    assert_eq!(settings.rag.top_k, 3);
    assert_eq!(settings.llm.model, "llama3.1:8b", "untouched keys keep defaults");
    assert_eq!(config.get::<usize>("rag.chunk_overlap").unwrap(), 50);
    assert_eq!(config.resolve("data/docs"), tmp.path().join("data/docs"));
}

#[test]
fn config_rejects_overlap_larger_than_chunk() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[rag]\nchunk_size = 100\nchunk_overlap = 100\n").unwrap();
    assert!(Config::load_in(tmp.path()).is_err());
}
