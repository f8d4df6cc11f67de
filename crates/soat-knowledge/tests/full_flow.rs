use std::fs;
use tempfile::TempDir;

use soat_core::chunker::ChunkingConfig;
use soat_core::error::Error;
use soat_knowledge::KnowledgeBase;

fn kb() -> KnowledgeBase {
    KnowledgeBase::new(ChunkingConfig { chunk_size: 120, overlap: 20 }).expect("valid chunking")
}

fn seed_docs(dir: &std::path::Path) {
    fs::write(
        dir.join("manual_tarifas.txt"),
        "Tarifa base: los automoviles particulares pagan 600000 pesos. \
         Las motos con cilindraje menor a 100 pagan 400000 pesos. \
         Los taxis pagan 750000 y los buses 900000 pesos anuales.",
    )
    .unwrap();
    fs::write(
        dir.join("factores_riesgo.md"),
        "Factor edad: conductores menores de 25 anos tienen recargo del 20 por ciento. \
         Factor zona: la zona alta tiene recargo del 15 por ciento.",
    )
    .unwrap();
    fs::write(dir.join("notas.csv"), "placa,valor\nABC123,1").unwrap();
}

/// One-page PDF with a single Helvetica text line; `media_box = false` leaves
/// the page without `/MediaBox`. Offsets in the xref table are exact.
fn pdf_bytes(text: &str, media_box: bool) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
    let page = if media_box {
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
    } else {
        "<< /Type /Page /Parent 2 0 R /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
    };
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        page.to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
    }
    let xref = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for off in offsets {
        out.push_str(&format!("{off:010} 00000 n \n"));
    }
    out.push_str(&format!("trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n", objects.len() + 1));
    out.into_bytes()
}

#[test]
fn indexes_recognized_documents_and_retrieves_ranked_chunks() {
    let tmp = TempDir::new().unwrap();
    seed_docs(tmp.path());

    let index = kb().index_documents(tmp.path()).expect("index");
    assert_eq!(index.documents(), 2, "csv files are not documents");
    assert!(index.warnings().is_empty());

    let results = index.retrieve("recargo para conductores menores de 25", 3).expect("retrieve");
    assert!(!results.is_empty() && results.len() <= 3);
    assert_eq!(results[0].doc_id, "factores_riesgo.md");
    assert!(results[0].source_path.ends_with("factores_riesgo.md"));
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(results.iter().all(|r| r.score.is_finite()));
}

#[test]
fn chunk_ids_restart_per_document() {
    let tmp = TempDir::new().unwrap();
    seed_docs(tmp.path());
    let index = kb().index_documents(tmp.path()).expect("index");

    for doc in ["manual_tarifas.txt", "factores_riesgo.md"] {
        let ids: Vec<usize> = index.chunks().iter().filter(|c| c.doc_id == doc).map(|c| c.chunk_id).collect();
        assert!(!ids.is_empty());
        assert_eq!(ids, (0..ids.len()).collect::<Vec<_>>(), "doc={doc}");
    }
}

#[test]
fn reindexing_is_deterministic() {
    let tmp = TempDir::new().unwrap();
    seed_docs(tmp.path());

    let first = kb().index_documents(tmp.path()).expect("first");
    let second = kb().index_documents(tmp.path()).expect("second");
    assert_eq!(first.len(), second.len());

    let q = "tarifa base de motos";
    assert_eq!(first.retrieve(q, 5).expect("first"), second.retrieve(q, 5).expect("second"));
}

#[test]
fn unreadable_documents_are_skipped_with_a_warning() {
    let tmp = TempDir::new().unwrap();
    seed_docs(tmp.path());
    fs::write(tmp.path().join("roto.pdf"), b"definitely not a pdf").unwrap();

    let index = kb().index_documents(tmp.path()).expect("partial indexing is fine");
    assert_eq!(index.documents(), 2);
    assert!(index.warnings().iter().any(|w| w.contains("roto.pdf")));
    assert!(index.retrieve("taxis", 2).is_ok());
}

#[test]
fn empty_directory_yields_not_indexed_on_retrieve() {
    let tmp = TempDir::new().unwrap();
    let index = kb().index_documents(tmp.path()).expect("empty index is not an error");
    assert!(index.is_empty());
    assert!(!index.warnings().is_empty());
    assert!(matches!(index.retrieve("tarifa", 5), Err(Error::NotIndexed)));
}

#[test]
fn missing_directory_yields_not_indexed_on_retrieve() {
    let tmp = TempDir::new().unwrap();
    let index = kb().index_documents(&tmp.path().join("nope")).expect("missing dir is a warning");
    assert!(matches!(index.retrieve("tarifa", 5), Err(Error::NotIndexed)));
}

#[test]
fn invalid_chunking_is_rejected_up_front() {
    let err = KnowledgeBase::new(ChunkingConfig { chunk_size: 50, overlap: 50 }).expect_err("overlap == size");
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn pdf_documents_are_extracted_chunked_and_retrieved() {
    let tmp = TempDir::new().unwrap();
    seed_docs(tmp.path());
    fs::write(tmp.path().join("tarifas_2024.pdf"), pdf_bytes("Tarifa especial para volquetas mineras", true)).unwrap();

    let index = kb().index_documents(tmp.path()).expect("index");
    assert_eq!(index.documents(), 3);
    assert!(index.warnings().is_empty(), "warnings={:?}", index.warnings());

    let results = index.retrieve("volquetas mineras", 2).expect("retrieve");
    assert_eq!(results[0].doc_id, "tarifas_2024.pdf");
    assert_eq!(results[0].chunk_id, 0);
    assert!(results[0].source_path.ends_with("tarifas_2024.pdf"));
    assert!(results[0].text.contains("volquetas"));
}

#[test]
fn pdf_that_crashes_the_parser_is_skipped_with_a_warning() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("ok.txt"), "Los taxis pagan 750000 pesos anuales.").unwrap();
    fs::write(tmp.path().join("sin_mediabox.pdf"), pdf_bytes("Texto inaccesible", false)).unwrap();

    let index = kb().index_documents(tmp.path()).expect("a bad pdf must not abort indexing");
    assert_eq!(index.documents(), 1);
    assert!(index.warnings().iter().any(|w| w.contains("sin_mediabox.pdf")), "warnings={:?}", index.warnings());
    assert_eq!(index.retrieve("taxis", 1).expect("retrieve")[0].doc_id, "ok.txt");
}

#[cfg(unix)]
#[test]
fn symlinked_documents_are_indexed() {
    let src = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    let target = src.path().join("manual_real.txt");
    fs::write(&target, "Las ambulancias tienen tarifa diferencial.").unwrap();
    std::os::unix::fs::symlink(&target, docs.path().join("manual.txt")).unwrap();

    let index = kb().index_documents(docs.path()).expect("index");
    assert_eq!(index.documents(), 1);
    assert_eq!(index.retrieve("ambulancias", 1).expect("retrieve")[0].doc_id, "manual.txt");
}
