use std::env;
use std::path::PathBuf;

use soat_core::config::Config;
use soat_knowledge::KnowledgeBase;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [docs_dir] [top_k]", args[0]);
        eprintln!("Example: {} 'recargo conductores jovenes' data/docs 5", args[0]);
        std::process::exit(1);
    }
    let config = Config::load()?;
    let settings = config.settings()?;

    let query_text = &args[1];
    let docs_dir = args.get(2).map(PathBuf::from).unwrap_or_else(|| config.resolve(&settings.paths.docs_dir));
    let top_k = match args.get(3) {
        Some(k) => k.parse()?,
        None => settings.rag.top_k,
    };

    println!("🔍 soat-search\n==================");
    println!("Query: {}", query_text);
    println!("Docs directory: {}", docs_dir.display());

    let kb = KnowledgeBase::new(settings.rag.chunking())?.with_stop_words(settings.rag.stop_words);
    let index = kb.index_documents(&docs_dir)?;
    for w in index.warnings() {
        eprintln!("⚠️  {w}");
    }
    let results = index.retrieve(query_text, top_k)?;
    println!("\n🔍 Found {} results for: \"{}\"", results.len(), query_text);
    for (i, r) in results.iter().enumerate() {
        let snippet: String = r.text.replace('\n', " ").chars().take(200).collect();
        println!("\n  {}. score={:.4}  doc={}  chunk={}  path={}", i + 1, r.score, r.doc_id, r.chunk_id, r.source_path);
        println!("     📝 Context: {}", snippet);
    }
    Ok(())
}
