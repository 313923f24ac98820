use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rag::{
    Config, Difficulty, ExamCounts, GenerationRequest, QuestionType, create_exam_for_document,
    format_bank, format_exam, format_questions, generate_questions, indexed_documents,
    ingest_path, is_indexed, list_documents, load_bank, save_questions,
};
use tracing::warn;

pub fn ingest(cfg: &Config, paths: &[PathBuf]) -> Result<()> {
    let mut failed = 0usize;
    let mut total = 0usize;
    for path in paths {
        let results = ingest_path(cfg, path);
        if results.is_empty() {
            println!("no PDF files under {}", path.display());
        }
        for (file, result) in results {
            total += 1;
            match result {
                Ok(report) => println!(
                    "Successfully processed and vectorized: {} ({} chunks, {}-dim)",
                    report.document, report.chunks, report.dimensions
                ),
                Err(err) => {
                    failed += 1;
                    println!("Failed to process document: {}: {}", file.display(), err);
                }
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} documents failed to ingest", failed, total);
    }
    Ok(())
}

pub fn documents(cfg: &Config) {
    let docs = list_documents(cfg);
    if docs.is_empty() {
        println!("No documents uploaded yet.");
        return;
    }
    let indexed = indexed_documents(cfg);
    for doc in docs {
        if indexed.contains(&doc) {
            println!("* {}", doc);
        } else {
            println!("  {} (not indexed)", doc);
        }
    }
}

pub fn generate(
    cfg: &Config,
    document: &str,
    difficulty: Difficulty,
    q_type: QuestionType,
    count: usize,
    save: bool,
) -> Result<()> {
    if !is_indexed(cfg, document) {
        warn!("{} has no vector index; questions will not be grounded in it", document);
    }
    let req = GenerationRequest {
        document: document.to_string(),
        difficulty,
        q_type,
        count,
    };
    let generation = generate_questions(cfg, &req)
        .with_context(|| format!("failed to generate questions for {}", document))?;

    println!("Generated {} {} questions\n", generation.questions.len(), generation.q_type);
    println!("{}", format_questions(&generation.questions, generation.q_type));

    if save {
        let added = save_questions(
            cfg,
            &generation.document,
            &generation.topic,
            generation.difficulty,
            generation.q_type,
            &generation.questions,
        )?;
        if added == 0 {
            println!("\nNo questions to save.");
        } else {
            println!("\nSaved {} {} questions to {} question bank.", added, generation.q_type, document);
        }
    }
    Ok(())
}

pub fn bank(cfg: &Config, document: &str) {
    println!("{}", format_bank(document, &load_bank(cfg, document)));
}

pub fn exam(
    cfg: &Config,
    document: &str,
    difficulty: Difficulty,
    counts: ExamCounts,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let paper = create_exam_for_document(cfg, document, difficulty, counts)?;
    let rendered = serde_json::to_string_pretty(&paper)?;
    if json {
        println!("{}", rendered);
    } else {
        println!("{}", format_exam(&paper));
    }
    if let Some(path) = output {
        std::fs::write(path, &rendered)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Exam written to {}", path.display());
    }
    Ok(())
}
