use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tfidf_core::{compute_fingerprint, ConnectionProvider, SharedConnection, TfIdfCalculator};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(default)]
    id: Option<String>,
    #[serde(alias = "text")]
    body: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScoreLine<'a> {
    query: &'a str,
    fingerprint: String,
    score: f64,
    terms: usize,
    distinct_terms: usize,
    document_count: u64,
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Feed documents into a TF-IDF corpus and score texts against it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a corpus from input files, then score each query against it
    Score {
        /// Input path (file or directory of .json, .jsonl or .txt files)
        #[arg(long)]
        input: String,
        /// Text to score; may be repeated
        #[arg(long = "query")]
        queries: Vec<String>,
        /// File with one query per line
        #[arg(long)]
        queries_file: Option<String>,
        /// Storage directory recording the fingerprint of every ingested document
        #[arg(long)]
        db: Option<String>,
    },
    /// Print the fingerprint of a text
    Fingerprint {
        #[arg(long)]
        text: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Score { input, queries, queries_file, db } => {
            let mut queries = queries;
            if let Some(path) = queries_file {
                queries.extend(read_lines(Path::new(&path))?);
            }
            let provider = db.map(ConnectionProvider::new);
            let conn = provider.as_ref().map(ConnectionProvider::get).transpose()?;
            let calc = TfIdfCalculator::new();
            let ingested = build_corpus(Path::new(&input), &calc, conn.as_ref())?;
            tracing::info!(ingested, vocabulary = calc.stats().vocabulary_size, "corpus built");
            if let Some(conn) = &conn {
                conn.flush()?;
            }
            let stdout = io::stdout();
            let mut out = stdout.lock();
            score_queries(&calc, &queries, &mut out)
        }
        Commands::Fingerprint { text } => {
            println!("{}", compute_fingerprint(&text));
            Ok(())
        }
    }
}

fn collect_files(input_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl" | "txt") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    files
}

/// Add every document under `input` to `calc`. Returns the number added.
fn build_corpus(input: &Path, calc: &TfIdfCalculator, conn: Option<&SharedConnection>) -> Result<usize> {
    let mut ingested = 0usize;
    for file in collect_files(input) {
        let docs = match file.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => read_jsonl(&file)?,
            Some("txt") => vec![InputDoc { id: None, body: Some(fs::read_to_string(&file)?) }],
            _ => read_json(&file)?,
        };
        for doc in docs {
            ingest_doc(doc, calc, conn).with_context(|| format!("ingesting {}", file.display()))?;
            ingested += 1;
        }
    }
    Ok(ingested)
}

fn read_jsonl(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(docs)
}

fn read_json(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<InputDoc>>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => vec![],
    };
    Ok(docs)
}

fn ingest_doc(doc: InputDoc, calc: &TfIdfCalculator, conn: Option<&SharedConnection>) -> Result<()> {
    calc.add_document_to_corpus(doc.body.as_deref())?;
    if let (Some(conn), Some(body)) = (conn, doc.body.as_deref()) {
        let record = conn.record_document(&compute_fingerprint(body))?;
        if record.times_seen > 1 {
            tracing::warn!(id = ?doc.id, times_seen = record.times_seen, "document seen before");
        }
    }
    Ok(())
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    Ok(lines)
}

fn score_queries<W: Write>(calc: &TfIdfCalculator, queries: &[String], out: &mut W) -> Result<()> {
    for query in queries {
        let breakdown = calc.score_breakdown(query);
        let line = ScoreLine {
            query,
            fingerprint: compute_fingerprint(query),
            score: breakdown.score,
            terms: breakdown.term_count,
            distinct_terms: breakdown.distinct_terms,
            document_count: breakdown.document_count,
        };
        serde_json::to_writer(&mut *out, &line)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_inputs(dir: &Path) {
        fs::write(dir.join("a.jsonl"), "{\"id\":\"1\",\"body\":\"this is a test document\"}\n\n{\"id\":\"2\",\"body\":\"this document is another test\"}\n").unwrap();
        fs::write(dir.join("b.json"), "[{\"text\":\"another test\"}]").unwrap();
        fs::write(dir.join("c.txt"), "plain text document").unwrap();
        fs::write(dir.join("ignored.md"), "not read").unwrap();
    }

    #[test]
    fn builds_corpus_from_mixed_inputs() {
        let dir = tempdir().unwrap();
        write_inputs(dir.path());
        let calc = TfIdfCalculator::new();
        let n = build_corpus(dir.path(), &calc, None).unwrap();
        assert_eq!(n, 4);
        assert_eq!(calc.document_count(), 4);
        assert_eq!(calc.frequency_of("document"), 3);
        assert_eq!(calc.frequency_of("read"), 0);
    }

    #[test]
    fn null_body_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{\"id\":\"x\",\"body\":null}").unwrap();
        let calc = TfIdfCalculator::new();
        let err = build_corpus(dir.path(), &calc, None).unwrap_err();
        let core_err = err.downcast_ref::<tfidf_core::Error>().unwrap();
        assert!(core_err.is_invalid_argument());
        assert_eq!(calc.document_count(), 0);
    }

    #[test]
    fn records_fingerprints_when_storage_given() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dup.jsonl"), "{\"body\":\"same\"}\n{\"body\":\"same\"}\n").unwrap();
        let provider = ConnectionProvider::temporary();
        let conn = provider.get().unwrap();
        let calc = TfIdfCalculator::new();
        build_corpus(dir.path(), &calc, Some(&conn)).unwrap();
        assert_eq!(calc.frequency_of("same"), 2);
        let record = conn.document_record(&compute_fingerprint("same")).unwrap().unwrap();
        assert_eq!(record.times_seen, 2);
    }

    #[test]
    fn writes_one_json_line_per_query() {
        let calc = TfIdfCalculator::new();
        calc.add_document("this is a test document");
        let mut out = Vec::new();
        score_queries(&calc, &["test".to_string(), "".to_string()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["score"].as_f64(), Some(1.0));
        assert_eq!(lines[1]["score"].as_f64(), Some(0.0));
        assert_eq!(lines[1]["fingerprint"], "D41D8CD98F00B204E9800998ECF8427E");
    }
}
