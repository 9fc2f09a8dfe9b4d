use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use labref_core::{AnalysisOptions, Analyzer};
use labref_kb::{IntegrityReport, KbCounts, KbSnapshot, KbStats, KnowledgeBase};
use labref_map::NameIndex;
use labref_model::{AnalysisReport, Subject};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, info_span, trace};

use labref_cli::input::read_observations;
use labref_cli::logging::redact_value;

use crate::cli::{AnalyzeArgs, KbArgs, LookupArgs, StatsArgs};
use crate::types::{LookupRow, VerifyResult};

fn load_knowledge_base(args: &KbArgs) -> Result<KnowledgeBase> {
    let (kb, _) = KnowledgeBase::load(&args.kb)
        .with_context(|| format!("load knowledge base {}", args.kb.display()))?;
    Ok(kb)
}

pub fn run_analyze(args: &AnalyzeArgs) -> Result<AnalysisReport> {
    let span = info_span!("analyze_command", observations = %args.observations.display());
    let _guard = span.enter();
    let start = Instant::now();

    let kb = load_knowledge_base(&args.kb)?;
    let observations = read_observations(&args.observations)?;
    info!(count = observations.len(), "observations read");

    let analyzer = Analyzer::new(Arc::new(kb), analysis_options(args));
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = analyzer.analyze(&observations, &mut rng);

    for result in &report.results {
        trace!(
            raw_name = %result.observation.raw_test_name,
            value = redact_value(&result.observation.value.to_string()),
            reference = %result.reference_range,
            classification = %result.classification,
            "observation classified"
        );
    }
    debug!(
        elapsed_ms = start.elapsed().as_millis(),
        abnormal = report.counts.abnormal(),
        "analyze finished"
    );
    Ok(report)
}

fn analysis_options(args: &AnalyzeArgs) -> AnalysisOptions {
    let mut subject = Subject::new();
    subject.sex = args.sex;
    subject.age = args.age;
    subject.condition = args.condition.clone();

    let mut options = AnalysisOptions::new()
        .with_default_subject(subject)
        .with_suggestions(args.suggest);
    if args.no_jitter {
        options = options.without_jitter();
    } else if let Some(amplitude) = args.jitter {
        options = options.with_jitter_amplitude(amplitude);
    }
    options
}

/// Checks a snapshot without refusing it, so every violation can be listed.
pub fn run_verify(args: &KbArgs) -> Result<VerifyResult> {
    let span = info_span!("verify", path = %args.kb.display());
    let _guard = span.enter();

    let loaded = KbSnapshot::read(&args.kb)
        .with_context(|| format!("read knowledge base {}", args.kb.display()))?;
    let report = IntegrityReport::check(&loaded.snapshot);
    let snapshot = &loaded.snapshot;
    let counts = KbCounts {
        tests: snapshot.tests.len(),
        sources: snapshot.sources.len(),
        ranges: snapshot.ranges.len(),
        synonyms: snapshot.synonyms.len(),
    };
    info!(violations = report.len(), sha256 = %loaded.sha256, "snapshot checked");
    Ok(VerifyResult {
        path: args.kb.clone(),
        sha256: loaded.sha256,
        counts,
        violations: report.violations,
    })
}

pub fn run_stats(args: &StatsArgs) -> Result<KbStats> {
    let span = info_span!("stats", path = %args.kb.kb.display());
    let _guard = span.enter();
    let kb = load_knowledge_base(&args.kb)?;
    Ok(KbStats::compute(&kb))
}

pub fn run_lookup(args: &LookupArgs) -> Result<Vec<LookupRow>> {
    let span = info_span!("lookup", names = args.names.len());
    let _guard = span.enter();
    let kb = load_knowledge_base(&args.kb)?;
    let index = NameIndex::build(&kb);
    Ok(args
        .names
        .iter()
        .map(|raw| lookup_one(&kb, &index, raw, args.limit, args.min_score))
        .collect())
}

fn lookup_one(
    kb: &KnowledgeBase,
    index: &NameIndex,
    raw: &str,
    limit: usize,
    min_score: f64,
) -> LookupRow {
    let name_match = index.resolve(raw);
    let canonical_name = name_match
        .test_id
        .and_then(|id| kb.test(id))
        .map(|test| test.canonical_name.clone());
    // Suggestions are only offered for names that did not resolve.
    let suggestions = if name_match.is_matched() {
        Vec::new()
    } else {
        index.suggest(raw, limit, min_score)
    };
    LookupRow {
        raw_name: raw.to_string(),
        name_match,
        canonical_name,
        suggestions,
    }
}

/// Prints a serializable value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}
