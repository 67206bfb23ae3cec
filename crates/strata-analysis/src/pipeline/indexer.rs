//! The incremental rebuild coordinator.
//!
//! One run walks `Discovering → Parsing → Resolving → Aggregating →
//! AnalyticsRecompute → Committed`. Parsing happens outside the store on
//! the rayon pool; everything from Resolving on is staged in a single
//! `BEGIN IMMEDIATE` transaction that only commits once analytics are
//! written. A failure or cancellation anywhere before that drops the
//! transaction, and readers keep seeing the previous snapshot.

use std::collections::BTreeSet;
use std::time::Instant;

use rayon::prelude::*;
use rusqlite::Connection;
use rustc_hash::FxHashMap;
use strata_core::errors::{PipelineError, StrataErrorCode};
use strata_core::tracing::metrics;
use strata_core::types::{FileId, SymbolId};
use strata_core::{Cancellable, CancellationToken};
use strata_storage::queries::edges;
use strata_storage::queries::file_edges;
use strata_storage::queries::files::{self, FileRecord};
use strata_storage::queries::history::{self as history_rows, FileStatsRecord, HistoryState};
use strata_storage::queries::metrics as metric_rows;
use strata_storage::queries::refs::{self, RefRecord};
use strata_storage::queries::runs;
use strata_storage::queries::snapshots::{self, SnapshotRecord};
use strata_storage::queries::symbols::{self, IndexedSymbol, SymbolRecord};
use strata_storage::queries::util::unix_now;
use strata_storage::DatabaseManager;

use super::context::IndexContext;
use super::lock::RunLock;
use super::phase::{Phase, PhaseTracker};
use super::report::{RunReport, RunStatus};
use crate::extract::{ExtractStatus, ExtractionCache, FileExtraction, SymbolKind};
use crate::graph::{analyze, AnalyticsOutput, SymbolGraph};
use crate::health::{
    composite_score, file_health_scores, indentation_complexity, FileHealthInput, HealthInputs,
};
use crate::history::{compute_signals, read_history, HistoryDelta};
use crate::resolve::{ReferencingFile, Resolver, SymbolIndex};
use crate::scanner::hasher::{hash_content, hash_hex};
use crate::scanner::{
    classify, classify_role, discover, resolve_mode, ChangeSet, ClassifiedFile, FileClass,
};

/// Per-run switches.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Re-parse every discovered file, ignoring fingerprints.
    pub force: bool,
    pub cancel: CancellationToken,
}

/// A file version parsed this run, ready to stage.
#[derive(Debug)]
struct ParsedFile {
    file_id: i64,
    record: FileRecord,
    extraction: FileExtraction,
}

/// Drives indexing runs for one repository.
pub struct Indexer<'a> {
    ctx: &'a IndexContext,
    db: &'a DatabaseManager,
    cache: ExtractionCache,
}

impl<'a> Indexer<'a> {
    pub fn new(ctx: &'a IndexContext, db: &'a DatabaseManager) -> Self {
        Self {
            ctx,
            db,
            cache: ExtractionCache::new(),
        }
    }

    pub fn cache(&self) -> &ExtractionCache {
        &self.cache
    }

    /// Run once under the repository's run lock.
    pub fn run(&self, options: &RunOptions) -> Result<RunReport, PipelineError> {
        let mut lock = RunLock::open(&self.ctx.index_dir())?;
        lock.hold(|| self.run_unlocked(options))?
    }

    /// Run without taking the lock. Callers must guarantee exclusivity.
    pub fn run_unlocked(&self, options: &RunOptions) -> Result<RunReport, PipelineError> {
        let started = Instant::now();
        let root = self.ctx.root.to_string_lossy().into_owned();
        let run_id = self
            .db
            .with_writer(|c| runs::insert_run_start(c, &root, unix_now()))?;
        let span = tracing::info_span!("index_run", run_id, root = %root);
        let _guard = span.enter();

        let mut tracker = PhaseTracker::new(run_id);
        match self.execute(&mut tracker, options, started) {
            Ok(report) => {
                if let Err(e) = self.db.checkpoint() {
                    tracing::warn!(error = %e, "wal checkpoint failed");
                }
                Ok(report)
            }
            Err(e) => {
                let phase = tracker.current();
                tracing::warn!(error = %e, phase = phase.as_str(), "run aborted, previous snapshot kept");
                let elapsed = started.elapsed().as_millis() as i64;
                let marked = self.db.with_writer(|c| {
                    runs::update_run_failed(c, run_id, phase.as_str(), unix_now(), elapsed, &e.tagged())
                });
                if let Err(mark) = marked {
                    tracing::error!(error = %mark, "could not record failed run");
                }
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        tracker: &mut PhaseTracker,
        options: &RunOptions,
        started: Instant,
    ) -> Result<RunReport, PipelineError> {
        let ctx = self.ctx;
        let cancel = &options.cancel;
        let index_dir = ctx.index_dir();
        let mut report = RunReport::new(tracker.run_id(), options.force);

        self.enter(tracker, Phase::Discovering)?;
        let discovery = discover(&ctx.root, &ctx.config.scan, &index_dir, cancel)?;
        report.files.skipped_large = discovery.skipped_large;
        report.files.skipped_filtered = discovery.skipped_filtered;
        let stored = self.db.with_reader(files::live_fingerprints)?;
        let mode = resolve_mode(ctx.config.scan.effective_fingerprint(), &ctx.root, &index_dir);
        let changes = classify(discovery, &stored, mode);
        count_files(&mut report, &changes);
        tracing::info!(
            { metrics::FILES_DISCOVERED } = report.files.discovered,
            changed = report.files.changed,
            new = report.files.new,
            deleted = report.files.deleted,
            fingerprint = mode.name(),
            "change set classified"
        );
        check_cancel(cancel)?;

        let delta = self.read_history(&mut report, cancel)?;
        let stored_head = self
            .db
            .with_reader(history_rows::history_state)?
            .map(|s| s.head);
        let head_moved = delta
            .as_ref()
            .is_some_and(|d| d.reset || Some(&d.head) != stored_head.as_ref());
        let first_run = self.db.with_reader(runs::latest_completed_run)?.is_none();

        if changes.is_clean() && !head_moved && !options.force && !first_run {
            return self.finish_up_to_date(tracker, report, started);
        }

        self.enter(tracker, Phase::Parsing)?;
        let parse_set: Vec<&ClassifiedFile> = if options.force {
            changes.files.iter().collect()
        } else {
            changes.to_parse().collect()
        };
        let parsed = self.parse_all(&parse_set, cancel)?;
        check_cancel(cancel)?;
        report.files.parsed = parsed.len();
        for p in &parsed {
            match &p.extraction.status {
                ExtractStatus::Failed { .. } => report.parse_failures.record_failed(&p.record.path),
                ExtractStatus::Partial { .. } => report.parse_failures.record_partial(&p.record.path),
                ExtractStatus::Unsupported => report.parse_failures.unsupported += 1,
                ExtractStatus::Parsed => {}
            }
        }
        report.cache_hit_rate = self.cache.hit_rate();
        tracing::info!(
            { metrics::FILES_PARSED } = parsed.len(),
            { metrics::CACHE_HIT_RATE } = report.cache_hit_rate,
            failures = report.parse_failures.count(),
            "parsing complete"
        );

        self.db.with_staging(|tx| {
            self.stage(tx, tracker, report, &changes, &parsed, delta, options, started)
        })
    }

    /// Everything written inside the staging transaction.
    #[allow(clippy::too_many_arguments)]
    fn stage(
        &self,
        conn: &Connection,
        tracker: &mut PhaseTracker,
        mut report: RunReport,
        changes: &ChangeSet,
        parsed: &[ParsedFile],
        delta: Option<HistoryDelta>,
        options: &RunOptions,
        started: Instant,
    ) -> Result<RunReport, PipelineError> {
        let cancel = &options.cancel;
        let run_id = tracker.run_id();
        let now = unix_now();
        let write_started = Instant::now();

        enter_staged(conn, tracker, Phase::Resolving)?;
        let parsed_ids: Vec<i64> = sorted_ids(parsed.iter().map(|p| p.file_id));
        let deleted_ids: Vec<i64> = sorted_ids(changes.deleted.iter().map(|d| d.id));
        let retired: Vec<i64> = sorted_ids(parsed_ids.iter().chain(&deleted_ids).copied());

        // Names the old versions declared, before their symbols go.
        let mut names = symbols::names_in_files(conn, &retired)?;
        symbols::delete_symbols_for_files(conn, &retired)?;
        refs::delete_refs_for_files(conn, &retired)?;
        files::mark_removed(conn, &deleted_ids, now)?;

        for p in parsed {
            let (symbol_rows, ref_rows) = staged_rows(p);
            files::upsert_file(conn, &p.record)?;
            report.symbols_written += symbols::insert_symbols(conn, &symbol_rows)?;
            refs::insert_refs(conn, &ref_rows)?;
            names.extend(symbol_rows.into_iter().map(|s| s.name));
        }
        for f in &changes.files {
            if f.class == FileClass::Unchanged && f.mtime_moved && !options.force {
                files::update_mtime(
                    conn,
                    FileId::derive(&f.file.path).raw(),
                    f.file.mtime_secs,
                    i64::from(f.file.mtime_nanos),
                )?;
            }
        }

        let mut spelled = Vec::new();
        for name in &names {
            for bridge in &self.ctx.bridges {
                spelled.extend(bridge.spellings(name));
            }
        }
        names.extend(spelled);
        names.sort();
        names.dedup();

        let referencing = refs::files_referencing(conn, &names)?;
        let deleted: BTreeSet<i64> = deleted_ids.iter().copied().collect();
        let affected: Vec<i64> = sorted_ids(
            parsed_ids
                .iter()
                .chain(referencing.iter())
                .copied()
                .filter(|id| !deleted.contains(id)),
        );
        report.files.re_resolved = affected.len() - parsed_ids.len();

        edges::delete_edges_from_files(conn, &affected)?;
        let index_rows = symbols::load_index(conn)?;
        let live = files::live_files(conn)?;
        let (edges_written, diagnostics) = self.resolve_affected(conn, &index_rows, &live, &affected)?;
        report.edges_written = edges_written;
        tracing::info!(
            { metrics::RESOLUTION_RATE } = diagnostics.resolution_rate(),
            affected = affected.len(),
            edges = edges_written,
            "references resolved"
        );
        report.resolution = diagnostics;
        check_cancel(cancel)?;

        enter_staged(conn, tracker, Phase::Aggregating)?;
        file_edges::delete_touching(conn, &retired)?;
        file_edges::recompute_for_sources(conn, &affected)?;

        if let Some(delta) = delta {
            report.history.commits_recorded = record_history(conn, &delta, now)?;
        }
        let change_rows = if report.history.enabled {
            history_rows::all_changes(conn)?
        } else {
            Vec::new()
        };
        let live_paths: FxHashMap<String, i64> =
            live.iter().map(|f| (f.path.clone(), f.id)).collect();
        let signals = compute_signals(
            &change_rows,
            &live_paths,
            self.ctx.config.history.effective_max_files_per_commit(),
        );
        check_cancel(cancel)?;

        enter_staged(conn, tracker, Phase::AnalyticsRecompute)?;
        let all_edges = edges::all_edges(conn)?;
        let graph = SymbolGraph::from_records(&index_rows, &all_edges);
        let analytics = analyze(&graph, &self.ctx.config.analysis);
        metric_rows::replace_symbol_metrics(conn, &analytics.metrics, run_id)?;
        metric_rows::replace_communities(conn, &analytics.communities, run_id)?;
        metric_rows::replace_layer_violations(conn, &analytics.violations, run_id)?;

        let dead = dead_export_ratios(&index_rows, &analytics);
        let max_cc: FxHashMap<i64, i64> = symbols::max_complexity_by_file(conn)?
            .into_iter()
            .collect();
        let inputs: Vec<FileHealthInput> = live
            .iter()
            .map(|f| {
                let flags = analytics.file_flags.get(&f.id).copied().unwrap_or_default();
                let s = signals.get(&f.id).cloned().unwrap_or_default();
                FileHealthInput {
                    max_symbol_complexity: max_cc.get(&f.id).copied().unwrap_or(0),
                    complexity: f.complexity,
                    in_cycle: flags.in_cycle,
                    has_god: flags.has_god,
                    dead_export_ratio: dead.get(&f.id).copied().unwrap_or(0.0),
                    cochange_entropy: s.cochange_entropy,
                    owner_share: s.owner_share,
                    commit_count: s.commit_count,
                    churn: s.churn,
                }
            })
            .collect();
        let scores = file_health_scores(&inputs);
        let stats: Vec<FileStatsRecord> = live
            .iter()
            .zip(&scores)
            .map(|(f, &health)| {
                let s = signals.get(&f.id).cloned().unwrap_or_default();
                FileStatsRecord {
                    file_id: f.id,
                    commit_count: s.commit_count,
                    churn: s.churn,
                    distinct_authors: s.distinct_authors,
                    top_owner: s.top_owner,
                    owner_share: s.owner_share,
                    cochange_entropy: s.cochange_entropy,
                    health,
                }
            })
            .collect();
        history_rows::replace_file_stats(conn, &stats, run_id)?;

        let summary = &analytics.summary;
        let mean_file_health =
            (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);
        let health = composite_score(
            &HealthInputs {
                nodes: summary.nodes,
                tangle_ratio: summary.tangle_ratio,
                god_components: summary.god_components,
                bottlenecks: summary.bottlenecks,
                layer_violations: summary.layer_violations,
                mean_file_health,
            },
            &self.ctx.config.health.effective_weights(),
        );

        report.symbols_total = symbols::count_symbols(conn)?;
        report.edges_total = edges::count_edges(conn)?;
        let snapshot = SnapshotRecord {
            run_id,
            ts: now,
            files: live.len() as i64,
            symbols: report.symbols_total,
            edges: report.edges_total,
            tangle_ratio: summary.tangle_ratio,
            cycles: summary.cycles as i64,
            god_components: summary.god_components as i64,
            bottlenecks: summary.bottlenecks as i64,
            layer_violations: summary.layer_violations as i64,
            modularity: summary.modularity,
            spectral_gap: summary.spectral_gap,
            propagation_cost: summary.propagation_cost,
            propagation_tier: summary.propagation_precision.as_str().to_string(),
            health_score: health.score,
        };
        snapshots::insert_snapshot(conn, &snapshot)?;
        snapshots::append_metric_values(
            conn,
            now,
            run_id,
            &[
                ("health_score", health.score),
                ("tangle_ratio", summary.tangle_ratio),
                ("cycle_ratio", summary.cycle_ratio),
                ("modularity", summary.modularity),
                ("spectral_gap", summary.spectral_gap),
                ("propagation_cost", summary.propagation_cost),
                ("god_components", summary.god_components as f64),
                ("bottlenecks", summary.bottlenecks as f64),
                ("layer_violations", summary.layer_violations as f64),
                ("files", live.len() as f64),
                ("symbols", report.symbols_total as f64),
                ("edges", report.edges_total as f64),
            ],
        )?;
        report.notices = summary.notices.clone();
        report.analytics = Some(analytics.summary);
        report.health = Some(health);
        check_cancel(cancel)?;

        enter_staged(conn, tracker, Phase::Committed)?;
        report.phase = Phase::Committed;
        report.status = RunStatus::Completed;
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        let json = report_json(&report);
        runs::update_run_complete(
            conn,
            run_id,
            report.status.as_str(),
            report.phase.as_str(),
            unix_now(),
            report.files.parsed as i64,
            report.elapsed_ms as i64,
            &json,
        )?;
        tracing::info!(
            { metrics::STAGE_WRITE_TIME } = write_started.elapsed().as_millis() as u64,
            symbols = report.symbols_total,
            edges = report.edges_total,
            health = health.score,
            "run staged"
        );
        Ok(report)
    }

    fn finish_up_to_date(
        &self,
        tracker: &mut PhaseTracker,
        mut report: RunReport,
        started: Instant,
    ) -> Result<RunReport, PipelineError> {
        self.enter(tracker, Phase::Committed)?;
        report.status = RunStatus::UpToDate;
        report.phase = Phase::Committed;
        let (symbols_total, edges_total) = self
            .db
            .with_reader(|c| Ok((symbols::count_symbols(c)?, edges::count_edges(c)?)))?;
        report.symbols_total = symbols_total;
        report.edges_total = edges_total;
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        let json = report_json(&report);
        let run_id = tracker.run_id();
        self.db.with_writer(|c| {
            runs::update_run_complete(
                c,
                run_id,
                report.status.as_str(),
                report.phase.as_str(),
                unix_now(),
                0,
                report.elapsed_ms as i64,
                &json,
            )
        })?;
        tracing::info!(run_id, "tree and history unchanged, nothing to do");
        Ok(report)
    }

    fn read_history(
        &self,
        report: &mut RunReport,
        cancel: &CancellationToken,
    ) -> Result<Option<HistoryDelta>, PipelineError> {
        let config = &self.ctx.config.history;
        report.history.enabled = config.effective_enabled();
        if !report.history.enabled {
            return Ok(None);
        }
        let last = self
            .db
            .with_reader(history_rows::history_state)?
            .map(|s| s.head);
        let delta = match read_history(
            &self.ctx.root,
            last.as_deref(),
            config.effective_max_commits(),
            cancel,
        ) {
            Ok(delta) => delta,
            Err(e) => {
                tracing::warn!(error = %e, "history refresh skipped");
                report.history.error = Some(e.to_string());
                None
            }
        };
        check_cancel(cancel)?;
        if let Some(d) = &delta {
            report.history.head = Some(d.head.clone());
            report.history.commits_walked = d.commits.len();
            report.history.reset = d.reset;
            tracing::info!({ metrics::COMMITS_WALKED } = d.commits.len(), reset = d.reset, "history read");
        }
        Ok(delta)
    }

    /// Parse every file of `set` in parallel. Results keep `set` order.
    fn parse_all(
        &self,
        set: &[&ClassifiedFile],
        cancel: &CancellationToken,
    ) -> Result<Vec<ParsedFile>, PipelineError> {
        let work = || -> Vec<Option<ParsedFile>> {
            set.par_iter()
                .map(|f| (!cancel.is_cancelled()).then(|| self.parse_one(f)))
                .collect()
        };
        let threads = self.ctx.config.scan.effective_threads();
        let results = if threads == 0 {
            work()
        } else {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(work),
                Err(e) => {
                    tracing::warn!(error = %e, threads, "custom parse pool unavailable, using the global pool");
                    work()
                }
            }
        };
        check_cancel(cancel)?;
        Ok(results.into_iter().flatten().collect())
    }

    fn parse_one(&self, f: &ClassifiedFile) -> ParsedFile {
        let path = &f.file.path;
        let file_id = FileId::derive(path).raw();
        let (extraction, hash, role, complexity) = match std::fs::read(&f.file.abs_path) {
            Ok(content) => {
                let hash = hash_content(&content);
                let extraction = self
                    .ctx
                    .registry
                    .extract(path, &content, hash, Some(&self.cache));
                let role = classify_role(path, Some(content.as_slice()));
                (extraction, hash, role, indentation_complexity(&content))
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "file vanished or unreadable during parse");
                let extraction = FileExtraction::failed(f.file.language, 0, e.to_string());
                (extraction, f.content_hash, classify_role(path, None), 0.0)
            }
        };
        let language = extraction.language.or(f.file.language);
        let record = FileRecord {
            id: file_id,
            path: path.clone(),
            language: language.map(|l| l.key().to_string()),
            hash: hash_hex(hash),
            mtime: f.file.mtime_secs,
            mtime_nanos: i64::from(f.file.mtime_nanos),
            size: f.file.size as i64,
            role: role.as_str().to_string(),
            line_count: i64::from(extraction.line_count),
            complexity,
            parse_status: extraction.status.as_str().to_string(),
            parse_errors: i64::from(extraction.status.error_nodes()),
            removed_at: None,
        };
        ParsedFile {
            file_id,
            record,
            extraction,
        }
    }

    /// Re-resolve the cached references of `affected` and write the edges.
    fn resolve_affected(
        &self,
        conn: &Connection,
        index_rows: &[IndexedSymbol],
        live: &[FileRecord],
        affected: &[i64],
    ) -> Result<(usize, crate::resolve::ResolutionDiagnostics), PipelineError> {
        let index = SymbolIndex::build(index_rows);
        let stored_refs = refs::refs_for_files(conn, affected)?;
        let by_file: FxHashMap<i64, &[RefRecord]> = stored_refs
            .chunk_by(|a, b| a.file_id == b.file_id)
            .map(|group| (group[0].file_id, group))
            .collect();

        // Live files are path ordered, which fixes the resolution order.
        let referencing: Vec<ReferencingFile<'_>> = live
            .iter()
            .filter_map(|f| {
                by_file.get(&f.id).map(|&refs| ReferencingFile {
                    file_id: f.id,
                    path: &f.path,
                    language: f.language.as_deref(),
                    provenance: &f.hash,
                    refs,
                })
            })
            .collect();

        let output = Resolver::new(&index, &self.ctx.bridges).resolve_files(&referencing);
        let written = edges::insert_edges(conn, &output.edges)?;
        Ok((written, output.diagnostics))
    }

    /// Advance outside the staging transaction.
    fn enter(&self, tracker: &mut PhaseTracker, next: Phase) -> Result<(), PipelineError> {
        tracker.advance(next)?;
        let run_id = tracker.run_id();
        self.db
            .with_writer(|c| runs::update_run_phase(c, run_id, next.as_str()))?;
        Ok(())
    }
}

/// Open the store under `ctx`'s index directory and run once.
pub fn index_repository(ctx: &IndexContext, options: &RunOptions) -> Result<RunReport, PipelineError> {
    let db = DatabaseManager::open_with_pool(&ctx.db_path(), ctx.config.storage.effective_read_pool_size())?;
    Indexer::new(ctx, &db).run(options)
}

/// Advance inside the staging transaction; the phase column commits with it.
fn enter_staged(conn: &Connection, tracker: &mut PhaseTracker, next: Phase) -> Result<(), PipelineError> {
    tracker.advance(next)?;
    runs::update_run_phase(conn, tracker.run_id(), next.as_str())?;
    Ok(())
}

fn check_cancel(cancel: &CancellationToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    Ok(())
}

fn sorted_ids(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let set: BTreeSet<i64> = ids.collect();
    set.into_iter().collect()
}

fn count_files(report: &mut RunReport, changes: &ChangeSet) {
    let counts = &mut report.files;
    counts.discovered = changes.files.len() + changes.unreadable.len();
    counts.unchanged = changes.count(FileClass::Unchanged);
    counts.changed = changes.count(FileClass::Changed);
    counts.new = changes.count(FileClass::New);
    counts.deleted = changes.deleted.len();
    counts.touched = changes.files.iter().filter(|f| f.mtime_moved).count();
    counts.unreadable = changes.unreadable.len();
    report.fingerprint = changes.fingerprint;
}

/// Symbol and reference rows of one parsed file version.
fn staged_rows(p: &ParsedFile) -> (Vec<SymbolRecord>, Vec<RefRecord>) {
    let path = p.record.path.as_str();
    let provenance = &p.record.hash;
    let symbol_id = |ordinal: u32| SymbolId::derive(path, ordinal).raw();
    let symbols = p
        .extraction
        .symbols
        .iter()
        .enumerate()
        .map(|(ordinal, s)| SymbolRecord {
            id: symbol_id(ordinal as u32),
            file_id: p.file_id,
            ordinal: ordinal as i64,
            name: s.name.clone(),
            qualified_name: s.qualified_name.clone(),
            kind: s.kind.as_str().to_string(),
            visibility: if s.exported { "public" } else { "private" }.to_string(),
            is_exported: s.exported,
            parent_id: s.parent.map(symbol_id),
            line_start: i64::from(s.line_start),
            line_end: i64::from(s.line_end),
            provenance: provenance.clone(),
            cognitive_complexity: i64::from(s.complexity),
        })
        .collect();
    let refs = p
        .extraction
        .refs
        .iter()
        .enumerate()
        .map(|(ordinal, r)| RefRecord {
            file_id: p.file_id,
            ordinal: ordinal as i64,
            source_id: symbol_id(r.source),
            target_name: r.target_name.clone(),
            qualifier: r.qualifier.clone(),
            kind: r.kind.as_str().to_string(),
            line: i64::from(r.line),
        })
        .collect();
    (symbols, refs)
}

/// Store the walked commits, oldest first. Returns how many were new.
fn record_history(conn: &Connection, delta: &HistoryDelta, now: i64) -> Result<usize, PipelineError> {
    if delta.reset {
        tracing::info!("HEAD no longer descends from the stored head, rebuilding history");
        history_rows::clear_history(conn)?;
    }
    let mut recorded = 0;
    for c in delta.commits.iter().rev() {
        if history_rows::insert_commit(conn, &c.commit, &c.changes)? {
            recorded += 1;
        }
    }
    history_rows::set_history_state(
        conn,
        &HistoryState {
            head: delta.head.clone(),
            commits: history_rows::count_commits(conn)?,
            updated_at: now,
        },
    )?;
    Ok(recorded)
}

/// Share of each file's exported symbols that nothing references.
fn dead_export_ratios(index_rows: &[IndexedSymbol], analytics: &AnalyticsOutput) -> FxHashMap<i64, f64> {
    let in_degree: FxHashMap<i64, i64> = analytics
        .metrics
        .iter()
        .map(|m| (m.symbol_id, m.in_degree))
        .collect();
    let mut tally: FxHashMap<i64, (usize, usize)> = FxHashMap::default();
    let module = SymbolKind::Module.as_str();
    for s in index_rows.iter().filter(|s| s.is_exported && s.kind != module) {
        let entry = tally.entry(s.file_id).or_default();
        entry.0 += 1;
        if in_degree.get(&s.id).copied().unwrap_or(0) == 0 {
            entry.1 += 1;
        }
    }
    tally
        .into_iter()
        .map(|(file, (exported, dead))| (file, dead as f64 / exported as f64))
        .collect()
}

fn report_json(report: &RunReport) -> String {
    match serde_json::to_string(report) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "run report not serializable");
            String::from("{}")
        }
    }
}
