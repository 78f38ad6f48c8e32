#![forbid(unsafe_code)]

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use decomm_core::config::{Settings, CONFIG_PATH};
use decomm_core::list::{circuit_table, rule_table, CircuitRow, RuleRow};
use decomm_core::model::{Circuit, Condition, Rule};
use decomm_core::traits::{ProgressSink, RULES_KEY};
use decomm_core::types::{CircuitStatus, Logic, RuleType};
use decomm_engine::classify::{flagged_first, review_queue};
use decomm_engine::lifecycle::{BatchReport, Disposition, TransitionOutcome};
use decomm_engine::store::{DecommStore, FileKvStore, Journal};
use decomm_engine::workflow;

const JOURNAL_FILE: &str = "journal.jsonl";

#[derive(Parser)]
#[command(
    name = "decomm",
    version,
    about = "Rule-based review of telecom circuits for decommission."
)]
struct Cli {
    /// Data directory (overrides .decomm/config.json).
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Reviewer name recorded on comments and history.
    #[arg(long, global = true)]
    reviewer: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Seed the data directory with sample circuits and the default rules.
    Init {
        /// Write workspace settings (.decomm/config.json) instead.
        #[arg(long)]
        workspace: bool,

        /// Seed for reproducible sample data.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of sample circuits.
        #[arg(long)]
        count: Option<usize>,

        /// Overwrite existing data.
        #[arg(long)]
        force: bool,
    },

    /// Manage classification rules.
    Rules {
        #[command(subcommand)]
        cmd: RulesCmd,
    },

    /// Run the rules against every circuit.
    Classify {
        #[arg(long)]
        json: bool,
    },

    /// List circuits.
    Circuits {
        /// Only flagged circuits awaiting review.
        #[arg(long)]
        flagged: bool,

        /// Filter by status: active, approved, rejected, in_process.
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show one circuit with its comments and history.
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show how every rule evaluates against one circuit.
    Explain {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Approve a circuit for decommission.
    Approve {
        id: String,

        /// Review comment (required).
        #[arg(short = 'm', long, default_value = "")]
        comment: String,

        #[arg(long)]
        json: bool,
    },

    /// Keep a circuit active.
    Reject {
        id: String,

        /// Why the circuit should remain active (required).
        #[arg(short = 'm', long, default_value = "")]
        comment: String,

        #[arg(long)]
        json: bool,
    },

    /// Approve several circuits with one comment.
    BulkApprove {
        ids: Vec<String>,

        #[arg(short = 'm', long, default_value = "")]
        comment: String,

        #[arg(long)]
        json: bool,
    },

    /// Reject several circuits with one comment.
    BulkReject {
        ids: Vec<String>,

        #[arg(short = 'm', long, default_value = "")]
        comment: String,

        #[arg(long)]
        json: bool,
    },

    /// Send approved circuits for decommission.
    Decommission {
        ids: Vec<String>,

        /// Every approved circuit not yet in process.
        #[arg(long, conflicts_with = "ids")]
        all_approved: bool,

        #[arg(long)]
        json: bool,
    },

    /// Suggest exclusion rules from rejection comments.
    Learn {
        /// Add the suggestion for this pattern key as a rule (repeatable).
        #[arg(long)]
        accept: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Export circuits as CSV.
    Export {
        /// Write to file instead of stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import circuits from CSV (or "-" for stdin).
    Import {
        file: String,

        #[arg(long)]
        json: bool,
    },

    /// Fleet metrics, pipeline, and projected savings.
    Analytics {
        #[arg(long)]
        json: bool,
    },

    /// Recent notifications, newest last.
    Notifications {
        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Verify the event journal hash chain.
    Audit {
        #[arg(long)]
        verify: bool,
    },
}

#[derive(Subcommand)]
enum RulesCmd {
    /// List rules.
    List {
        #[arg(long)]
        json: bool,
    },

    /// Add a rule from one or more `field op value` conditions.
    Add {
        #[arg(long)]
        name: String,

        /// Condition such as "utilization < 20" (repeatable).
        #[arg(long = "when", required = true)]
        conditions: Vec<String>,

        /// How multiple conditions combine.
        #[arg(long, value_enum)]
        logic: Option<LogicArg>,

        #[arg(long = "type", value_enum, default_value_t = KindArg::Include)]
        kind: KindArg,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        json: bool,
    },

    /// Delete a rule by id.
    Delete { id: String },

    /// Validate a rules document (defaults to the stored rules).
    Check {
        file: Option<String>,

        #[arg(long)]
        json: bool,

        /// Fail on warnings (not just errors).
        #[arg(long)]
        strict: bool,
    },

    /// Rewrite legacy rules files in place.
    Migrate {
        #[arg(required = true)]
        files: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Include,
    Exclude,
}

impl From<KindArg> for RuleType {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Include => RuleType::Include,
            KindArg::Exclude => RuleType::Exclude,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogicArg {
    #[value(name = "AND", alias = "and")]
    And,
    #[value(name = "OR", alias = "or")]
    Or,
}

impl From<LogicArg> for Logic {
    fn from(l: LogicArg) -> Self {
        match l {
            LogicArg::And => Logic::And,
            LogicArg::Or => Logic::Or,
        }
    }
}

struct Global {
    data_dir: Option<String>,
    reviewer: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let g = Global {
        data_dir: cli.data_dir,
        reviewer: cli.reviewer,
    };

    match cli.cmd {
        Cmd::Init {
            workspace,
            seed,
            count,
            force,
        } => cmd_init(&g, workspace, seed, count, force),

        Cmd::Rules { cmd } => match cmd {
            RulesCmd::List { json } => cmd_rules_list(&g, json),
            RulesCmd::Add {
                name,
                conditions,
                logic,
                kind,
                description,
                json,
            } => cmd_rules_add(&g, &name, &conditions, logic, kind, &description, json),
            RulesCmd::Delete { id } => cmd_rules_delete(&g, &id),
            RulesCmd::Check { file, json, strict } => {
                cmd_rules_check(&g, file.as_deref(), json, strict)
            }
            RulesCmd::Migrate { files } => cmd_rules_migrate(&files),
        },

        Cmd::Classify { json } => cmd_classify(&g, json),

        Cmd::Circuits {
            flagged,
            status,
            json,
        } => cmd_circuits(&g, flagged, status.as_deref(), json),

        Cmd::Show { id, json } => cmd_show(&g, &id, json),

        Cmd::Explain { id, json } => cmd_explain(&g, &id, json),

        Cmd::Approve { id, comment, json } => cmd_review(&g, &id, &comment, true, json),

        Cmd::Reject { id, comment, json } => cmd_review(&g, &id, &comment, false, json),

        Cmd::BulkApprove { ids, comment, json } => cmd_bulk(&g, &ids, &comment, true, json),

        Cmd::BulkReject { ids, comment, json } => cmd_bulk(&g, &ids, &comment, false, json),

        Cmd::Decommission {
            ids,
            all_approved,
            json,
        } => cmd_decommission(&g, ids, all_approved, json),

        Cmd::Learn { accept, json } => cmd_learn(&g, &accept, json),

        Cmd::Export { output } => cmd_export(&g, output.as_deref()),

        Cmd::Import { file, json } => cmd_import(&g, &file, json),

        Cmd::Analytics { json } => cmd_analytics(&g, json),

        Cmd::Notifications { limit, json } => cmd_notifications(&g, limit, json),

        Cmd::Audit { verify } => cmd_audit(&g, verify),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("DECOMM_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn settings(g: &Global) -> Result<Settings> {
    Ok(Settings::load_workspace()?.with_overrides(g.data_dir.clone(), g.reviewer.clone()))
}

fn open_store(g: &Global) -> Result<DecommStore<FileKvStore>> {
    let settings = settings(g)?;
    open_with(&settings)
}

fn open_with(settings: &Settings) -> Result<DecommStore<FileKvStore>> {
    let dir = PathBuf::from(&settings.data_dir);
    let journal = Journal::new(dir.join(JOURNAL_FILE));
    let store = DecommStore::open(FileKvStore::new(dir), settings.reviewer.as_str())
        .with_context(|| format!("cannot open data directory {}", settings.data_dir))?;
    Ok(store.with_journal(journal))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints each completed stage to stderr.
#[derive(Default)]
struct StderrProgress {
    label: String,
}

impl ProgressSink for StderrProgress {
    fn stage_started(&mut self, _index: usize, _total: usize, label: &str) {
        self.label = label.to_string();
    }

    fn stage_completed(&mut self, index: usize, total: usize, detail: &str) {
        eprintln!("  [{index}/{total}] {}: {detail}", self.label);
    }
}

// ── Setup ───────────────────────────────────────────────────────

fn cmd_init(
    g: &Global,
    workspace: bool,
    seed: Option<u64>,
    count: Option<usize>,
    force: bool,
) -> Result<()> {
    if workspace {
        if Path::new(CONFIG_PATH).exists() && !force {
            bail!("{CONFIG_PATH} already exists; use --force to overwrite");
        }
        std::fs::create_dir_all(".decomm")?;
        let json = serde_json::to_string_pretty(&Settings::default())?;
        std::fs::write(CONFIG_PATH, &json)?;
        eprintln!("created {CONFIG_PATH}");
        return Ok(());
    }

    let settings = settings(g)?;
    let mut store = open_with(&settings)?;
    if (!store.circuits().is_empty() || !store.rules().is_empty()) && !force {
        bail!(
            "{} already holds data; use --force to overwrite",
            settings.data_dir
        );
    }
    let count = count.unwrap_or(settings.sample_size);
    let circuits = decomm_engine::sample::generate_circuits(
        count,
        seed.or(settings.seed),
        &settings.reviewer,
    );
    store.reset(circuits, decomm_core::templates::default_rules());
    store.save()?;
    eprintln!(
        "initialized {}: {} circuits, {} rules",
        store.kv().dir().display(),
        store.circuits().len(),
        store.rules().len()
    );
    Ok(())
}

// ── Rules ───────────────────────────────────────────────────────

fn cmd_rules_list(g: &Global, json_out: bool) -> Result<()> {
    let store = open_store(g)?;
    if json_out {
        return print_json(&store.rules());
    }
    let rows: Vec<RuleRow> = store.rules().iter().map(RuleRow::from).collect();
    print!("{}", rule_table(&rows));
    Ok(())
}

fn cmd_rules_add(
    g: &Global,
    name: &str,
    exprs: &[String],
    logic: Option<LogicArg>,
    kind: KindArg,
    description: &str,
    json_out: bool,
) -> Result<()> {
    let mut conditions = Vec::with_capacity(exprs.len());
    for expr in exprs {
        conditions.push(Condition::parse_expr(expr)?);
    }

    let rule = match (logic, conditions.len()) {
        (None, 1) => Rule::single("", name, kind.into(), conditions.remove(0)),
        (None, _) => bail!("--logic AND|OR is required with more than one --when"),
        (Some(logic), _) => Rule::compound("", name, kind.into(), logic.into(), conditions),
    }
    .with_description(description);

    let mut store = open_store(g)?;
    let added = store.add_rule(rule)?.clone();
    store.save()?;
    if json_out {
        print_json(&added)?;
    } else {
        eprintln!(
            "  added {} rule {} \"{}\": {}",
            added.effective_type(),
            added.id,
            added.name,
            added.condition_summary()
        );
    }
    Ok(())
}

fn cmd_rules_delete(g: &Global, id: &str) -> Result<()> {
    let mut store = open_store(g)?;
    let removed = store.delete_rule(id)?;
    store.save()?;
    eprintln!("  deleted rule {} \"{}\"", removed.id, removed.name);
    Ok(())
}

fn cmd_rules_check(g: &Global, file: Option<&str>, json_out: bool, strict: bool) -> Result<()> {
    let path = match file {
        Some(f) => PathBuf::from(f),
        None => FileKvStore::new(&settings(g)?.data_dir).path_for(RULES_KEY),
    };
    let source = path.display().to_string();
    let content =
        std::fs::read_to_string(&path).with_context(|| format!("cannot read {source}"))?;
    let data: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("{source}: invalid JSON"))?;

    let report = decomm_core::schema::check_rules(&data, &source, strict);

    if json_out {
        print_json(&report)?;
    } else {
        if report.pass {
            eprintln!("  ok  {source} ({} rules)", report.rules);
        } else {
            eprintln!("  FAIL {source} ({} rules)", report.rules);
        }
        for e in &report.errors {
            eprintln!(
                "  error {}: {} {}",
                e.code,
                e.message,
                e.path.as_deref().unwrap_or("")
            );
        }
        for w in &report.warnings {
            eprintln!(
                "  warn  {}: {} {}",
                w.code,
                w.message,
                w.path.as_deref().unwrap_or("")
            );
        }
    }

    if !report.pass {
        bail!("check failed for {source}");
    }
    Ok(())
}

fn cmd_rules_migrate(files: &[String]) -> Result<()> {
    for file in files {
        let content =
            std::fs::read_to_string(file).with_context(|| format!("cannot read {file}"))?;
        let data: serde_json::Value =
            serde_json::from_str(&content).with_context(|| format!("{file}: invalid JSON"))?;
        let (migrated, changed) = decomm_core::migrate::migrate_rules(&data)
            .with_context(|| format!("{file}: cannot migrate"))?;
        if changed == 0 {
            eprintln!("  {file}: already current");
            continue;
        }
        let json = serde_json::to_string_pretty(&migrated)?;
        decomm_engine::store::atomic::atomic_write(Path::new(file), json.as_bytes())
            .with_context(|| format!("cannot write {file}"))?;
        eprintln!("  {file}: migrated {changed} rule(s)");
    }
    Ok(())
}

// ── Classification ──────────────────────────────────────────────

fn cmd_classify(g: &Global, json_out: bool) -> Result<()> {
    let mut store = open_store(g)?;
    let summary = workflow::run_analysis(&mut store, &mut StderrProgress::default())?;
    if json_out {
        print_json(&summary)?;
    } else {
        eprintln!(
            "  {} circuits flagged for review ({} evaluated, {} excluded)",
            summary.flagged, summary.evaluated, summary.excluded
        );
    }
    Ok(())
}

fn cmd_circuits(g: &Global, flagged: bool, status: Option<&str>, json_out: bool) -> Result<()> {
    let store = open_store(g)?;
    let mut circuits: Vec<&Circuit> = if flagged {
        review_queue(store.circuits())
    } else {
        flagged_first(store.circuits())
    };
    if let Some(status) = status {
        let keep: Box<dyn Fn(&Circuit) -> bool> = match status {
            "in_process" => Box::new(Circuit::is_in_process),
            other => {
                let Some(s) = CircuitStatus::parse(other) else {
                    bail!("unknown status \"{other}\" (expected active, approved, rejected, in_process)");
                };
                Box::new(move |c: &Circuit| c.status == s && !c.is_in_process())
            }
        };
        circuits.retain(|c| keep(*c));
    }

    if json_out {
        return print_json(&circuits);
    }
    let rows: Vec<CircuitRow> = circuits.iter().map(|c| CircuitRow::from(*c)).collect();
    print!("{}", circuit_table(&rows));
    Ok(())
}

fn find_circuit<'a>(store: &'a DecommStore<FileKvStore>, id: &str) -> Result<&'a Circuit> {
    store
        .circuit(id)
        .ok_or_else(|| anyhow::anyhow!("circuit not found: {id}"))
}

fn cmd_show(g: &Global, id: &str, json_out: bool) -> Result<()> {
    let store = open_store(g)?;
    let c = find_circuit(&store, id)?;
    if json_out {
        return print_json(c);
    }
    println!("  {}  {}", c.id, c.location);
    println!(
        "  bandwidth {} Mbps, utilization {}%, age {} months, traffic {} GB, cost {}/Mbps",
        c.bandwidth, c.utilization, c.age, c.traffic, c.cost
    );
    println!(
        "  contract {}, service {}, redundancy {}, site {}, hardware EOL {}, provider {}",
        c.contract_status,
        c.service_type,
        c.redundancy,
        c.site_status,
        c.hardware_eol,
        c.provider_status
    );
    let status = if c.is_in_process() {
        "approved (decommission in process)".to_string()
    } else {
        c.status.to_string()
    };
    println!("  status {status}, flagged {}", c.flagged);
    for m in &c.matched_rules {
        println!("    matched: {m}");
    }
    for comment in &c.comments {
        println!(
            "    {} {} [{}]: {}",
            comment.timestamp.format("%Y-%m-%d %H:%M"),
            comment.author,
            comment.decision,
            comment.text
        );
    }
    for event in &c.history {
        println!(
            "    {} {}: {}",
            event.timestamp.format("%Y-%m-%d %H:%M"),
            event.event.as_str(),
            event.description
        );
    }
    Ok(())
}

fn cmd_explain(g: &Global, id: &str, json_out: bool) -> Result<()> {
    let store = open_store(g)?;
    find_circuit(&store, id)?;
    let traces = store.explain(id).unwrap_or_default();
    if json_out {
        return print_json(&traces);
    }
    if traces.is_empty() {
        println!("(no rules defined)");
    }
    for t in &traces {
        let mark = if t.matched { "x" } else { " " };
        let logic = t.logic.as_deref().map(|l| format!(", {l}")).unwrap_or_default();
        println!("  [{mark}] {} ({}{logic})", t.rule_name, t.rule_type);
        for c in &t.conditions {
            let actual = c.actual.as_deref().unwrap_or("(none)");
            let verdict = if c.pass { "pass" } else { "fail" };
            println!(
                "        {} {} {}  actual {actual}  {verdict}",
                c.label, c.operator, c.expected
            );
        }
    }
    Ok(())
}

// ── Review lifecycle ────────────────────────────────────────────

fn cmd_review(g: &Global, id: &str, comment: &str, approve: bool, json_out: bool) -> Result<()> {
    let mut store = open_store(g)?;
    let outcome = if approve {
        store.approve(id, comment)?
    } else {
        store.reject(id, comment)?
    };
    if outcome.disposition == Disposition::NotFound {
        tracing::warn!(circuit = id, "no such circuit; nothing to review");
        if json_out {
            return print_json(&outcome);
        }
        eprintln!("  skipped {id}: not found");
        return Ok(());
    }
    check_eligible(&outcome)?;
    store.save()?;
    if json_out {
        print_json(&outcome)?;
    } else {
        eprintln!("  {id} {}", outcome.action.past_tense());
    }
    Ok(())
}

fn check_eligible(outcome: &TransitionOutcome) -> Result<()> {
    let id = &outcome.circuit_id;
    match outcome.disposition {
        Disposition::Applied | Disposition::NotFound => Ok(()),
        Disposition::NotEligible => {
            let from = outcome.from.map(|s| s.as_str()).unwrap_or("unknown");
            bail!(
                "circuit {id} is {from}; only active circuits can be {}",
                outcome.action.past_tense()
            )
        }
    }
}

fn report_batch(report: &BatchReport, json_out: bool) -> Result<()> {
    if json_out {
        return print_json(report);
    }
    eprintln!(
        "  {} of {} circuit(s) {} ({} skipped)",
        report.applied,
        report.requested,
        report.action.past_tense(),
        report.skipped()
    );
    for o in report.outcomes.iter().filter(|o| !o.applied()) {
        let why = match o.disposition {
            Disposition::NotFound => "not found".to_string(),
            _ => match (o.from, o.in_process) {
                (_, Some(true)) => "already in process".to_string(),
                (Some(s), _) => format!("is {s}"),
                (None, _) => "not eligible".to_string(),
            },
        };
        eprintln!("    skipped {}: {why}", o.circuit_id);
    }
    Ok(())
}

fn cmd_bulk(g: &Global, ids: &[String], comment: &str, approve: bool, json_out: bool) -> Result<()> {
    let mut store = open_store(g)?;
    let report = if approve {
        store.bulk_approve(ids, comment)?
    } else {
        store.bulk_reject(ids, comment)?
    };
    store.save()?;
    report_batch(&report, json_out)
}

fn cmd_decommission(g: &Global, ids: Vec<String>, all_approved: bool, json_out: bool) -> Result<()> {
    let mut store = open_store(g)?;
    let ids = if all_approved {
        store
            .circuits()
            .iter()
            .filter(|c| c.is_pending_decommission())
            .map(|c| c.id.clone())
            .collect()
    } else {
        ids
    };
    let report = workflow::run_decommission(&mut store, &ids, &mut StderrProgress::default())?;
    report_batch(&report, json_out)
}

// ── Learning ────────────────────────────────────────────────────

fn cmd_learn(g: &Global, accept: &[String], json_out: bool) -> Result<()> {
    let mut store = open_store(g)?;
    let suggestions =
        workflow::run_learning(&mut store, accept, &mut StderrProgress::default())?;
    if json_out {
        return print_json(&suggestions);
    }
    if suggestions.is_empty() {
        eprintln!("  no patterns found in rejection comments");
    }
    for s in &suggestions {
        println!(
            "  {:<14} {} ({} comment(s))",
            s.pattern_key, s.name, s.matched_comments
        );
        println!("  {:<14} {}", "", s.description);
        println!("  {:<14} e.g. \"{}\"", "", s.example);
    }
    for key in accept {
        eprintln!("  accepted suggestion {key}");
    }
    Ok(())
}

// ── Data exchange ───────────────────────────────────────────────

fn cmd_export(g: &Global, output: Option<&str>) -> Result<()> {
    let store = open_store(g)?;
    let csv = store.export_csv();
    match output {
        Some(path) => {
            std::fs::write(path, &csv).with_context(|| format!("cannot write {path}"))?;
            eprintln!("wrote {path} ({} circuits)", store.circuits().len());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn cmd_import(g: &Global, file: &str, json_out: bool) -> Result<()> {
    let text = if file == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("cannot read {file}"))?
    };
    let mut store = open_store(g)?;
    let report = store.import_csv(&text);
    store.save()?;
    if json_out {
        print_json(&report)?;
    } else {
        eprintln!(
            "  imported {} circuits ({} duplicate, {} malformed)",
            report.imported, report.duplicates, report.malformed
        );
    }
    Ok(())
}

// ── Reporting ───────────────────────────────────────────────────

fn cmd_analytics(g: &Global, json_out: bool) -> Result<()> {
    let store = open_store(g)?;
    let a = store.analytics();
    if json_out {
        return print_json(&a);
    }
    let m = &a.metrics;
    println!("  Circuits:        {}", m.total);
    println!("  Under review:    {}", m.flagged);
    println!("  Approved:        {}", m.approved);
    println!("  Rejected:        {}", m.rejected);
    println!("  In process:      {}", m.in_process);
    println!("  Pending:         {}", m.pending);
    println!(
        "  Pipeline:        analysis {} -> review {} -> approved {} -> in process {}",
        a.pipeline.analysis, a.pipeline.review, a.pipeline.approved, a.pipeline.in_process
    );
    println!("  Rules:           {}", a.rules);
    match &a.top_rule {
        Some(top) => println!("  Top rule:        {top}"),
        None => println!("  Top rule:        none"),
    }
    let s = &a.savings;
    println!(
        "  Savings:         {} circuits, {} Mbps, avg utilization {}%, avg age {} months",
        s.circuits, s.bandwidth_mbps, s.avg_utilization, s.avg_age_months
    );
    Ok(())
}

fn cmd_notifications(g: &Global, limit: usize, json_out: bool) -> Result<()> {
    let store = open_store(g)?;
    let all = store.notifications();
    let recent = &all[all.len().saturating_sub(limit)..];
    if json_out {
        return print_json(&recent);
    }
    for n in recent {
        println!("  {}  {}", n.ts.format("%Y-%m-%d %H:%M:%S"), n.message);
    }
    Ok(())
}

fn cmd_audit(g: &Global, verify: bool) -> Result<()> {
    if !verify {
        bail!("specify --verify");
    }
    let settings = settings(g)?;
    let journal = Journal::new(Path::new(&settings.data_dir).join(JOURNAL_FILE));
    if !journal.path().exists() {
        eprintln!("  no journal found at {}", journal.path().display());
        return Ok(());
    }
    let count = journal.verify()?;
    eprintln!("  journal chain valid ({count} entries)");
    Ok(())
}
