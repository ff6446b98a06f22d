use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use brevet::config::AppConfig;
use brevet::grading::{self, DomainScoreEntry, EvaluationRecord, GradeAnalysis, RawEvaluation};
use brevet::EvaluationCsvImporter;
use clap::{ArgGroup, Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

mod error;
mod telemetry;

use error::AppError;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    side_subject: String,
}

#[derive(Parser, Debug)]
#[command(
    name = "pronote-analyzer",
    about = "Turn Pronote competency evaluations into Brevet statistics",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Analyze an evaluation export and print the Brevet report
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("source")
        .args(["input", "csv"])
        .required(true)
        .multiple(false)
))]
struct AnalyzeArgs {
    /// JSON file holding an array of raw evaluations
    #[arg(long)]
    input: Option<PathBuf>,
    /// Flat CSV acquisition export (one row per acquisition)
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Override the designated side-channel subject
    #[arg(long)]
    side_subject: Option<String>,
    /// Include the individual evaluation listing in the output
    #[arg(long)]
    list_evaluations: bool,
}

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    /// Raw evaluations, as fetched from the school information service.
    #[serde(default)]
    evaluations: Vec<RawEvaluation>,
    /// Alternative input: a flat CSV acquisition export.
    #[serde(default)]
    csv: Option<String>,
    /// Override for the configured side-channel subject.
    #[serde(default)]
    side_subject: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    total_evaluations: usize,
    performance_level: &'static str,
    evaluations: Vec<EvaluationRecord>,
    subject_averages: Vec<grading::SubjectAverage>,
    domain_scores: Vec<DomainScoreEntry>,
    side_channel: grading::SideChannelReport,
    socle: grading::SocleAggregate,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Analyze(args) => run_analyze(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(config.environment, &config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        side_subject: config.analyzer.side_subject.clone(),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/analysis", post(analysis_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "brevet analyzer ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        input,
        csv,
        side_subject,
        list_evaluations,
    } = args;

    let config = AppConfig::load()?;
    let side_subject = side_subject.unwrap_or(config.analyzer.side_subject);

    let evaluations = match (input, csv) {
        (Some(path), _) => {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str::<Vec<RawEvaluation>>(&contents)?
        }
        (None, Some(path)) => EvaluationCsvImporter::from_path(path)?,
        (None, None) => Vec::new(),
    };

    let analysis = grading::analyze(&evaluations, &side_subject);
    render_analysis(&analysis, list_evaluations);

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn analysis_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let response = build_analysis_response(payload, &state.side_subject)?;
    Ok(Json(response))
}

fn build_analysis_response(
    payload: AnalysisRequest,
    default_side_subject: &str,
) -> Result<AnalysisResponse, AppError> {
    let AnalysisRequest {
        evaluations,
        csv,
        side_subject,
    } = payload;

    let evaluations = match csv {
        Some(csv) => EvaluationCsvImporter::from_reader(Cursor::new(csv.into_bytes()))?,
        None => evaluations,
    };

    let side_subject = side_subject.as_deref().unwrap_or(default_side_subject);
    let analysis = grading::analyze(&evaluations, side_subject);
    let GradeAnalysis {
        evaluations,
        subject_averages,
        domain_scores,
        side_channel,
        socle,
    } = analysis;

    Ok(AnalysisResponse {
        total_evaluations: evaluations.len(),
        performance_level: socle.tier.label(),
        evaluations,
        subject_averages,
        domain_scores,
        side_channel,
        socle,
    })
}

fn render_analysis(analysis: &GradeAnalysis, list_evaluations: bool) {
    println!("Brevet grade analysis");
    println!(
        "{} evaluations, {} subjects",
        analysis.evaluations.len(),
        analysis.subject_averages.len()
    );

    if list_evaluations {
        println!("\nIndividual evaluations");
        for (index, evaluation) in analysis.evaluations.iter().enumerate() {
            let grades = if evaluation.grades.is_empty() {
                "no grades".to_string()
            } else {
                evaluation.grades.join(", ")
            };
            println!(
                "{}. {} | {} | {} | coefficient {} | {} | avg {:.2}",
                index + 1,
                evaluation.subject,
                evaluation.name,
                evaluation.date_display,
                evaluation.coefficient,
                grades,
                evaluation.average_points
            );
        }
    }

    println!("\nSubject averages (weighted)");
    if analysis.subject_averages.is_empty() {
        println!("- none");
    } else {
        for average in &analysis.subject_averages {
            println!(
                "- {}: {:.2}/50 ({:.2}/20)",
                average.subject, average.average_points, average.average_out_of_20
            );
        }
    }

    println!("\nDomain breakdown");
    if analysis.domain_scores.is_empty() {
        println!("- none");
    } else {
        for entry in &analysis.domain_scores {
            let label = entry.label.unwrap_or("not part of the socle");
            println!(
                "- {} ({}): {} acquisitions, mean {:.2} -> {} ({}, {})",
                entry.tag,
                label,
                entry.count,
                entry.mean_points,
                entry.tier_points,
                entry.tier_symbol,
                entry.tier_label
            );
        }
    }

    println!("\nSide channel: {}", analysis.side_channel.subject);
    match &analysis.side_channel.summary {
        Some(summary) => {
            for entry in &analysis.side_channel.entries {
                println!(
                    "- {} | {} | {} points",
                    entry.evaluation, entry.grade, entry.points
                );
            }
            println!(
                "Summary: {} acquisitions, mean {:.2} -> {} ({}, not counted in the total)",
                summary.count,
                summary.mean_points,
                summary.tier_points,
                summary.tier.label()
            );
        }
        None => println!("- no untagged acquisitions recorded"),
    }

    println!("\nBrevet statistics");
    println!("Socle score:        {}/400", analysis.socle.total);
    println!(
        "Average per domain: {:.2}/50 ({:.2}/20)",
        analysis.socle.average_per_domain, analysis.socle.average_out_of_20
    );
    match analysis.socle.tier.mention() {
        Some(mention) => println!(
            "Performance level:  {} ({})",
            analysis.socle.tier.label(),
            mention
        ),
        None => println!("Performance level:  {}", analysis.socle.tier.label()),
    }
}
