use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::format::{
    format_currency, format_days, format_metric_currency, format_metric_percent, format_months,
    format_roi,
};
use crate::core::{Calculation, CalculationMode, EditError, InputField, Inputs, calculate};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("--set expects FIELD=VALUE, got '{0}'")]
    InvalidSetArgument(String),
    #[error("unknown calculation mode '{0}'")]
    InvalidMode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModeArg {
    #[serde(alias = "basic")]
    Simple,
    #[serde(alias = "detailed")]
    Full,
}

impl From<ModeArg> for CalculationMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Simple => CalculationMode::Simple,
            ModeArg::Full => CalculationMode::Full,
        }
    }
}

impl From<CalculationMode> for ModeArg {
    fn from(value: CalculationMode) -> Self {
        match value {
            CalculationMode::Simple => ModeArg::Simple,
            CalculationMode::Full => ModeArg::Full,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "bank-roi",
    about = "ROI, payback and NPV calculator for a bank adopting a vendor platform"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Serve the calculator page and JSON API")]
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    #[command(about = "Print a text report for the default inputs with edits applied")]
    Report {
        #[arg(long, value_enum, default_value_t = ModeArg::Full)]
        mode: ModeArg,
        #[arg(
            long = "set",
            value_name = "FIELD=VALUE",
            help = "Override one input, e.g. --set annual-revenue=60000000"
        )]
        set: Vec<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    mode: Option<ModeArg>,
    #[serde(flatten)]
    fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug)]
struct CalculateRequest {
    inputs: Inputs,
    mode: CalculationMode,
    rejected_edits: Vec<RejectedEdit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectedEdit {
    field: String,
    value: String,
    reason: String,
}

impl RejectedEdit {
    fn new(field: &str, value: impl Into<String>, err: &EditError) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SummaryCard {
    label: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    mode: ModeArg,
    inputs: Inputs,
    metrics: Calculation,
    cards: Vec<SummaryCard>,
    rejected_edits: Vec<RejectedEdit>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldDescriptor {
    name: &'static str,
    kind: FieldKind,
    default_value: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum FieldKind {
    Text,
    Integer,
    Number,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(cli: Cli) -> Result<(), ApiError> {
    match cli.command {
        Command::Serve { port } => run_http_server(port).await?,
        Command::Report { mode, set } => {
            let edits = parse_set_arguments(&set)?;
            let (inputs, rejected) = apply_raw_edits(
                Inputs::default(),
                edits.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            );
            let calculation = calculate(&inputs, mode.into());
            print!("{}", render_report(&inputs, &calculation, &rejected));
        }
    }
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/fields", get(fields_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    log::info!("ROI calculator listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn fields_handler() -> Response {
    json_response(StatusCode::OK, field_descriptors(&Inputs::default()))
}

async fn calculate_get_handler(Query(params): Query<BTreeMap<String, String>>) -> Response {
    match calculate_request_from_query(params) {
        Ok(request) => calculate_handler_impl(request),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(calculate_request_from_payload(payload))
}

fn calculate_handler_impl(request: CalculateRequest) -> Response {
    let calculation = calculate(&request.inputs, request.mode);
    let response = build_calculate_response(request, calculation);
    json_response(StatusCode::OK, response)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn field_descriptors(inputs: &Inputs) -> Vec<FieldDescriptor> {
    InputField::ALL
        .into_iter()
        .map(|field| FieldDescriptor {
            name: field.name(),
            kind: if field.is_text() {
                FieldKind::Text
            } else if field.is_whole_number() {
                FieldKind::Integer
            } else {
                FieldKind::Number
            },
            default_value: inputs.field_value(field),
        })
        .collect()
}

// Rejected edits keep the previous value.
fn apply_raw_edits<'a>(
    base: Inputs,
    edits: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> (Inputs, Vec<RejectedEdit>) {
    let mut inputs = base;
    let mut rejected = Vec::new();
    for (key, raw) in edits {
        match key.parse::<InputField>().and_then(|f| inputs.edit(f, raw)) {
            Ok(next) => inputs = next,
            Err(err) => {
                log::warn!("rejected edit {key}={raw:?}: {err}");
                rejected.push(RejectedEdit::new(key, raw, &err));
            }
        }
    }
    (inputs, rejected)
}

fn parse_set_arguments(args: &[String]) -> Result<Vec<(String, String)>, ApiError> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| ApiError::InvalidSetArgument(arg.clone()))
        })
        .collect()
}

fn calculate_request_from_query(
    mut params: BTreeMap<String, String>,
) -> Result<CalculateRequest, ApiError> {
    let mode = match params.remove("mode") {
        Some(raw) => ModeArg::from_str(&raw, true).map_err(|_| ApiError::InvalidMode(raw))?,
        None => ModeArg::Full,
    };
    let (inputs, rejected_edits) = apply_raw_edits(
        Inputs::default(),
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    );
    Ok(CalculateRequest {
        inputs,
        mode: mode.into(),
        rejected_edits,
    })
}

#[cfg(test)]
fn calculate_request_from_json(json: &str) -> Result<CalculateRequest, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(calculate_request_from_payload(payload))
}

fn calculate_request_from_payload(payload: CalculatePayload) -> CalculateRequest {
    let mut inputs = Inputs::default();
    let mut rejected_edits = Vec::new();

    for (key, value) in &payload.fields {
        let outcome = key.parse::<InputField>().and_then(|field| match value {
            serde_json::Value::String(raw) => inputs.edit(field, raw),
            serde_json::Value::Number(n) => {
                let mut next = inputs.clone();
                let number = n.as_f64().unwrap_or(f64::NAN);
                next.set_number(field, number).map(|()| next)
            }
            other => Err(EditError::Unparseable {
                field,
                raw: other.to_string(),
            }),
        });
        match outcome {
            Ok(next) => inputs = next,
            Err(err) => {
                log::warn!("rejected edit {key}={value}: {err}");
                rejected_edits.push(RejectedEdit::new(key, value.to_string(), &err));
            }
        }
    }

    CalculateRequest {
        inputs,
        mode: payload.mode.unwrap_or(ModeArg::Full).into(),
        rejected_edits,
    }
}

fn build_calculate_response(
    request: CalculateRequest,
    calculation: Calculation,
) -> CalculateResponse {
    CalculateResponse {
        mode: request.mode.into(),
        cards: summary_cards(&calculation),
        inputs: request.inputs,
        metrics: calculation,
        rejected_edits: request.rejected_edits,
    }
}

fn summary_cards(calculation: &Calculation) -> Vec<SummaryCard> {
    let card = |label, value| SummaryCard { label, value };
    match calculation {
        Calculation::Simple(m) => vec![
            card("Annual Savings", format_currency(m.annual_savings)),
            card("Digital ROI", format_roi(m.roi_percent)),
            card("Net Benefit", format_currency(m.net_benefit)),
        ],
        Calculation::Full(m) => vec![
            card("ROI", format_roi(m.roi_percent)),
            card("Payback Period", format_months(m.payback_months)),
            card("Net Benefit", format_currency(m.net_benefit)),
            card("NPV", format_metric_currency(m.npv)),
            card("Total Cost Savings", format_currency(m.total_cost_savings)),
            card("Total Revenue Gain", format_currency(m.total_revenue_gain)),
            card("Total Benefits", format_currency(m.total_benefits)),
            card("Cost per Loan", format_metric_currency(m.cost_per_loan)),
            card(
                "Revenue per Customer",
                format_metric_currency(m.revenue_per_customer),
            ),
            card("Efficiency Ratio", format_metric_percent(m.efficiency_ratio)),
            card("Time Saved per Loan", format_days(m.time_saved_per_loan)),
            card(
                "Time Saved per Onboarding",
                format_days(m.time_saved_per_onboarding),
            ),
        ],
    }
}

fn render_report(
    inputs: &Inputs,
    calculation: &Calculation,
    rejected: &[RejectedEdit],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("ROI analysis: {}\n\n", inputs.institution_name));

    for card in summary_cards(calculation) {
        out.push_str(&format!("{:<28}{:>16}\n", card.label, card.value));
    }

    if let Calculation::Full(m) = calculation {
        if !m.projection.is_empty() {
            out.push_str(&format!(
                "\n{:<6}{:>16}{:>16}{:>16}{:>16}\n",
                "Year", "Cost Savings", "Revenue Gains", "Total Benefits", "Cumulative"
            ));
            for row in &m.projection {
                out.push_str(&format!(
                    "{:<6}{:>16}{:>16}{:>16}{:>16}\n",
                    row.year,
                    format_currency(row.cost_savings),
                    format_currency(row.revenue_gains),
                    format_currency(row.total_benefits),
                    format_currency(row.cumulative),
                ));
            }
        }
    }

    if !rejected.is_empty() {
        out.push_str("\nIgnored edits:\n");
        for edit in rejected {
            out.push_str(&format!("  {}={}: {}\n", edit.field, edit.value, edit.reason));
        }
    }
    out
}
