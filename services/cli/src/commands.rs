use chrono::{DateTime, Local};
use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::workflows::datasets::{
    load_table, save_table, DatasetCatalog, ProcessedSplit, RawDataset,
};
use credit_risk::workflows::decision::{
    decide, CostModel, ThresholdEvaluation, ThresholdGrid, ThresholdOptimizer, ThresholdSelection,
};
use credit_risk::workflows::features::{
    labels_from_cells, AssemblyReport, DerivationOptions, FeatureAssembler, ModelMatrix,
};
use credit_risk::workflows::RiskError;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct EngineerArgs {
    /// Raw application CSV. Defaults to application_train.csv in the data directory.
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Destination CSV. Defaults to the processed train file in the data directory.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Also derive INCOME_PER_PERSON and DAYS_EMPLOYED_PERCENT
    #[arg(long)]
    pub(crate) household_features: bool,
}

#[derive(Args, Debug)]
pub(crate) struct OptimizeArgs {
    /// CSV holding observed labels and repayment scores
    #[arg(long)]
    pub(crate) scores: PathBuf,
    /// Column with 0 (repaid) / 1 (defaulted) outcomes
    #[arg(long, default_value = "TARGET")]
    pub(crate) label_column: String,
    /// Column with repayment scores in [0, 1]
    #[arg(long, default_value = "SCORE")]
    pub(crate) score_column: String,
    /// Grid spacing (defaults to THRESHOLD_STEP)
    #[arg(long)]
    pub(crate) step: Option<f64>,
    /// Emit the selection and full curve as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DecideArgs {
    /// Repayment score of the application
    #[arg(long)]
    pub(crate) score: f64,
    /// Approval threshold
    #[arg(long)]
    pub(crate) threshold: f64,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DatasetsArgs {
    /// Override CREDIT_DATA_DIR
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct OptimizeSummary {
    generated_at: DateTime<Local>,
    source: String,
    selection: ThresholdSelection,
    baseline: ThresholdEvaluation,
}

pub(crate) fn run_engineer(args: EngineerArgs, config: &AppConfig) -> Result<(), AppError> {
    let catalog = DatasetCatalog::new(&config.data.data_dir);
    let input = args
        .input
        .unwrap_or_else(|| catalog.raw_path(RawDataset::ApplicationTrain));

    let raw = load_table(&input)?;
    let assembler = FeatureAssembler::new(DerivationOptions {
        household_features: args.household_features,
    });
    let assembled = assembler.assemble(&raw)?;

    let output = match args.output {
        Some(path) => {
            save_table(&path, &assembled.table)?;
            path
        }
        None => catalog.write_processed(ProcessedSplit::Train, &assembled.table)?,
    };
    info!(input = %input.display(), output = %output.display(), "engineered features");

    let matrix = ModelMatrix::from_table(&assembled.table, &config.data.excluded_columns)?;

    println!("Feature engineering report ({})", Local::now().format("%Y-%m-%d %H:%M"));
    println!("- input: {}", input.display());
    println!("- output: {}", output.display());
    render_assembly_report(&assembled.report);
    println!(
        "- model features: {} ({} columns excluded)",
        matrix.feature_names().len(),
        config.data.excluded_columns.len()
    );
    Ok(())
}

fn render_assembly_report(report: &AssemblyReport) {
    println!("- rows: {}", report.rows);
    println!(
        "- DAYS_BIRTH sign flips: {}",
        report.cleaning.days_birth_sign_flips
    );
    println!(
        "- DAYS_EMPLOYED sentinels cleared: {}",
        report.cleaning.days_employed_sentinels
    );
    if report.sanitation.is_clean() {
        println!("- non-finite values replaced: 0");
    } else {
        println!(
            "- non-finite values replaced: {}",
            report.sanitation.total()
        );
        for (column, count) in &report.sanitation.replaced_by_column {
            println!("  - {column}: {count}");
        }
    }
}

pub(crate) fn run_optimize(args: OptimizeArgs, config: &AppConfig) -> Result<(), AppError> {
    let summary = optimize_scores(&args, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        render_optimize_summary(&summary);
    }
    Ok(())
}

fn optimize_scores(args: &OptimizeArgs, config: &AppConfig) -> Result<OptimizeSummary, AppError> {
    let table = load_table(&args.scores)?;
    let labels = labels_from_cells(table.numeric(&args.label_column)?)?;
    let scores = table
        .numeric(&args.score_column)?
        .iter()
        .map(|cell| {
            cell.ok_or(RiskError::InvalidParameter {
                name: "score",
                value: f64::NAN,
                reason: "missing score",
            })
        })
        .collect::<Result<Vec<f64>, RiskError>>()?;

    let grid = ThresholdGrid::from_step(args.step.unwrap_or(config.decision.threshold_step))?;
    let optimizer = ThresholdOptimizer::new(CostModel::new(config.decision.costs)?, grid);
    let selection = optimizer.optimize(&labels, &scores)?;
    let baseline = optimizer.evaluate_at(config.decision.default_threshold, &labels, &scores)?;
    info!(
        threshold = selection.threshold,
        baseline = baseline.threshold,
        rows = labels.len(),
        "optimized approval threshold"
    );

    Ok(OptimizeSummary {
        generated_at: Local::now(),
        source: args.scores.display().to_string(),
        selection,
        baseline,
    })
}

fn render_optimize_summary(summary: &OptimizeSummary) {
    let OptimizeSummary {
        generated_at,
        selection,
        baseline,
        ..
    } = summary;

    println!(
        "Threshold selection ({}) over {} applications",
        generated_at.format("%Y-%m-%d %H:%M"),
        selection.counts.total()
    );
    println!(
        "- selected threshold {:.2} | net value {:.2} | expected cost {:.2} | {:.1}% approved",
        selection.threshold,
        selection.net_value,
        selection.expected_cost,
        selection.approval_rate() * 100.0
    );
    println!(
        "  TP {} | FP {} | TN {} | FN {}",
        selection.counts.true_positive,
        selection.counts.false_positive,
        selection.counts.true_negative,
        selection.counts.false_negative
    );
    println!(
        "- default threshold {:.2} | net value {:.2} | {:.1}% approved",
        baseline.threshold,
        baseline.net_value,
        baseline.counts.approval_rate() * 100.0
    );
    println!(
        "- improvement over default: {:.2}",
        selection.net_value - baseline.net_value
    );
}

pub(crate) fn run_decide(args: DecideArgs) -> Result<(), AppError> {
    let decision = decide(args.score, args.threshold)?;
    println!(
        "{} (score {:.4}, threshold {:.4})",
        decision.label(),
        args.score,
        args.threshold
    );
    Ok(())
}

pub(crate) fn run_datasets(args: DatasetsArgs, config: &AppConfig) -> Result<(), AppError> {
    let data_dir = args.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let catalog = DatasetCatalog::new(&data_dir);

    println!("Raw datasets under {}", catalog.raw_dir().display());
    for (dataset, present) in catalog.available() {
        let status = if present { "present" } else { "missing" };
        println!("- {}.csv: {}", dataset.file_stem(), status);
    }

    println!("Processed datasets under {}", catalog.processed_dir().display());
    for split in [ProcessedSplit::Train, ProcessedSplit::Test] {
        let status = if catalog.processed_path(split).is_file() {
            "present"
        } else {
            "missing"
        };
        println!("- {}: {}", split.file_name(), status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_risk::config::{AppEnvironment, DataConfig, DecisionConfig, TelemetryConfig};
    use credit_risk::workflows::decision::CostParameters;
    use credit_risk::workflows::features::columns;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "credit-risk-cli-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("raw")).expect("create scratch dir");
        dir
    }

    fn config(data_dir: &std::path::Path) -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            data: DataConfig {
                data_dir: data_dir.to_path_buf(),
                excluded_columns: DataConfig::default_excluded_columns(),
            },
            decision: DecisionConfig {
                costs: CostParameters::default(),
                threshold_step: 0.01,
                default_threshold: 0.5,
            },
            telemetry: TelemetryConfig {
                log_level: "warn".to_string(),
                ansi_colors: false,
            },
        }
    }

    const RAW_APPLICATIONS: &str = "SK_ID_CURR,TARGET,NAME_CONTRACT_TYPE,DAYS_BIRTH,DAYS_EMPLOYED,AMT_CREDIT,AMT_INCOME_TOTAL,AMT_ANNUITY,CNT_FAM_MEMBERS
100002,1,Cash loans,-10000,-2000,100000,50000,5000,1
100003,0,Revolving loans,-16765,365243,270000,0,13500,2
";

    #[test]
    fn engineer_writes_the_engineered_table() {
        let dir = scratch_dir("engineer");
        let input = dir.join("raw/application_train.csv");
        let output = dir.join("engineered.csv");
        std::fs::write(&input, RAW_APPLICATIONS).expect("write fixture");

        run_engineer(
            EngineerArgs {
                input: Some(input),
                output: Some(output.clone()),
                household_features: true,
            },
            &config(&dir),
        )
        .expect("engineer succeeds");

        let table = load_table(&output).expect("output readable");
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.numeric(columns::CREDIT_INCOME_RATIO).expect("column"),
            &[Some(2.0), None]
        );
        assert_eq!(
            table.numeric(columns::DAYS_EMPLOYED).expect("column"),
            &[Some(-2000.0), None]
        );
        assert_eq!(
            table.numeric(columns::DAYS_BIRTH).expect("column"),
            &[Some(10000.0), Some(16765.0)]
        );
        assert!(table.contains(columns::INCOME_PER_PERSON));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn engineer_defaults_to_the_catalog_paths() {
        let dir = scratch_dir("engineer-catalog");
        std::fs::write(dir.join("raw/application_train.csv"), RAW_APPLICATIONS)
            .expect("write fixture");

        run_engineer(
            EngineerArgs {
                input: None,
                output: None,
                household_features: false,
            },
            &config(&dir),
        )
        .expect("engineer succeeds");

        let processed = DatasetCatalog::new(&dir).load_processed().expect("load");
        let train = processed.train.expect("train written");
        assert!(train.contains(columns::AGE_YEARS));
        assert!(!train.contains(columns::INCOME_PER_PERSON));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn optimize_summary_serializes_selection_and_baseline() {
        let dir = scratch_dir("optimize");
        let scores = dir.join("scores.csv");
        std::fs::write(&scores, "TARGET,SCORE\n1,0.1\n0,0.3\n1,0.6\n0,0.8\n0,0.9\n")
            .expect("write fixture");

        let args = OptimizeArgs {
            scores: scores.clone(),
            label_column: "TARGET".to_string(),
            score_column: "SCORE".to_string(),
            step: Some(0.25),
            json: true,
        };
        let summary = optimize_scores(&args, &config(&dir)).expect("optimizes");
        let json = serde_json::to_value(&summary).expect("serializes");

        assert_eq!(json["source"], scores.display().to_string());
        assert_eq!(json["selection"]["curve"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["baseline"]["threshold"], 0.5);
        let selected = json["selection"]["net_value"].as_f64().expect("net value");
        let baseline = json["baseline"]["net_value"].as_f64().expect("net value");
        assert!(selected >= baseline);
        assert!(json["generated_at"].is_string());

        run_optimize(args, &config(&dir)).expect("prints json");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn optimize_rejects_missing_scores() {
        let dir = scratch_dir("optimize-missing");
        let scores = dir.join("scores.csv");
        std::fs::write(&scores, "TARGET,SCORE\n1,0.1\n0,\n").expect("write fixture");

        let args = OptimizeArgs {
            scores,
            label_column: "TARGET".to_string(),
            score_column: "SCORE".to_string(),
            step: None,
            json: false,
        };
        match optimize_scores(&args, &config(&dir)).expect_err("missing score") {
            AppError::Risk(RiskError::InvalidParameter { name, .. }) => assert_eq!(name, "score"),
            other => panic!("expected invalid score, got {other:?}"),
        }

        let _ = std::fs::remove_dir_all(&dir);
    }
}
