use crate::infra::{read_expense, read_rules};
use approval_routing::error::AppError;
use approval_routing::policy::{evaluate, parse_instant, Decision, EvaluationError, RuleSet};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON array of policy rules
    #[arg(long)]
    pub(crate) rules: PathBuf,
    /// JSON expense document
    #[arg(long)]
    pub(crate) expense: PathBuf,
    /// Drop rules outside their validity window before evaluating
    #[arg(long)]
    pub(crate) active_only: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let decision = evaluate_files(&args)?;
    let rendered = serde_json::to_string_pretty(&decision).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn evaluate_files(args: &EvaluateArgs) -> Result<Decision, AppError> {
    let rule_set = RuleSet::new(1, read_rules(&args.rules)?);
    let expense = read_expense(&args.expense)?;

    if !args.active_only {
        return Ok(rule_set.evaluate(&expense)?);
    }

    let at = parse_instant(&expense.date).ok_or_else(|| EvaluationError::InvalidExpenseDate {
        value: expense.date.clone(),
    })?;
    Ok(evaluate(&expense, &rule_set.active_on(at))?)
}
