use clap::Args;
use lecturas::config::AppConfig;
use lecturas::error::AppError;
use lecturas::meters::ClaveCatalog;
use lecturas::readings::{BlockReason, MeterSnapshot, ReadingAssessment, ReadingService};

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Reading as typed on the form
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) reading: String,
    /// Previous reading of the register
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) previous: i64,
    /// Number of dial digits on the meter
    #[arg(long)]
    pub(crate) digits: u32,
    /// Meter constant applied to the raw difference
    #[arg(long, default_value_t = 1.0)]
    pub(crate) multiplier: f64,
    /// Previous month's consumption, used by the history check
    #[arg(long, default_value_t = 0.0)]
    pub(crate) previous_consumption: f64,
    /// Print the full assessment as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = ReadingService::from_config(&config.readings, ClaveCatalog::default());

    let snapshot = MeterSnapshot {
        digit_count: args.digits,
        multiplier: args.multiplier,
        previous_reading: args.previous,
        previous_consumption: args.previous_consumption,
    };
    let assessment = service.assess(&snapshot, &args.reading);

    if args.json {
        match serde_json::to_string_pretty(&assessment) {
            Ok(json) => println!("{}", json),
            Err(err) => println!("Assessment payload unavailable: {}", err),
        }
        return Ok(());
    }

    for line in summary_lines(&assessment) {
        println!("{}", line);
    }
    Ok(())
}

fn summary_lines(assessment: &ReadingAssessment) -> Vec<String> {
    let mut lines = vec![format!("Reading: {}", assessment.raw_value)];

    match assessment.blocked_by {
        Some(BlockReason::InvalidReading) => {
            lines.push("Blocked: the reading is not a number".to_string());
        }
        Some(BlockReason::DigitOverflow { max_value }) => {
            lines.push(format!("Blocked: exceeds the register maximum of {}", max_value));
        }
        Some(BlockReason::UnsupportedDigitWidth { digit_count }) => {
            lines.push(format!(
                "Blocked: reading decreased on a {}-digit register with no rollover offset",
                digit_count
            ));
        }
        None => {
            lines.push(format!(
                "Consumption: {} ({:?}, effective reading {})",
                assessment.consumption.consumption,
                assessment.consumption.comparison_kind,
                assessment.consumption.effective_reading
            ));
        }
    }

    if assessment.anomaly.is_anomalous {
        lines.push(format!("Warning: {}", assessment.anomaly.message));
    }
    if assessment.missing_decimal_hint {
        lines.push("Hint: the value may be missing its decimal separator".to_string());
    }

    lines
}
