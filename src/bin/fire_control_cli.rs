use clap::{Args, Parser, Subcommand, ValueEnum};
use fire_control::grid::{display_digits, format_grid_coordinate, parse_grid_coordinate};
use fire_control::{
    apply_tally, compute_sheaf, recompute, trace, AdjustmentTally, AngleSolution, Bearing, ChargeCatalog,
    Correction, FireControlConfig, FireType, MissionInputs, MissionOutputs, Point2D, Position, SheafAssignment,
    SheafPattern,
};
use log::debug;
use serde::Serialize;
use std::error::Error;

#[derive(Parser)]
#[command(name = "fire-control")]
#[command(version = "0.1.0")]
#[command(about = "Mortar firing solution calculator", long_about = None)]
struct Cli {
    /// JSON configuration file (solver, doctrine, charges)
    #[arg(short = 'c', long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct MissionArgs {
    /// Launcher easting (grid reference or meters)
    #[arg(long)]
    launcher_easting: String,

    /// Launcher northing (grid reference or meters)
    #[arg(long)]
    launcher_northing: String,

    /// Launcher elevation (meters)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    launcher_elevation: f64,

    /// Target easting (grid reference or meters)
    #[arg(long)]
    target_easting: String,

    /// Target northing (grid reference or meters)
    #[arg(long)]
    target_northing: String,

    /// Target elevation (meters)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    target_elevation: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve every charge and select a firing solution
    Solve {
        #[command(flatten)]
        mission: MissionArgs,

        /// Ranked charge index to fire (0 = best)
        #[arg(long)]
        charge: Option<usize>,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Apply observer corrections to the target and re-solve
    Adjust {
        #[command(flatten)]
        mission: MissionArgs,

        /// Add (meters, farther)
        #[arg(long, default_value = "0")]
        add: f64,

        /// Drop (meters, closer)
        #[arg(long, default_value = "0")]
        drop: f64,

        /// Left (meters)
        #[arg(long, default_value = "0")]
        left: f64,

        /// Right (meters)
        #[arg(long, default_value = "0")]
        right: f64,

        /// Observer-target bearing; launcher-target bearing when omitted
        #[arg(long)]
        bearing: Option<f64>,

        /// Unit of --bearing
        #[arg(long, default_value = "degrees")]
        bearing_unit: BearingUnitArg,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Distribute aim points for several launchers
    Sheaf {
        /// Target easting (grid reference or meters)
        #[arg(long)]
        target_easting: String,

        /// Target northing (grid reference or meters)
        #[arg(long)]
        target_northing: String,

        /// Launcher position as EASTING,NORTHING (repeat per launcher)
        #[arg(short = 'l', long = "launcher", required = true)]
        launchers: Vec<String>,

        /// Spacing between aim points (meters)
        #[arg(short = 's', long, default_value = "50.0")]
        spread: f64,

        /// Sheaf pattern
        #[arg(short = 'p', long, default_value = "open")]
        pattern: PatternArg,

        /// Sheaf axis; first launcher to target when omitted
        #[arg(long)]
        orientation: Option<f64>,

        /// Unit of --orientation
        #[arg(long, default_value = "degrees")]
        orientation_unit: BearingUnitArg,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Export the flight path of a solution
    Trace {
        #[command(flatten)]
        mission: MissionArgs,

        /// Ranked charge index (0 = best)
        #[arg(long)]
        charge: Option<usize>,

        /// Trajectory to trace; the selected fire type when omitted
        #[arg(long)]
        fire_type: Option<FireTypeArg>,

        /// Output format
        #[arg(short = 'o', long, default_value = "csv")]
        output: TraceFormat,
    },

    /// List the charge catalog
    Charges {
        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TraceFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BearingUnitArg {
    Degrees,
    Mils,
}

impl BearingUnitArg {
    fn bearing(self, value: f64) -> Bearing {
        match self {
            BearingUnitArg::Degrees => Bearing::degrees(value),
            BearingUnitArg::Mils => Bearing::mils(value),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PatternArg {
    Open,
    Closed,
    Linear,
    Rectangular,
}

impl From<PatternArg> for SheafPattern {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::Open => SheafPattern::Open,
            PatternArg::Closed => SheafPattern::Closed,
            PatternArg::Linear => SheafPattern::Linear,
            PatternArg::Rectangular => SheafPattern::Rectangular,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FireTypeArg {
    Direct,
    Indirect,
}

#[derive(Debug, Serialize)]
struct AdjustReport<'a> {
    tally: AdjustmentTally,
    original_target: Point2D,
    adjusted_target: Point2D,
    adjusted_easting: String,
    adjusted_northing: String,
    mission: &'a MissionOutputs,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => FireControlConfig::from_file(path)?,
        None => FireControlConfig::default(),
    };
    let catalog = config.catalog()?;
    debug!("loaded {} charges", catalog.len());

    match cli.command {
        Commands::Solve { mission, charge, output } => {
            let mut inputs = mission_inputs(&mission)?;
            inputs.charge_index = charge;
            let outputs = recompute(&inputs, &catalog, &config)?;
            display_mission(&outputs, output)?;
        }

        Commands::Adjust {
            mission, add, drop, left, right, bearing, bearing_unit, output
        } => {
            let inputs = mission_inputs(&mission)?;
            let tally = AdjustmentTally::new()
                .with(Correction::Add, add)
                .with(Correction::Drop, drop)
                .with(Correction::Left, left)
                .with(Correction::Right, right);
            let bearing = bearing.map(|value| bearing_unit.bearing(value));

            let adjusted = apply_tally(inputs.launcher.point, inputs.target.point, &tally, bearing)?;
            let adjusted_inputs = MissionInputs {
                target: Position { point: adjusted, ..inputs.target },
                ..inputs
            };
            let outputs = recompute(&adjusted_inputs, &catalog, &config)?;

            let changed = !tally.is_zero();
            let report = AdjustReport {
                tally,
                original_target: inputs.target.point,
                adjusted_target: adjusted,
                adjusted_easting: format_grid_coordinate(
                    adjusted.easting,
                    display_digits(&mission.target_easting, changed),
                ),
                adjusted_northing: format_grid_coordinate(
                    adjusted.northing,
                    display_digits(&mission.target_northing, changed),
                ),
                mission: &outputs,
            };
            display_adjustment(&report, output)?;
        }

        Commands::Sheaf {
            target_easting, target_northing, launchers, spread, pattern,
            orientation, orientation_unit, output
        } => {
            let target = grid_point(&target_easting, &target_northing)?;
            let launchers = launchers
                .iter()
                .map(|text| parse_launcher(text))
                .collect::<Result<Vec<_>, _>>()?;
            let orientation = orientation.map(|value| orientation_unit.bearing(value).to_degrees());

            let assignments = compute_sheaf(&launchers, target, spread, pattern.into(), orientation)?;
            display_sheaf(&assignments, pattern.into(), spread, output)?;
        }

        Commands::Trace { mission, charge, fire_type, output } => {
            let mut inputs = mission_inputs(&mission)?;
            inputs.charge_index = charge;
            let outputs = recompute(&inputs, &catalog, &config)?;

            let selected = outputs.selected().ok_or("no charge at the requested index")?;
            let fire_type = match (fire_type, &outputs.decision) {
                (Some(FireTypeArg::Direct), _) => FireType::Direct,
                (Some(FireTypeArg::Indirect), _) => FireType::Indirect,
                (None, Some(decision)) => decision.fire_type,
                (None, None) => return Err("no viable solution to trace".into()),
            };
            let solution: &AngleSolution = match fire_type {
                FireType::Direct => selected.direct.as_ref(),
                FireType::Indirect => selected.indirect.as_ref(),
            }
            .ok_or_else(|| format!("{} has no {} solution", selected.charge.label, fire_type))?;

            let samples = trace(
                solution.angle_deg,
                selected.horizontal_distance,
                inputs.launcher.elevation,
                inputs.target.elevation,
                &selected.charge,
                &config.solver,
            );

            match output {
                TraceFormat::Csv => {
                    println!("time,x,y");
                    for s in &samples {
                        println!("{:.4},{:.2},{:.2}", s.time, s.x, s.y);
                    }
                }
                TraceFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&samples)?);
                }
            }
        }

        Commands::Charges { output } => {
            display_charges(&catalog, output)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn grid_point(easting: &str, northing: &str) -> Result<Point2D, Box<dyn Error>> {
    let e = parse_grid_coordinate(easting).ok_or_else(|| format!("invalid easting: {easting}"))?;
    let n = parse_grid_coordinate(northing).ok_or_else(|| format!("invalid northing: {northing}"))?;
    Ok(Point2D::new(e, n))
}

fn mission_inputs(args: &MissionArgs) -> Result<MissionInputs, Box<dyn Error>> {
    let launcher = grid_point(&args.launcher_easting, &args.launcher_northing)?;
    let target = grid_point(&args.target_easting, &args.target_northing)?;
    Ok(MissionInputs::new(
        Position { point: launcher, elevation: args.launcher_elevation },
        Position { point: target, elevation: args.target_elevation },
    ))
}

fn parse_launcher(text: &str) -> Result<Point2D, Box<dyn Error>> {
    let (easting, northing) = text
        .split_once(',')
        .ok_or_else(|| format!("launcher must be EASTING,NORTHING: {text}"))?;
    grid_point(easting, northing)
}

fn describe(solution: &Option<AngleSolution>) -> String {
    match solution {
        Some(s) => format!(
            "{:>6.2}° {:>5} mils {:>6.2} s {:>7.2} m",
            s.angle_deg,
            s.rounded_mils(),
            s.time_of_flight,
            s.objective_error
        ),
        None => format!("{:>40}", "n/a"),
    }
}

fn display_mission(outputs: &MissionOutputs, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outputs)?);
        }
        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║         FIRING SOLUTION                ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Range:             {:>8.1} m          ║", outputs.geometry.horizontal_distance);
            println!("║ Bearing:           {:>8.2}°           ║", outputs.geometry.bearing_deg);
            println!("║ Bearing:           {:>8} mils       ║", outputs.geometry.bearing_mils());
            println!("╠════════════════════════════════════════╣");
            match &outputs.decision {
                Some(decision) => {
                    println!("║ Charge:  {:<30}║", decision.charge_label);
                    println!("║ Type:    {:<30}║", decision.fire_type.to_string());
                    println!("║ Elevation:         {:>8} mils       ║", decision.solution.rounded_mils());
                    println!("║ Deflection:        {:>8} mils       ║", decision.bearing_mils);
                    println!("║ Time of Flight:    {:>8.2} s          ║", decision.solution.time_of_flight);
                    println!("║ Miss Distance:     {:>8.2} m          ║", decision.solution.objective_error);
                    println!("╚════════════════════════════════════════╝");
                    println!("{}", decision.reason);
                    if decision.elevation_exceeded {
                        println!("WARNING: elevation below minimum, solution is not safe to fire as laid");
                    }
                }
                None => {
                    println!("║ NO VIABLE SOLUTION                     ║");
                    println!("╚════════════════════════════════════════╝");
                }
            }

            println!("\nCharges (best first):");
            println!("┌───┬────────────────┬──────────────────────────────────────────┬──────────────────────────────────────────┐");
            println!("│ # │ Charge         │ Direct                                   │ Indirect                                 │");
            println!("├───┼────────────────┼──────────────────────────────────────────┼──────────────────────────────────────────┤");
            for (i, s) in outputs.solutions.iter().enumerate() {
                let marker = if i == outputs.selected_index { '>' } else { ' ' };
                println!(
                    "│{}{:<2}│ {:<14} │ {} │ {} │",
                    marker,
                    i,
                    s.charge.label,
                    describe(&s.direct),
                    describe(&s.indirect)
                );
            }
            println!("└───┴────────────────┴──────────────────────────────────────────┴──────────────────────────────────────────┘");
        }
    }

    Ok(())
}

fn display_adjustment(report: &AdjustReport<'_>, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║         FIRE ADJUSTMENT                ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Range correction:  {:>+8.0} m          ║", report.tally.range_correction());
            println!("║ Deflection:        {:>+8.0} m          ║", report.tally.deflection_correction());
            println!("║ Original:  {:<28}║", report.original_target.to_string());
            println!("║ Adjusted:  {:<28}║", report.adjusted_target.to_string());
            println!("║ Grid:      {:<28}║", format!("{} {}", report.adjusted_easting, report.adjusted_northing));
            println!("╚════════════════════════════════════════╝");
            println!();
            display_mission(report.mission, OutputFormat::Table)?;
        }
    }

    Ok(())
}

fn display_sheaf(
    assignments: &[SheafAssignment],
    pattern: SheafPattern,
    spread: f64,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(assignments)?);
        }
        OutputFormat::Table => {
            println!("Sheaf: {} ({:.0} m spread, {} launchers)", pattern, spread, assignments.len());
            println!("┌────┬──────────────┬──────────────┬──────────┬──────────┬──────────┐");
            println!("│ #  │ Aim Easting  │ Aim Northing │ Range(m) │ Brg(deg) │ Brg(mil) │");
            println!("├────┼──────────────┼──────────────┼──────────┼──────────┼──────────┤");
            for a in assignments {
                println!(
                    "│ {:>2} │ {:>12.1} │ {:>12.1} │ {:>8.1} │ {:>8.2} │ {:>8} │",
                    a.launcher_index + 1,
                    a.adjusted_target.easting,
                    a.adjusted_target.northing,
                    a.range,
                    a.bearing_deg,
                    a.bearing_mils
                );
            }
            println!("└────┴──────────────┴──────────────┴──────────┴──────────┴──────────┘");
        }
    }

    Ok(())
}

fn display_charges(catalog: &ChargeCatalog, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(catalog.charges())?);
        }
        OutputFormat::Table => {
            println!("┌────────────────┬──────────┬────────────┬──────────┐");
            println!("│ Charge         │ Mass(kg) │ Drag k     │ MV (m/s) │");
            println!("├────────────────┼──────────┼────────────┼──────────┤");
            for c in catalog.iter() {
                println!(
                    "│ {:<14} │ {:>8.2} │ {:>10.7} │ {:>8.3} │",
                    c.label, c.mass, c.drag_coefficient, c.muzzle_velocity
                );
            }
            println!("└────────────────┴──────────┴────────────┴──────────┘");
        }
    }

    Ok(())
}
