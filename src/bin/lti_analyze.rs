use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use lti_analysis::prelude::*;
use tracing_subscriber::EnvFilter;

/// Pole-zero, partial-fraction and time-response analysis of second-order systems
#[derive(Parser, Debug)]
#[command(name = "lti-analyze", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    system: SystemCommand,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Time window in seconds for responses and components (default: per system)
    #[arg(long, global = true)]
    span: Option<f64>,

    /// Number of samples per time grid (default: per system)
    #[arg(long, global = true)]
    samples: Option<usize>,

    /// State update used by the simulator
    #[arg(long, value_enum, default_value_t = Method::Zoh, global = true)]
    method: Method,

    /// Directory for figures and CSV files
    #[arg(long, default_value = "figures", global = true)]
    out_dir: PathBuf,

    /// Also export responses and components as CSV
    #[arg(long, global = true)]
    csv: bool,

    /// Skip figure rendering
    #[arg(long, global = true)]
    no_plot: bool,
}

#[derive(Subcommand, Debug)]
enum SystemCommand {
    /// Two-branch RLC circuit: 1 / (C(L1+L2) s^2 + C(R1+R2) s + 1)
    Electrical {
        /// First inductance [H]
        #[arg(long, default_value_t = 10e-3)]
        l1: f64,
        /// Second inductance [H]
        #[arg(long, default_value_t = 15e-3)]
        l2: f64,
        /// First resistance [Ohm]
        #[arg(long, default_value_t = 100.0)]
        r1: f64,
        /// Second resistance [Ohm]
        #[arg(long, default_value_t = 150.0)]
        r2: f64,
        /// Capacitance [F]
        #[arg(long, default_value_t = 100e-9)]
        c: f64,
    },
    /// Mass-spring-damper: 1 / (m s^2 + c s + k)
    Mechanical {
        /// Mass [kg]
        #[arg(long, default_value_t = 1.0)]
        mass: f64,
        /// Damping coefficient [N*s/m]
        #[arg(long, default_value_t = 0.1)]
        damping: f64,
        /// Stiffness [N/m]
        #[arg(long, default_value_t = 0.5)]
        stiffness: f64,
    },
    /// DC motor, voltage to angular velocity
    Motor {
        /// Armature inductance Ld [H]
        #[arg(long, default_value_t = 0.02)]
        inductance: f64,
        /// Armature resistance Rd [Ohm]
        #[arg(long, default_value_t = 0.5)]
        resistance: f64,
        /// Torque constant Kf [N*m/A]
        #[arg(long, default_value_t = 5.0)]
        torque_constant: f64,
        /// Back-EMF constant Ke [V*s/rad]
        #[arg(long, default_value_t = 2.0)]
        back_emf_constant: f64,
        /// Rotor inertia Jm [kg*m^2]
        #[arg(long, default_value_t = 5.0)]
        inertia: f64,
        /// Viscous friction b [N*m*s]
        #[arg(long, default_value_t = 2.0)]
        friction: f64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Method {
    /// Exact zero-order hold (matrix exponential)
    Zoh,
    /// Trapezoidal rule
    Trapezoidal,
    /// Backward Euler
    BackwardEuler,
}

impl From<Method> for Discretization {
    fn from(method: Method) -> Self {
        match method {
            Method::Zoh => Self::ZeroOrderHold,
            Method::Trapezoidal => Self::Trapezoidal,
            Method::BackwardEuler => Self::BackwardEuler,
        }
    }
}

fn run_system<S: PhysicalSystem>(system: S, args: &OutputArgs) -> Result<(), AnalysisError> {
    let config = system
        .default_config()
        .with_span(args.span)
        .with_samples(args.samples)
        .with_method(args.method.into());
    let analysis = SystemAnalysis::with_config(system, config)?;
    println!("{analysis}");

    if args.csv {
        write_csv(&analysis, &args.out_dir)?;
    }
    if !args.no_plot {
        render(&analysis, &args.out_dir)?;
    }
    Ok(())
}

fn write_csv<S: PhysicalSystem>(analysis: &SystemAnalysis<S>, dir: &Path) -> Result<(), AnalysisError> {
    std::fs::create_dir_all(dir)?;
    let name = analysis.system().name();

    let impulse_path = dir.join(format!("{name}_impulse.csv"));
    write_response_csv(BufWriter::new(File::create(&impulse_path)?), &analysis.impulse_response()?, "impulse")?;
    let step_path = dir.join(format!("{name}_step.csv"));
    write_response_csv(BufWriter::new(File::create(&step_path)?), &analysis.step_response()?, "step")?;
    let components_path = dir.join(format!("{name}_partial_fractions.csv"));
    write_components_csv(
        BufWriter::new(File::create(&components_path)?),
        &analysis.partial_fraction_components()?,
    )?;

    for path in [impulse_path, step_path, components_path] {
        tracing::info!(path = %path.display(), "wrote csv");
    }
    Ok(())
}

#[cfg(feature = "plot")]
fn render<S: PhysicalSystem>(analysis: &SystemAnalysis<S>, dir: &Path) -> Result<(), AnalysisError> {
    for path in render_analysis(analysis, dir)? {
        println!("figure: {}", path.display());
    }
    Ok(())
}

#[cfg(not(feature = "plot"))]
fn render<S: PhysicalSystem>(_analysis: &SystemAnalysis<S>, _dir: &Path) -> Result<(), AnalysisError> {
    tracing::warn!("built without the `plot` feature; skipping figures");
    Ok(())
}

fn run(cli: Cli) -> Result<(), AnalysisError> {
    match cli.system {
        SystemCommand::Electrical { l1, l2, r1, r2, c } => run_system(
            ElectricalSystem::new(ElectricalParameters { l1, l2, r1, r2, c })?,
            &cli.output,
        ),
        SystemCommand::Mechanical {
            mass,
            damping,
            stiffness,
        } => run_system(
            MechanicalSystem::new(MechanicalParameters {
                mass,
                damping,
                stiffness,
            })?,
            &cli.output,
        ),
        SystemCommand::Motor {
            inductance,
            resistance,
            torque_constant,
            back_emf_constant,
            inertia,
            friction,
        } => run_system(
            MotorSystem::new(MotorParameters {
                inductance,
                resistance,
                torque_constant,
                back_emf_constant,
                inertia,
                friction,
            })?,
            &cli.output,
        ),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mechanical_defaults_are_reference_parameters() {
        let cli = Cli::try_parse_from(["lti-analyze", "mechanical"]).unwrap();
        match cli.system {
            SystemCommand::Mechanical {
                mass,
                damping,
                stiffness,
            } => assert_eq!((mass, damping, stiffness), (1.0, 0.1, 0.5)),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.output.method, Method::Zoh);
        assert!(cli.output.span.is_none());
    }

    #[test]
    fn global_options_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "lti-analyze",
            "motor",
            "--inertia",
            "2.5",
            "--span",
            "1.5",
            "--method",
            "backward-euler",
            "--no-plot",
        ])
        .unwrap();
        assert!(matches!(cli.system, SystemCommand::Motor { inertia, .. } if inertia == 2.5));
        assert_eq!(cli.output.span, Some(1.5));
        assert_eq!(Discretization::from(cli.output.method), Discretization::BackwardEuler);
        assert!(cli.output.no_plot);
    }

    #[test]
    fn electrical_accepts_scientific_notation() {
        let cli = Cli::try_parse_from(["lti-analyze", "electrical", "--c", "220e-9"]).unwrap();
        assert!(matches!(cli.system, SystemCommand::Electrical { c, .. } if c == 220e-9));
    }

    #[test]
    fn csv_export_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = SystemAnalysis::new(MechanicalSystem::reference()).unwrap();
        write_csv(&analysis, dir.path()).unwrap();
        for suffix in ["impulse", "step", "partial_fractions"] {
            assert!(dir.path().join(format!("mechanical_{suffix}.csv")).exists());
        }
    }
}
