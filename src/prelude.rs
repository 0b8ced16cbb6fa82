//! Convenience re-exports for analysing second-order systems.

pub use crate::analysis::{
    write_components_csv, AnalysisConfig, ComponentSeries, ComponentTrace, SystemAnalysis,
};
pub use crate::backend::{NumericBackend, ResidueSolver, ResponseSimulator, RootFinder};
pub use crate::errors::AnalysisError;
pub use crate::grid::{linspace, TimeGrid};
pub use crate::math::{CScalar, Scalar};
#[cfg(feature = "plot")]
pub use crate::plot::{draw_components, draw_pole_zero_map, draw_time_series, render_analysis};
pub use crate::polynomial::{CompanionRoots, Polynomial};
pub use crate::residue::{GeneralizedResidues, PartialFractions, ResidueTerm};
pub use crate::simulation::{
    write_response_csv, Discretization, Excitation, SimulationError, StateSpace,
    StateSpaceSimulator, TimeResponse,
};
pub use crate::systems::{
    ElectricalParameters, ElectricalSystem, MechanicalParameters, MechanicalSystem,
    MotorParameters, MotorSystem, Parameter, PhysicalSystem,
};
pub use crate::transfer::TransferFunction;
