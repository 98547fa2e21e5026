pub mod simulation_setting;

pub use simulation_setting::SimulationModeSetting;
