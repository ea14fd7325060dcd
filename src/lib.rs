pub mod clients;
pub mod metrics;
pub mod simulation;
pub mod view;

pub use clients::{ClientActivity, ClientRoster};
pub use metrics::MetricSample;
pub use simulation::{SimConfig, TrainingController, TrainingStatus};

pub mod prelude {
    pub use crate::clients::{ClientActivity, ClientRoster};
    pub use crate::metrics::report::RunReport;
    pub use crate::metrics::MetricSample;
    pub use crate::simulation::{
        SimConfig, TrainingController, TrainingEvent, TrainingSnapshot, TrainingStatus,
    };
}
