pub mod bundle;
pub mod eta;
pub mod features;
pub mod model;
pub mod route;
pub mod shared;
pub mod train;

pub mod prelude {
    pub use crate::bundle::{BundleStore, ModelBundle};
    pub use crate::eta::{EtaEstimate, EtaService, predict_eta};
    pub use crate::features::{Condition, FeatureVector, build_features};
    pub use crate::model::{Model, ModelKind, StandardScaler};
    pub use crate::route::{RouteTable, Stop};
    pub use crate::shared::geo::Coordinate;
    pub use crate::train::{Candidate, TrainConfig, default_candidates, train_and_select};
}
