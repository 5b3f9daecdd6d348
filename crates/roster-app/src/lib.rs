// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod charts;
pub mod controller;
pub mod driver;
pub mod forms;
pub mod gateway;
pub mod ids;
pub mod model;
pub mod monitored;
pub mod query;
pub mod state;
pub mod stats;

pub use charts::*;
pub use controller::*;
pub use driver::*;
pub use forms::*;
pub use gateway::*;
pub use ids::*;
pub use model::*;
pub use monitored::*;
pub use query::*;
pub use state::*;
pub use stats::*;
