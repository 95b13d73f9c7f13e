// Domain layer: data carried across the HTTP boundary. No dependencies beyond serde.

pub mod model;
