pub mod generation;

pub use generation::{
    Capabilities, GenerationGateway, GenerationLimits, GenerationOutcome, GenerationRequest,
};
