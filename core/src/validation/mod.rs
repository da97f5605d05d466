//! Post-hoc verification of algorithm results

pub mod correctness;

pub use self::correctness::{verify_cut_duality, verify_maximum_flow, FlowVerification, VerificationError};
