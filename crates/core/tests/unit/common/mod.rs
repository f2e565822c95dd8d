
/// Arena handles and simulated time.
pub mod handles;
