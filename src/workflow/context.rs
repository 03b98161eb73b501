//! Shared state threaded through one workflow run

/// State for a single workflow invocation
///
/// `input` is caller-supplied and has its defaults filled once by an init
/// step. `runtime` is mutable scratch space for intermediate artifacts
/// (fetched manifests, deployment-unit handles). `output` is built
/// incrementally and is the only part returned on success.
///
/// One context exists per invocation; contexts are never shared.
#[derive(Debug)]
pub struct Context<I, R, O> {
    /// Caller-supplied input
    pub input: I,

    /// Mutable scratch space for intermediate state
    pub runtime: R,

    /// Result under construction, returned whole or not at all
    pub output: O,
}

