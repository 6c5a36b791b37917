/// Generate a trace id for correlating a request with its error body and logs.
#[must_use]
pub fn generate_trace_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
