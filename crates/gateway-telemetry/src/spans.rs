//! Span macros.

/// Span around one inbound API request
#[macro_export]
macro_rules! request_span {
    ($endpoint:expr, $model:expr) => {
        tracing::info_span!(
            "api_request",
            endpoint = %$endpoint,
            model = %$model,
        )
    };
}

/// Span around one upstream provider call
#[macro_export]
macro_rules! upstream_span {
    ($provider:expr, $operation:expr) => {
        tracing::info_span!(
            "upstream_call",
            provider = %$provider,
            operation = %$operation,
        )
    };
}
