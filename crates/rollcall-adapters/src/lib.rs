pub mod datadog;
mod http;
pub mod slack;
