pub mod capture_endpoint;
pub mod noise_filter;
pub mod output_endpoint;
pub mod pipeline_delegate;
