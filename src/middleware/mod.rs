pub mod request_span;
