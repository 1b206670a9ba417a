mod quote;

pub use quote::{exact_input_params, quote_and_bound};
